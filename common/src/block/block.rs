use std::{
    collections::HashSet,
    fmt::{Display, Error as FmtError, Formatter},
    ops::Deref,
};

use lazy_static::lazy_static;
use log::{debug, warn};
use primitive_types::U256;
use serde::{Deserialize, Serialize};

use crate::{
    config::{
        BLOCK_SIZE_MAX, GENESIS_ACCOUNTS_HASH, GENESIS_HEIGHT, GENESIS_MINER, GENESIS_N_BITS,
        GENESIS_NONCE, GENESIS_TIMESTAMP,
    },
    crypto::{Hash, Hashable},
    difficulty::{get_target_height, is_proof_of_work, level_target},
    serializer::{Reader, ReaderError, Serializer, Writer},
};

use super::{BlockBody, BlockHeader, BlockInterlink};

lazy_static! {
    // Bound once at first access, immutable afterwards
    static ref GENESIS: Block = {
        let body = BlockBody::new(GENESIS_MINER, Vec::new());
        let interlink = BlockInterlink::empty();
        let header = BlockHeader::new(
            Hash::zero(),
            interlink.hash(),
            body.hash(),
            GENESIS_ACCOUNTS_HASH,
            GENESIS_N_BITS,
            GENESIS_HEIGHT,
            GENESIS_TIMESTAMP,
            GENESIS_NONCE,
        );
        Block::new(header, interlink, body)
    };
    static ref GENESIS_HASH: Hash = GENESIS.hash();
}

/// Self-verifying unit of the chain: header, interlink and body.
/// Construction only composes; all invariants are enforced by `verify`.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
pub struct Block {
    header: BlockHeader,
    interlink: BlockInterlink,
    body: BlockBody,
}

impl Block {
    pub fn new(header: BlockHeader, interlink: BlockInterlink, body: BlockBody) -> Self {
        Block {
            header,
            interlink,
            body,
        }
    }

    pub fn genesis() -> &'static Block {
        &GENESIS
    }

    pub fn genesis_hash() -> &'static Hash {
        &GENESIS_HASH
    }

    pub fn get_header(&self) -> &BlockHeader {
        &self.header
    }

    pub fn get_interlink(&self) -> &BlockInterlink {
        &self.interlink
    }

    pub fn get_body(&self) -> &BlockBody {
        &self.body
    }

    pub fn split(self) -> (BlockHeader, BlockInterlink, BlockBody) {
        (self.header, self.interlink, self.body)
    }

    /// Intrinsic validity. Checks run in a fixed order and the first failing
    /// rule determines the reported reason; any failure yields `false`.
    pub fn verify(&self) -> bool {
        if self.size() > BLOCK_SIZE_MAX {
            warn!(
                "Block {} rejected: {} bytes exceed the limit of {}",
                self.hash(),
                self.size(),
                BLOCK_SIZE_MAX
            );
            return false;
        }

        // at most one transaction per sender per block
        let mut senders = HashSet::with_capacity(self.body.get_txs_count());
        for tx in self.body.get_transactions() {
            if !senders.insert(tx.get_sender_pub_key()) {
                warn!(
                    "Block {} rejected: duplicate sender {}",
                    self.hash(),
                    tx.get_sender_pub_key()
                );
                return false;
            }
        }

        for tx in self.body.get_transactions() {
            if *tx.get_recipient() == tx.get_sender_address() {
                warn!(
                    "Block {} rejected: transaction sends to its own sender {}",
                    self.hash(),
                    tx.get_sender_address()
                );
                return false;
            }
        }

        if !self.header.verify_proof_of_work() {
            warn!("Block {} rejected: proof of work not met", self.hash());
            return false;
        }

        if self.header.body_hash != self.body.hash() {
            warn!("Block {} rejected: body hash mismatch", self.hash());
            return false;
        }

        if self.header.interlink_hash != self.interlink.hash() {
            warn!("Block {} rejected: interlink hash mismatch", self.hash());
            return false;
        }

        for tx in self.body.get_transactions() {
            if !tx.verify_signature() {
                warn!(
                    "Block {} rejected: invalid signature from {}",
                    self.hash(),
                    tx.get_sender_address()
                );
                return false;
            }
        }

        true
    }

    /// Whether this block is a valid direct child of `prev`.
    ///
    /// The expected interlink is the parent's, retargeted with *this* block's
    /// target: under dynamic difficulty the child inherits an interlink
    /// already adjusted for the new difficulty.
    pub fn is_successor_of(&self, prev: &Block) -> bool {
        if self.header.height != prev.header.height + 1 {
            debug!(
                "Block {} is no successor: height {} after {}",
                self.hash(),
                self.header.height,
                prev.header.height
            );
            return false;
        }

        if self.header.timestamp < prev.header.timestamp {
            debug!("Block {} is no successor: timestamp goes backwards", self.hash());
            return false;
        }

        if self.header.prev_hash != prev.hash() {
            debug!("Block {} is no successor: prev hash mismatch", self.hash());
            return false;
        }

        let next_target = match self.header.get_target() {
            Ok(target) => target,
            Err(e) => {
                debug!("Block {} is no successor: malformed target: {}", self.hash(), e);
                return false;
            }
        };

        self.header.interlink_hash == prev.next_interlink(&next_target).hash()
    }

    /// Interlink a direct child mined against `next_target` must carry.
    ///
    /// Difficulty-aware InterlinkUpdate: the block's hash is inserted once
    /// per cleared level below the next target height, and the tail of the
    /// current interlink is shifted by the height difference between the
    /// current and the next target.
    pub fn next_interlink(&self, next_target: &U256) -> BlockInterlink {
        let hash = self.hash();
        let next_height = get_target_height(next_target);

        // number of levels beyond the next target this hash clears
        let mut depth: u32 = 0;
        while depth < next_height
            && is_proof_of_work(&hash, &level_target(next_height - depth - 1))
        {
            depth += 1;
        }

        let current_height = match self.header.get_target() {
            Ok(target) => get_target_height(&target),
            Err(e) => {
                warn!(
                    "Block {} carries a malformed target ({}), keeping the next height",
                    hash, e
                );
                next_height
            }
        };

        if depth == 0 && current_height == next_height {
            return self.interlink.clone();
        }

        let mut hashes = Vec::with_capacity(1 + depth as usize + self.interlink.len());
        hashes.push(Block::genesis_hash().clone());
        for _ in 0..depth {
            hashes.push(hash.clone());
        }

        // entries that no longer satisfy the new height are dropped; a
        // negative offset pulls in extra entries instead
        let offset = current_height as i64 - next_height as i64;
        let start = depth as i64 + offset + 1;
        for i in start.max(0)..self.interlink.len() as i64 {
            hashes.push(self.interlink.hashes()[i as usize].clone());
        }

        BlockInterlink::new(hashes)
    }
}

impl Serializer for Block {
    fn write(&self, writer: &mut Writer) {
        self.header.write(writer);
        self.interlink.write(writer);
        self.body.write(writer);
    }

    fn read(reader: &mut Reader) -> Result<Block, ReaderError> {
        let header = BlockHeader::read(reader)?;
        let interlink = BlockInterlink::read(reader)?;
        let body = BlockBody::read(reader)?;
        Ok(Block::new(header, interlink, body))
    }

    fn size(&self) -> usize {
        self.header.size() + self.interlink.size() + self.body.size()
    }
}

impl Hashable for Block {
    fn hash(&self) -> Hash {
        self.header.hash()
    }
}

impl Deref for Block {
    type Target = BlockHeader;

    fn deref(&self) -> &Self::Target {
        self.get_header()
    }
}

impl Display for Block {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        write!(
            f,
            "Block[height: {}, hash: {}, txs: {}]",
            self.header.height,
            self.hash(),
            self.body.get_txs_count()
        )
    }
}
