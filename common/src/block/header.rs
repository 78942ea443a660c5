use std::fmt::{Display, Error as FmtError, Formatter};

use log::warn;
use primitive_types::U256;
use serde::{Deserialize, Serialize};

use crate::{
    crypto::{Hash, Hashable, HASH_SIZE},
    difficulty::{
        compact_to_target, difficulty_from_target, is_proof_of_work, Difficulty, DifficultyError,
    },
    serializer::{Reader, ReaderError, Serializer, Writer},
};

// 4 hashes + 4 u32 fields
pub const HEADER_SIZE: usize = HASH_SIZE * 4 + 4 * 4;

/// Fixed-size block header. Its hash is the block's identifying hash and
/// the value the proof of work is checked against.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
pub struct BlockHeader {
    pub prev_hash: Hash,
    pub interlink_hash: Hash,
    pub body_hash: Hash,
    pub accounts_hash: Hash,
    // compact difficulty target
    pub n_bits: u32,
    pub height: u32,
    // seconds since epoch
    pub timestamp: u32,
    pub nonce: u32,
}

impl BlockHeader {
    pub fn new(
        prev_hash: Hash,
        interlink_hash: Hash,
        body_hash: Hash,
        accounts_hash: Hash,
        n_bits: u32,
        height: u32,
        timestamp: u32,
        nonce: u32,
    ) -> Self {
        Self {
            prev_hash,
            interlink_hash,
            body_hash,
            accounts_hash,
            n_bits,
            height,
            timestamp,
            nonce,
        }
    }

    // Expanded 256-bit target encoded by `n_bits`
    pub fn get_target(&self) -> Result<U256, DifficultyError> {
        compact_to_target(self.n_bits)
    }

    pub fn get_difficulty(&self) -> Result<Difficulty, DifficultyError> {
        difficulty_from_target(&self.get_target()?)
    }

    // A malformed compact target fails closed
    pub fn verify_proof_of_work(&self) -> bool {
        let target = match self.get_target() {
            Ok(target) => target,
            Err(e) => {
                warn!("Header {} carries a malformed target: {}", self.hash(), e);
                return false;
            }
        };
        is_proof_of_work(&self.hash(), &target)
    }
}

impl Serializer for BlockHeader {
    fn write(&self, writer: &mut Writer) {
        writer.write_hash(&self.prev_hash);
        writer.write_hash(&self.interlink_hash);
        writer.write_hash(&self.body_hash);
        writer.write_hash(&self.accounts_hash);
        writer.write_u32(&self.n_bits);
        writer.write_u32(&self.height);
        writer.write_u32(&self.timestamp);
        writer.write_u32(&self.nonce);
    }

    fn read(reader: &mut Reader) -> Result<BlockHeader, ReaderError> {
        let prev_hash = reader.read_hash()?;
        let interlink_hash = reader.read_hash()?;
        let body_hash = reader.read_hash()?;
        let accounts_hash = reader.read_hash()?;
        let n_bits = reader.read_u32()?;
        let height = reader.read_u32()?;
        let timestamp = reader.read_u32()?;
        let nonce = reader.read_u32()?;

        Ok(BlockHeader {
            prev_hash,
            interlink_hash,
            body_hash,
            accounts_hash,
            n_bits,
            height,
            timestamp,
            nonce,
        })
    }

    fn size(&self) -> usize {
        HEADER_SIZE
    }
}

impl Hashable for BlockHeader {}

impl Display for BlockHeader {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        write!(
            f,
            "BlockHeader[height: {}, prev: {}, timestamp: {}, nonce: {}]",
            self.height, self.prev_hash, self.timestamp, self.nonce
        )
    }
}
