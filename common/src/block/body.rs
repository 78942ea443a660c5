use std::fmt::{Display, Error as FmtError, Formatter};

use serde::{Deserialize, Serialize};

use crate::{
    crypto::{hash, Address, Hash, Hashable, ADDRESS_SIZE},
    serializer::{Reader, ReaderError, Serializer, Writer},
    transaction::Transaction,
};

use super::calculate_merkle_root;

/// Block payload: the miner reward address and the ordered transaction list.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
pub struct BlockBody {
    miner: Address,
    transactions: Vec<Transaction>,
}

impl BlockBody {
    pub fn new(miner: Address, transactions: Vec<Transaction>) -> Self {
        Self {
            miner,
            transactions,
        }
    }

    pub fn get_miner(&self) -> &Address {
        &self.miner
    }

    pub fn get_transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn get_txs_count(&self) -> usize {
        self.transactions.len()
    }
}

impl Serializer for BlockBody {
    fn write(&self, writer: &mut Writer) {
        self.miner.write(writer);
        assert!(
            self.transactions.len() <= u16::MAX as usize,
            "transaction count {} exceeds the length prefix",
            self.transactions.len()
        );
        writer.write_u16(self.transactions.len() as u16);
        for tx in &self.transactions {
            tx.write(writer);
        }
    }

    fn read(reader: &mut Reader) -> Result<BlockBody, ReaderError> {
        let miner = Address::read(reader)?;
        let count = reader.read_u16()?;
        let mut transactions = Vec::with_capacity(count as usize);
        for _ in 0..count {
            transactions.push(Transaction::read(reader)?);
        }
        Ok(BlockBody {
            miner,
            transactions,
        })
    }

    fn size(&self) -> usize {
        ADDRESS_SIZE + 2 + self.transactions.iter().map(|tx| tx.size()).sum::<usize>()
    }
}

impl Hashable for BlockBody {
    // Merkle commitment over the miner address and the ordered transactions
    fn hash(&self) -> Hash {
        let mut leaves = Vec::with_capacity(1 + self.transactions.len());
        leaves.push(hash(self.miner.as_bytes()));
        for tx in &self.transactions {
            leaves.push(tx.hash());
        }
        calculate_merkle_root(&leaves)
    }
}

impl Display for BlockBody {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        write!(
            f,
            "BlockBody[miner: {}, txs: {}]",
            self.miner,
            self.transactions.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::KeyPair;

    fn body_with_txs(count: u32) -> BlockBody {
        let txs = (0..count)
            .map(|nonce| {
                Transaction::new_signed(&KeyPair::new(), Address::zero(), 100, 1, nonce).unwrap()
            })
            .collect();
        BlockBody::new(Address::new([9u8; ADDRESS_SIZE]), txs)
    }

    #[test]
    fn test_empty_body_round_trip() {
        let body = body_with_txs(0);
        let bytes = body.to_bytes();
        assert_eq!(bytes.len(), ADDRESS_SIZE + 2);
        assert_eq!(bytes.len(), body.size());
        assert_eq!(BlockBody::from_bytes(&bytes).unwrap(), body);
    }

    #[test]
    fn test_round_trip() {
        let body = body_with_txs(3);
        let bytes = body.to_bytes();
        assert_eq!(bytes.len(), body.size());

        let decoded = BlockBody::from_bytes(&bytes).unwrap();
        assert_eq!(decoded, body);
        assert_eq!(decoded.hash(), body.hash());
    }

    #[test]
    fn test_commitment_depends_on_miner() {
        let body = body_with_txs(2);
        let other = BlockBody::new(
            Address::new([8u8; ADDRESS_SIZE]),
            body.get_transactions().to_vec(),
        );
        assert_ne!(body.hash(), other.hash());
    }

    #[test]
    fn test_commitment_depends_on_tx_order() {
        let body = body_with_txs(2);
        let mut reversed = body.get_transactions().to_vec();
        reversed.reverse();
        let other = BlockBody::new(body.get_miner().clone(), reversed);
        assert_ne!(body.hash(), other.hash());
    }
}
