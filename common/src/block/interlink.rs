use std::fmt::{Display, Error as FmtError, Formatter};

use serde::{Deserialize, Serialize};

use crate::{
    crypto::{Hash, Hashable, HASH_SIZE},
    serializer::{Reader, ReaderError, Serializer, Writer},
};

/// Ordered back-pointers to ancestors whose hashes met increasingly hard
/// targets. Slot 0 always carries the genesis hash; only the genesis block
/// itself has an empty interlink.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
pub struct BlockInterlink {
    hashes: Vec<Hash>,
}

impl BlockInterlink {
    pub fn new(hashes: Vec<Hash>) -> Self {
        Self { hashes }
    }

    pub fn empty() -> Self {
        Self { hashes: Vec::new() }
    }

    pub fn hashes(&self) -> &[Hash] {
        &self.hashes
    }

    pub fn len(&self) -> usize {
        self.hashes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hashes.is_empty()
    }
}

impl Serializer for BlockInterlink {
    fn write(&self, writer: &mut Writer) {
        assert!(
            self.hashes.len() <= u8::MAX as usize,
            "interlink of {} entries exceeds the length prefix",
            self.hashes.len()
        );
        writer.write_u8(self.hashes.len() as u8);
        for hash in &self.hashes {
            writer.write_hash(hash);
        }
    }

    fn read(reader: &mut Reader) -> Result<BlockInterlink, ReaderError> {
        let count = reader.read_u8()?;
        let mut hashes = Vec::with_capacity(count as usize);
        for _ in 0..count {
            hashes.push(reader.read_hash()?);
        }
        Ok(BlockInterlink { hashes })
    }

    fn size(&self) -> usize {
        1 + self.hashes.len() * HASH_SIZE
    }
}

impl Hashable for BlockInterlink {}

impl Display for BlockInterlink {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        let hashes: Vec<String> = self.hashes.iter().map(|h| format!("{}", h)).collect();
        write!(f, "BlockInterlink[{}]", hashes.join(", "))
    }
}
