use std::string::FromUtf8Error;

use thiserror::Error;

use crate::crypto::{Hash, HASH_SIZE};

#[derive(Debug, Error)]
pub enum ReaderError {
    #[error("Not enough bytes left in the buffer")]
    InvalidSize,
    #[error("Invalid value read from the buffer")]
    InvalidValue,
    #[error("Invalid hex input")]
    InvalidHex,
    #[error("Error during conversion of raw bytes")]
    ErrorTryInto,
    #[error("Invalid UTF-8 string: {0}")]
    InvalidString(#[from] FromUtf8Error),
}

// Cursor over a borrowed byte slice.
// Every read is bounds-checked before any byte is consumed, so a failed
// read leaves the cursor where it was.
pub struct Reader<'a> {
    bytes: &'a [u8],
    total: usize,
}

impl<'a> Reader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Reader { bytes, total: 0 }
    }

    pub fn read_bytes_ref(&mut self, count: usize) -> Result<&'a [u8], ReaderError> {
        if count > self.size() {
            return Err(ReaderError::InvalidSize);
        }

        let bytes = &self.bytes[self.total..self.total + count];
        self.total += count;
        Ok(bytes)
    }

    pub fn read_bytes<T>(&mut self, count: usize) -> Result<T, ReaderError>
    where
        T: TryFrom<Vec<u8>>,
    {
        let bytes = self.read_bytes_ref(count)?.to_vec();
        bytes.try_into().map_err(|_| ReaderError::ErrorTryInto)
    }

    pub fn read_u8(&mut self) -> Result<u8, ReaderError> {
        let bytes = self.read_bytes_ref(1)?;
        Ok(bytes[0])
    }

    pub fn read_u16(&mut self) -> Result<u16, ReaderError> {
        let bytes = self.read_bytes_ref(2)?;
        Ok(u16::from_be_bytes(bytes.try_into().map_err(|_| ReaderError::ErrorTryInto)?))
    }

    pub fn read_u32(&mut self) -> Result<u32, ReaderError> {
        let bytes = self.read_bytes_ref(4)?;
        Ok(u32::from_be_bytes(bytes.try_into().map_err(|_| ReaderError::ErrorTryInto)?))
    }

    pub fn read_u64(&mut self) -> Result<u64, ReaderError> {
        let bytes = self.read_bytes_ref(8)?;
        Ok(u64::from_be_bytes(bytes.try_into().map_err(|_| ReaderError::ErrorTryInto)?))
    }

    pub fn read_hash(&mut self) -> Result<Hash, ReaderError> {
        let bytes = self.read_bytes(HASH_SIZE)?;
        Ok(Hash::new(bytes))
    }

    // VarLenString: 1 byte length N in [0, 255], then N UTF-8 bytes
    pub fn read_string(&mut self) -> Result<String, ReaderError> {
        let len = self.read_u8()? as usize;
        let bytes = self.read_bytes_ref(len)?;
        Ok(String::from_utf8(bytes.to_vec())?)
    }

    // Remaining unread bytes
    pub fn size(&self) -> usize {
        self.bytes.len() - self.total
    }

    pub fn total_size(&self) -> usize {
        self.bytes.len()
    }

    pub fn total_read(&self) -> usize {
        self.total
    }
}
