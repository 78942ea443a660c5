use crate::crypto::Hash;

// Appends canonical big-endian encodings to a borrowed buffer.
// Callers preallocate with `Serializer::size()` so writes never reallocate.
pub struct Writer<'a> {
    bytes: &'a mut Vec<u8>,
}

impl<'a> Writer<'a> {
    pub fn new(bytes: &'a mut Vec<u8>) -> Self {
        Writer { bytes }
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.bytes.extend_from_slice(bytes);
    }

    pub fn write_u8(&mut self, value: u8) {
        self.bytes.push(value);
    }

    pub fn write_u16(&mut self, value: u16) {
        self.bytes.extend_from_slice(&value.to_be_bytes());
    }

    pub fn write_u32(&mut self, value: &u32) {
        self.bytes.extend_from_slice(&value.to_be_bytes());
    }

    pub fn write_u64(&mut self, value: &u64) {
        self.bytes.extend_from_slice(&value.to_be_bytes());
    }

    pub fn write_hash(&mut self, hash: &Hash) {
        self.bytes.extend_from_slice(hash.as_bytes());
    }

    // VarLenString: 1 byte length N in [0, 255], then N UTF-8 bytes
    pub fn write_string(&mut self, value: &str) {
        assert!(
            value.len() <= u8::MAX as usize,
            "string of {} bytes exceeds the VarLenString capacity",
            value.len()
        );
        self.write_u8(value.len() as u8);
        self.write_bytes(value.as_bytes());
    }

    pub fn total_write(&self) -> usize {
        self.bytes.len()
    }
}
