mod reader;
mod writer;

pub use reader::{Reader, ReaderError};
pub use writer::Writer;

// Common trait for every record that is persisted or sent over the wire.
// The byte representation is canonical: `to_bytes` must produce exactly
// `size()` bytes and `read(write(x)) == x`.
pub trait Serializer {
    fn write(&self, writer: &mut Writer);

    fn read(reader: &mut Reader) -> Result<Self, ReaderError>
    where
        Self: Sized;

    fn size(&self) -> usize {
        self.to_bytes().len()
    }

    fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.size());
        let mut writer = Writer::new(&mut bytes);
        self.write(&mut writer);
        bytes
    }

    fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, ReaderError>
    where
        Self: Sized,
    {
        let mut reader = Reader::new(bytes);
        Self::read(&mut reader)
    }

    fn from_hex(hex: &str) -> Result<Self, ReaderError>
    where
        Self: Sized,
    {
        let bytes = hex::decode(hex).map_err(|_| ReaderError::InvalidHex)?;
        Self::from_bytes(&bytes)
    }
}
