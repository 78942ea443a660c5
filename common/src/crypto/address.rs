use std::{
    fmt::{Display, Error, Formatter},
    str::FromStr,
};

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::de::Error as SerdeError;
use serde::{Deserialize, Serialize};

use super::{hash, PublicKey};
use crate::serializer::{Reader, ReaderError, Serializer, Writer};

pub const ADDRESS_SIZE: usize = 20;

// Account identifier: the first 20 bytes of the hash of a public key.
#[derive(Eq, PartialEq, PartialOrd, Ord, Hash, Clone, Debug)]
pub struct Address([u8; ADDRESS_SIZE]);

impl Address {
    pub const fn new(bytes: [u8; ADDRESS_SIZE]) -> Self {
        Address(bytes)
    }

    pub const fn zero() -> Self {
        Address::new([0; ADDRESS_SIZE])
    }

    pub fn from_public_key(key: &PublicKey) -> Self {
        let hash = hash(key.as_bytes());
        let mut bytes = [0u8; ADDRESS_SIZE];
        bytes.copy_from_slice(&hash.as_bytes()[..ADDRESS_SIZE]);
        Address(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_SIZE] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn to_base64(&self) -> String {
        BASE64.encode(self.0)
    }

    pub fn from_base64(value: &str) -> Result<Self, &'static str> {
        let bytes = BASE64.decode(value).map_err(|_| "Invalid base64 string")?;
        let bytes: [u8; ADDRESS_SIZE] = bytes.try_into().map_err(|_| "Invalid address")?;
        Ok(Address::new(bytes))
    }
}

impl FromStr for Address {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s).map_err(|_| "Invalid hex string")?;
        let bytes: [u8; ADDRESS_SIZE] = bytes.try_into().map_err(|_| "Invalid address")?;
        Ok(Address::new(bytes))
    }
}

impl Serializer for Address {
    fn read(reader: &mut Reader) -> Result<Self, ReaderError> {
        let bytes = reader.read_bytes(ADDRESS_SIZE)?;
        Ok(Address::new(bytes))
    }

    fn write(&self, writer: &mut Writer) {
        writer.write_bytes(&self.0);
    }

    fn size(&self) -> usize {
        ADDRESS_SIZE
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        write!(f, "{}", &self.to_hex())
    }
}

impl Serialize for Address {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'a> Deserialize<'a> for Address {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'a>,
    {
        let hex = String::deserialize(deserializer)?;
        Address::from_str(&hex).map_err(SerdeError::custom)
    }
}
