use std::fmt::{Display, Error as FmtError, Formatter};

use serde::{Deserialize, Serialize};

use crate::serializer::{Reader, ReaderError, Serializer, Writer};

/// Advertised peer endpoint.
///
/// `timestamp` is when the peer was last seen; it travels on the wire but is
/// excluded from equality, since an address identifies a peer and not a
/// moment in time.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct NetAddress {
    services: u32,
    timestamp: u64,
    host: String,
    port: u16,
    signal_id: u32,
}

impl NetAddress {
    pub fn new(services: u32, timestamp: u64, host: String, port: u16, signal_id: u32) -> Self {
        Self {
            services,
            timestamp,
            host,
            port,
            signal_id,
        }
    }

    pub fn get_services(&self) -> u32 {
        self.services
    }

    pub fn get_timestamp(&self) -> u64 {
        self.timestamp
    }

    pub fn set_timestamp(&mut self, timestamp: u64) {
        self.timestamp = timestamp;
    }

    pub fn get_host(&self) -> &str {
        &self.host
    }

    pub fn get_port(&self) -> u16 {
        self.port
    }

    pub fn get_signal_id(&self) -> u32 {
        self.signal_id
    }
}

impl Serializer for NetAddress {
    fn write(&self, writer: &mut Writer) {
        writer.write_u32(&self.services);
        writer.write_u64(&self.timestamp);
        writer.write_string(&self.host);
        writer.write_u16(self.port);
        writer.write_u32(&self.signal_id);
    }

    fn read(reader: &mut Reader) -> Result<NetAddress, ReaderError> {
        let services = reader.read_u32()?;
        let timestamp = reader.read_u64()?;
        let host = reader.read_string()?;
        let port = reader.read_u16()?;
        let signal_id = reader.read_u32()?;

        Ok(NetAddress {
            services,
            timestamp,
            host,
            port,
            signal_id,
        })
    }

    fn size(&self) -> usize {
        4 + 8 + 1 + self.host.len() + 2 + 4
    }
}

impl PartialEq for NetAddress {
    fn eq(&self, other: &Self) -> bool {
        self.services == other.services
            && self.host == other.host
            && self.port == other.port
            && self.signal_id == other.signal_id
    }
}

impl Eq for NetAddress {}

impl std::hash::Hash for NetAddress {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.services.hash(state);
        self.host.hash(state);
        self.port.hash(state);
        self.signal_id.hash(state);
    }
}

impl Display for NetAddress {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        write!(f, "{}:{} (signal {})", self.host, self.port, self.signal_id)
    }
}
