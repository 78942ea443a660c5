mod address;

pub use address::NetAddress;
