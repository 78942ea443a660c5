use crate::{
    crypto::{Address, Hash},
    difficulty::MAX_TARGET_COMPACT,
};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 1 KB = 1024 bytes
pub const BYTES_PER_KB: usize = 1024;

// Hard limit for one serialized block (header + interlink + body)
pub const BLOCK_SIZE_MAX: usize = 1_000_000;

// Genesis block literals. The genesis hash itself is derived from these at
// first access, see Block::genesis_hash().
pub const GENESIS_HEIGHT: u32 = 1;
pub const GENESIS_TIMESTAMP: u32 = 1_735_689_600; // 2025-01-01T00:00:00Z
pub const GENESIS_NONCE: u32 = 0;
// difficulty 1
pub const GENESIS_N_BITS: u32 = MAX_TARGET_COMPACT;

pub const GENESIS_MINER: Address = Address::new([
    0x4b, 0x3e, 0x11, 0x89, 0x2f, 0xd0, 0x6a, 0xc5, 0x77, 0x02, 0x9e, 0xb1, 0x34, 0x58, 0xee,
    0x0d, 0xa6, 0x91, 0x7c, 0x25,
]);

// Root of the initial accounts tree
pub const GENESIS_ACCOUNTS_HASH: Hash = Hash::new([
    0x1a, 0x8d, 0x54, 0x07, 0xe3, 0x62, 0xb9, 0xf1, 0x0c, 0x75, 0x3d, 0xc8, 0x96, 0x21, 0x4f,
    0xda, 0x88, 0x5b, 0x30, 0x6e, 0x42, 0xaf, 0x17, 0x93, 0xce, 0x0b, 0x64, 0xd9, 0x2e, 0x70,
    0xa1, 0x5c,
]);

// Static checks
crate::static_assert!(BLOCK_SIZE_MAX > BYTES_PER_KB, "A block must be able to hold at least one KB");
