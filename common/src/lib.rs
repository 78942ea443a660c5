pub mod block;
pub mod config;
pub mod crypto;
pub mod difficulty;
pub mod network;
pub mod serializer;
pub mod transaction;

// Compile-time assertion on policy constants
#[macro_export]
macro_rules! static_assert {
    ($cond:expr, $msg:expr) => {
        const _: () = assert!($cond, $msg);
    };
}
