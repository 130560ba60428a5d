//! Task board types definitions
mod address;
mod amount;
mod task;

pub use address::*;
pub use amount::*;
pub use task::*;

/// re-exports the ethers primitives used across the crate
pub use ethers::types::{Address, TxHash, U256};
/// re-exports [`rust_decimal::Decimal`]
pub use rust_decimal::Decimal;

#[cfg(test)]
#[test]
fn test_display_helpers() {
    let poster: Address = "0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed".parse().unwrap();
    assert_eq!(poster.short(), "0x5aAe...eAed");

    let reward = parse_shm("0.25").unwrap();
    assert_eq!(reward, U256::exp10(16) * 25u64);
    assert_eq!(format_shm(reward), "0.25");
}
