pub mod app;
pub mod config;
pub mod connection;
pub mod contract;
pub mod error;
pub mod form;
pub mod gateway;
pub mod notify;
pub mod pages;
pub mod serde;
pub mod types;
pub mod view;
pub mod wallet;

cfg_if::cfg_if! {
    if #[cfg(feature = "non-blocking-tracing")] {
        pub mod non_blocking_tracing;
    }
}

pub use error::{Error, Result};
pub use types::{Task, TaskStatus};

/// re-exports common dependencies
pub use ethers;
pub use rust_decimal;
