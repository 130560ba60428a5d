use std::str::FromStr;

use ethers::utils::to_checksum;

use super::Address;
use crate::error::{Error, Result};

/// Address extension
pub trait AddressExt: Sized {
    /// Parse a `0x`-prefixed (or bare) 40 digit hex address
    fn parse(address: &str) -> Result<Self>;
    /// EIP-55 checksummed form
    fn checksummed(&self) -> String;
    /// `0x1234...abcd`
    fn short(&self) -> String;
}

impl AddressExt for Address {
    fn parse(address: &str) -> Result<Self> {
        let trimmed = address.trim();
        let digits = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        if digits.len() != 40 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(Error::InvalidAddress(trimmed.to_owned()));
        }
        Address::from_str(digits).map_err(|_| Error::InvalidAddress(trimmed.to_owned()))
    }

    fn checksummed(&self) -> String {
        to_checksum(self, None)
    }

    fn short(&self) -> String {
        let full = self.checksummed();
        format!("{}...{}", &full[..6], &full[full.len() - 4..])
    }
}
