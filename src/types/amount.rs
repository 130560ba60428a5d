use std::str::FromStr;

use super::{Decimal, U256};

/// Decimals of the native SHM currency.
pub const SHM_DECIMALS: u32 = 18;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AmountError {
    #[error("{0:?} is not a decimal number")]
    Malformed(String),
    #[error("amount must not be negative")]
    Negative,
    #[error("amount has more than {0} decimal places")]
    TooPrecise(u32),
    #[error("amount does not fit in 256 bits")]
    Overflow,
}

type Result<T, E = AmountError> = std::result::Result<T, E>;

/// `10^exp`, or `None` once it no longer fits in 256 bits.
fn pow10(exp: u32) -> Option<U256> {
    (exp < 78).then(|| U256::exp10(exp as usize))
}

pub trait DecimalExt {
    /// Scale a display amount into the smallest unit with `decimals` places.
    fn to_wei(&self, decimals: u32) -> Result<U256>;
}

impl DecimalExt for Decimal {
    fn to_wei(&self, decimals: u32) -> Result<U256> {
        if self.is_zero() {
            return Ok(U256::zero());
        }
        if self.is_sign_negative() {
            return Err(AmountError::Negative);
        }
        let normalized = self.normalize();
        let scale = normalized.scale();
        if scale > decimals {
            return Err(AmountError::TooPrecise(decimals));
        }
        let mantissa = u128::try_from(normalized.mantissa()).map_err(|_| AmountError::Negative)?;
        let unit = pow10(decimals - scale).ok_or(AmountError::Overflow)?;
        U256::from(mantissa)
            .checked_mul(unit)
            .ok_or(AmountError::Overflow)
    }
}

/// Parse a user supplied decimal string, surrounding whitespace allowed.
/// Limited to the 28 significant digits a `Decimal` holds; use
/// [`parse_units`] for amounts headed on chain.
pub fn parse_decimal(amount: &str) -> Result<Decimal> {
    let trimmed = amount.trim();
    Decimal::from_str(trimmed).map_err(|_| AmountError::Malformed(trimmed.to_owned()))
}

/// Parse a decimal string straight into the smallest unit with `decimals`
/// places. Exact for every value that fits in 256 bits.
pub fn parse_units(amount: &str, decimals: u32) -> Result<U256> {
    let trimmed = amount.trim();
    let malformed = || AmountError::Malformed(trimmed.to_owned());
    let (negative, unsigned) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let (whole, frac) = unsigned.split_once('.').unwrap_or((unsigned, ""));
    let is_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    if (whole.is_empty() && frac.is_empty()) || !is_digits(whole) || !is_digits(frac) {
        return Err(malformed());
    }

    let frac = frac.trim_end_matches('0');
    let digits = format!("{}{}", whole, frac);
    let digits = digits.trim_start_matches('0');
    if digits.is_empty() {
        return Ok(U256::zero());
    }
    if negative {
        return Err(AmountError::Negative);
    }
    let places = u32::try_from(frac.len()).map_err(|_| AmountError::TooPrecise(decimals))?;
    if places > decimals {
        return Err(AmountError::TooPrecise(decimals));
    }
    let unit = pow10(decimals - places).ok_or(AmountError::Overflow)?;
    U256::from_dec_str(digits)
        .map_err(|_| AmountError::Overflow)?
        .checked_mul(unit)
        .ok_or(AmountError::Overflow)
}

/// Render an integer amount with `decimals` places, trimming trailing zeros
/// but keeping at least one fractional digit.
pub fn format_units(amount: U256, decimals: u32) -> String {
    let (whole, frac) = match pow10(decimals) {
        Some(unit) => amount.div_mod(unit),
        // every 256 bit value is below one unit
        None => (U256::zero(), amount),
    };
    let digits = frac.to_string();
    let mut padded = "0".repeat((decimals as usize).saturating_sub(digits.len()));
    padded.push_str(&digits);
    let frac = padded.trim_end_matches('0');
    if frac.is_empty() {
        format!("{}.0", whole)
    } else {
        format!("{}.{}", whole, frac)
    }
}

/// wei to SHM, e.g. `1000000000000000` -> `"0.001"`
pub fn format_shm(wei: U256) -> String {
    format_units(wei, SHM_DECIMALS)
}

/// SHM to wei, e.g. `"0.001"` -> `1000000000000000`
pub fn parse_shm(shm: &str) -> Result<U256> {
    parse_units(shm, SHM_DECIMALS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_format_shm() {
        assert_eq!(format_shm(U256::zero()), "0.0");
        assert_eq!(format_shm(U256::exp10(18)), "1.0");
        assert_eq!(format_shm(U256::exp10(15)), "0.001");
        assert_eq!(format_shm(U256::from(1u64)), "0.000000000000000001");
        assert_eq!(
            format_shm(U256::from(12_345_000_000_000_000_000u128)),
            "12.345"
        );
    }

    #[test]
    fn test_parse_shm() {
        assert_eq!(parse_shm("1").unwrap(), U256::exp10(18));
        assert_eq!(parse_shm(" 0.001 ").unwrap(), U256::exp10(15));
        assert_eq!(parse_shm("1.500").unwrap(), U256::exp10(17) * 15u64);
        assert_eq!(parse_shm("0").unwrap(), U256::zero());
        assert_eq!(parse_shm("-1"), Err(AmountError::Negative));
        assert_eq!(
            parse_shm("abc"),
            Err(AmountError::Malformed("abc".to_owned()))
        );
        assert_eq!(
            parse_shm("0.0000000000000000001"),
            Err(AmountError::TooPrecise(SHM_DECIMALS))
        );
    }

    #[test]
    fn test_parse_shm_is_exact() {
        // 33 significant digits, past what a Decimal holds
        assert_eq!(
            parse_shm("123456789012345.123456789012345678").unwrap(),
            U256::from_dec_str("123456789012345123456789012345678").unwrap()
        );
        assert_eq!(
            parse_shm("99999999999999999999999999999999.000000000000000001").unwrap(),
            U256::from_dec_str("99999999999999999999999999999999000000000000000001").unwrap()
        );
        assert_eq!(parse_shm(".5").unwrap(), U256::exp10(17) * 5u64);
        assert_eq!(parse_shm("2.").unwrap(), U256::exp10(18) * 2u64);
        assert_eq!(parse_shm("+3").unwrap(), U256::exp10(18) * 3u64);
        assert_eq!(parse_shm("-0.0").unwrap(), U256::zero());
        assert_eq!(parse_shm("-0.5"), Err(AmountError::Negative));
        for bad in [".", "", "1.2.3", "1e18", "1_000", "0x10", "- 1"] {
            assert!(
                matches!(parse_shm(bad), Err(AmountError::Malformed(_))),
                "{:?}",
                bad
            );
        }
        let too_big = format!("{}0", U256::MAX);
        assert_eq!(parse_shm(&too_big), Err(AmountError::Overflow));
    }

    #[test]
    fn test_to_wei_other_precision() {
        assert_eq!(dec!(2.5).to_wei(6).unwrap(), U256::from(2_500_000u64));
        assert_eq!(dec!(2.50000).to_wei(1).unwrap(), U256::from(25u64));
        assert_eq!(dec!(0.05).to_wei(1), Err(AmountError::TooPrecise(1)));
        assert_eq!(parse_units("2.5", 6).unwrap(), U256::from(2_500_000u64));
        assert_eq!(parse_units("0.05", 1), Err(AmountError::TooPrecise(1)));
    }

    #[test]
    fn test_huge_precision() {
        assert_eq!(dec!(1).to_wei(77).unwrap(), U256::exp10(77));
        assert_eq!(dec!(1).to_wei(78), Err(AmountError::Overflow));
        assert_eq!(dec!(0).to_wei(200).unwrap(), U256::zero());
        assert_eq!(parse_units("1", 78), Err(AmountError::Overflow));
        assert_eq!(parse_units("0.000", 200).unwrap(), U256::zero());

        assert_eq!(format_units(U256::exp10(77), 77), "1.0");
        let tiny = format_units(U256::from(5u64), 80);
        assert_eq!(tiny, format!("0.{}5", "0".repeat(79)));
        assert_eq!(format_units(U256::zero(), 90), "0.0");
    }

    #[test]
    fn test_round_trip() {
        let samples = [
            U256::from(1u64),
            U256::from(999u64),
            U256::exp10(15),
            U256::exp10(18),
            U256::from(123_456_789_012_345_678_901u128),
            U256::exp10(27) + U256::from(7u64),
            U256::exp10(40) + U256::from(1u64),
            U256::MAX,
        ];
        for wei in samples {
            assert_eq!(parse_shm(&format_shm(wei)).unwrap(), wei, "{}", wei);
        }
    }
}
