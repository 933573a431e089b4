// src/utils.rs
use ethers::types::{Address, U256};
use ethers::utils::to_checksum;

/// Render a base-unit amount with `decimals` fractional places.
///
/// Trailing fractional zeros are trimmed but one digit is always kept, so a
/// whole amount prints as `"42.0"`. With zero decimals the integer is returned
/// as is.
pub fn u256_to_human(value: U256, decimals: u8) -> String {
    if decimals == 0 {
        return value.to_string();
    }
    let divisor = U256::exp10(decimals as usize);
    let integer = value / divisor;
    let mut fraction = format!("{:0>width$}", (value % divisor).to_string(), width = decimals as usize);
    while fraction.len() > 1 && fraction.ends_with('0') {
        fraction.pop();
    }
    format!("{}.{}", integer, fraction)
}

/// Cache key for a contract: its EIP-55 checksummed address.
pub fn address_key(address: &Address) -> String {
    to_checksum(address, None)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(n: u64) -> U256 {
        U256::from(n) * U256::exp10(18)
    }

    #[test]
    fn whole_amount_keeps_one_fraction_digit() {
        assert_eq!(u256_to_human(tokens(999_850), 18), "999850.0");
        assert_eq!(u256_to_human(U256::zero(), 18), "0.0");
    }

    #[test]
    fn fraction_is_zero_padded_and_trimmed() {
        // 1.05 tokens
        let value = U256::from(1_050_000_000_000_000_000u64);
        assert_eq!(u256_to_human(value, 18), "1.05");
        assert_eq!(u256_to_human(U256::one(), 18), "0.000000000000000001");
    }

    #[test]
    fn zero_decimals_prints_integer() {
        assert_eq!(u256_to_human(U256::from(1234), 0), "1234");
    }

    #[test]
    fn address_key_is_checksummed() {
        let addr: Address = "0x967da4048cd07ab37855c090aaf366e4ce1b9f48".parse().unwrap();
        assert_eq!(address_key(&addr), "0x967da4048cD07aB37855c090aAF366e4ce1b9F48");
    }
}
