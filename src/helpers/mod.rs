pub mod datetime;
pub mod depositdata;
pub mod json;

use alloy::primitives::{
    U256,
    utils::{ParseUnits, format_units},
};

/// Formats a base unit amount with `decimals`, fractional part truncated
/// to at most 10 digits, e.g. `format_unit(&1_500_000_000_000_000_000, 18)`
/// renders `1.5`
pub fn format_unit<T>(amount: &T, decimals: u8) -> String
where
    T: Into<ParseUnits> + Copy,
{
    let formatted = match format_units(*amount, decimals) {
        Ok(s) => s,
        Err(_) => return String::from("NaN"),
    };
    match formatted.split_once('.') {
        Some((whole, fractional)) => {
            let fractional = fractional[..fractional.len().min(10)].trim_end_matches('0');
            match fractional.is_empty() {
                true => whole.to_string(),
                false => format!("{}.{}", whole, fractional),
            }
        }
        None => formatted,
    }
}

/// Staking token amounts are 18 decimals
pub fn format_token(amount: &U256) -> String {
    format_unit(amount, 18)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_token_amounts() {
        let one = U256::from(10).pow(U256::from(18));
        assert_eq!(format_token(&one), "1");
        assert_eq!(format_token(&(one * U256::from(64))), "64");
        assert_eq!(format_token(&(one / U256::from(2))), "0.5");
        assert_eq!(format_token(&U256::ZERO), "0");
        assert_eq!(format_token(&U256::from(1)), "0");
    }
}
