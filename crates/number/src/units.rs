use {
    crate::conversions::{big_rational_from_decimal_str, exact_big_rational_to_u256},
    alloy_primitives::U256,
    anyhow::{Context, Result, ensure},
    num::{BigInt, BigRational},
};

/// Converts an amount of units of a token with the specified amount of
/// decimals into its decimal representation as a string.
///
/// ```
/// use number::{U256, units::format_units};
///
/// assert_eq!(format_units(U256::from(42), 0), "42");
/// assert_eq!(format_units(U256::from(1_337_000), 6), "1.337000")
/// ```
pub fn format_units(amount: U256, decimals: usize) -> String {
    let str_amount = amount.to_string();
    if decimals == 0 {
        str_amount
    } else if str_amount.len() <= decimals {
        format!("0.{str_amount:0>decimals$}")
    } else {
        let (integer, fraction) = str_amount.split_at(str_amount.len() - decimals);
        format!("{integer}.{fraction}")
    }
}

/// Like [`format_units`] but drops trailing zeros of the fractional part,
/// keeping at least one fractional digit.
pub fn format_units_trimmed(amount: U256, decimals: usize) -> String {
    let formatted = format_units(amount, decimals);
    match formatted.split_once('.') {
        Some((integer, fraction)) => {
            let fraction = fraction.trim_end_matches('0');
            let fraction = if fraction.is_empty() { "0" } else { fraction };
            format!("{integer}.{fraction}")
        }
        None => formatted,
    }
}

/// Parses a human readable decimal amount (e.g. `"1.5"`) into the smallest
/// units of a token with `decimals` decimals.
///
/// Fails when the amount is negative, does not fit into 256 bits or has more
/// fractional digits than the token supports.
pub fn parse_units(amount: &str, decimals: u8) -> Result<U256> {
    let value = big_rational_from_decimal_str(amount)
        .with_context(|| format!("invalid amount {amount:?}"))?;
    ensure!(
        value >= BigRational::from_integer(BigInt::from(0)),
        "amount {amount:?} is negative"
    );
    let scale = BigRational::from_integer(BigInt::from(10u32).pow(u32::from(decimals)));
    exact_big_rational_to_u256(&(value * scale))
        .with_context(|| format!("amount {amount:?} is not representable with {decimals} decimals"))
}
