use {
    alloy_primitives::U256,
    anyhow::{Context, Result, anyhow, ensure},
    num::{BigInt, BigRational, BigUint, Zero, bigint::Sign},
    std::{ops::Neg, str::FromStr},
};

pub fn u256_to_big_uint(input: &U256) -> BigUint {
    BigUint::from_bytes_be(&input.to_be_bytes::<32>())
}

pub fn u256_to_big_int(input: &U256) -> BigInt {
    BigInt::from_biguint(Sign::Plus, u256_to_big_uint(input))
}

pub fn big_uint_to_u256(input: &BigUint) -> Result<U256> {
    let bytes = input.to_bytes_be();
    ensure!(bytes.len() <= 32, "too large");
    Ok(U256::from_be_slice(&bytes))
}

pub fn big_int_to_u256(input: &BigInt) -> Result<U256> {
    ensure!(input.sign() != Sign::Minus, "negative");
    big_uint_to_u256(input.magnitude())
}

/// Converts a rational to a [`U256`] only if it is a whole number. Amounts
/// that would need rounding are rejected instead of silently truncated.
pub fn exact_big_rational_to_u256(ratio: &BigRational) -> Result<U256> {
    ensure!(!ratio.denom().is_zero(), "zero denominator");
    ensure!(ratio.is_integer(), "not a whole number");
    big_int_to_u256(&ratio.to_integer())
}

/// Converts a decimal string (e.g., `"0.1"`) to an exact `BigRational`.
pub fn big_rational_from_decimal_str(s: &str) -> Result<BigRational> {
    let s = s.trim();
    let (is_negative, s) = match s.strip_prefix('-') {
        Some(stripped) => (true, stripped),
        None => (false, s),
    };
    // `BigInt::from_str` accepts a sign of its own, which would let "--1" or
    // "1.-5" through.
    ensure!(
        !s.is_empty() && s.chars().all(|c| c.is_ascii_digit() || c == '.'),
        "invalid decimal number"
    );

    let parts: Vec<&str> = s.split('.').collect();
    match parts.as_slice() {
        [integer] => {
            let numerator = BigInt::from_str(integer).context("unable to parse integer part")?;
            Ok(BigRational::from_integer(numerator))
        }
        [integer, fraction] => {
            ensure!(
                !(integer.is_empty() && fraction.is_empty()),
                "invalid decimal number"
            );
            // ".5" is read as "0.5" and "1." as "1.0".
            let integer_part = if integer.is_empty() {
                BigInt::zero()
            } else {
                BigInt::from_str(integer).context("unable to parse integer part")?
            };
            let fractional_part = if fraction.is_empty() {
                BigInt::zero()
            } else {
                BigInt::from_str(fraction).context("unable to parse fractional part")?
            };

            let denominator = BigInt::from(10u32).pow(fraction.len() as u32);
            let numerator = integer_part * &denominator + fractional_part;
            Ok(BigRational::new(numerator, denominator))
        }
        _ => Err(anyhow!("invalid decimal number")),
    }
    .map(|ratio| if is_negative { ratio.neg() } else { ratio })
}
