use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AmountError {
    #[error("not an integer amount: {0}")]
    Parse(#[from] std::num::ParseIntError),

    #[error("amount out of range: {0}")]
    Range(#[from] rust_decimal::Error),
}

/// Render a raw on-chain integer amount with `decimals` implied decimal
/// places as a two-decimal figure with thousands separators.
///
/// `2500000000000000000` with 18 decimals becomes `2.50`. Halfway values are
/// rounded to even.
pub fn format_token_amount(raw: &str, decimals: u32) -> Result<String, AmountError> {
    let raw: i128 = raw.trim().parse()?;
    let value = Decimal::try_from_i128_with_scale(raw, decimals)?.round_dp(2);
    Ok(group_thousands(&format!("{value:.2}")))
}

fn group_thousands(number: &str) -> String {
    let (sign, unsigned) = match number.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", number),
    };
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (unsigned, None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, digit) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    match frac_part {
        Some(frac) => format!("{sign}{grouped}.{frac}"),
        None => format!("{sign}{grouped}"),
    }
}
