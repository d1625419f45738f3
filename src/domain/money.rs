use std::fmt;

/// Amounts are plain 64-bit floats, matching the interchange format.
/// Comparisons never test for exact zero; anything within `SETTLE_TOLERANCE`
/// of zero counts as settled.
pub type Amount = f64;

/// Absolute tolerance for treating a balance as zero and for deciding when a
/// settlement leg is exhausted. One cent.
pub const SETTLE_TOLERANCE: Amount = 0.01;

/// Round an amount to two decimal places for display and reporting.
/// Negative zero is normalized so "-0.00" never shows up.
pub fn round2(amount: Amount) -> Amount {
    let rounded = (amount * 100.0).round() / 100.0;
    if rounded == 0.0 { 0.0 } else { rounded }
}

/// Format an amount with two decimals.
/// Example: 12.5 -> "12.50", -0.004 -> "0.00"
pub fn format_amount(amount: Amount) -> String {
    format!("{:.2}", round2(amount))
}

/// Parse a decimal string into an amount.
/// Example: "50.00" -> 50.0, "12.5" -> 12.5, "100" -> 100.0
pub fn parse_amount(input: &str) -> Result<Amount, ParseAmountError> {
    let value: f64 = input
        .trim()
        .parse()
        .map_err(|_| ParseAmountError::InvalidFormat)?;
    if !value.is_finite() {
        return Err(ParseAmountError::NotFinite);
    }
    Ok(value)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseAmountError {
    InvalidFormat,
    NotFinite,
}

impl fmt::Display for ParseAmountError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseAmountError::InvalidFormat => write!(f, "invalid amount format"),
            ParseAmountError::NotFinite => write!(f, "amount must be a finite number"),
        }
    }
}

impl std::error::Error for ParseAmountError {}
