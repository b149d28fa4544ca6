//! SOL amount parsing and display.
//!
//! User input is a decimal SOL string. Conversion to lamports is exact
//! integer arithmetic; no floating point is involved.

use crate::constants::{LAMPORTS_PER_SOL, SOL_DECIMALS};
use crate::error::ValidationError;

/// Parse a decimal SOL amount (e.g. `"1.5"`) into lamports.
///
/// Accepts an optional fractional part of up to nine digits. Rejects empty
/// input, signs, exponents, zero, and values that do not fit in `u64`.
pub fn parse_sol(input: &str) -> Result<u64, ValidationError> {
    let s = input.trim();
    if s.is_empty() {
        return Err(ValidationError::MissingField("amount"));
    }

    let (whole, frac) = match s.split_once('.') {
        Some((w, f)) => (w, f),
        None => (s, ""),
    };

    if whole.is_empty() && frac.is_empty() {
        return Err(ValidationError::InvalidAmount(s.to_string()));
    }
    if !whole.bytes().all(|b| b.is_ascii_digit()) || !frac.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ValidationError::InvalidAmount(s.to_string()));
    }
    if frac.len() > SOL_DECIMALS as usize {
        return Err(ValidationError::TooPrecise { max: SOL_DECIMALS });
    }

    let whole_sol: u64 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| ValidationError::AmountOverflow)?
    };

    let mut frac_lamports: u64 = 0;
    if !frac.is_empty() {
        let scale = 10u64.pow(SOL_DECIMALS - frac.len() as u32);
        // At most nine digits, cannot overflow.
        let digits: u64 = frac
            .parse()
            .map_err(|_| ValidationError::InvalidAmount(s.to_string()))?;
        frac_lamports = digits * scale;
    }

    let lamports = whole_sol
        .checked_mul(LAMPORTS_PER_SOL)
        .and_then(|l| l.checked_add(frac_lamports))
        .ok_or(ValidationError::AmountOverflow)?;

    if lamports == 0 {
        return Err(ValidationError::ZeroAmount);
    }
    Ok(lamports)
}

/// Render lamports as a SOL string without trailing zeros (`1500000000` → `"1.5"`).
pub fn format_sol(lamports: u64) -> String {
    let whole = lamports / LAMPORTS_PER_SOL;
    let frac = lamports % LAMPORTS_PER_SOL;
    if frac == 0 {
        return whole.to_string();
    }
    let frac_str = format!("{:0width$}", frac, width = SOL_DECIMALS as usize);
    format!("{whole}.{}", frac_str.trim_end_matches('0'))
}
