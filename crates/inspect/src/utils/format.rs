//! Rendering of numeric transaction fields.
use std::str::FromStr;

use alloy::primitives::U256;
use chrono::{DateTime, Utc};
use txlens_common::utils::integers::ToLocaleString;

/// Values below this many base units are shown as a raw wei integer.
const MIN_DISPLAY_UNITS: f64 = 0.000001;

/// Formats a wei amount given as a hex (`0x`-prefixed) or decimal string in base units
/// (RBTC). Empty, `0x` and `0x0` are `"0"`. Input that isn't an integer is returned as-is.
///
/// ```
/// use txlens_inspect::format_value;
///
/// assert_eq!(format_value("0x0"), "0");
/// assert_eq!(format_value("500000000000000000"), "0.5");
/// ```
pub fn format_value(value: &str) -> String {
    if value.is_empty() || value == "0x" || value == "0x0" {
        return "0".to_string();
    }

    match U256::from_str(value) {
        Ok(wei) => format_wei(wei),
        Err(_) => value.to_string(),
    }
}

/// Formats a wei amount in base units with up to 6 decimals and no trailing zeros. Amounts
/// too small to show at that precision are returned as the raw wei integer.
pub fn format_wei(wei: U256) -> String {
    if wei.is_zero() {
        return "0".to_string();
    }

    let digits = wei.to_string();
    let units = match digits.parse::<f64>() {
        Ok(wei) => wei / 1e18,
        Err(_) => return digits,
    };

    if units < MIN_DISPLAY_UNITS {
        return digits;
    }

    let fixed = to_fixed(units, 6);
    fixed.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// Formats gas as a base-10 integer with thousands separators.
pub fn format_gas_used(gas: U256) -> String {
    gas.to_locale_string()
}

/// Formats a wei gas price in gwei with exactly 2 decimals.
pub fn format_gas_price(wei: U256) -> String {
    let gwei = wei.to_string().parse::<f64>().unwrap_or(f64::INFINITY) / 1e9;
    to_fixed(gwei, 2)
}

/// Renders a non-negative `x` with exactly `places` decimals, rounding half up on the exact
/// binary value of `x`. `format!("{:.N}")` rounds ties to even instead.
fn to_fixed(x: f64, places: usize) -> String {
    // every finite f64 has a terminating decimal expansion of at most 1074 fractional digits
    let exact = format!("{x:.1074}");
    let Some((whole, fraction)) = exact.split_once('.') else { return exact };

    let Ok(mut scaled) = U256::from_str_radix(&format!("{whole}{}", &fraction[..places]), 10)
    else {
        return exact;
    };
    if fraction.as_bytes()[places] >= b'5' {
        scaled += U256::from(1);
    }

    let mut digits = scaled.to_string();
    while digits.len() <= places {
        digits.insert(0, '0');
    }
    let (whole, fraction) = digits.split_at(digits.len() - places);
    if places == 0 {
        whole.to_string()
    } else {
        format!("{whole}.{fraction}")
    }
}

/// Formats a timestamp as `YYYY-MM-DD HH:MM:SS UTC`.
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}
