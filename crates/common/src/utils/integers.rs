use alloy::primitives::U256;

/// Trait for formatting numbers with locale-specific formatting.
///
/// This trait adds methods to format numbers in a more human-readable way,
/// such as adding thousands separators.
pub trait ToLocaleString {
    /// Formats a number with locale-specific formatting.
    ///
    /// For numbers, this adds commas as thousand separators.
    ///
    /// # Returns
    ///
    /// * `String` - The formatted string
    fn to_locale_string(&self) -> String;
}

/// Add commas every 3 digits, e.g. 1000000 -> 1,000,000.
fn group_digits(digits: &str) -> String {
    let mut result = String::with_capacity(digits.len() + digits.len() / 3);

    for (count, c) in digits.chars().rev().enumerate() {
        if count != 0 && count % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }

    result.chars().rev().collect()
}

impl ToLocaleString for U256 {
    /// ```
    /// use alloy::primitives::U256;
    /// use txlens_common::utils::integers::ToLocaleString;
    ///
    /// assert_eq!(U256::from(1000000).to_locale_string(), "1,000,000");
    /// ```
    fn to_locale_string(&self) -> String {
        group_digits(&self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use alloy::primitives::U256;

    use crate::utils::integers::{group_digits, ToLocaleString};

    #[test]
    fn test_group_digits() {
        assert_eq!(group_digits("5"), "5");
        assert_eq!(group_digits("123"), "123");
        assert_eq!(group_digits("1234"), "1,234");
        assert_eq!(group_digits("234567"), "234,567");
        assert_eq!(group_digits("123456789"), "123,456,789");
    }

    #[test]
    fn test_u256_to_locale_string() {
        assert_eq!(U256::ZERO.to_locale_string(), "0");
        assert_eq!(U256::from(21000).to_locale_string(), "21,000");
        assert_eq!(
            U256::from(10).pow(U256::from(21)).to_locale_string(),
            "1,000,000,000,000,000,000,000"
        );
    }
}
