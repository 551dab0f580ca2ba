//! Utility functions for formatting and common operations
//!
//! Centralized formatting so riyal amounts and percentages render the same
//! on every display surface.

use rust_decimal::Decimal;

/// Currency symbol options for formatting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurrencySymbol {
    /// Include "SAR " prefix (Saudi Riyal)
    Sar,
    /// No currency symbol (for table cells, calculations display)
    None,
}

/// Core formatting function with full control over output.
///
/// Formats a Decimal value with a `,` thousands separator and `.` decimal
/// separator, the convention used on Tadawul statements.
///
/// # Arguments
/// * `value` - The decimal value to format
/// * `width` - Minimum width for padding (0 for no padding, right-aligned)
/// * `symbol` - Whether to include currency symbol
///
/// # Examples
/// ```
/// use tadawul::utils::{format_currency_with_width, CurrencySymbol};
/// use rust_decimal_macros::dec;
///
/// assert_eq!(
///     format_currency_with_width(dec!(1234.56), 0, CurrencySymbol::Sar),
///     "SAR 1,234.56"
/// );
///
/// assert_eq!(
///     format_currency_with_width(dec!(1234), 12, CurrencySymbol::None),
///     "    1,234.00"
/// );
/// ```
pub fn format_currency_with_width(value: Decimal, width: usize, symbol: CurrencySymbol) -> String {
    let is_negative = value < Decimal::ZERO;
    let abs_value = value.abs();

    // Round to 2 decimal places and format
    let formatted = format!("{:.2}", abs_value);
    let parts: Vec<&str> = formatted.split('.').collect();

    let integer_part = parts[0];
    let decimal_part = parts.get(1).unwrap_or(&"00");

    // Add thousands separators (,) to integer part
    let with_separators: String = integer_part
        .chars()
        .rev()
        .enumerate()
        .flat_map(|(i, c)| {
            if i > 0 && i % 3 == 0 {
                vec![',', c]
            } else {
                vec![c]
            }
        })
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();

    let sign = if is_negative { "-" } else { "" };
    let prefix = match symbol {
        CurrencySymbol::Sar => "SAR ",
        CurrencySymbol::None => "",
    };

    let result = format!("{}{}{}.{}", prefix, sign, with_separators, decimal_part);

    // Apply width padding (right-align)
    if width > 0 && result.len() < width {
        format!("{:>width$}", result, width = width)
    } else {
        result
    }
}

// ============ Convenience functions ============

/// Format as Saudi Riyal with symbol: "SAR 1,234.56"
///
/// # Examples
/// ```
/// use tadawul::utils::format_currency;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(format_currency(dec!(1234.56)), "SAR 1,234.56");
/// assert_eq!(format_currency(dec!(-500)), "SAR -500.00");
/// ```
pub fn format_currency(value: Decimal) -> String {
    format_currency_with_width(value, 0, CurrencySymbol::Sar)
}

/// Format number only (no symbol): "1,234.56"
///
/// # Examples
/// ```
/// use tadawul::utils::format_decimal;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(format_decimal(dec!(1234.56)), "1,234.56");
/// ```
pub fn format_decimal(value: Decimal) -> String {
    format_currency_with_width(value, 0, CurrencySymbol::None)
}

/// Format a percentage with sign: "+1.25%" / "-3.40%"
///
/// # Examples
/// ```
/// use tadawul::utils::format_percent;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(format_percent(dec!(1.25)), "+1.25%");
/// assert_eq!(format_percent(dec!(-3.4)), "-3.40%");
/// ```
pub fn format_percent(value: Decimal) -> String {
    if value >= Decimal::ZERO {
        format!("+{:.2}%", value)
    } else {
        format!("{:.2}%", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_format_currency_basic() {
        assert_eq!(format_currency(dec!(1234.56)), "SAR 1,234.56");
        assert_eq!(format_currency(dec!(0.99)), "SAR 0.99");
        assert_eq!(format_currency(dec!(1000000)), "SAR 1,000,000.00");
    }

    #[test]
    fn test_format_currency_small_values() {
        assert_eq!(format_currency(dec!(0)), "SAR 0.00");
        assert_eq!(format_currency(dec!(0.01)), "SAR 0.01");
        assert_eq!(format_currency(dec!(1)), "SAR 1.00");
        assert_eq!(format_currency(dec!(123)), "SAR 123.00");
        assert_eq!(format_currency(dec!(999.99)), "SAR 999.99");
    }

    #[test]
    fn test_format_currency_large_values() {
        assert_eq!(format_currency(dec!(1000)), "SAR 1,000.00");
        assert_eq!(format_currency(dec!(12345)), "SAR 12,345.00");
        assert_eq!(format_currency(dec!(1234567)), "SAR 1,234,567.00");
        assert_eq!(format_currency(dec!(12345678.90)), "SAR 12,345,678.90");
    }

    #[test]
    fn test_format_currency_negative() {
        assert_eq!(format_currency(dec!(-1234.56)), "SAR -1,234.56");
        assert_eq!(format_currency(dec!(-0.01)), "SAR -0.01");
    }

    #[test]
    fn test_format_decimal() {
        assert_eq!(format_decimal(dec!(1234.56)), "1,234.56");
        assert_eq!(format_decimal(dec!(0)), "0.00");
        assert_eq!(format_decimal(dec!(-500)), "-500.00");
    }

    #[test]
    fn test_format_with_width() {
        // "SAR 100.00" is 10 chars, padding to 15 adds 5 spaces
        let result = format_currency_with_width(dec!(100), 15, CurrencySymbol::Sar);
        assert_eq!(result.len(), 15);
        assert_eq!(result, "     SAR 100.00");
    }

    #[test]
    fn test_format_with_width_no_padding_needed() {
        let result = format_currency_with_width(dec!(1000000), 5, CurrencySymbol::Sar);
        assert_eq!(result, "SAR 1,000,000.00");
    }

    #[test]
    fn test_format_percent_sign() {
        assert_eq!(format_percent(dec!(0)), "+0.00%");
        assert_eq!(format_percent(dec!(12.5)), "+12.50%");
        assert_eq!(format_percent(dec!(-8.75)), "-8.75%");
    }
}
