//! Locale-aware number and date handling
//!
//! Colombian exports write amounts as `$1.250.000` (period for thousands,
//! comma for decimals) and dates as `DD/MM/YYYY`. The conventions are kept in
//! named profiles so they can be changed from configuration instead of being
//! spread across string replacements.

use chrono::{Datelike, NaiveDate};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Largest magnitude a spreadsheet number cell holds exactly (2^53 - 1)
pub const MAX_EXACT_AMOUNT: i64 = (1 << 53) - 1;

/// Years a spreadsheet date cell can represent
pub const SPREADSHEET_YEARS: std::ops::RangeInclusive<i32> = 1900..=9999;

/// Why an amount could not be read as whole pesos
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    #[error("empty value")]
    Empty,
    #[error("not a number")]
    NotNumeric,
    #[error("has a fractional part")]
    Fractional,
    #[error("out of range")]
    OutOfRange,
}

/// Number parsing profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NumberProfile {
    pub name: String,
    pub decimal_separator: char,
    pub thousands_separator: char,
    pub currency_symbol: String,
}

impl Default for NumberProfile {
    fn default() -> Self {
        Self::es_co()
    }
}

impl NumberProfile {
    /// Colombian peso convention: `$1.250.000,00`
    pub fn es_co() -> Self {
        Self {
            name: "es-CO".to_string(),
            decimal_separator: ',',
            thousands_separator: '.',
            currency_symbol: "$".to_string(),
        }
    }

    /// Parse a locale-formatted amount into whole currency units.
    ///
    /// A zero fractional part is accepted (`"1.250,00"` is 1250), any other
    /// fraction is rejected since the currency has no subunit in this domain.
    /// Magnitudes above [`MAX_EXACT_AMOUNT`] are out of range.
    pub fn parse_amount(&self, text: &str) -> Result<i64, AmountError> {
        let trimmed = text.trim();
        let without_symbol = if self.currency_symbol.is_empty() {
            trimmed.to_string()
        } else {
            trimmed.replace(self.currency_symbol.as_str(), "")
        };

        let cleaned: String = without_symbol
            .chars()
            .filter(|c| !c.is_whitespace() && *c != self.thousands_separator)
            .map(|c| if c == self.decimal_separator { '.' } else { c })
            .collect();

        if cleaned.is_empty() {
            return Err(AmountError::Empty);
        }

        let value = Decimal::from_str(&cleaned).map_err(|_| AmountError::NotNumeric)?;
        if !value.fract().is_zero() {
            return Err(AmountError::Fractional);
        }
        value
            .trunc()
            .to_i64()
            .filter(|v| v.unsigned_abs() <= MAX_EXACT_AMOUNT as u64)
            .ok_or(AmountError::OutOfRange)
    }
}

/// Date parsing profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DateProfile {
    /// chrono format string, matched exactly
    pub format: String,
}

impl Default for DateProfile {
    fn default() -> Self {
        Self {
            format: "%d/%m/%Y".to_string(),
        }
    }
}

impl DateProfile {
    /// Parse a date; anything that does not match the pattern, or falls
    /// outside [`SPREADSHEET_YEARS`] (`"05/02/24"` reads as year 24), is `None`
    pub fn parse(&self, text: &str) -> Option<NaiveDate> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return None;
        }
        NaiveDate::parse_from_str(trimmed, &self.format)
            .ok()
            .filter(|date| SPREADSHEET_YEARS.contains(&date.year()))
    }
}

/// Format whole pesos with Colombian grouping: "$ 1.250.000"
///
/// # Examples
/// ```
/// use circular030::utils::format_pesos;
///
/// assert_eq!(format_pesos(1250000), "$ 1.250.000");
/// assert_eq!(format_pesos(-500), "$ -500");
/// ```
pub fn format_pesos(value: i64) -> String {
    let sign = if value < 0 { "-" } else { "" };
    let digits = value.unsigned_abs().to_string();

    // Add thousands separators (.) to integer part
    let with_separators: String = digits
        .chars()
        .rev()
        .enumerate()
        .flat_map(|(i, c)| {
            if i > 0 && i % 3 == 0 {
                vec!['.', c]
            } else {
                vec![c]
            }
        })
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();

    format!("$ {}{}", sign, with_separators)
}
