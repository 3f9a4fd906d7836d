//! Runtime settings.
//!
//! Defaults cover a single-store shop; each value can be overridden with a
//! `TILLBOOK_*` environment variable.

use serde::Deserialize;
use tracing::warn;

use tillbook_accounting::OPENING_BALANCE_DETAILS;

pub const CURRENCY_SYMBOL_VAR: &str = "TILLBOOK_CURRENCY_SYMBOL";
pub const DEFAULT_PAYMENT_METHOD_VAR: &str = "TILLBOOK_DEFAULT_PAYMENT_METHOD";
pub const OPENING_BALANCE_LABEL_VAR: &str = "TILLBOOK_OPENING_BALANCE_LABEL";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    /// Prefix for formatted money, e.g. `$` or `৳`.
    pub currency_symbol: String,
    /// Used when a customer payment does not name a method.
    pub default_payment_method: String,
    /// `details` text of carried-forward opening balances.
    pub opening_balance_label: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            currency_symbol: "$".to_string(),
            default_payment_method: "cash".to_string(),
            opening_balance_label: OPENING_BALANCE_DETAILS.to_string(),
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any key lookup. Blank or malformed values keep the default.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::default();

        if let Some(symbol) = lookup(CURRENCY_SYMBOL_VAR) {
            let symbol = symbol.trim();
            if symbol.is_empty() || symbol.chars().any(|c| c.is_ascii_digit()) {
                warn!(var = CURRENCY_SYMBOL_VAR, value = %symbol, "ignoring malformed currency symbol");
            } else {
                settings.currency_symbol = symbol.to_string();
            }
        }

        if let Some(method) = lookup(DEFAULT_PAYMENT_METHOD_VAR) {
            let method = method.trim().to_lowercase();
            if method.is_empty() || method.chars().any(char::is_whitespace) {
                warn!(var = DEFAULT_PAYMENT_METHOD_VAR, value = %method, "ignoring malformed payment method");
            } else {
                settings.default_payment_method = method;
            }
        }

        if let Some(label) = lookup(OPENING_BALANCE_LABEL_VAR) {
            let label = label.trim();
            if label.is_empty() {
                warn!(var = OPENING_BALANCE_LABEL_VAR, "ignoring blank opening balance label");
            } else {
                settings.opening_balance_label = label.to_string();
            }
        }

        settings
    }

    pub fn format_money(&self, amount: rust_decimal::Decimal) -> String {
        tillbook_core::money::format_money(amount, &self.currency_symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_without_overrides() {
        let settings = Settings::from_lookup(|_| None);
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.opening_balance_label, OPENING_BALANCE_DETAILS);
    }

    #[test]
    fn overrides_are_trimmed_and_applied() {
        let settings = Settings::from_lookup(lookup_from(&[
            (CURRENCY_SYMBOL_VAR, " ৳ "),
            (DEFAULT_PAYMENT_METHOD_VAR, "Bkash"),
            (OPENING_BALANCE_LABEL_VAR, "Brought forward"),
        ]));
        assert_eq!(settings.currency_symbol, "৳");
        assert_eq!(settings.default_payment_method, "bkash");
        assert_eq!(settings.opening_balance_label, "Brought forward");
        assert_eq!(settings.format_money(dec!(-12.5)), "-৳12.50");
    }

    #[test]
    fn malformed_values_keep_defaults() {
        let settings = Settings::from_lookup(lookup_from(&[
            (CURRENCY_SYMBOL_VAR, "42"),
            (DEFAULT_PAYMENT_METHOD_VAR, "credit card"),
            (OPENING_BALANCE_LABEL_VAR, "   "),
        ]));
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn deserializes_with_missing_fields_defaulted() {
        let settings: Settings =
            serde_json::from_value(serde_json::json!({ "currencySymbol": "€" })).unwrap();
        assert_eq!(settings.currency_symbol, "€");
        assert_eq!(settings.default_payment_method, "cash");
    }
}
