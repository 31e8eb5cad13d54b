use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Upper bound for USD amounts (2 decimal places of precision).
pub const USD_MAX: Decimal = dec!(999_999_999.99);

/// Upper bound for USDT amounts (6 decimal places of precision).
pub const USDT_MAX: Decimal = dec!(999_999.999999);

/// Currency unit for monetary amounts. Closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Currency {
    #[serde(rename = "USD")]
    Usd,
    #[serde(rename = "USDT")]
    Usdt,
}

impl Currency {
    /// Maximum accepted amount for this currency.
    pub fn max_amount(self) -> Decimal {
        match self {
            Currency::Usd => USD_MAX,
            Currency::Usdt => USDT_MAX,
        }
    }

    /// Decimal places kept when an amount is normalized.
    pub fn scale(self) -> u32 {
        match self {
            Currency::Usd => 2,
            Currency::Usdt => 6,
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Currency::Usd => write!(f, "USD"),
            Currency::Usdt => write!(f, "USDT"),
        }
    }
}

impl FromStr for Currency {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "USD" => Ok(Currency::Usd),
            "USDT" => Ok(Currency::Usdt),
            _ => Err(ValidationError::InvalidEnum {
                field: "currency".to_string(),
                allowed: vec!["USD".to_string(), "USDT".to_string()],
            }),
        }
    }
}

/// Validation failure. Each variant carries the details needed to render both
/// a machine code and a human-readable message. Validators return these as
/// values, they never panic on expected bad input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),

    #[error("Invalid {field}: must be one of {}", .allowed.join(", "))]
    InvalidEnum { field: String, allowed: Vec<String> },

    #[error("Amount is required")]
    AmountMissing,

    #[error("Amount must be a positive number")]
    AmountNotPositive,

    #[error("Amount exceeds the {currency} limit of {limit}")]
    AmountOverLimit { currency: Currency, limit: Decimal },
}

impl ValidationError {
    /// Machine code carried in the response envelope's `error` field.
    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::MissingFields(_) => "MISSING_FIELDS",
            ValidationError::InvalidEnum { .. } => "INVALID_FIELD",
            ValidationError::AmountMissing
            | ValidationError::AmountNotPositive
            | ValidationError::AmountOverLimit { .. } => "INVALID_AMOUNT",
        }
    }
}

/// Check that every named field is present in the JSON body.
///
/// A field counts as missing when the key is absent, the value is JSON null,
/// or the value is an empty string. All missing names are reported in a
/// single combined error.
pub fn validate_required_fields(body: &Value, required: &[&str]) -> Result<(), ValidationError> {
    let missing: Vec<String> = required
        .iter()
        .filter(|name| is_missing(body.get(**name)))
        .map(|name| name.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::MissingFields(missing))
    }
}

fn is_missing(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(_) => false,
    }
}

/// Check that `value` is a member of `allowed`, naming the field on failure.
pub fn validate_enum(value: &str, allowed: &[&str], field: &str) -> Result<(), ValidationError> {
    if allowed.contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::InvalidEnum {
            field: field.to_string(),
            allowed: allowed.iter().map(|s| s.to_string()).collect(),
        })
    }
}

/// Parse and bound-check a monetary amount for the given currency.
///
/// Accepts the raw text form from the request body so that handlers never
/// lose precision to an intermediate float. Returns the parsed amount on
/// success; the caller decides how to normalize it (see [`round_usd`] and
/// [`round_usdt`]).
pub fn validate_amount(text: &str, currency: Currency) -> Result<Decimal, ValidationError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::AmountMissing);
    }

    let amount = Decimal::from_str(trimmed).map_err(|_| ValidationError::AmountNotPositive)?;

    if amount <= Decimal::ZERO {
        return Err(ValidationError::AmountNotPositive);
    }

    if amount > currency.max_amount() {
        return Err(ValidationError::AmountOverLimit {
            currency,
            limit: currency.max_amount(),
        });
    }

    Ok(amount)
}

/// Round a USD amount to the nearest cent, half-up.
pub fn round_usd(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Round a USDT amount to the nearest millionth, half-up, rendered as a
/// fixed-point string with exactly 6 fractional digits.
pub fn round_usdt(value: Decimal) -> String {
    let rounded = value.round_dp_with_strategy(6, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.6}", rounded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_required_fields_reports_only_missing_names() {
        let body = json!({"a": 1});
        let err = validate_required_fields(&body, &["a", "b"]).unwrap_err();
        match &err {
            ValidationError::MissingFields(names) => {
                assert_eq!(names, &vec!["b".to_string()]);
            }
            other => panic!("unexpected error: {:?}", other),
        }
        let message = err.to_string();
        assert!(message.contains('b'));
        assert!(!message.contains('a'));

        let body = json!({"a": 1, "b": 2});
        assert!(validate_required_fields(&body, &["a", "b"]).is_ok());
    }

    #[test]
    fn test_required_fields_null_and_empty_string_count_as_missing() {
        let body = json!({"a": null, "b": "", "c": 0});
        let err = validate_required_fields(&body, &["a", "b", "c"]).unwrap_err();
        assert_eq!(
            err,
            ValidationError::MissingFields(vec!["a".to_string(), "b".to_string()])
        );
    }

    #[test]
    fn test_required_fields_combined_message_is_comma_joined() {
        let body = json!({});
        let err = validate_required_fields(&body, &["x", "y"]).unwrap_err();
        assert_eq!(err.to_string(), "Missing required fields: x, y");
    }

    #[test]
    fn test_validate_enum() {
        assert!(validate_enum("USD", &["USD", "USDT"], "currency").is_ok());

        let err = validate_enum("EUR", &["USD", "USDT"], "currency").unwrap_err();
        assert_eq!(err.code(), "INVALID_FIELD");
        let message = err.to_string();
        assert!(message.contains("currency"));
        assert!(message.contains("USD, USDT"));
    }

    #[test]
    fn test_validate_amount_rejects_non_positive() {
        assert_eq!(
            validate_amount("0", Currency::Usd).unwrap_err(),
            ValidationError::AmountNotPositive
        );
        assert_eq!(
            validate_amount("-5", Currency::Usdt).unwrap_err(),
            ValidationError::AmountNotPositive
        );
        assert_eq!(
            validate_amount("abc", Currency::Usd).unwrap_err(),
            ValidationError::AmountNotPositive
        );
    }

    #[test]
    fn test_validate_amount_rejects_empty() {
        assert_eq!(
            validate_amount("", Currency::Usd).unwrap_err(),
            ValidationError::AmountMissing
        );
        assert_eq!(
            validate_amount("   ", Currency::Usdt).unwrap_err(),
            ValidationError::AmountMissing
        );
    }

    #[test]
    fn test_validate_amount_bounds() {
        // One cent over the USD limit
        assert_eq!(
            validate_amount("1000000000", Currency::Usd).unwrap_err(),
            ValidationError::AmountOverLimit {
                currency: Currency::Usd,
                limit: USD_MAX,
            }
        );
        assert!(validate_amount("999999999.99", Currency::Usd).is_ok());

        assert!(validate_amount("1000000", Currency::Usdt).is_err());
        assert!(validate_amount("999999.999999", Currency::Usdt).is_ok());
    }

    #[test]
    fn test_validate_amount_accepts_typical_values() {
        assert_eq!(
            validate_amount("100.5", Currency::Usd).unwrap(),
            dec!(100.5)
        );
        assert_eq!(
            validate_amount("0.000001", Currency::Usdt).unwrap(),
            dec!(0.000001)
        );
    }

    #[test]
    fn test_round_usd_half_up() {
        assert_eq!(round_usd(dec!(10.005)), dec!(10.01));
        assert_eq!(round_usd(dec!(10.004)), dec!(10.00));
        assert_eq!(round_usd(dec!(2.5)), dec!(2.50));
    }

    #[test]
    fn test_round_usdt_pads_to_six_decimals() {
        assert_eq!(round_usdt(dec!(1.0000005)), "1.000001");
        assert_eq!(round_usdt(dec!(1)), "1.000000");
        assert_eq!(round_usdt(dec!(0.1)), "0.100000");
    }

    #[test]
    fn test_round_trip_within_currency_precision() {
        for raw in ["12.345", "0.01", "999999999.99"] {
            let amount = validate_amount(raw, Currency::Usd).unwrap();
            let rounded = round_usd(amount);
            assert!((rounded - amount).abs() < dec!(0.005));
        }
        for raw in ["0.1234567", "999999.999999", "42"] {
            let amount = validate_amount(raw, Currency::Usdt).unwrap();
            let reparsed = Decimal::from_str(&round_usdt(amount)).unwrap();
            assert!((reparsed - amount).abs() < dec!(0.0000005));
        }
    }

    #[test]
    fn test_currency_parse_and_display() {
        assert_eq!("USD".parse::<Currency>().unwrap(), Currency::Usd);
        assert_eq!("USDT".parse::<Currency>().unwrap(), Currency::Usdt);
        assert!("usd".parse::<Currency>().is_err());
        assert_eq!(Currency::Usdt.to_string(), "USDT");
    }
}
