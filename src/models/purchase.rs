use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::validation::{round_usd, round_usdt, Currency};

/// Amount normalized for storage: USD as a 2-dp numeric value, USDT as a
/// fixed-point string with exactly 6 fractional digits.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum NormalizedAmount {
    Usd(Decimal),
    Usdt(String),
}

impl NormalizedAmount {
    pub fn new(amount: Decimal, currency: Currency) -> Self {
        match currency {
            Currency::Usd => NormalizedAmount::Usd(round_usd(amount)),
            Currency::Usdt => NormalizedAmount::Usdt(round_usdt(amount)),
        }
    }
}

/// Row written to the provider's `signal_purchases` table. Only validated,
/// normalized values ever reach this struct.
#[derive(Debug, Serialize)]
pub struct PurchaseRecord {
    pub signal_id: String,
    pub amount: NormalizedAmount,
    pub currency: Currency,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
    pub purchased_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_normalized_amount_per_currency() {
        assert_eq!(
            NormalizedAmount::new(dec!(10.005), Currency::Usd),
            NormalizedAmount::Usd(dec!(10.01))
        );
        assert_eq!(
            NormalizedAmount::new(dec!(1.0000005), Currency::Usdt),
            NormalizedAmount::Usdt("1.000001".to_string())
        );
    }

    #[test]
    fn test_purchase_record_serialization() {
        let record = PurchaseRecord {
            signal_id: "sig_42".to_string(),
            amount: NormalizedAmount::new(dec!(100.5), Currency::Usd),
            currency: Currency::Usd,
            payment_method: None,
            purchased_at: Utc::now(),
        };

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["signal_id"], "sig_42");
        assert_eq!(value["currency"], "USD");
        assert!(value.get("payment_method").is_none());

        let record = PurchaseRecord {
            signal_id: "sig_7".to_string(),
            amount: NormalizedAmount::new(dec!(0.5), Currency::Usdt),
            currency: Currency::Usdt,
            payment_method: Some("wallet".to_string()),
            purchased_at: Utc::now(),
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["amount"], "0.500000");
        assert_eq!(value["payment_method"], "wallet");
    }
}
