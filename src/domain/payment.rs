use crate::domain::form::ValidationError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Represents a positive monetary amount for a payment.
///
/// This is a wrapper around `rust_decimal::Decimal` that guarantees the
/// charged amount is strictly greater than zero.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Amount(Decimal);

impl Amount {
    pub fn new(value: Decimal) -> Result<Self, ValidationError> {
        if value > Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(ValidationError::Amount)
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Two-decimal display form, e.g. `42.50`.
    pub fn display(&self) -> String {
        format!("{:.2}", self.0)
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = ValidationError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

/// The only card data that ever crosses the component boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardSnapshot {
    /// Last four digits of the card number, captured at submit time.
    pub last_four: String,
}

/// Request handed to the payment-submission collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRequest {
    pub amount: Amount,
    pub card: CardSnapshot,
}

/// Resolved collaborator payload: a success flag, an optional server
/// message, and opaque data carried through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentReceipt {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default)]
    pub data: serde_json::Value,
}

impl PaymentReceipt {
    pub fn approved(data: serde_json::Value) -> Self {
        Self {
            success: true,
            message: None,
            data,
        }
    }

    pub fn declined(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            data: serde_json::Value::Null,
        }
    }
}

/// Outcome of a gateway call.
///
/// `Degraded` marks a placeholder receipt synthesized because the transport
/// was unreachable; it must never be presented as a genuine settlement.
#[derive(Debug, Clone, PartialEq)]
pub enum PaymentOutcome {
    Settled(PaymentReceipt),
    Degraded(PaymentReceipt),
}

impl PaymentOutcome {
    pub fn receipt(&self) -> &PaymentReceipt {
        match self {
            Self::Settled(receipt) | Self::Degraded(receipt) => receipt,
        }
    }

    pub fn into_receipt(self) -> PaymentReceipt {
        match self {
            Self::Settled(receipt) | Self::Degraded(receipt) => receipt,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_amount_validation() {
        assert!(Amount::new(dec!(1.0)).is_ok());
        assert_eq!(Amount::new(dec!(0.0)), Err(ValidationError::Amount));
        assert_eq!(Amount::new(dec!(-1.0)), Err(ValidationError::Amount));
    }

    #[test]
    fn test_amount_display_precision() {
        assert_eq!(Amount::new(dec!(42.5)).unwrap().display(), "42.50");
        assert_eq!(Amount::new(dec!(7)).unwrap().display(), "7.00");
        assert_eq!(Amount::new(dec!(0.1)).unwrap().display(), "0.10");
    }

    #[test]
    fn test_receipt_deserialization_tolerates_missing_fields() {
        let receipt: PaymentReceipt = serde_json::from_str(r#"{"success": true}"#).unwrap();
        assert!(receipt.success);
        assert_eq!(receipt.message, None);
        assert_eq!(receipt.data, serde_json::Value::Null);
    }

    #[test]
    fn test_outcome_exposes_receipt() {
        let receipt = PaymentReceipt::declined("card expired");
        let outcome = PaymentOutcome::Settled(receipt.clone());
        assert_eq!(outcome.receipt(), &receipt);
        assert_eq!(outcome.into_receipt(), receipt);
    }
}
