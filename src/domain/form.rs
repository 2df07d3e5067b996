use crate::domain::format;
use crate::domain::notice::Notice;
use crate::domain::payment::{Amount, CardSnapshot, PaymentRequest};
use rust_decimal::Decimal;
use thiserror::Error;

/// A submit-time validation failure.
///
/// Validation short-circuits on the first failing rule, so one attempt
/// surfaces at most one of these.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid card number")]
    CardNumber,
    #[error("invalid expiry date")]
    Expiry,
    #[error("invalid cvv")]
    Cvv,
    #[error("missing name on card")]
    Name,
    #[error("invalid amount")]
    Amount,
}

impl ValidationError {
    /// The user-facing notice for this failure.
    pub fn notice(&self) -> Notice {
        match self {
            Self::CardNumber => Notice::error(
                "Invalid card number",
                "Please enter a valid 16-digit card number.",
            ),
            Self::Expiry => Notice::error(
                "Invalid expiry date",
                "Please enter a valid expiry date (MM/YY).",
            ),
            Self::Cvv => Notice::error("Invalid CVV", "Please enter a valid 3-digit CVV number."),
            Self::Name => Notice::error(
                "Missing information",
                "Please enter the name on your card.",
            ),
            Self::Amount => Notice::error(
                "Invalid amount",
                "Please enter a valid payment amount.",
            ),
        }
    }
}

/// The editable card-payment form.
///
/// Every setter runs the raw keystroke input through the matching formatter,
/// so stored fields never contain characters outside their charset.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PaymentForm {
    amount: Decimal,
    card_number: String,
    expiry: String,
    cvv: String,
    name_on_card: String,
}

impl PaymentForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// A form pre-filled with the amount owed, the way a cost-share screen
    /// hands it over.
    pub fn with_amount(amount: Decimal) -> Self {
        Self {
            amount: amount.max(Decimal::ZERO),
            ..Self::default()
        }
    }

    pub fn set_amount(&mut self, input: &str) {
        self.amount = format::normalize_amount(input);
    }

    pub fn set_card_number(&mut self, input: &str) {
        self.card_number = format::format_card_number(input);
    }

    pub fn set_expiry(&mut self, input: &str) {
        self.expiry = format::format_expiry(input);
    }

    pub fn set_cvv(&mut self, input: &str) {
        self.cvv = format::format_cvv(input);
    }

    pub fn set_name_on_card(&mut self, input: &str) {
        self.name_on_card = input.to_string();
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    /// Two-decimal display form of the amount, e.g. for a `Pay $42.50` label.
    pub fn display_amount(&self) -> String {
        format!("{:.2}", self.amount)
    }

    pub fn card_number(&self) -> &str {
        &self.card_number
    }

    pub fn expiry(&self) -> &str {
        &self.expiry
    }

    pub fn cvv(&self) -> &str {
        &self.cvv
    }

    pub fn name_on_card(&self) -> &str {
        &self.name_on_card
    }

    fn card_digits(&self) -> String {
        self.card_number
            .chars()
            .filter(char::is_ascii_digit)
            .collect()
    }

    /// Last four card digits, or an empty string while fewer than four are
    /// present.
    pub fn last_four(&self) -> String {
        let digits = self.card_digits();
        if digits.len() < 4 {
            return String::new();
        }
        digits[digits.len() - 4..].to_string()
    }

    /// Validates the form and builds the collaborator request.
    ///
    /// Rules run in a fixed order and fail fast, so the caller can surface
    /// exactly one notice per attempt. Failure leaves the form untouched.
    pub fn validate(&self) -> Result<PaymentRequest, ValidationError> {
        if self.card_digits().len() < 16 {
            return Err(ValidationError::CardNumber);
        }
        if self.expiry.len() < 5 {
            return Err(ValidationError::Expiry);
        }
        if self.cvv.len() != 3 {
            return Err(ValidationError::Cvv);
        }
        if self.name_on_card.trim().is_empty() {
            return Err(ValidationError::Name);
        }
        let amount = Amount::new(self.amount)?;

        Ok(PaymentRequest {
            amount,
            card: CardSnapshot {
                last_four: self.last_four(),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn filled_form() -> PaymentForm {
        let mut form = PaymentForm::new();
        form.set_amount("42.50");
        form.set_card_number("4111 1111 1111 1111");
        form.set_expiry("12/34");
        form.set_cvv("123");
        form.set_name_on_card("Ada Lovelace");
        form
    }

    #[test]
    fn test_setters_apply_formatting() {
        let mut form = PaymentForm::new();
        form.set_card_number("4111-1111-1111-1111-9999");
        assert_eq!(form.card_number(), "4111 1111 1111 1111");
        form.set_expiry("1234");
        assert_eq!(form.expiry(), "12/34");
        form.set_cvv("12x3");
        assert_eq!(form.cvv(), "123");
        form.set_amount("-5");
        assert_eq!(form.amount(), Decimal::ZERO);
    }

    #[test]
    fn test_with_amount_prefills_and_clamps() {
        assert_eq!(PaymentForm::with_amount(dec!(25.0)).amount(), dec!(25.0));
        assert_eq!(PaymentForm::with_amount(dec!(-3.0)).amount(), Decimal::ZERO);
        assert_eq!(PaymentForm::with_amount(dec!(7)).display_amount(), "7.00");
    }

    #[test]
    fn test_validate_success() {
        let request = filled_form().validate().unwrap();
        assert_eq!(request.amount.value(), dec!(42.50));
        assert_eq!(request.card.last_four, "1111");
    }

    #[test]
    fn test_validate_rejects_short_card_number() {
        let mut form = filled_form();
        form.set_card_number("1234 5678 9012");
        assert_eq!(form.validate(), Err(ValidationError::CardNumber));
    }

    #[test]
    fn test_validate_rejects_incomplete_expiry() {
        let mut form = filled_form();
        form.set_expiry("12/");
        assert_eq!(form.validate(), Err(ValidationError::Expiry));
    }

    #[test]
    fn test_validate_rejects_short_cvv() {
        let mut form = filled_form();
        form.set_cvv("12");
        assert_eq!(form.validate(), Err(ValidationError::Cvv));
    }

    #[test]
    fn test_validate_rejects_blank_name() {
        let mut form = filled_form();
        form.set_name_on_card("   ");
        assert_eq!(form.validate(), Err(ValidationError::Name));
    }

    #[test]
    fn test_validate_rejects_coerced_negative_amount() {
        let mut form = filled_form();
        // Negative input coerces to zero, which then fails the amount rule.
        form.set_amount("-5");
        assert_eq!(form.amount(), Decimal::ZERO);
        assert_eq!(form.validate(), Err(ValidationError::Amount));
    }

    #[test]
    fn test_validation_fails_fast_in_declared_order() {
        let mut form = filled_form();
        form.set_card_number("1234");
        form.set_cvv("1");
        // Card number is checked before CVV, so only the card failure surfaces.
        assert_eq!(form.validate(), Err(ValidationError::CardNumber));
    }

    #[test]
    fn test_last_four() {
        assert_eq!(filled_form().last_four(), "1111");
        let mut form = PaymentForm::new();
        form.set_card_number("123");
        assert_eq!(form.last_four(), "");
    }

    #[test]
    fn test_notice_texts_are_distinct() {
        let notices = [
            ValidationError::CardNumber.notice(),
            ValidationError::Expiry.notice(),
            ValidationError::Cvv.notice(),
            ValidationError::Name.notice(),
            ValidationError::Amount.notice(),
        ];
        for (i, a) in notices.iter().enumerate() {
            for b in notices.iter().skip(i + 1) {
                assert_ne!(a.title, b.title);
            }
        }
    }
}
