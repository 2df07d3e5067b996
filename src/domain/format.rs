use rust_decimal::Decimal;
use std::str::FromStr;

/// Maximum number of card digits retained from input.
pub const CARD_DIGITS_MAX: usize = 16;
/// Maximum number of expiry digits retained from input (`MM` + `YY`).
pub const EXPIRY_DIGITS_MAX: usize = 4;
/// Maximum number of CVV digits retained from input.
pub const CVV_DIGITS_MAX: usize = 3;

/// Formats raw card-number input for display.
///
/// Strips everything that is not an ASCII digit, keeps at most 16 digits,
/// and groups the result in blocks of 4 separated by single spaces.
/// Re-applying the formatter to its own output is a no-op.
pub fn format_card_number(input: &str) -> String {
    let digits: Vec<char> = input
        .chars()
        .filter(char::is_ascii_digit)
        .take(CARD_DIGITS_MAX)
        .collect();

    let mut formatted = String::with_capacity(digits.len() + digits.len() / 4);
    for (i, digit) in digits.iter().enumerate() {
        if i > 0 && i % 4 == 0 {
            formatted.push(' ');
        }
        formatted.push(*digit);
    }
    formatted
}

/// Formats raw expiry input as `MM/YY`.
///
/// Strips non-digits, keeps at most 4 digits, and inserts the `/` once more
/// than two digits are present. Idempotent: the separator it inserts is not
/// a digit, so it is stripped and re-inserted in the same place.
pub fn format_expiry(input: &str) -> String {
    let digits: String = input
        .chars()
        .filter(char::is_ascii_digit)
        .take(EXPIRY_DIGITS_MAX)
        .collect();

    if digits.len() > 2 {
        format!("{}/{}", &digits[..2], &digits[2..])
    } else {
        digits
    }
}

/// Formats raw CVV input: digits only, at most 3.
pub fn format_cvv(input: &str) -> String {
    input
        .chars()
        .filter(char::is_ascii_digit)
        .take(CVV_DIGITS_MAX)
        .collect()
}

/// Normalizes raw amount input to a non-negative decimal.
///
/// Unparsable or negative input coerces to zero; a literal negative amount
/// is never stored.
pub fn normalize_amount(input: &str) -> Decimal {
    match Decimal::from_str(input.trim()) {
        Ok(value) if value >= Decimal::ZERO => value,
        _ => Decimal::ZERO,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::distributions::{Alphanumeric, DistString};
    use rand::Rng;
    use rust_decimal_macros::dec;

    #[test]
    fn test_card_number_grouping() {
        assert_eq!(format_card_number("1234567890123456"), "1234 5678 9012 3456");
        assert_eq!(format_card_number("12345"), "1234 5");
        assert_eq!(format_card_number("1234"), "1234");
        assert_eq!(format_card_number(""), "");
    }

    #[test]
    fn test_card_number_strips_non_digits() {
        assert_eq!(format_card_number("1234-5678 9012.3456"), "1234 5678 9012 3456");
        assert_eq!(format_card_number("abc"), "");
    }

    #[test]
    fn test_card_number_truncates_to_sixteen_digits() {
        let formatted = format_card_number("12345678901234567890");
        assert_eq!(formatted, "1234 5678 9012 3456");
        assert_eq!(formatted.chars().filter(char::is_ascii_digit).count(), 16);
    }

    #[test]
    fn test_expiry_formatting() {
        assert_eq!(format_expiry(""), "");
        assert_eq!(format_expiry("1"), "1");
        assert_eq!(format_expiry("12"), "12");
        assert_eq!(format_expiry("123"), "12/3");
        assert_eq!(format_expiry("1234"), "12/34");
        assert_eq!(format_expiry("12345"), "12/34");
        assert_eq!(format_expiry("12/34"), "12/34");
    }

    #[test]
    fn test_cvv_formatting() {
        assert_eq!(format_cvv("123"), "123");
        assert_eq!(format_cvv("12345"), "123");
        assert_eq!(format_cvv("1a2b3c4"), "123");
        assert_eq!(format_cvv("abc"), "");
    }

    #[test]
    fn test_amount_normalization() {
        assert_eq!(normalize_amount("42.50"), dec!(42.50));
        assert_eq!(normalize_amount("0"), Decimal::ZERO);
        assert_eq!(normalize_amount("-5"), Decimal::ZERO);
        assert_eq!(normalize_amount("not a number"), Decimal::ZERO);
        assert_eq!(normalize_amount(""), Decimal::ZERO);
        assert_eq!(normalize_amount(" 10.00 "), dec!(10.00));
    }

    #[test]
    fn test_formatters_idempotent_on_random_input() {
        let mut rng = rand::thread_rng();
        for _ in 0..500 {
            let len = rng.gen_range(0..40);
            let input = Alphanumeric.sample_string(&mut rng, len);

            let card = format_card_number(&input);
            assert_eq!(format_card_number(&card), card);

            let expiry = format_expiry(&input);
            assert_eq!(format_expiry(&expiry), expiry);

            let cvv = format_cvv(&input);
            assert_eq!(format_cvv(&cvv), cvv);
        }
    }

    #[test]
    fn test_card_output_charset_and_shape_on_random_input() {
        let mut rng = rand::thread_rng();
        for _ in 0..500 {
            let len = rng.gen_range(0..60);
            let input: String = (0..len).map(|_| rng.gen_range(' '..='~')).collect();

            let card = format_card_number(&input);
            assert!(card.chars().all(|c| c.is_ascii_digit() || c == ' '));
            assert!(card.chars().filter(char::is_ascii_digit).count() <= 16);
            // A space appears after every 4th digit except possibly the last group.
            if !card.is_empty() {
                let groups: Vec<&str> = card.split(' ').collect();
                for (i, group) in groups.iter().enumerate() {
                    assert!(group.chars().all(|c| c.is_ascii_digit()));
                    if i < groups.len() - 1 {
                        assert_eq!(group.len(), 4);
                    } else {
                        assert!(!group.is_empty() && group.len() <= 4);
                    }
                }
            }

            let expiry = format_expiry(&input);
            assert!(expiry.len() <= 5);
            let parts: Vec<&str> = expiry.splitn(2, '/').collect();
            assert!(parts[0].len() <= 2 && parts[0].chars().all(|c| c.is_ascii_digit()));
            if let Some(tail) = parts.get(1) {
                assert!(tail.len() <= 2 && tail.chars().all(|c| c.is_ascii_digit()));
            }
        }
    }
}
