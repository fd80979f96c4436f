use proptest::prelude::*;
use salama_types::{EmailAddress, OtpCode, PaymentCode, PhoneNumber, PurchaseCode, ValidationError};

// ── Phone numbers ───────────────────────────────────────────────

#[test]
fn phone_number_accepts_local_format() {
    let phone = PhoneNumber::parse("+254712345678").unwrap();
    assert_eq!(phone.as_str(), "+254712345678");
}

#[test]
fn phone_number_trims_whitespace() {
    let phone = PhoneNumber::parse("  +254712345678 ").unwrap();
    assert_eq!(phone.as_str(), "+254712345678");
}

#[test]
fn phone_number_rejects_missing_prefix() {
    assert_eq!(
        PhoneNumber::parse("0712345678"),
        Err(ValidationError::InvalidPhoneNumber)
    );
}

#[test]
fn phone_number_rejects_wrong_length() {
    assert!(PhoneNumber::parse("+25471234567").is_err()); // 8 digits
    assert!(PhoneNumber::parse("+2547123456789").is_err()); // 10 digits
}

#[test]
fn phone_number_rejects_non_digits() {
    assert!(PhoneNumber::parse("+25471234567a").is_err());
}

// ── Purchase codes ──────────────────────────────────────────────

#[test]
fn purchase_code_accepts_four_digits() {
    assert_eq!(PurchaseCode::parse("1234").unwrap().as_str(), "1234");
}

#[test]
fn purchase_code_rejects_other_shapes() {
    assert!(PurchaseCode::parse("123").is_err());
    assert!(PurchaseCode::parse("12345").is_err());
    assert!(PurchaseCode::parse("12a4").is_err());
    assert!(PurchaseCode::parse("").is_err());
}

// ── Payment codes ───────────────────────────────────────────────

#[test]
fn payment_code_normalizes_to_uppercase() {
    let code = PaymentCode::parse("sjv74btlc5").unwrap();
    assert_eq!(code.as_str(), "SJV74BTLC5");
}

#[test]
fn payment_code_rejects_wrong_length() {
    assert!(PaymentCode::parse("SJV74BTLC").is_err());
    assert!(PaymentCode::parse("SJV74BTLC55").is_err());
}

#[test]
fn payment_code_rejects_symbols() {
    assert!(PaymentCode::parse("SJV74BTLC-").is_err());
    assert!(PaymentCode::parse("SJV74 TLC5").is_err());
}

#[test]
fn payment_code_format_gate() {
    assert!(PaymentCode::is_valid_format("SJV74BTLC5"));
    assert!(!PaymentCode::is_valid_format("sjv74btlc5")); // gate expects uppercased input
    assert!(!PaymentCode::is_valid_format("SJV74"));
}

// ── OTPs ────────────────────────────────────────────────────────

#[test]
fn otp_accepts_six_digits() {
    assert_eq!(OtpCode::parse("042917").unwrap().as_str(), "042917");
}

#[test]
fn otp_rejects_other_shapes() {
    assert!(OtpCode::parse("12345").is_err());
    assert!(OtpCode::parse("1234567").is_err());
    assert!(OtpCode::parse("12345a").is_err());
}

// ── Emails ──────────────────────────────────────────────────────

#[test]
fn email_accepts_plain_address() {
    let email = EmailAddress::parse("user@example.com").unwrap();
    assert_eq!(email.as_str(), "user@example.com");
}

#[test]
fn email_rejects_malformed() {
    assert!(EmailAddress::parse("userexample.com").is_err());
    assert!(EmailAddress::parse("@example.com").is_err());
    assert!(EmailAddress::parse("user@").is_err());
    assert!(EmailAddress::parse("user@example").is_err());
    assert!(EmailAddress::parse("user@exa mple.com").is_err());
}

// ── Properties ──────────────────────────────────────────────────

proptest! {
    /// Any parsed payment code is exactly 10 uppercase alphanumerics,
    /// regardless of input casing.
    #[test]
    fn payment_code_always_normalized(s in "[a-zA-Z0-9]{10}") {
        let code = PaymentCode::parse(&s).unwrap();
        prop_assert_eq!(code.as_str().len(), 10);
        prop_assert!(code.as_str().chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }

    /// No string that fails the digit/length shape ever parses as a phone
    /// number.
    #[test]
    fn phone_number_never_accepts_short_input(s in "\\+254[0-9]{0,8}") {
        prop_assert!(PhoneNumber::parse(&s).is_err());
    }
}
