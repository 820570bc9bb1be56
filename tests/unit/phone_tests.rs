//! Unit tests for phone canonicalization.

use crewcall::phone::canonicalize;

#[test]
fn international_input_is_normalized() {
    let canonical = canonicalize("+7 999 123-45-67", "+7").expect("parse");
    assert_eq!(canonical, "+79991234567");
}

#[test]
fn russian_trunk_prefix_is_swapped() {
    let canonical = canonicalize("8 (999) 123 45 67", "+7").expect("parse");
    assert_eq!(canonical, "+79991234567");
}

#[test]
fn contact_card_without_plus_keeps_country_code() {
    // Telegram contact cards often drop the plus sign.
    let canonical = canonicalize("79991234567", "+7").expect("parse");
    assert_eq!(canonical, "+79991234567");
}

#[test]
fn national_input_gets_default_country_code() {
    let canonical = canonicalize("9991234567", "+7").expect("parse");
    assert_eq!(canonical, "+79991234567");
}

#[test]
fn no_digits_is_rejected() {
    assert!(canonicalize("call me maybe", "+7").is_err());
}

#[test]
fn out_of_range_digit_counts_are_rejected() {
    assert!(canonicalize("+123", "+7").is_err());
    assert!(canonicalize("+1234567890123456789", "+7").is_err());
}
