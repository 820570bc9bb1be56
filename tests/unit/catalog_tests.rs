//! Unit tests for the locale catalog.

use crewcall::i18n::Catalog;

#[test]
fn embedded_catalogs_load() {
    let catalog = Catalog::embedded("en").expect("catalog");
    let mut supported = catalog.supported();
    supported.sort_unstable();
    assert_eq!(supported, vec!["en", "ru"]);
}

#[test]
fn unknown_default_locale_is_rejected() {
    assert!(Catalog::embedded("xx").is_err());
}

#[test]
fn preferred_locale_wins() {
    let catalog = Catalog::embedded("en").expect("catalog");
    let en = catalog.text(Some("en"), "worker_saved");
    let ru = catalog.text(Some("ru"), "worker_saved");
    assert_ne!(en, ru);
}

#[test]
fn unsupported_locale_falls_back_to_default() {
    let catalog = Catalog::embedded("en").expect("catalog");
    assert_eq!(
        catalog.text(Some("de"), "worker_saved"),
        catalog.text(Some("en"), "worker_saved")
    );
    assert_eq!(
        catalog.text(None, "worker_saved"),
        catalog.text(Some("en"), "worker_saved")
    );
}

#[test]
fn missing_key_surfaces_the_key() {
    let catalog = Catalog::embedded("en").expect("catalog");
    assert_eq!(catalog.text(Some("en"), "no_such_key"), "no_such_key");
}

#[test]
fn placeholders_are_substituted() {
    let catalog = Catalog::embedded("en").expect("catalog");
    let rendered = catalog.text_with(Some("en"), "welcome_message", &[("name", "Ivan")]);
    assert!(rendered.contains("Ivan"), "got: {rendered}");
    assert!(!rendered.contains("{name}"));
}
