use super::*;

#[test]
fn parse_known_codes() {
    assert_eq!("en".parse::<Language>().unwrap(), Language::En);
    assert_eq!("HI".parse::<Language>().unwrap(), Language::Hi);
    assert_eq!(" ta ".parse::<Language>().unwrap(), Language::Ta);
    assert_eq!("gu".parse::<Language>().unwrap(), Language::Gu);
}

#[test]
fn parse_unknown_code_errors() {
    let err = "fr".parse::<Language>().unwrap_err();
    assert_eq!(err.to_string(), "unsupported language code: fr");
}

#[test]
fn code_round_trips_through_display() {
    for lang in Language::ALL {
        assert_eq!(lang.to_string().parse::<Language>().unwrap(), lang);
    }
}

#[test]
fn default_language_is_hindi() {
    assert_eq!(Language::default(), Language::Hi);
}

#[test]
fn every_bundle_has_non_empty_user_facing_strings() {
    for lang in Language::ALL {
        let s = strings(lang);
        assert!(!s.greeting.is_empty(), "{lang}: greeting");
        assert!(!s.service_busy.is_empty(), "{lang}: service_busy");
        assert!(!s.scan_failed.is_empty(), "{lang}: scan_failed");
        assert!(!s.report.sources.is_empty(), "{lang}: report.sources");
        assert!(s.scanning.starts_with('🔍'), "{lang}: scanning marker");
    }
}

#[test]
fn verdict_label_lookup() {
    let s = strings(Language::En);
    assert_eq!(s.verdict_label(Verdict::Fake), "Confirmed Fake");
    assert_eq!(s.verdict_label(Verdict::Real), "Verified Real");
    assert_eq!(s.verdict_label(Verdict::Suspicious), "Warning: Suspicious");
}

#[test]
fn english_names_feed_prompts() {
    assert_eq!(Language::Gu.english_name(), "Gujarati");
    assert_eq!(Language::Hi.native_label(), "हिन्दी");
}
