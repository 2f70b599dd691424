use eurostat_macro::countries::{COUNTRY_CODES, DEFAULT_COUNTRY, code_for, resolve};

#[test]
fn every_documented_name_resolves_to_its_code() {
    let names: Vec<&str> = COUNTRY_CODES.iter().map(|(n, _)| *n).collect();
    let codes: Vec<String> = COUNTRY_CODES.iter().map(|(_, c)| c.to_string()).collect();
    assert_eq!(resolve(&names), codes);
    assert_eq!(COUNTRY_CODES.len(), 28);
}

#[test]
fn unknown_names_are_skipped_in_order() {
    assert_eq!(resolve(&["Poland", "Nowhere", "Germany"]), vec!["PL", "DE"]);
}

#[test]
fn names_outside_the_table_resolve_to_nothing() {
    for name in ["Norway", "United Kingdom", "Switzerland", "", "EU"] {
        assert_eq!(code_for(name), None, "{name}");
        assert!(resolve(&[name]).is_empty());
    }
}

#[test]
fn duplicates_are_kept_and_empty_input_is_fine() {
    assert_eq!(resolve(&["Italy", "Italy"]), vec!["IT", "IT"]);
    let none: [&str; 0] = [];
    assert!(resolve(&none).is_empty());
}

#[test]
fn default_country_is_in_the_table() {
    assert_eq!(code_for(DEFAULT_COUNTRY), Some("PL"));
}

#[test]
fn owned_strings_resolve_too() {
    let names = vec!["Euro Zone".to_string(), "Greece".to_string()];
    assert_eq!(resolve(&names), vec!["EA", "EL"]);
}
