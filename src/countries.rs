//! Country display names → Eurostat geo codes.
//!
//! The table covers the EU member states tracked by the fetchers plus the
//! `EA` euro-area aggregate. Names outside the table are skipped with a warning.

use ahash::AHashMap;
use log::warn;
use std::sync::LazyLock;

/// Default country used by the fetch helpers when none are given.
pub const DEFAULT_COUNTRY: &str = "Poland";

/// Static (name, geo code) pairs, in display order.
pub const COUNTRY_CODES: [(&str, &str); 28] = [
    ("Belgium", "BE"),
    ("Greece", "EL"),
    ("Lithuania", "LT"),
    ("Portugal", "PT"),
    ("Bulgaria", "BG"),
    ("Spain", "ES"),
    ("Luxembourg", "LU"),
    ("Romania", "RO"),
    ("Czechia", "CZ"),
    ("France", "FR"),
    ("Hungary", "HU"),
    ("Slovenia", "SI"),
    ("Denmark", "DK"),
    ("Croatia", "HR"),
    ("Malta", "MT"),
    ("Slovakia", "SK"),
    ("Germany", "DE"),
    ("Italy", "IT"),
    ("Netherlands", "NL"),
    ("Finland", "FI"),
    ("Estonia", "EE"),
    ("Cyprus", "CY"),
    ("Austria", "AT"),
    ("Sweden", "SE"),
    ("Ireland", "IE"),
    ("Latvia", "LV"),
    ("Poland", "PL"),
    ("Euro Zone", "EA"),
];

static LOOKUP: LazyLock<AHashMap<&'static str, &'static str>> =
    LazyLock::new(|| COUNTRY_CODES.iter().copied().collect());

/// Look up the geo code for a single display name (exact, case-sensitive).
pub fn code_for(name: &str) -> Option<&'static str> {
    LOOKUP.get(name).copied()
}

/// Resolve display names to geo codes, preserving order and duplicates.
///
/// Unknown names are dropped with a warning; this never fails.
///
/// ```
/// use eurostat_macro::countries::resolve;
/// let geo = resolve(&["Poland", "Nowhere", "Germany"]);
/// assert_eq!(geo, vec!["PL".to_string(), "DE".to_string()]);
/// ```
pub fn resolve<S: AsRef<str>>(names: &[S]) -> Vec<String> {
    let mut geo = Vec::with_capacity(names.len());
    for name in names {
        let name = name.as_ref();
        match code_for(name) {
            Some(code) => geo.push(code.to_string()),
            None => warn!("country {name:?} either doesn't exist or is not an EU member; skipped"),
        }
    }
    geo
}
