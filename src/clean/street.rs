use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

static STREET_TYPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b\S+\.?$").expect("Invalid street type regex")
});

/// Street types we already consider canonical.
pub const EXPECTED_STREET_TYPES: [&str; 13] = [
    "Street", "Avenue", "Boulevard", "Drive", "Court", "Place", "Square", "Lane", "Road",
    "Trail", "Parkway", "Commons", "Way",
];

/// Abbreviations and miscased types seen in the data, with their canonical form.
const STREET_MAPPING: [(&str, &str); 19] = [
    ("Rd", "Road"),
    ("Rd.", "Road"),
    ("broadway", "Broadway"),
    ("street", "Street"),
    ("st", "Street"),
    ("St", "Street"),
    ("St.", "Street"),
    ("avenue", "Avenue"),
    ("Ave", "Avenue"),
    ("Ave.", "Avenue"),
    ("AVE", "Avenue"),
    ("way", "Way"),
    ("blvd", "Boulevard"),
    ("Blvd", "Boulevard"),
    ("Blvd.", "Boulevard"),
    ("parkway", "Parkway"),
    ("Hwy", "Highway"),
    ("Dr", "Drive"),
    ("Ctr", "Center"),
];

/// The trailing token of a street name, e.g. `St.` in `123 Main St.`.
pub fn street_type(name: &str) -> Option<&str> {
    STREET_TYPE.find(name).map(|m| m.as_str())
}

/// Returns the street type of `name` when it is not one of the expected ones.
pub fn unexpected_street_type(name: &str) -> Option<&str> {
    street_type(name).filter(|street_type| !EXPECTED_STREET_TYPES.contains(street_type))
}

/// Expands an abbreviated street type. Unknown types are left alone.
pub fn clean_street(name: &str) -> Cow<'_, str> {
    let Some(street_type) = unexpected_street_type(name) else {
        return Cow::Borrowed(name);
    };

    match STREET_MAPPING.iter().find(|(abbreviation, _)| *abbreviation == street_type) {
        Some((_, canonical)) => {
            let prefix = &name[..name.len() - street_type.len()];
            Cow::Owned(format!("{prefix}{canonical}"))
        }
        None => Cow::Borrowed(name),
    }
}
