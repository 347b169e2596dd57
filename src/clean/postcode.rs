use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

/// Written in place of a postcode that has nothing usable in it.
pub const UNKNOWN_POSTCODE: &str = "unknown";

static EMBEDDED_POSTCODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"9[0-9]{4}").expect("Invalid postcode regex")
});

/// Postcodes in the mapped region are five characters starting with a 9.
pub fn is_expected_postcode(postcode: &str) -> bool {
    postcode.chars().count() == 5 && postcode.starts_with('9')
}

/// Pulls a `9xxxx` code out of values like `CA 95014` or `95014-2083`.
pub fn clean_postcode(postcode: &str) -> Cow<'_, str> {
    if is_expected_postcode(postcode) || postcode == UNKNOWN_POSTCODE {
        return Cow::Borrowed(postcode);
    }
    match EMBEDDED_POSTCODE.find(postcode) {
        Some(m) => Cow::Owned(m.as_str().to_string()),
        None => Cow::Owned(UNKNOWN_POSTCODE.to_string()),
    }
}
