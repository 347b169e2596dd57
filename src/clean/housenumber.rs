use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

static HOUSENUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]+[a-zA-Z]?$").expect("Invalid house number regex")
});

static SPLIT_LETTER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]+[- ][a-zA-Z]$").expect("Invalid split letter regex")
});

// Leftmost match wins, so `ste.` is only reached through `ste`.
static SUITE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"ste|ste\.|suite").expect("Invalid suite regex")
});

static PLUS_PAIR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]+\+[0-9]+$").expect("Invalid plus pair regex")
});

/// Digits, optionally followed by a single letter: `123`, `123A`.
pub fn is_expected_housenumber(housenumber: &str) -> bool {
    HOUSENUMBER.is_match(housenumber)
}

/// Applies the first rewrite that matches `housenumber`, if any.
fn rewrite_once(housenumber: &str) -> Option<String> {
    if is_expected_housenumber(housenumber) {
        return None;
    }

    if housenumber.ends_with('-') {
        Some(housenumber.replace('-', ""))
    } else if housenumber.contains(';') {
        Some(housenumber.replace(';', ","))
    } else if SPLIT_LETTER.is_match(housenumber) {
        if housenumber.contains('-') {
            Some(housenumber.replace('-', ""))
        } else {
            Some(housenumber.replace(' ', ""))
        }
    } else if let Some(m) = SUITE.find(housenumber) {
        Some(format!(
            "{}Suite{}",
            &housenumber[..m.start()],
            &housenumber[m.end()..]
        ))
    } else if PLUS_PAIR.is_match(housenumber) {
        Some(housenumber.replace('+', "-"))
    } else {
        None
    }
}

/// Rewrites the handful of malformed house numbers seen in the data. Each pass
/// applies the first matching rewrite; passes repeat until nothing matches, so
/// `12+34-` ends up as `12-34` rather than `12+34`.
pub fn clean_housenumber(housenumber: &str) -> Cow<'_, str> {
    let Some(mut cleaned) = rewrite_once(housenumber) else {
        return Cow::Borrowed(housenumber);
    };
    // Every rewrite removes a hyphen, semicolon, space, plus or suite marker, so this ends.
    while let Some(next) = rewrite_once(&cleaned) {
        cleaned = next;
    }
    Cow::Owned(cleaned)
}
