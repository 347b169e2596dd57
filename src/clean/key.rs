use std::sync::LazyLock;

use regex::Regex;

/// Tag type used when the key carries no namespace.
pub const DEFAULT_TAG_TYPE: &str = "regular";

static LOWER_COLON: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([a-z]|_)+:([a-z]|_)+").expect("Invalid namespaced key regex")
});

static PROBLEM_CHARS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"[=+/&<>;'"?%#$@,. \t\r\n]"#).expect("Invalid problem character regex")
});

/// A tag key split into the `type` and `key` columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassifiedKey<'a> {
    pub tag_type: &'a str,
    pub key: &'a str,
}

/// Splits `addr:street` into (`addr`, `street`) and `name` into (`regular`, `name`).
///
/// Returns `None` for keys that cannot be stored: keys containing problem characters
/// and namespaced keys with more than three segments.
pub fn classify_key(raw: &str) -> Option<ClassifiedKey<'_>> {
    // Checked before the namespace split so a key like `addr:street name` is dropped too.
    if PROBLEM_CHARS.is_match(raw) {
        return None;
    }

    if LOWER_COLON.is_match(raw) {
        // Everything after the first colon is the key, so `a:b:c` keeps `b:c`.
        let (tag_type, key) = raw.split_once(':')?;
        return match key.split(':').count() {
            1 | 2 => Some(ClassifiedKey { tag_type, key }),
            _ => None,
        };
    }

    Some(ClassifiedKey {
        tag_type: DEFAULT_TAG_TYPE,
        key: raw,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classified(raw: &str) -> Option<(&str, &str)> {
        classify_key(raw).map(|c| (c.tag_type, c.key))
    }

    #[test]
    fn splits_two_segment_keys() {
        assert_eq!(classified("addr:street"), Some(("addr", "street")));
        assert_eq!(classified("is_in:country"), Some(("is_in", "country")));
    }

    #[test]
    fn keeps_tail_of_three_segment_keys() {
        assert_eq!(classified("addr:street:name"), Some(("addr", "street:name")));
    }

    #[test]
    fn drops_keys_with_four_segments() {
        assert_eq!(classified("a:b:c:d"), None);
    }

    #[test]
    fn plain_keys_are_regular() {
        assert_eq!(classified("name"), Some(("regular", "name")));
        assert_eq!(classified("highway"), Some(("regular", "highway")));
    }

    #[test]
    fn upper_case_namespace_is_not_split() {
        assert_eq!(classified("name:EN"), Some(("regular", "name:EN")));
    }

    #[test]
    fn drops_problem_characters() {
        for key in ["bad key", "a=b", "x/y", "tab\tkey", "semi;colon", "dotted.key", "addr:street name"] {
            assert_eq!(classified(key), None, "{key:?} should be dropped");
        }
    }
}
