//! Cleaning of tag keys and of the address fields known to be dirty.
//!
//! Every cleaner returns a `Cow`: `Borrowed` when the value was left as it is,
//! `Owned` when it was rewritten.

pub mod housenumber;
pub mod key;
pub mod postcode;
pub mod street;

use std::borrow::Cow;

/// Tags whose values get rewritten on the way out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum AddressField {
    Street,
    Postcode,
    HouseNumber,
}

impl AddressField {
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "addr:street" => Some(AddressField::Street),
            "addr:postcode" => Some(AddressField::Postcode),
            "addr:housenumber" => Some(AddressField::HouseNumber),
            _ => None,
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            AddressField::Street => "addr:street",
            AddressField::Postcode => "addr:postcode",
            AddressField::HouseNumber => "addr:housenumber",
        }
    }

    pub fn clean<'a>(&self, value: &'a str) -> Cow<'a, str> {
        match self {
            AddressField::Street => street::clean_street(value),
            AddressField::Postcode => postcode::clean_postcode(value),
            AddressField::HouseNumber => housenumber::clean_housenumber(value),
        }
    }

    /// Whether `value` already has the shape this field should have.
    pub fn is_expected(&self, value: &str) -> bool {
        match self {
            AddressField::Street => street::unexpected_street_type(value).is_none(),
            AddressField::Postcode => postcode::is_expected_postcode(value),
            AddressField::HouseNumber => housenumber::is_expected_housenumber(value),
        }
    }
}

/// Cleans the value of a tag with the raw (unsplit) key `key`.
pub fn clean_field<'a>(key: &str, value: &'a str) -> Cow<'a, str> {
    match AddressField::from_key(key) {
        Some(field) => field.clean(value),
        None => Cow::Borrowed(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routes_address_fields() {
        assert_eq!(clean_field("addr:street", "1 Infinite Loop Rd"), "1 Infinite Loop Road");
        assert_eq!(clean_field("addr:postcode", "CA 95014"), "95014");
        assert_eq!(clean_field("addr:housenumber", "12+34"), "12-34");
    }

    #[test]
    fn other_keys_pass_through() {
        assert!(matches!(clean_field("name", "Main St"), Cow::Borrowed("Main St")));
        assert!(matches!(clean_field("street", "Main St"), Cow::Borrowed(_)));
        assert!(matches!(clean_field("postcode", "12345"), Cow::Borrowed(_)));
    }

    #[test]
    fn keys_round_trip() {
        for field in [AddressField::Street, AddressField::Postcode, AddressField::HouseNumber] {
            assert_eq!(AddressField::from_key(field.key()), Some(field));
        }
    }
}
