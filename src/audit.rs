//! Survey of the address fields in a map: which values do not have the expected
//! shape, and how many the cleaners would rewrite.

use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::clean::{street, AddressField};
use crate::data::osm::{RawElement, RawTag};

#[derive(Serialize, Debug, Default, Clone, PartialEq, Eq)]
pub struct AuditReport {
    /// Unexpected street types, each with the street names that end in it.
    pub street_types: BTreeMap<String, BTreeSet<String>>,
    pub postcodes: Vec<String>,
    pub housenumbers: Vec<String>,
    /// Number of values each cleaner changes, keyed by tag key.
    pub rewrites: BTreeMap<String, usize>,
    pub elements: usize,
}

impl AuditReport {
    pub fn record_tag(&mut self, tag: &RawTag) {
        let Some(field) = AddressField::from_key(&tag.key) else {
            return;
        };

        if !field.is_expected(&tag.value) {
            match field {
                AddressField::Street => {
                    if let Some(street_type) = street::unexpected_street_type(&tag.value) {
                        self.street_types.entry(street_type.to_string())
                            .or_default()
                            .insert(tag.value.clone());
                    }
                }
                AddressField::Postcode => self.postcodes.push(tag.value.clone()),
                AddressField::HouseNumber => self.housenumbers.push(tag.value.clone()),
            }
        }

        if let Cow::Owned(_) = field.clean(&tag.value) {
            *self.rewrites.entry(field.key().to_string()).or_default() += 1;
        }
    }

    pub fn record_element(&mut self, element: &RawElement) {
        self.elements += 1;
        for tag in &element.tags {
            self.record_tag(tag);
        }
    }

    pub fn rewrite_count(&self) -> usize {
        self.rewrites.values().sum()
    }
}
