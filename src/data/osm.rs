use std::collections::HashMap;

/// The two kinds of .osm elements we turn into table rows. Relations never make it
/// past the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Point,
    Way,
}

impl ElementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ElementKind::Point => "node",
            ElementKind::Way => "way",
        }
    }

    /// Attributes every element of this kind must carry to produce a row.
    pub fn required_fields(&self) -> &'static [&'static str] {
        match self {
            ElementKind::Point => &["id", "lat", "lon", "user", "uid", "version", "changeset", "timestamp"],
            ElementKind::Way => &["id", "user", "uid", "version", "changeset", "timestamp"],
        }
    }
}

/// A `<tag k=".." v=".."/>` child, unescaped but otherwise untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTag {
    pub key: String,
    pub value: String,
}

impl RawTag {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        RawTag {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// One `<node>` or `<way>` as it appears in the .osm file. Consumed once by the shaper.
#[derive(Debug, Clone, PartialEq)]
pub struct RawElement {
    pub kind: ElementKind,
    pub attributes: HashMap<String, String>,
    pub tags: Vec<RawTag>,
    /// `ref` values of the `<nd>` children, in document order. Always empty for points.
    pub member_refs: Vec<String>,
}

impl RawElement {
    pub fn new(kind: ElementKind) -> Self {
        RawElement {
            kind,
            attributes: HashMap::new(),
            tags: Vec::new(),
            member_refs: Vec::new(),
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}
