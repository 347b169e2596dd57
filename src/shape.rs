//! Turns one raw .osm element into its table rows.

use std::str::FromStr;

use crate::clean::{clean_field, key::classify_key};
use crate::data::osm::{ElementKind, RawElement, RawTag};
use crate::data::table::{ShapedElement, ShapedPoint, ShapedTag, ShapedWay, WayMember};
use crate::data::OsmId;
use crate::errors::Result;

/// Outcome of shaping a single element.
#[derive(Debug, Clone, PartialEq)]
pub enum Shaped {
    Element(ShapedElement),
    Skipped(SkipReason),
}

/// Why an element produced no rows. Skipping is expected and not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    MissingField {
        kind: ElementKind,
        field: &'static str,
    },
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::MissingField { kind, field } => {
                write!(f, "{} is missing required attribute '{}'", kind.as_str(), field)
            }
        }
    }
}

fn parse_field<T: FromStr>(element: &RawElement, field: &str, value: &str) -> Result<T> {
    value.parse().map_err(|_| {
        format!(
            "Could not parse attribute '{}' of {} {:?}: {:?}",
            field,
            element.kind.as_str(),
            element.attribute("id").unwrap_or_default(),
            value,
        )
        .into()
    })
}

fn shape_tags(owner_id: OsmId, tags: &[RawTag]) -> Vec<ShapedTag> {
    tags.iter()
        .filter_map(|tag| {
            let classified = classify_key(&tag.key)?;
            Some(ShapedTag {
                owner_id,
                key: classified.key.to_string(),
                value: clean_field(&tag.key, &tag.value).into_owned(),
                tag_type: classified.tag_type.to_string(),
            })
        })
        .collect()
}

fn shape_members(element: &RawElement, way_id: OsmId) -> Result<Vec<WayMember>> {
    element
        .member_refs
        .iter()
        .enumerate()
        .map(|(position, node_ref)| {
            Ok(WayMember {
                way_id,
                point_id: parse_field(element, "ref", node_ref)?,
                position: position as u64,
            })
        })
        .collect()
}

/// Shapes a point or way. Elements missing a required attribute are skipped;
/// required attributes that do not parse as numbers are errors.
pub fn shape_element(element: &RawElement) -> Result<Shaped> {
    let kind = element.kind;
    let missing = kind
        .required_fields()
        .iter()
        .copied()
        .find(|field| element.attribute(field).is_none());
    if let Some(field) = missing {
        return Ok(Shaped::Skipped(SkipReason::MissingField { kind, field }));
    }
    // Presence was checked above.
    let attr = |field: &str| element.attribute(field).unwrap_or_default();

    let id: OsmId = parse_field(element, "id", attr("id"))?;
    let uid: OsmId = parse_field(element, "uid", attr("uid"))?;
    let changeset: OsmId = parse_field(element, "changeset", attr("changeset"))?;
    let tags = shape_tags(id, &element.tags);

    let shaped = match kind {
        ElementKind::Point => ShapedElement::Point {
            point: ShapedPoint {
                id,
                lat: parse_field(element, "lat", attr("lat"))?,
                lon: parse_field(element, "lon", attr("lon"))?,
                user: attr("user").to_string(),
                uid,
                version: attr("version").to_string(),
                changeset,
                timestamp: attr("timestamp").to_string(),
            },
            tags,
        },
        ElementKind::Way => ShapedElement::Way {
            way: ShapedWay {
                id,
                user: attr("user").to_string(),
                uid,
                version: attr("version").to_string(),
                changeset,
                timestamp: attr("timestamp").to_string(),
            },
            members: shape_members(element, id)?,
            tags,
        },
    };
    Ok(Shaped::Element(shaped))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    const CORE: [(&str, &str); 6] = [
        ("id", "42"),
        ("user", "mapper"),
        ("uid", "7"),
        ("version", "3"),
        ("changeset", "1001"),
        ("timestamp", "2016-04-01T12:00:00Z"),
    ];

    pub(crate) fn raw_point(tags: &[(&str, &str)]) -> RawElement {
        let mut element = RawElement::new(ElementKind::Point);
        for (name, value) in CORE.iter().chain(&[("lat", "37.3229"), ("lon", "-122.0322")]) {
            element.attributes.insert(name.to_string(), value.to_string());
        }
        element.tags = tags.iter().map(|(k, v)| RawTag::new(*k, *v)).collect();
        element
    }

    pub(crate) fn raw_way(tags: &[(&str, &str)], refs: &[&str]) -> RawElement {
        let mut element = RawElement::new(ElementKind::Way);
        for (name, value) in CORE {
            element.attributes.insert(name.to_string(), value.to_string());
        }
        element.tags = tags.iter().map(|(k, v)| RawTag::new(*k, *v)).collect();
        element.member_refs = refs.iter().map(|r| r.to_string()).collect();
        element
    }

    fn shaped(element: &RawElement) -> ShapedElement {
        match shape_element(element).expect("shaping failed") {
            Shaped::Element(shaped) => shaped,
            Shaped::Skipped(reason) => panic!("unexpected skip: {reason}"),
        }
    }

    #[test]
    fn shapes_point_with_tags() {
        let element = raw_point(&[
            ("name", "Café Ω"),
            ("addr:street", "Stevens Creek Blvd"),
            ("addr:postcode", "CA 95014"),
        ]);
        let ShapedElement::Point { point, tags } = shaped(&element) else {
            panic!("expected a point");
        };

        assert_eq!(point.id, 42);
        assert_eq!(point.lat, 37.3229);
        assert_eq!(point.lon, -122.0322);
        assert_eq!(point.user, "mapper");
        assert_eq!(point.uid, 7);
        assert_eq!(point.version, "3");
        assert_eq!(point.changeset, 1001);
        assert_eq!(point.timestamp, "2016-04-01T12:00:00Z");

        assert_eq!(tags, vec![
            ShapedTag { owner_id: 42, key: "name".into(), value: "Café Ω".into(), tag_type: "regular".into() },
            ShapedTag { owner_id: 42, key: "street".into(), value: "Stevens Creek Boulevard".into(), tag_type: "addr".into() },
            ShapedTag { owner_id: 42, key: "postcode".into(), value: "95014".into(), tag_type: "addr".into() },
        ]);
    }

    #[test]
    fn point_missing_uid_is_skipped_whole() {
        let mut element = raw_point(&[("name", "Somewhere")]);
        element.attributes.remove("uid");

        assert_eq!(
            shape_element(&element).unwrap(),
            Shaped::Skipped(SkipReason::MissingField { kind: ElementKind::Point, field: "uid" })
        );
    }

    #[test]
    fn way_does_not_need_coordinates() {
        let element = raw_way(&[], &["1"]);
        assert!(matches!(shaped(&element), ShapedElement::Way { .. }));
    }

    #[test]
    fn bad_keys_only_drop_their_own_tag() {
        let element = raw_point(&[("bad key", "x"), ("amenity", "cafe"), ("a:b:c:d", "y")]);
        let ShapedElement::Point { tags, .. } = shaped(&element) else {
            panic!("expected a point");
        };

        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].key, "amenity");
    }

    #[test]
    fn member_positions_follow_document_order() {
        let element = raw_way(&[("highway", "residential"), ("name", "Main St")], &["30", "10", "20"]);
        let ShapedElement::Way { members, .. } = shaped(&element) else {
            panic!("expected a way");
        };

        let rows: Vec<_> = members.iter().map(|m| (m.way_id, m.point_id, m.position)).collect();
        assert_eq!(rows, vec![(42, 30, 0), (42, 10, 1), (42, 20, 2)]);
    }

    #[test]
    fn non_numeric_id_is_an_error() {
        let mut element = raw_point(&[]);
        element.attributes.insert("id".into(), "forty-two".into());

        let err = shape_element(&element).unwrap_err();
        assert!(err.message.contains("'id'"), "{}", err.message);
    }

    #[test]
    fn non_numeric_member_ref_is_an_error() {
        let element = raw_way(&[], &["1", "x"]);
        assert!(shape_element(&element).is_err());
    }
}
