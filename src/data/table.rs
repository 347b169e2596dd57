//! Rows of the five output tables. Field order is column order.

use serde::Serialize;

use super::OsmId;

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ShapedPoint {
    pub id: OsmId,
    pub lat: f64,
    pub lon: f64,
    pub user: String,
    pub uid: OsmId,
    pub version: String,
    pub changeset: OsmId,
    pub timestamp: String,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ShapedWay {
    pub id: OsmId,
    pub user: String,
    pub uid: OsmId,
    pub version: String,
    pub changeset: OsmId,
    pub timestamp: String,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ShapedTag {
    #[serde(rename = "id")]
    pub owner_id: OsmId,
    pub key: String,
    pub value: String,
    #[serde(rename = "type")]
    pub tag_type: String,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct WayMember {
    #[serde(rename = "id")]
    pub way_id: OsmId,
    #[serde(rename = "node_id")]
    pub point_id: OsmId,
    pub position: u64,
}

/// Everything one source element contributes to the tables.
#[derive(Debug, Clone, PartialEq)]
pub enum ShapedElement {
    Point {
        point: ShapedPoint,
        tags: Vec<ShapedTag>,
    },
    Way {
        way: ShapedWay,
        members: Vec<WayMember>,
        tags: Vec<ShapedTag>,
    },
}
