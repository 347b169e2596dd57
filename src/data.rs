pub mod osm;
pub mod table;

/// Identifier of a node, way or user as found in the .osm file.
pub type OsmId = i64;
