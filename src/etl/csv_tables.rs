use std::fs::{self, File};
use std::path::{Path, PathBuf};

use csv::{Writer, WriterBuilder};
use serde::Serialize;

use crate::data::table::ShapedElement;
use crate::errors::Result;

pub const NODES_FILE_NAME: &str = "nodes.csv";
pub const NODE_TAGS_FILE_NAME: &str = "nodes_tags.csv";
pub const WAYS_FILE_NAME: &str = "ways.csv";
pub const WAY_NODES_FILE_NAME: &str = "ways_nodes.csv";
pub const WAY_TAGS_FILE_NAME: &str = "ways_tags.csv";

pub const TABLE_FILE_NAMES: [&str; 5] = [
    NODES_FILE_NAME,
    NODE_TAGS_FILE_NAME,
    WAYS_FILE_NAME,
    WAY_NODES_FILE_NAME,
    WAY_TAGS_FILE_NAME,
];

const NODE_FIELDS: [&str; 8] = ["id", "lat", "lon", "user", "uid", "version", "changeset", "timestamp"];
const TAG_FIELDS: [&str; 4] = ["id", "key", "value", "type"];
const WAY_FIELDS: [&str; 6] = ["id", "user", "uid", "version", "changeset", "timestamp"];
const WAY_NODE_FIELDS: [&str; 3] = ["id", "node_id", "position"];

pub fn table_paths(dir: &Path) -> Vec<PathBuf> {
    TABLE_FILE_NAMES.iter().map(|name| dir.join(name)).collect()
}

/// Rows written to each table.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TableCounts {
    pub nodes: u64,
    pub node_tags: u64,
    pub ways: u64,
    pub way_nodes: u64,
    pub way_tags: u64,
}

/// The five output tables. Headers are written up front so empty tables still have them.
pub struct CsvTables {
    nodes: Writer<File>,
    node_tags: Writer<File>,
    ways: Writer<File>,
    way_nodes: Writer<File>,
    way_tags: Writer<File>,
    counts: TableCounts,
}

fn create_writer(dir: &Path, file_name: &str, header: &[&str]) -> Result<Writer<File>> {
    let path = dir.join(file_name);
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .from_path(&path)
        .map_err(|err| format!("Could not create {}: {}", path.display(), err))?;
    writer.write_record(header)?;
    Ok(writer)
}

fn write_rows<T: Serialize>(writer: &mut Writer<File>, rows: &[T], count: &mut u64) -> Result<()> {
    for row in rows {
        writer.serialize(row)?;
        *count += 1;
    }
    Ok(())
}

impl CsvTables {
    pub fn create(dir: &Path) -> Result<CsvTables> {
        fs::create_dir_all(dir)?;
        Ok(CsvTables {
            nodes: create_writer(dir, NODES_FILE_NAME, &NODE_FIELDS)?,
            node_tags: create_writer(dir, NODE_TAGS_FILE_NAME, &TAG_FIELDS)?,
            ways: create_writer(dir, WAYS_FILE_NAME, &WAY_FIELDS)?,
            way_nodes: create_writer(dir, WAY_NODES_FILE_NAME, &WAY_NODE_FIELDS)?,
            way_tags: create_writer(dir, WAY_TAGS_FILE_NAME, &TAG_FIELDS)?,
            counts: TableCounts::default(),
        })
    }

    pub fn write(&mut self, element: &ShapedElement) -> Result<()> {
        match element {
            ShapedElement::Point { point, tags } => {
                write_rows(&mut self.nodes, std::slice::from_ref(point), &mut self.counts.nodes)?;
                write_rows(&mut self.node_tags, tags, &mut self.counts.node_tags)
            }
            ShapedElement::Way { way, members, tags } => {
                write_rows(&mut self.ways, std::slice::from_ref(way), &mut self.counts.ways)?;
                write_rows(&mut self.way_nodes, members, &mut self.counts.way_nodes)?;
                write_rows(&mut self.way_tags, tags, &mut self.counts.way_tags)
            }
        }
    }

    /// Flushes every table and returns how many rows each received.
    pub fn finish(mut self) -> Result<TableCounts> {
        for writer in [&mut self.nodes, &mut self.node_tags, &mut self.ways, &mut self.way_nodes, &mut self.way_tags] {
            writer.flush()?;
        }
        Ok(self.counts)
    }
}
