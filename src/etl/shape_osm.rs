use std::fs;
use std::io::BufRead;
use std::path::Path;

use log::{debug, info};

use crate::UserConfig;
use crate::data::osm::RawElement;
use crate::errors::Result;
use crate::etl::Etl;
use crate::etl::csv_tables::{table_paths, CsvTables};
use crate::etl::parse_osm::{open_osm_reader, OsmElements};
use crate::schema::Schema;
use crate::shape::{shape_element, Shaped};

pub const ETL_NAME: &str = "shape_osm";

pub type ShapedStream = Box<dyn Iterator<Item = Result<Shaped>>>;

fn shape_and_validate(element: RawElement, schema: Option<&Schema>) -> Result<Shaped> {
    let shaped = shape_element(&element)?;
    if let (Some(schema), Shaped::Element(shaped_element)) = (schema, &shaped) {
        schema.validate(shaped_element)?;
    }
    Ok(shaped)
}

/// Shapes every point and way of the configured map into the five CSV tables.
pub struct ShapeOsmEtl<'a> {
    config: &'a UserConfig,
    schema: Option<Schema>,
}

impl ShapeOsmEtl<'_> {
    pub fn new(config: &UserConfig, schema: Option<Schema>) -> ShapeOsmEtl<'_> {
        ShapeOsmEtl {
            config,
            schema,
        }
    }
}

impl Etl for ShapeOsmEtl<'_> {
    type Input = OsmElements<Box<dyn BufRead>>;
    type Output = ShapedStream;

    fn etl_name(&self) -> &str {
        ETL_NAME
    }

    fn is_cached(&self, dir: &Path) -> Result<bool> {
        for path in table_paths(dir) {
            if !path.try_exists()? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn clean(&self, dir: &Path) -> Result<()> {
        for path in table_paths(dir) {
            if path.try_exists()? {
                fs::remove_file(path)?;
            }
        }
        Ok(())
    }

    fn extract(&mut self, _dir: &Path) -> Result<Self::Input> {
        let reader = open_osm_reader(Path::new(&self.config.data_path))?;
        Ok(OsmElements::new(reader))
    }

    fn transform(&mut self, input: Self::Input) -> Result<Self::Output> {
        let schema = self.schema.clone();
        Ok(Box::new(input.map(move |element| {
            shape_and_validate(element?, schema.as_ref())
        })))
    }

    fn load(&mut self, dir: &Path, output: Self::Output) -> Result<()> {
        let mut tables = CsvTables::create(dir)?;
        let mut skipped: u64 = 0;

        for shaped in output {
            match shaped? {
                Shaped::Element(element) => tables.write(&element)?,
                Shaped::Skipped(reason) => {
                    skipped += 1;
                    debug!(etl_name = ETL_NAME, reason = reason.to_string().as_str(); "Skipping element");
                }
            }
        }

        let counts = tables.finish()?;
        info!(
            etl_name = ETL_NAME,
            nodes = counts.nodes,
            node_tags = counts.node_tags,
            ways = counts.ways,
            way_nodes = counts.way_nodes,
            way_tags = counts.way_tags,
            skipped = skipped;
            "Wrote tables"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::etl::csv_tables::{NODES_FILE_NAME, WAY_NODES_FILE_NAME, WAY_TAGS_FILE_NAME};

    const MAP: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<osm version="0.6">
  <node id="1" lat="37.32" lon="-122.03" user="a" uid="1" version="1" changeset="5" timestamp="2016-01-01T00:00:00Z">
    <tag k="addr:housenumber" v="123-"/>
  </node>
  <node id="2" lat="37.33" lon="-122.04" user="a" version="1" changeset="5" timestamp="2016-01-01T00:00:00Z">
    <tag k="name" v="no uid"/>
  </node>
  <way id="3" user="a" uid="1" version="1" changeset="5" timestamp="2016-01-01T00:00:00Z">
    <nd ref="1"/>
    <tag k="addr:street" v="Stevens Creek Blvd"/>
    <nd ref="2"/>
  </way>
</osm>
"#;

    fn config(dir: &Path) -> UserConfig {
        let data_path = dir.join("map.osm");
        fs::File::create(&data_path).unwrap().write_all(MAP.as_bytes()).unwrap();
        UserConfig::for_paths(data_path.to_string_lossy().into_owned(), dir.join("out").to_string_lossy().into_owned())
    }

    #[test]
    fn processes_map_into_tables() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        let out = Path::new(&config.dest_path);
        let mut etl = ShapeOsmEtl::new(&config, Some(Schema::default()));

        assert!(!etl.is_cached(out).unwrap());
        etl.process(out).unwrap();
        assert!(etl.is_cached(out).unwrap());

        let nodes = fs::read_to_string(out.join(NODES_FILE_NAME)).unwrap();
        assert_eq!(nodes.lines().count(), 2, "the node without uid is skipped:\n{nodes}");
        assert_eq!(
            fs::read_to_string(out.join(WAY_TAGS_FILE_NAME)).unwrap(),
            "id,key,value,type\n3,street,Stevens Creek Boulevard,addr\n"
        );
        assert_eq!(
            fs::read_to_string(out.join(WAY_NODES_FILE_NAME)).unwrap(),
            "id,node_id,position\n3,1,0\n3,2,1\n"
        );

        etl.clean(out).unwrap();
        assert!(!etl.is_cached(out).unwrap());
    }

    #[test]
    fn validation_failure_stops_the_run() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        let out = Path::new(&config.dest_path);
        let mut schema = Schema::default();
        schema.node_tags.fields.retain(|rule| rule.name != "type");

        let err = ShapeOsmEtl::new(&config, Some(schema)).process(out).unwrap_err();
        assert!(err.message.contains("'node_tags'"), "{}", err.message);
        assert!(err.message.contains("unknown field"), "{}", err.message);
    }
}
