use std::fs::{self, File};
use std::io::{BufRead, BufWriter, Write};
use std::path::{Path, PathBuf};

use log::info;

use crate::UserConfig;
use crate::audit::AuditReport;
use crate::errors::Result;
use crate::etl::Etl;
use crate::etl::parse_osm::{open_osm_reader, OsmElements};

pub const ETL_NAME: &str = "audit_osm";
pub const OUTPUT_FILE_NAME: &str = "audit.json";

/// Reports the address values of the configured map that the cleaners target.
pub struct AuditOsmEtl<'a> {
    config: &'a UserConfig,
}

impl AuditOsmEtl<'_> {
    fn output_path(dir: &Path) -> PathBuf {
        dir.join(OUTPUT_FILE_NAME)
    }

    pub fn new(config: &UserConfig) -> AuditOsmEtl<'_> {
        AuditOsmEtl {
            config
        }
    }
}

impl Etl for AuditOsmEtl<'_> {
    type Input = OsmElements<Box<dyn BufRead>>;
    type Output = AuditReport;

    fn etl_name(&self) -> &str {
        ETL_NAME
    }

    fn is_cached(&self, dir: &Path) -> Result<bool> {
        Ok(Self::output_path(dir).try_exists()?)
    }

    fn clean(&self, dir: &Path) -> Result<()> {
        if self.is_cached(dir)? {
            fs::remove_file(Self::output_path(dir))?;
        }
        Ok(())
    }

    fn extract(&mut self, _dir: &Path) -> Result<Self::Input> {
        let reader = open_osm_reader(Path::new(&self.config.data_path))?;
        Ok(OsmElements::new(reader))
    }

    fn transform(&mut self, input: Self::Input) -> Result<Self::Output> {
        let mut report = AuditReport::default();
        for element in input {
            report.record_element(&element?);
        }
        Ok(report)
    }

    fn load(&mut self, dir: &Path, output: Self::Output) -> Result<()> {
        fs::create_dir_all(dir)?;
        let mut writer = BufWriter::new(File::create(Self::output_path(dir))?);
        serde_json::to_writer_pretty(&mut writer, &output)?;
        writer.flush()?;

        info!(
            etl_name = ETL_NAME,
            elements = output.elements,
            street_types = output.street_types.len(),
            postcodes = output.postcodes.len(),
            housenumbers = output.housenumbers.len(),
            rewrites = output.rewrite_count();
            "Audit finished"
        );
        Ok(())
    }
}
