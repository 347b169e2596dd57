mod audit;
mod clean;
mod data;
mod errors;
mod etl;
mod schema;
mod shape;

use std::env;
use std::fs::{create_dir_all, File};
use std::io;
use std::path::{Path, PathBuf};

use log::info;
use serde::Deserialize;
use structured_logger::json::new_writer;
use structured_logger::Builder;

use crate::errors::Result;
use crate::etl::audit_osm::AuditOsmEtl;
use crate::etl::shape_osm::ShapeOsmEtl;
use crate::etl::Etl;
use crate::schema::Schema;

const DEFAULT_CONFIG_PATH: &str = "config/default.json";

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Deserialize, Debug, Clone)]
pub struct UserConfig {
    pub data_path: String,
    pub dest_path: String,
    #[serde(default = "default_true")]
    pub validate: bool,
    #[serde(default)]
    pub schema_path: Option<String>,
    #[serde(default)]
    pub audit: bool,
    #[serde(default)]
    pub force: bool,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl UserConfig {
    /// Config with every optional setting at its default.
    #[cfg(test)]
    pub fn for_paths(data_path: String, dest_path: String) -> UserConfig {
        UserConfig {
            data_path,
            dest_path,
            validate: true,
            schema_path: None,
            audit: false,
            force: false,
            log_level: default_log_level(),
        }
    }

    fn schema(&self) -> Result<Option<Schema>> {
        if !self.validate {
            return Ok(None);
        }
        match &self.schema_path {
            Some(path) => Ok(Some(Schema::load(Path::new(path))?)),
            None => Ok(Some(Schema::default())),
        }
    }
}

fn load_user_config(path: &str) -> Result<UserConfig> {
    let file = File::open(path)
        .map_err(|err| format!("Could not open config file {}: {}", path, err))?;
    Ok(serde_json::from_reader(file)?)
}

fn create_output_dir(config: &UserConfig) -> Result<PathBuf> {
    let output_dir = PathBuf::from(&config.dest_path);
    create_dir_all(&output_dir)?;
    Ok(output_dir)
}

fn setup_logging(level: &str) {
    Builder::with_level(level)
        .with_target_writer("*", new_writer(io::stdout()))
        .init();
}

fn run_etl(etl: &mut impl Etl, dir: &Path, force: bool) -> Result<()> {
    if force {
        etl.clean(dir)?;
    }
    etl.process(dir)
}

fn main() -> Result<()> {
    let config_path = env::args().nth(1).unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let user_config = load_user_config(&config_path)?;
    setup_logging(&user_config.log_level);
    info!(config = config_path.as_str(), data_path = user_config.data_path.as_str(); "Loaded config");

    let output_dir = create_output_dir(&user_config)?;

    if user_config.audit {
        run_etl(&mut AuditOsmEtl::new(&user_config), &output_dir, user_config.force)?;
    }

    let mut etl = ShapeOsmEtl::new(&user_config, user_config.schema()?);
    run_etl(&mut etl, &output_dir, user_config.force)?;

    Ok(())
}
