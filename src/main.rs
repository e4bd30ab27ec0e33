mod audit;
mod data;
mod errors;
mod etl;
mod shape;
mod store;

use std::env;
use std::fs::{create_dir_all, File};
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use serde::Deserialize;
use structured_logger::json::new_writer;
use structured_logger::Builder;

use crate::errors::Result;
use crate::etl::audit_osm::AuditOsmEtl;
use crate::etl::shape_osm::ShapeOsmEtl;
use crate::etl::stats::StatsEtl;
use crate::etl::Etl;
use crate::shape::{corpus::DEFAULT_BATCH_SIZE, ShapeConfig};

const DEFAULT_CONFIG_PATH: &str = "config/shanghai.json";

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct UserConfig {
    /// .osm or .osm.xz extract to clean.
    pub data_path: String,
    /// Every run writes into `<dest_path>/<input file name>/`.
    pub dest_path: String,
    pub log_level: String,
    pub batch_size: usize,
    pub shape: ShapeConfig,
}

impl Default for UserConfig {
    fn default() -> Self {
        UserConfig {
            data_path: String::new(),
            dest_path: "output".to_string(),
            log_level: "info".to_string(),
            batch_size: DEFAULT_BATCH_SIZE,
            shape: ShapeConfig::default(),
        }
    }
}

fn load_user_config(path: &str) -> Result<UserConfig> {
    let file = File::open(path)
        .map_err(|err| format!("Could not open config file {}: {}", path, err))?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

fn create_output_dir(config: &UserConfig) -> Result<PathBuf> {
    let input_fname = Path::new(&config.data_path)
        .file_name()
        .ok_or("Could not get input file name")?;
    let output_dir = Path::new(&config.dest_path).join(input_fname);
    create_dir_all(&output_dir)?;
    Ok(output_dir)
}

fn setup_logging(level: &str) {
    Builder::with_level(level)
        .with_target_writer("*", new_writer(io::stdout()))
        .init();
}

fn main() -> Result<()> {
    let config_path = env::args().nth(1).unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let user_config = load_user_config(&config_path)?;
    setup_logging(&user_config.log_level);

    let output_dir = create_output_dir(&user_config)?;

    AuditOsmEtl::new(&user_config)?.process(&output_dir)?;
    ShapeOsmEtl::new(&user_config)?.process(&output_dir)?;
    StatsEtl::new().process(&output_dir)?;

    Ok(())
}
