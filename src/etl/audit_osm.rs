use std::io::BufRead;
use std::path::{Path, PathBuf};

use log::info;

use crate::audit::{AuditReport, Auditor};
use crate::errors::Result;
use crate::etl::parse_osm::{open_osm_reader, OsmReader};
use crate::shape::{classify::TagClassifier, street::StreetNormalizer};
use crate::UserConfig;

use super::{remove_if_exists, write_json_pretty, Etl};

pub const ETL_NAME: &str = "audit_osm";
pub const OUTPUT_FILE_NAME: &str = "audit.json";

/// Collects street type and postal code anomalies for manual review.
pub struct AuditOsmEtl<'a> {
    config: &'a UserConfig,
    classifier: TagClassifier,
    normalizer: StreetNormalizer,
}

impl AuditOsmEtl<'_> {
    fn output_path(dir: &Path) -> PathBuf {
        dir.join(OUTPUT_FILE_NAME)
    }

    pub fn new(config: &UserConfig) -> Result<AuditOsmEtl> {
        Ok(AuditOsmEtl {
            config,
            classifier: TagClassifier::new()?,
            normalizer: StreetNormalizer::new(config.shape.street_suffix_mapping.clone())?,
        })
    }
}

impl Etl for AuditOsmEtl<'_> {
    type Input = OsmReader<Box<dyn BufRead + Send>>;
    type Output = AuditReport;

    fn etl_name(&self) -> &str {
        ETL_NAME
    }

    fn is_cached(&self, dir: &Path) -> Result<bool> {
        Ok(Self::output_path(dir).try_exists()?)
    }

    fn clean(&self, dir: &Path) -> Result<()> {
        remove_if_exists(&Self::output_path(dir))
    }

    fn extract(&mut self, _dir: &Path) -> Result<Self::Input> {
        open_osm_reader(Path::new(&self.config.data_path))
    }

    fn transform(&mut self, input: Self::Input) -> Result<Self::Output> {
        let mut auditor = Auditor::new(&self.classifier, &self.normalizer, &self.config.shape.expected_street_types);
        for element in input {
            auditor.inspect(&element?);
        }
        let report = auditor.finish();
        info!(
            etl_name = ETL_NAME,
            street_types = report.street_types.len(),
            non_compliant_codes = report.non_compliant_codes.len(),
            problem_keys = report.key_shapes.problemchars;
            "Audit finished"
        );
        Ok(report)
    }

    fn load(&mut self, dir: &Path, output: Self::Output) -> Result<()> {
        write_json_pretty(&Self::output_path(dir), &output)
    }
}
