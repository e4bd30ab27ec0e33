use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use log::info;

use crate::data::document::CanonicalDocument;
use crate::errors::Result;
use crate::etl::parse_osm::{open_osm_reader, OsmReader};
use crate::shape::{corpus, element::ElementTransformer};
use crate::UserConfig;

use super::{remove_if_exists, write_json_pretty, Etl};

pub const ETL_NAME: &str = "shape_osm";
pub const OUTPUT_FILE_NAME: &str = "documents.json";

/// Shapes every node and way of the .osm file and exports them as a JSON array.
pub struct ShapeOsmEtl<'a> {
    config: &'a UserConfig,
    transformer: ElementTransformer,
}

impl ShapeOsmEtl<'_> {
    fn output_path(dir: &Path) -> PathBuf {
        dir.join(OUTPUT_FILE_NAME)
    }

    pub fn new(config: &UserConfig) -> Result<ShapeOsmEtl> {
        Ok(ShapeOsmEtl {
            config,
            transformer: ElementTransformer::new(&config.shape)?,
        })
    }
}

impl Etl for ShapeOsmEtl<'_> {
    type Input = OsmReader<Box<dyn BufRead + Send>>;
    type Output = Vec<CanonicalDocument>;

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
        let documents = corpus::build(input, &self.transformer, self.config.batch_size)?;
        info!(etl_name = ETL_NAME, documents = documents.len(); "Shaped documents");
        Ok(documents)
    }

    fn load(&mut self, dir: &Path, output: Self::Output) -> Result<()> {
        write_json_pretty(&Self::output_path(dir), &output)
    }
}

/// Reads back a document export written by [`ShapeOsmEtl`].
pub fn read_documents(path: &Path) -> Result<Vec<CanonicalDocument>> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

pub fn documents_path(dir: &Path) -> PathBuf {
    ShapeOsmEtl::output_path(dir)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<osm version="0.6">
  <bounds minlat="30.7" minlon="120.85" maxlat="31.87" maxlon="122.2"/>
  <node id="1" lat="31.2304" lon="121.4737" version="2" changeset="10" timestamp="2012-01-01T00:00:00Z" user="alice" uid="7">
    <tag k="name" v="上海大学 Shanghai University"/>
    <tag k="name:en" v="Shanghai Univ"/>
    <tag k="amenity" v="university"/>
    <tag k="postal_code" v="200444 上海"/>
  </node>
  <node id="2" lat="31.1" lon="121.2" version="1" user="bob" uid="8">
    <tag k="addr:street" v="中山路 Zhongshan Rd"/>
    <tag k="addr:street:en" v="Zhongshan Rd"/>
    <tag k="addr:city" v="上海"/>
    <tag k="addr:postcode" v="2000"/>
  </node>
  <way id="3" version="4" user="alice" uid="7">
    <nd ref="1"/>
    <nd ref="2"/>
    <tag k="highway" v="residential"/>
  </way>
  <relation id="4"><member type="way" ref="3" role="outer"/></relation>
</osm>"#;

    fn config(dir: &Path) -> UserConfig {
        let data_path = dir.join("sample.osm");
        fs::write(&data_path, SAMPLE).unwrap();
        UserConfig {
            data_path: data_path.to_string_lossy().into_owned(),
            dest_path: dir.to_string_lossy().into_owned(),
            ..Default::default()
        }
    }

    #[test]
    fn test_process_writes_documents() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        let mut etl = ShapeOsmEtl::new(&config).unwrap();
        etl.process(dir.path()).unwrap();
        assert!(etl.is_cached(dir.path()).unwrap());

        let documents = read_documents(&documents_path(dir.path())).unwrap();
        assert_eq!(documents.len(), 3);
        assert_eq!(documents[0].display_name(), Some("Shanghai University"));
        assert_eq!(documents[0].field("postal_code"), Some("200444"));
        assert_eq!(documents[0].created["user"], "alice");
        assert_eq!(documents[1].field("addr:postcode"), None);
        let street = documents[1].address.as_ref().unwrap().street.as_ref().unwrap();
        assert_eq!(street.name, "Zhongshan Road");
        assert_eq!(street.zh.as_deref(), Some("中山路"));
        assert_eq!(documents[2].node_refs, Some(vec!["1".to_string(), "2".to_string()]));
    }

    #[test]
    fn test_export_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        let mut etl = ShapeOsmEtl::new(&config).unwrap();
        let input = etl.extract(dir.path()).unwrap();
        let documents = etl.transform(input).unwrap();
        etl.load(dir.path(), documents.clone()).unwrap();

        let exported = fs::read_to_string(documents_path(dir.path())).unwrap();
        assert!(exported.starts_with("[\n    {"));
        assert_eq!(read_documents(&documents_path(dir.path())).unwrap(), documents);
    }

    #[test]
    fn test_colliding_tags_survive_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let data_path = dir.path().join("colliding.osm");
        fs::write(&data_path, r#"<osm>
  <node id="1" lat="nan" lon="inf" user="alice">
    <tag k="addr:street" v="中山路 Zhongshan Rd"/>
    <tag k="addr:street:en" v="Zhongshan Rd"/>
    <tag k="addr:street:name" v="X"/>
    <tag k="addr:street:street" v="Y"/>
    <tag k="name:zh" v="中山路"/>
    <tag k="name:name" v="Z"/>
  </node>
</osm>"#).unwrap();
        let config = UserConfig {
            data_path: data_path.to_string_lossy().into_owned(),
            ..Default::default()
        };
        let mut etl = ShapeOsmEtl::new(&config).unwrap();
        let input = etl.extract(dir.path()).unwrap();
        let documents = etl.transform(input).unwrap();
        etl.load(dir.path(), documents.clone()).unwrap();

        let back = read_documents(&documents_path(dir.path())).unwrap();
        assert_eq!(back, documents);
        assert_eq!(back[0].pos, None);
        let street = back[0].address.as_ref().unwrap().street.as_ref().unwrap();
        assert_eq!(street.name, "Zhongshan Road");
        assert_eq!(street.zh.as_deref(), Some("中山路"));
        assert!(street.variants.is_empty());
        assert_eq!(back[0].display_name(), None);
    }

    #[test]
    fn test_clean_removes_output() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        let mut etl = ShapeOsmEtl::new(&config).unwrap();
        etl.clean(dir.path()).unwrap();
        etl.process(dir.path()).unwrap();
        etl.clean(dir.path()).unwrap();
        assert!(!etl.is_cached(dir.path()).unwrap());
    }

    #[test]
    fn test_missing_input_fails() {
        let dir = tempfile::tempdir().unwrap();
        let config = UserConfig {
            data_path: dir.path().join("missing.osm").to_string_lossy().into_owned(),
            ..Default::default()
        };
        let mut etl = ShapeOsmEtl::new(&config).unwrap();
        assert!(etl.process(dir.path()).is_err());
        assert!(!etl.is_cached(dir.path()).unwrap());
    }
}
