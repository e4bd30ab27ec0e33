use log::debug;

use crate::data::{document::CanonicalDocument, osm::{ElementKind, RawElement}, AddressFields, NameVariants};
use crate::errors::Result;

use super::{address, classify::{self, KeyShape, TagClassifier}, names, street::StreetNormalizer, ShapeConfig};

/// Turns raw nodes and ways into canonical documents.
///
/// Holds only immutable tables, so one transformer can be shared between threads.
pub struct ElementTransformer {
    classifier: TagClassifier,
    normalizer: StreetNormalizer,
    created_keys: Vec<String>,
}

impl ElementTransformer {
    pub fn new(config: &ShapeConfig) -> Result<ElementTransformer> {
        Ok(ElementTransformer {
            classifier: TagClassifier::new()?,
            normalizer: StreetNormalizer::new(config.street_suffix_mapping.clone())?,
            created_keys: config.created_keys.clone(),
        })
    }

    fn shape_attributes(&self, element: &RawElement, doc: &mut CanonicalDocument) {
        let mut lat: Option<&str> = None;
        let mut lon: Option<&str> = None;

        for (key, value) in &element.attributes {
            if self.created_keys.iter().any(|created| created == key) {
                doc.created.insert(key.clone(), value.clone());
            } else if key == "lat" {
                lat = Some(value);
            } else if key == "lon" {
                lon = Some(value);
            } else if !doc.set_field(key, value) {
                debug!(attribute = key.as_str(); "Dropping attribute shadowing a document field");
            }
        }

        if let (Some(lat), Some(lon)) = (lat, lon) {
            match (lat.trim().parse::<f64>(), lon.trim().parse::<f64>()) {
                (Ok(lat), Ok(lon)) if lat.is_finite() && lon.is_finite() => doc.pos = Some([lat, lon]),
                _ => debug!(lat = lat, lon = lon; "Ignoring non-numeric coordinates"),
            }
        }
    }

    fn shape_tags(&self, element: &RawElement, doc: &mut CanonicalDocument) -> (NameVariants, AddressFields) {
        let mut name_variants = NameVariants::new();
        let mut address_fields = AddressFields::new();

        for tag in &element.tags {
            let key = tag.key.as_str();
            if classify::is_postal_code_key(key) {
                match classify::valid_postal_code(&tag.value) {
                    Some(code) => {
                        doc.set_field(key, &code);
                    },
                    None => debug!(key = key, value = tag.value.as_str(); "Dropping invalid postal code"),
                }
            } else if let Some(label) = self.classifier.name_label(key) {
                if label == names::RESOLVED {
                    debug!(key = key; "Dropping name variant shadowing the resolved name");
                } else {
                    name_variants.insert(label.to_string(), tag.value.clone());
                }
            } else if let Some(sub_key) = self.classifier.address_sub_key(key) {
                address_fields.insert(sub_key.to_string(), tag.value.clone());
            } else if self.classifier.classify(key) != KeyShape::Problematic
                && key.matches(':').count() <= 1 {
                if !doc.set_field(key, &tag.value) {
                    debug!(key = key; "Dropping tag shadowing a document field");
                }
            } else {
                debug!(key = key; "Dropping tag with unsupported key");
            }
        }

        (name_variants, address_fields)
    }

    /// Canonical document for a node or way. Any other element kind yields `None`.
    pub fn transform(&self, element: &RawElement) -> Option<CanonicalDocument> {
        match element.kind {
            ElementKind::Node | ElementKind::Way => (),
            _ => return None,
        }

        let mut doc = CanonicalDocument::new(element.kind.as_str());
        self.shape_attributes(element, &mut doc);

        if !element.node_refs.is_empty() {
            doc.node_refs = Some(element.node_refs.clone());
        }

        let (name_variants, address_fields) = self.shape_tags(element, &mut doc);
        if !name_variants.is_empty() {
            doc.name = Some(names::with_resolved_name(name_variants));
        }
        if !address_fields.is_empty() {
            doc.address = Some(address::compose(address_fields, &self.normalizer));
        }

        Some(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::osm::Tag;

    fn transformer() -> ElementTransformer {
        ElementTransformer::new(&ShapeConfig::default()).unwrap()
    }

    fn node(attributes: &[(&str, &str)], tags: &[(&str, &str)]) -> RawElement {
        let mut element = RawElement::new(ElementKind::Node);
        element.attributes = attributes.iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        element.tags = tags.iter().map(|(key, value)| Tag::new(key, value)).collect();
        element
    }

    const META: [(&str, &str); 8] = [
        ("id", "261114295"),
        ("visible", "true"),
        ("version", "7"),
        ("changeset", "11129782"),
        ("timestamp", "2012-03-28T18:31:23Z"),
        ("user", "bigfatfrog67"),
        ("uid", "234872"),
        ("lat", "31.2304"),
    ];

    #[test]
    fn test_other_kinds_are_absent() {
        let transformer = transformer();
        assert!(transformer.transform(&RawElement::new(ElementKind::Relation)).is_none());
        assert!(transformer.transform(&RawElement::new(ElementKind::Other("bounds".to_string()))).is_none());
    }

    #[test]
    fn test_attributes() {
        let mut attributes = META.to_vec();
        attributes.push(("lon", "121.4737"));
        let doc = transformer().transform(&node(&attributes, &[])).unwrap();

        assert_eq!(doc.kind, "node");
        assert_eq!(doc.pos, Some([31.2304, 121.4737]));
        assert_eq!(doc.field("id"), Some("261114295"));
        assert_eq!(doc.field("visible"), Some("true"));
        assert_eq!(doc.field("lat"), None);
        assert_eq!(doc.created.len(), 5);
        assert_eq!(doc.created["user"], "bigfatfrog67");
        assert_eq!(doc.created["timestamp"], "2012-03-28T18:31:23Z");
        assert_eq!(doc.node_refs, None);
    }

    #[test]
    fn test_missing_or_bad_coordinates() {
        let doc = transformer().transform(&node(&META, &[])).unwrap();
        assert_eq!(doc.pos, None);

        let doc = transformer().transform(&node(&[("lat", "north"), ("lon", "121.4")], &[])).unwrap();
        assert_eq!(doc.pos, None);
        assert!(doc.created.is_empty());
    }

    #[test]
    fn test_non_finite_coordinates() {
        for (lat, lon) in [("nan", "121.4"), ("31.2", "inf"), ("NaN", "-infinity")] {
            let doc = transformer().transform(&node(&[("lat", lat), ("lon", lon)], &[])).unwrap();
            assert_eq!(doc.pos, None);
            let json = serde_json::to_string(&doc).unwrap();
            assert_eq!(serde_json::from_str::<CanonicalDocument>(&json).unwrap(), doc);
        }
    }

    #[test]
    fn test_name_variant_named_name_is_dropped() {
        let doc = transformer().transform(&node(&[], &[
            ("name", "人民路"),
            ("name:en", "Renmin Road"),
            ("name:name", "X"),
        ])).unwrap();
        assert_eq!(doc.display_name(), Some("Renmin Road"));

        let doc = transformer().transform(&node(&[], &[("name:zh", "静安寺"), ("name:name", "X")])).unwrap();
        let name = doc.name.unwrap();
        assert!(!name.contains_key("name"));
        assert_eq!(name["zh"], "静安寺");
    }

    #[test]
    fn test_way_node_refs() {
        let mut way = RawElement::new(ElementKind::Way);
        way.attributes.push(("id".to_string(), "5".to_string()));
        way.node_refs = vec!["3".to_string(), "1".to_string(), "2".to_string()];
        let doc = transformer().transform(&way).unwrap();
        assert_eq!(doc.kind, "way");
        assert_eq!(doc.node_refs, Some(vec!["3".to_string(), "1".to_string(), "2".to_string()]));
        assert_eq!(doc.pos, None);
    }

    #[test]
    fn test_postal_codes() {
        let doc = transformer().transform(&node(&[], &[
            ("postal_code", "201315 上海"),
            ("addr:postcode", "200032 "),
        ])).unwrap();
        assert_eq!(doc.field("postal_code"), Some("201315"));
        assert_eq!(doc.field("addr:postcode"), Some("200032"));
        assert_eq!(doc.address, None);

        let doc = transformer().transform(&node(&[], &[("postal_code", "20032")])).unwrap();
        assert_eq!(doc.field("postal_code"), None);
    }

    #[test]
    fn test_names() {
        let doc = transformer().transform(&node(&[], &[
            ("name", "上海大学 Shanghai University"),
            ("name:en", "Shanghai Univ"),
            ("name:zh", "上海大学"),
        ])).unwrap();
        assert_eq!(doc.display_name(), Some("Shanghai University"));
        let name = doc.name.unwrap();
        assert_eq!(name["en"], "Shanghai Univ");
        assert_eq!(name["zh"], "上海大学");
        assert_eq!(name[""], "上海大学 Shanghai University");
    }

    #[test]
    fn test_address() {
        let doc = transformer().transform(&node(&[], &[
            ("addr:street", "中山路 Zhongshan Rd"),
            ("addr:street:en", "Zhongshan Rd"),
            ("addr:housenumber", "100"),
            ("addr:city", "上海"),
        ])).unwrap();
        let address = doc.address.unwrap();
        let street = address.street.unwrap();
        assert_eq!(street.name, "Zhongshan Road");
        assert_eq!(street.zh.as_deref(), Some("中山路"));
        assert_eq!(street.en.as_deref(), Some("Zhongshan Rd"));
        assert_eq!(address.fields["housenumber"], "100");
        assert_eq!(address.fields["city"], "上海");
    }

    #[test]
    fn test_pass_through_and_dropped_tags() {
        let doc = transformer().transform(&node(&[("id", "1")], &[
            ("amenity", "restaurant"),
            ("cuisine", "chinese"),
            ("building:levels", "3"),
            ("ISO3166-1", "CN"),
            ("old_name:en", "Avenue Joffre"),
            ("fixme name", "?"),
            ("contact:web.site", "example.org"),
            ("seamark:light:colour", "red"),
            ("type", "multipolygon"),
        ])).unwrap();
        assert_eq!(doc.field("amenity"), Some("restaurant"));
        assert_eq!(doc.field("cuisine"), Some("chinese"));
        assert_eq!(doc.field("building:levels"), Some("3"));
        assert_eq!(doc.field("ISO3166-1"), Some("CN"));
        assert_eq!(doc.field("old_name:en"), Some("Avenue Joffre"));
        assert_eq!(doc.field("fixme name"), None);
        assert_eq!(doc.field("contact:web.site"), None);
        assert_eq!(doc.field("seamark:light:colour"), None);
        assert_eq!(doc.kind, "node");
        assert_eq!(doc.name, None);
    }

    #[test]
    fn test_transform_is_idempotent() {
        let mut attributes = META.to_vec();
        attributes.push(("lon", "121.4737"));
        let element = node(&attributes, &[
            ("name", "人民广场 People's Square"),
            ("name:en", "People's Sq"),
            ("addr:street", "西藏中路 Middle Xizang Rd"),
            ("addr:street:en", "Middle Xizang Rd"),
            ("postal_code", "200001"),
            ("amenity", "park"),
        ]);
        let transformer = transformer();
        let first = serde_json::to_string(&transformer.transform(&element).unwrap()).unwrap();
        let second = serde_json::to_string(&transformer.transform(&element).unwrap()).unwrap();
        assert_eq!(first, second);
    }
}
