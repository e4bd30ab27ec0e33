use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::data::osm::{ElementKind, RawElement};
use crate::shape::classify::{is_postal_code_key, KeyShape, TagClassifier};
use crate::shape::street::StreetNormalizer;

/// Anomalies found in the raw data. Nothing here is fixed, it only feeds the
/// suffix mapping and the postal code rule.

#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
pub struct AuditReport {
    /// Unexpected street types, with the street names they were seen in.
    pub street_types: BTreeMap<String, BTreeSet<String>>,
    /// Postal codes that aren't exactly six ASCII digits.
    pub non_compliant_codes: BTreeSet<String>,
    pub key_shapes: KeyShapeCounts,
}

#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq, Eq)]
pub struct KeyShapeCounts {
    pub lower: usize,
    pub lower_colon: usize,
    pub problemchars: usize,
    pub other: usize,
}

impl KeyShapeCounts {
    pub fn record(&mut self, shape: KeyShape) {
        match shape {
            KeyShape::Plain => self.lower += 1,
            KeyShape::Namespaced => self.lower_colon += 1,
            KeyShape::Problematic => self.problemchars += 1,
            KeyShape::Other => self.other += 1,
        }
    }
}

pub fn audit_street_type(
    street_types: &mut BTreeMap<String, BTreeSet<String>>,
    street_name: &str,
    normalizer: &StreetNormalizer,
    expected: &[String],
) {
    if let Some(street_type) = normalizer.street_type(street_name) {
        if !expected.iter().any(|known| known == street_type) {
            street_types.entry(street_type.to_string())
                .or_default()
                .insert(street_name.to_string());
        }
    }
}

pub fn audit_postal_code(codes: &mut BTreeSet<String>, code: &str) {
    if code.len() != 6 || !code.bytes().all(|b| b.is_ascii_digit()) {
        codes.insert(code.to_string());
    }
}

pub struct Auditor<'a> {
    classifier: &'a TagClassifier,
    normalizer: &'a StreetNormalizer,
    expected_street_types: &'a [String],
    report: AuditReport,
}

impl<'a> Auditor<'a> {
    pub fn new(
        classifier: &'a TagClassifier,
        normalizer: &'a StreetNormalizer,
        expected_street_types: &'a [String],
    ) -> Auditor<'a> {
        Auditor {
            classifier,
            normalizer,
            expected_street_types,
            report: AuditReport::default(),
        }
    }

    pub fn inspect(&mut self, element: &RawElement) {
        for tag in &element.tags {
            self.report.key_shapes.record(self.classifier.classify(&tag.key));
        }
        if !matches!(element.kind, ElementKind::Node | ElementKind::Way) {
            return;
        }
        for tag in &element.tags {
            if tag.key == "addr:street" {
                audit_street_type(
                    &mut self.report.street_types,
                    &tag.value,
                    self.normalizer,
                    self.expected_street_types,
                );
            }
            if is_postal_code_key(&tag.key) {
                audit_postal_code(&mut self.report.non_compliant_codes, &tag.value);
            }
        }
    }

    pub fn finish(self) -> AuditReport {
        self.report
    }
}
