pub mod address;
pub mod classify;
pub mod corpus;
pub mod element;
pub mod names;
pub mod street;

use std::collections::HashMap;

use serde::Deserialize;

/// Fixed tables driving the cleaning rules. The defaults were derived from an
/// audit of the Shanghai extract; any of them can be replaced from the config file.

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ShapeConfig {
    pub street_suffix_mapping: HashMap<String, String>,
    pub created_keys: Vec<String>,
    pub expected_street_types: Vec<String>,
}

pub const DEFAULT_CREATED_KEYS: [&str; 5] = ["version", "changeset", "timestamp", "user", "uid"];

pub const DEFAULT_EXPECTED_STREET_TYPES: [&str; 12] = [
    "Street", "Avenue", "Boulevard", "Drive", "Court", "Place", "Square", "Lane", "Road",
    "Trail", "Parkway", "Commons",
];

pub const DEFAULT_STREET_SUFFIX_MAPPING: [(&str, &str); 13] = [
    ("St", "Street"),
    ("St.", "Street"),
    ("Ave", "Avenue"),
    ("Ave.", "Avenue"),
    ("Rd", "Road"),
    ("Rd.", "Road"),
    // pinyin of 路
    ("Lu", "Road"),
    ("Raod", "Road"),
    ("Road)", "Road"),
    ("Roaf", "Road"),
    ("Rode", "Road"),
    ("road(west)", "Road West"),
    // pinyin of 东
    ("Dong", "East"),
];

impl Default for ShapeConfig {
    fn default() -> Self {
        ShapeConfig {
            street_suffix_mapping: DEFAULT_STREET_SUFFIX_MAPPING.iter()
                .map(|(abbreviation, canonical)| (abbreviation.to_string(), canonical.to_string()))
                .collect(),
            created_keys: DEFAULT_CREATED_KEYS.iter().map(|key| key.to_string()).collect(),
            expected_street_types: DEFAULT_EXPECTED_STREET_TYPES.iter()
                .map(|street_type| street_type.to_string())
                .collect(),
        }
    }
}
