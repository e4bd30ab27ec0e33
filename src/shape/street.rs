use std::collections::HashMap;

use regex::Regex;

use crate::errors::Result;

/// Rewrites the trailing street type of a street name ("Rd" -> "Road").
pub struct StreetNormalizer {
    street_type: Regex,
    mapping: HashMap<String, String>,
}

impl StreetNormalizer {
    pub fn new(mapping: HashMap<String, String>) -> Result<StreetNormalizer> {
        Ok(StreetNormalizer {
            street_type: Regex::new(r"\b\S+\.?$")?,
            mapping,
        })
    }

    /// Trailing whitespace-delimited token of `name`, if any.
    pub fn street_type<'a>(&self, name: &'a str) -> Option<&'a str> {
        self.street_type.find(name).map(|m| m.as_str())
    }

    /// Replaces the street type when it is a known abbreviation or misspelling.
    /// Unknown street types are left as they are.
    pub fn normalize(&self, name: &str) -> String {
        let Some(m) = self.street_type.find(name) else {
            return name.to_string();
        };
        match self.mapping.get(m.as_str()) {
            Some(canonical) => format!("{}{}", &name[..m.start()], canonical),
            None => name.to_string(),
        }
    }
}
