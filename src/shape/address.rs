use std::collections::BTreeMap;

use log::debug;

use crate::data::{document::{Address, StreetValue}, AddressFields};

use super::street::StreetNormalizer;

const STREET: &str = "street";
const STREET_PREFIX: &str = "street:";

/// Variant labels that would collide with the primary value or the resolved name.
const RESERVED_LABELS: [&str; 2] = [STREET, "name"];

fn is_street_key(key: &str) -> bool {
    key == STREET || key.starts_with(STREET_PREFIX)
}

/// Chinese part of a bilingual street value such as `"中山路 Zhongshan Road"`.
/// The character right before the English part is taken to be a separator.
fn chinese_part(raw_name: &str, english: &str) -> String {
    match raw_name.find(english) {
        Some(idx) if idx > 0 => {
            let before = &raw_name[..idx];
            let without_separator = before.char_indices()
                .last()
                .map_or(before, |(last, _)| &before[..last]);
            without_separator.trim_end().to_string()
        },
        _ => raw_name.to_string(),
    }
}

fn build_street(raw_name: Option<String>, mut variants: BTreeMap<String, String>) -> Option<StreetValue> {
    let en = variants.remove("en");
    let mut zh = variants.remove("zh");

    let name = match (raw_name, &en) {
        (Some(raw_name), Some(english)) => {
            zh = Some(chinese_part(&raw_name, english));
            english.clone()
        },
        (Some(raw_name), None) => raw_name,
        (None, Some(english)) => english.clone(),
        (None, None) => match &zh {
            Some(zh) => zh.clone(),
            None => variants.values().next()?.clone(),
        },
    };

    Some(StreetValue {
        name,
        zh,
        en,
        variants,
    })
}

/// Folds the `street` and `street:<variant>` fields into a nested street value.
pub fn compose(fields: AddressFields, normalizer: &StreetNormalizer) -> Address {
    let (street_fields, fields): (AddressFields, AddressFields) = fields.into_iter()
        .partition(|(key, _)| is_street_key(key));

    let mut raw_name: Option<String> = None;
    let mut variants: BTreeMap<String, String> = BTreeMap::new();
    for (key, value) in street_fields {
        if value.is_empty() {
            continue;
        }
        match key.strip_prefix(STREET_PREFIX) {
            None => raw_name = Some(value),
            Some(label) if RESERVED_LABELS.contains(&label) => {
                debug!(key = key.as_str(); "Dropping street variant shadowing a street field");
            },
            Some(label) => {
                variants.insert(label.to_string(), value);
            },
        }
    }

    let street = build_street(raw_name, variants).map(|mut street| {
        street.name = normalizer.normalize(&street.name);
        street
    });

    Address {
        street,
        fields,
    }
}
