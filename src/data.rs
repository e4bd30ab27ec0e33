use std::collections::BTreeMap;

pub mod document;
pub mod osm;

/// Name variants keyed by label. The primary `name` tag is stored under `""`,
/// `name:<variant>` under `<variant>`.
pub type NameVariants = BTreeMap<String, String>;

/// Address fields keyed by the part of the key after `addr:`.
pub type AddressFields = BTreeMap<String, String>;
