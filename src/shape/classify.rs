use regex::Regex;

use crate::errors::Result;

/// Structural shape of a tag key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyShape {
    /// Lowercase letters and underscores only, e.g. `highway`.
    Plain,
    /// Two plain parts joined by one colon, e.g. `addr:city`.
    Namespaced,
    /// Contains characters that can't be used as a document key.
    Problematic,
    Other,
}

pub struct TagClassifier {
    lower: Regex,
    lower_colon: Regex,
    problem_chars: Regex,
    address_key: Regex,
}

impl TagClassifier {
    pub fn new() -> Result<TagClassifier> {
        Ok(TagClassifier {
            lower: Regex::new(r"^[a-z_]*$")?,
            lower_colon: Regex::new(r"^[a-z_]*:[a-z_]*$")?,
            problem_chars: Regex::new(r#"[=+/&<>;'"?%#$@,. \t\r\n]"#)?,
            address_key: Regex::new(r"^addr(:[a-z_]+)+$")?,
        })
    }

    pub fn classify(&self, key: &str) -> KeyShape {
        if self.lower.is_match(key) {
            KeyShape::Plain
        } else if self.lower_colon.is_match(key) {
            KeyShape::Namespaced
        } else if self.problem_chars.is_match(key) {
            KeyShape::Problematic
        } else {
            KeyShape::Other
        }
    }

    /// Sub-key of an `addr:` tag. Unlike other namespaces, the address namespace
    /// may nest (`addr:street:en`).
    pub fn address_sub_key<'a>(&self, key: &'a str) -> Option<&'a str> {
        if self.address_key.is_match(key) {
            key.strip_prefix("addr:")
        } else {
            None
        }
    }

    /// Label of a name variant: `""` for the primary `name` tag, `<variant>` for `name:<variant>`.
    pub fn name_label<'a>(&self, key: &'a str) -> Option<&'a str> {
        if key == "name" {
            return Some("");
        }
        if self.classify(key) != KeyShape::Namespaced {
            return None;
        }
        key.strip_prefix("name:").filter(|label| !label.is_empty())
    }
}

pub fn is_postal_code_key(key: &str) -> bool {
    key == "postal_code" || key == "addr:postcode"
}

/// Mainland China postal codes are six digits. A trailing annotation is tolerated
/// when separated by a space (`"201315 上海"`), anything else is rejected.
pub fn valid_postal_code(value: &str) -> Option<String> {
    let mut chars = value.chars();
    let code: String = chars.by_ref().take(6).collect();
    if code.chars().count() != 6 || !code.chars().all(|ch| ch.is_ascii_digit()) {
        return None;
    }
    match chars.next() {
        None | Some(' ') => Some(code),
        Some(_) => None,
    }
}
