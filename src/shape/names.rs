use crate::data::NameVariants;

pub const PRIMARY: &str = "";
pub const ENGLISH: &str = "en";
/// Label under which the resolved display name is stored.
pub const RESOLVED: &str = "name";

/// Picks the display name for an element, preferring English.
///
/// The primary name in this extract is often bilingual (`"上海大学 Shanghai University"`),
/// so the part after the first space competes with the `name:en` tag and the longer
/// one wins. A primary name without a space is assumed to be Chinese only.
pub fn reconcile(variants: &NameVariants) -> Option<String> {
    let primary = variants.get(PRIMARY);
    let Some(english) = variants.get(ENGLISH) else {
        return primary.cloned();
    };
    let Some(primary) = primary else {
        return Some(english.clone());
    };
    match primary.split_once(' ') {
        Some((_, alternate)) if alternate.chars().count() > english.chars().count() => {
            Some(alternate.to_string())
        },
        _ => Some(english.clone()),
    }
}

/// Variants with the resolved name stored under `name`.
pub fn with_resolved_name(mut variants: NameVariants) -> NameVariants {
    if let Some(name) = reconcile(&variants) {
        variants.insert(RESOLVED.to_string(), name);
    }
    variants
}
