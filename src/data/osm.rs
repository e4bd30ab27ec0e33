/// Map elements as they appear in the .osm file, before any cleaning.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementKind {
    Node,
    Way,
    Relation,
    Other(String),
}

impl ElementKind {
    pub fn from_name(name: &str) -> ElementKind {
        match name {
            "node" => ElementKind::Node,
            "way" => ElementKind::Way,
            "relation" => ElementKind::Relation,
            other => ElementKind::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ElementKind::Node => "node",
            ElementKind::Way => "way",
            ElementKind::Relation => "relation",
            ElementKind::Other(name) => name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub key: String,
    pub value: String,
}

impl Tag {
    pub fn new(key: &str, value: &str) -> Tag {
        Tag {
            key: key.to_string(),
            value: value.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawElement {
    pub kind: ElementKind,
    /// Attributes in document order.
    pub attributes: Vec<(String, String)>,
    /// `<nd ref=..>` children in document order. Only ways have them.
    pub node_refs: Vec<String>,
    pub tags: Vec<Tag>,
}

impl RawElement {
    pub fn new(kind: ElementKind) -> RawElement {
        RawElement {
            kind,
            attributes: Vec::new(),
            node_refs: Vec::new(),
            tags: Vec::new(),
        }
    }
}
