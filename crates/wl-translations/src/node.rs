//! Raw and validated translation trees
//!
//! JSON is first read into a permissive [`RawNode`] tree that accepts every
//! value kind and remembers repeated sibling keys, so that validation can
//! report each violation with the key path where it occurred.

use crate::error::{SchemaError, TranslationResult};
use indexmap::IndexMap;
use serde::de::{self, Deserialize, Deserializer, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;
use std::str::FromStr;

/// Ordered list of keys addressing an entry, displayed dotted
/// (e.g. `entity.sensor.wind_direction.state.n`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyPath(Vec<String>);

impl KeyPath {
    /// The empty path, addressing the document root
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Build a path from segments
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    /// Extend this path by one key
    pub fn child(&self, key: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(key.into());
        Self(segments)
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn first(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    pub fn last(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromStr for KeyPath {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl From<&str> for KeyPath {
    fn from(s: &str) -> Self {
        Self(
            s.split('.')
                .filter(|segment| !segment.is_empty())
                .map(String::from)
                .collect(),
        )
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("<root>");
        }
        f.write_str(&self.0.join("."))
    }
}

/// Unvalidated JSON tree
#[derive(Debug)]
pub(crate) enum RawNode {
    Text(String),
    Map {
        entries: IndexMap<String, RawNode>,
        /// Keys seen more than once, in order of their repeat
        duplicates: Vec<String>,
    },
    /// Any other JSON value; holds its kind for error reporting
    Other(&'static str),
}

impl<'de> Deserialize<'de> for RawNode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(RawNodeVisitor)
    }
}

struct RawNodeVisitor;

impl<'de> Visitor<'de> for RawNodeVisitor {
    type Value = RawNode;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a translation string or mapping")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<RawNode, E> {
        Ok(RawNode::Text(v.to_owned()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<RawNode, E> {
        Ok(RawNode::Text(v))
    }

    fn visit_bool<E: de::Error>(self, _: bool) -> Result<RawNode, E> {
        Ok(RawNode::Other("boolean"))
    }

    fn visit_i64<E: de::Error>(self, _: i64) -> Result<RawNode, E> {
        Ok(RawNode::Other("number"))
    }

    fn visit_u64<E: de::Error>(self, _: u64) -> Result<RawNode, E> {
        Ok(RawNode::Other("number"))
    }

    fn visit_f64<E: de::Error>(self, _: f64) -> Result<RawNode, E> {
        Ok(RawNode::Other("number"))
    }

    fn visit_unit<E: de::Error>(self) -> Result<RawNode, E> {
        Ok(RawNode::Other("null"))
    }

    fn visit_none<E: de::Error>(self) -> Result<RawNode, E> {
        Ok(RawNode::Other("null"))
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<RawNode, A::Error>
    where
        A: SeqAccess<'de>,
    {
        while seq.next_element::<IgnoredAny>()?.is_some() {}
        Ok(RawNode::Other("array"))
    }

    fn visit_map<A>(self, mut map: A) -> Result<RawNode, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut entries = IndexMap::new();
        let mut duplicates = Vec::new();

        while let Some(key) = map.next_key::<String>()? {
            let value = map.next_value::<RawNode>()?;
            if entries.contains_key(&key) {
                duplicates.push(key);
            } else {
                entries.insert(key, value);
            }
        }

        Ok(RawNode::Map {
            entries,
            duplicates,
        })
    }
}

/// Validated translation tree: every leaf is a non-empty string
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Text(String),
    Branch(IndexMap<String, Node>),
}

impl Node {
    /// Parse and validate a JSON document into a tree
    pub fn from_slice(bytes: &[u8]) -> TranslationResult<Self> {
        let raw: RawNode = serde_json::from_slice(bytes)?;
        Ok(Self::from_raw(raw, &KeyPath::root())?)
    }

    pub(crate) fn from_raw(raw: RawNode, path: &KeyPath) -> Result<Self, SchemaError> {
        match raw {
            RawNode::Text(text) => {
                if text.trim().is_empty() {
                    return Err(SchemaError::EmptyText { path: path.clone() });
                }
                Ok(Node::Text(text))
            }
            RawNode::Map {
                entries,
                duplicates,
            } => {
                if let Some(key) = duplicates.into_iter().next() {
                    return Err(SchemaError::DuplicateKey {
                        path: path.clone(),
                        key,
                    });
                }

                let mut children = IndexMap::with_capacity(entries.len());
                for (key, value) in entries {
                    let child = Node::from_raw(value, &path.child(key.as_str()))?;
                    children.insert(key, child);
                }
                Ok(Node::Branch(children))
            }
            RawNode::Other(found) => Err(SchemaError::UnexpectedValue {
                path: path.clone(),
                found,
            }),
        }
    }

    /// Short name of the node kind, used in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Node::Text(_) => "string",
            Node::Branch(_) => "mapping",
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Node::Text(text) => Some(text),
            Node::Branch(_) => None,
        }
    }

    pub fn as_branch(&self) -> Option<&IndexMap<String, Node>> {
        match self {
            Node::Branch(children) => Some(children),
            Node::Text(_) => None,
        }
    }

    /// Direct child by key
    pub fn child(&self, key: &str) -> Option<&Node> {
        self.as_branch()?.get(key)
    }

    /// Walk a path of keys from this node
    pub fn get<S: AsRef<str>>(&self, path: &[S]) -> Option<&Node> {
        let mut current = self;
        for key in path {
            current = current.child(key.as_ref())?;
        }
        Some(current)
    }

    /// Visit every leaf in document order
    pub fn for_each_leaf<'a, F>(&'a self, prefix: &KeyPath, visit: &mut F)
    where
        F: FnMut(&KeyPath, &'a str),
    {
        match self {
            Node::Text(text) => visit(prefix, text),
            Node::Branch(children) => {
                for (key, child) in children {
                    child.for_each_leaf(&prefix.child(key.as_str()), visit);
                }
            }
        }
    }

    /// All leaves with their paths, in document order
    pub fn leaves(&self) -> Vec<(KeyPath, &str)> {
        let mut leaves = Vec::new();
        self.for_each_leaf(&KeyPath::root(), &mut |path, text| {
            leaves.push((path.clone(), text));
        });
        leaves
    }

    pub fn leaf_count(&self) -> usize {
        match self {
            Node::Text(_) => 1,
            Node::Branch(children) => children.values().map(Node::leaf_count).sum(),
        }
    }
}

impl FromStr for Node {
    type Err = crate::error::TranslationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_slice(s.as_bytes())
    }
}

impl Serialize for Node {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Node::Text(text) => serializer.serialize_str(text),
            Node::Branch(children) => {
                let mut map = serializer.serialize_map(Some(children.len()))?;
                for (key, child) in children {
                    map.serialize_entry(key, child)?;
                }
                map.end()
            }
        }
    }
}
