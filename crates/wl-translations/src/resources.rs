//! Flattened translation resources
//!
//! The frontend consumes translations as flat `component.<domain>.<path>`
//! keys. Strings may reference shared text with
//! `[%key:common::config_flow::abort::already_configured_device%]`, which is
//! resolved against a common strings tree.

use crate::node::{KeyPath, Node};
use crate::schema::Namespace;
use crate::table::Translations;
use indexmap::IndexMap;
use serde_json::Value;

/// Resolve a key reference like `[%key:common::config_flow::abort::no_devices_found%]`
pub fn resolve_key_reference(reference: &str, common: &Node) -> Option<String> {
    // Reference format: [%key:path::to::value%]
    let inner = reference.strip_prefix("[%key:")?.strip_suffix("%]")?;

    let parts: Vec<&str> = inner.split("::").collect();
    if parts.iter().any(|part| part.is_empty()) {
        return None;
    }

    common.get(parts.as_slice())?.as_text().map(String::from)
}

/// Resolve a string that may be a key reference; unresolvable references are kept verbatim
fn resolve_string_value(value: &str, common: Option<&Node>) -> String {
    match common {
        Some(common) if value.starts_with("[%key:") && value.ends_with("%]") => {
            resolve_key_reference(value, common).unwrap_or_else(|| value.to_string())
        }
        _ => value.to_string(),
    }
}

/// Flatten nested strings into dot-notation keys
fn flatten_node(
    node: &Node,
    prefix: &str,
    common: Option<&Node>,
    output: &mut IndexMap<String, String>,
) {
    match node {
        Node::Branch(map) => {
            for (key, child) in map {
                flatten_node(child, &format!("{}.{}", prefix, key), common, output);
            }
        }
        Node::Text(text) => {
            output.insert(prefix.to_string(), resolve_string_value(text, common));
        }
    }
}

impl Translations {
    /// Flatten the table (or one namespace) into frontend resource keys
    ///
    /// ```ignore
    /// let flat = Translations::bundled().flatten("weatherlink", Some(Namespace::Selector));
    /// assert_eq!(flat["component.weatherlink.selector.set_api_ver.options.api_v1"], "API V1");
    /// ```
    pub fn flatten(&self, domain: &str, category: Option<Namespace>) -> IndexMap<String, String> {
        self.flatten_with_common(domain, category, None)
    }

    /// Like [`Translations::flatten`], resolving key references against `common`
    pub fn flatten_with_common(
        &self,
        domain: &str,
        category: Option<Namespace>,
        common: Option<&Node>,
    ) -> IndexMap<String, String> {
        let mut resources = IndexMap::new();

        match category {
            Some(namespace) => {
                if let Some(section) = self.root().child(namespace.as_str()) {
                    flatten_node(
                        section,
                        &format!("component.{}.{}", domain, namespace),
                        common,
                        &mut resources,
                    );
                }
            }
            None => flatten_node(
                self.root(),
                &format!("component.{}", domain),
                common,
                &mut resources,
            ),
        }

        resources
    }

    /// Resources in the shape returned to the frontend
    ///
    /// ```json
    /// {
    ///   "resources": {
    ///     "component.weatherlink.config.abort.already_configured": "Device is already configured",
    ///     ...
    ///   }
    /// }
    /// ```
    pub fn resources(
        &self,
        domain: &str,
        category: Option<Namespace>,
        common: Option<&Node>,
    ) -> Value {
        serde_json::json!({
            "resources": self.flatten_with_common(domain, category, common)
        })
    }

    /// Paths of strings that are unresolved key references
    pub fn unresolved_references(&self, common: &Node) -> Vec<KeyPath> {
        self.leaves()
            .into_iter()
            .filter(|(_, text)| {
                text.starts_with("[%key:")
                    && text.ends_with("%]")
                    && resolve_key_reference(text, common).is_none()
            })
            .map(|(path, _)| path)
            .collect()
    }
}
