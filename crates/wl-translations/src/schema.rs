//! Typed descriptors for the translation namespaces
//!
//! The validated [`Node`] tree is converted into these structures once at
//! load time. Conversion rejects unknown fields and any leaf/mapping
//! confusion, so a table that loads is guaranteed to have the documented
//! shape.

use crate::error::SchemaError;
use crate::node::{KeyPath, Node};
use indexmap::IndexMap;
use std::fmt;
use std::str::FromStr;
use tracing::warn;

/// Mapping from a stable key to its display string
pub type Labels = IndexMap<String, String>;

/// Top-level partition of the key space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    Title,
    Config,
    Options,
    Entity,
    Selector,
    Services,
    Issues,
    Exceptions,
    DeviceAutomation,
    SystemHealth,
    ApplicationCredentials,
    Conversation,
    EntityComponent,
}

impl Namespace {
    pub const ALL: [Namespace; 13] = [
        Namespace::Title,
        Namespace::Config,
        Namespace::Options,
        Namespace::Entity,
        Namespace::Selector,
        Namespace::Services,
        Namespace::Issues,
        Namespace::Exceptions,
        Namespace::DeviceAutomation,
        Namespace::SystemHealth,
        Namespace::ApplicationCredentials,
        Namespace::Conversation,
        Namespace::EntityComponent,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Namespace::Title => "title",
            Namespace::Config => "config",
            Namespace::Options => "options",
            Namespace::Entity => "entity",
            Namespace::Selector => "selector",
            Namespace::Services => "services",
            Namespace::Issues => "issues",
            Namespace::Exceptions => "exceptions",
            Namespace::DeviceAutomation => "device_automation",
            Namespace::SystemHealth => "system_health",
            Namespace::ApplicationCredentials => "application_credentials",
            Namespace::Conversation => "conversation",
            Namespace::EntityComponent => "entity_component",
        }
    }
}

impl FromStr for Namespace {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Namespace::ALL
            .into_iter()
            .find(|ns| ns.as_str() == s)
            .ok_or_else(|| SchemaError::UnknownNamespace { key: s.to_string() })
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Entity platforms the integration provides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    BinarySensor,
    Sensor,
}

impl Platform {
    pub const ALL: [Platform; 2] = [Platform::BinarySensor, Platform::Sensor];

    pub fn as_str(self) -> &'static str {
        match self {
            Platform::BinarySensor => "binary_sensor",
            Platform::Sensor => "sensor",
        }
    }
}

impl FromStr for Platform {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Platform::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| SchemaError::UnknownPlatform {
                path: KeyPath::new([Namespace::Entity.as_str()]),
                platform: s.to_string(),
            })
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strings for a config or options flow
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlowStrings {
    pub step: IndexMap<String, ConfigStep>,
    pub error: Labels,
    pub abort: Labels,
    pub progress: Labels,
}

/// One step of a flow (e.g. `user`, `user_1`)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigStep {
    pub title: Option<String>,
    pub description: Option<String>,
    /// Field id -> label
    pub data: Labels,
    /// Field id -> helper text
    pub data_description: Labels,
    pub menu_options: Labels,
}

/// Display strings for one entity key, or one of its state attributes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityDescriptor {
    pub name: Option<String>,
    /// Raw state token -> display label
    pub state: Labels,
    pub state_attributes: IndexMap<String, EntityDescriptor>,
    pub unit_of_measurement: Option<String>,
}

/// Options of a user-facing choice control
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectorDescriptor {
    pub options: Labels,
}

/// Typed view of a whole table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    pub title: Option<String>,
    pub config: FlowStrings,
    pub options: FlowStrings,
    pub entity: IndexMap<Platform, IndexMap<String, EntityDescriptor>>,
    pub selector: IndexMap<String, SelectorDescriptor>,
}

impl Schema {
    /// Convert a validated tree, enforcing the namespace shapes
    pub fn from_node(root: &Node) -> Result<Self, SchemaError> {
        let root_path = KeyPath::root();
        let mut schema = Schema::default();

        for (key, node) in expect_branch(root, &root_path)? {
            let path = root_path.child(key.as_str());
            let Ok(namespace) = key.parse::<Namespace>() else {
                // Kept in the tree for the host; leaves were already checked
                warn!("Unrecognized top-level namespace '{}' kept as free-form strings", key);
                continue;
            };
            match namespace {
                Namespace::Title => schema.title = Some(expect_text(node, &path)?),
                Namespace::Config => schema.config = FlowStrings::from_node(node, &path)?,
                Namespace::Options => schema.options = FlowStrings::from_node(node, &path)?,
                Namespace::Entity => schema.entity = parse_platforms(node, &path)?,
                Namespace::Selector => schema.selector = parse_selectors(node, &path)?,
                // Free-form string trees; leaves were checked when the tree was built
                Namespace::Services
                | Namespace::Issues
                | Namespace::Exceptions
                | Namespace::DeviceAutomation
                | Namespace::SystemHealth
                | Namespace::ApplicationCredentials
                | Namespace::Conversation
                | Namespace::EntityComponent => {
                    expect_branch(node, &path)?;
                }
            }
        }

        Ok(schema)
    }

    pub fn entity(&self, platform: Platform, key: &str) -> Option<&EntityDescriptor> {
        self.entity.get(&platform)?.get(key)
    }
}

impl FlowStrings {
    fn from_node(node: &Node, path: &KeyPath) -> Result<Self, SchemaError> {
        let map = expect_branch(node, path)?;
        check_fields(map, path, &["step", "error", "abort", "progress"])?;

        let mut flow = FlowStrings::default();
        if let Some(steps) = map.get("step") {
            let steps_path = path.child("step");
            for (step_id, step) in expect_branch(steps, &steps_path)? {
                let step_path = steps_path.child(step_id.as_str());
                flow.step
                    .insert(step_id.clone(), ConfigStep::from_node(step, &step_path)?);
            }
        }
        flow.error = optional_labels(map, "error", path)?;
        flow.abort = optional_labels(map, "abort", path)?;
        flow.progress = optional_labels(map, "progress", path)?;
        Ok(flow)
    }
}

impl ConfigStep {
    fn from_node(node: &Node, path: &KeyPath) -> Result<Self, SchemaError> {
        let map = expect_branch(node, path)?;
        check_fields(
            map,
            path,
            &["title", "description", "data", "data_description", "menu_options"],
        )?;

        Ok(ConfigStep {
            title: optional_text(map, "title", path)?,
            description: optional_text(map, "description", path)?,
            data: optional_labels(map, "data", path)?,
            data_description: optional_labels(map, "data_description", path)?,
            menu_options: optional_labels(map, "menu_options", path)?,
        })
    }
}

impl EntityDescriptor {
    fn from_node(node: &Node, path: &KeyPath) -> Result<Self, SchemaError> {
        let map = expect_branch(node, path)?;
        check_fields(
            map,
            path,
            &["name", "state", "state_attributes", "unit_of_measurement"],
        )?;

        let state = optional_labels(map, "state", path)?;
        validate_state_tokens(&state, &path.child("state"))?;

        let mut state_attributes = IndexMap::new();
        if let Some(attributes) = map.get("state_attributes") {
            let attributes_path = path.child("state_attributes");
            for (attr, attr_node) in expect_branch(attributes, &attributes_path)? {
                let attr_path = attributes_path.child(attr.as_str());
                state_attributes.insert(attr.clone(), EntityDescriptor::from_node(attr_node, &attr_path)?);
            }
        }

        Ok(EntityDescriptor {
            name: optional_text(map, "name", path)?,
            state,
            state_attributes,
            unit_of_measurement: optional_text(map, "unit_of_measurement", path)?,
        })
    }

    /// Display label for a raw state token
    pub fn state_label(&self, token: &str) -> Option<&str> {
        self.state.get(token).map(String::as_str)
    }
}

impl SelectorDescriptor {
    fn from_node(node: &Node, path: &KeyPath) -> Result<Self, SchemaError> {
        let map = expect_branch(node, path)?;
        check_fields(map, path, &["options"])?;

        let options = map.get("options").ok_or_else(|| SchemaError::MissingField {
            path: path.clone(),
            field: "options",
        })?;

        Ok(SelectorDescriptor {
            options: labels(options, &path.child("options"))?,
        })
    }
}

fn parse_platforms(
    node: &Node,
    path: &KeyPath,
) -> Result<IndexMap<Platform, IndexMap<String, EntityDescriptor>>, SchemaError> {
    let mut platforms = IndexMap::new();

    for (platform_key, entities) in expect_branch(node, path)? {
        let platform_path = path.child(platform_key.as_str());
        let platform: Platform = platform_key.parse()?;

        let mut descriptors = IndexMap::new();
        for (entity_key, entity) in expect_branch(entities, &platform_path)? {
            let entity_path = platform_path.child(entity_key.as_str());
            descriptors.insert(
                entity_key.clone(),
                EntityDescriptor::from_node(entity, &entity_path)?,
            );
        }
        platforms.insert(platform, descriptors);
    }

    Ok(platforms)
}

fn parse_selectors(
    node: &Node,
    path: &KeyPath,
) -> Result<IndexMap<String, SelectorDescriptor>, SchemaError> {
    expect_branch(node, path)?
        .iter()
        .map(|(id, selector)| {
            let selector_path = path.child(id.as_str());
            Ok((id.clone(), SelectorDescriptor::from_node(selector, &selector_path)?))
        })
        .collect()
}

fn expect_branch<'a>(
    node: &'a Node,
    path: &KeyPath,
) -> Result<&'a IndexMap<String, Node>, SchemaError> {
    node.as_branch().ok_or_else(|| SchemaError::ExpectedMapping {
        path: path.clone(),
        found: node.kind(),
    })
}

fn expect_text(node: &Node, path: &KeyPath) -> Result<String, SchemaError> {
    node.as_text()
        .map(String::from)
        .ok_or_else(|| SchemaError::ExpectedText {
            path: path.clone(),
            found: node.kind(),
        })
}

fn check_fields(
    map: &IndexMap<String, Node>,
    path: &KeyPath,
    allowed: &[&str],
) -> Result<(), SchemaError> {
    match map.keys().find(|key| !allowed.contains(&key.as_str())) {
        Some(field) => Err(SchemaError::UnknownField {
            path: path.clone(),
            field: field.clone(),
        }),
        None => Ok(()),
    }
}

fn labels(node: &Node, path: &KeyPath) -> Result<Labels, SchemaError> {
    expect_branch(node, path)?
        .iter()
        .map(|(key, value)| Ok((key.clone(), expect_text(value, &path.child(key.as_str()))?)))
        .collect()
}

fn optional_labels(
    map: &IndexMap<String, Node>,
    field: &str,
    path: &KeyPath,
) -> Result<Labels, SchemaError> {
    match map.get(field) {
        Some(node) => labels(node, &path.child(field)),
        None => Ok(Labels::new()),
    }
}

fn optional_text(
    map: &IndexMap<String, Node>,
    field: &str,
    path: &KeyPath,
) -> Result<Option<String>, SchemaError> {
    map.get(field)
        .map(|node| expect_text(node, &path.child(field)))
        .transpose()
}

/// Check if a state token is a lowercase identifier
///
/// Lowercase alphanumeric with underscores, cannot start or end with `_`.
pub fn is_state_token(s: &str) -> bool {
    if s.is_empty() || s.starts_with('_') || s.ends_with('_') {
        return false;
    }
    s.chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

/// Normalize a raw reported value into token form
///
/// Lowercases, maps every non-alphanumeric run to a single `_` and trims
/// underscores at both ends, so `"Rising Slowly"` becomes `rising_slowly`.
pub fn normalize_token(raw: &str) -> String {
    let mut normalized = String::with_capacity(raw.len());
    for c in raw.chars().flat_map(char::to_lowercase) {
        if c.is_alphanumeric() {
            normalized.push(c);
        } else if !normalized.is_empty() && !normalized.ends_with('_') {
            normalized.push('_');
        }
    }
    while normalized.ends_with('_') {
        normalized.pop();
    }
    normalized
}

fn validate_state_tokens(state: &Labels, path: &KeyPath) -> Result<(), SchemaError> {
    let mut seen: IndexMap<String, &str> = IndexMap::with_capacity(state.len());

    for token in state.keys() {
        if !is_state_token(token) {
            return Err(SchemaError::InvalidStateToken {
                path: path.clone(),
                token: token.clone(),
            });
        }

        let normalized = normalize_token(token);
        if let Some(first) = seen.get(&normalized) {
            return Err(SchemaError::StateTokenCollision {
                path: path.clone(),
                first: first.to_string(),
                second: token.clone(),
                normalized,
            });
        }
        seen.insert(normalized, token);
    }

    Ok(())
}
