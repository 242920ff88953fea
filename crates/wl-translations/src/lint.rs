//! Non-fatal quality checks
//!
//! A table that passes schema validation can still carry mistakes a user
//! would notice, such as two attributes sharing a copy-pasted label.

use crate::node::KeyPath;
use crate::schema::{EntityDescriptor, FlowStrings, Labels, Namespace};
use crate::table::Translations;
use indexmap::IndexMap;
use std::fmt;

/// A quality problem that does not block loading
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LintWarning {
    /// Sibling keys under `path` share the same display text
    DuplicateLabel {
        path: KeyPath,
        keys: Vec<String>,
        label: String,
    },
    /// State label identical to its raw token
    UntranslatedToken { path: KeyPath, token: String },
}

impl fmt::Display for LintWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LintWarning::DuplicateLabel { path, keys, label } => write!(
                f,
                "{}: keys {} share the label \"{}\"",
                path,
                keys.join(", "),
                label
            ),
            LintWarning::UntranslatedToken { path, token } => {
                write!(f, "{}: state '{}' is labelled with its raw token", path, token)
            }
        }
    }
}

impl Translations {
    /// Run all quality checks
    pub fn lint(&self) -> Vec<LintWarning> {
        let schema = self.schema();
        let mut warnings = Vec::new();

        for (namespace, flow) in [
            (Namespace::Config, &schema.config),
            (Namespace::Options, &schema.options),
        ] {
            lint_flow(flow, &KeyPath::new([namespace.as_str()]), &mut warnings);
        }

        let entity_path = KeyPath::new([Namespace::Entity.as_str()]);
        for (platform, entities) in &schema.entity {
            let platform_path = entity_path.child(platform.as_str());
            check_names(entities, &platform_path, &mut warnings);
            for (key, descriptor) in entities {
                lint_entity(descriptor, &platform_path.child(key.as_str()), &mut warnings);
            }
        }

        let selector_path = KeyPath::new([Namespace::Selector.as_str()]);
        for (id, selector) in &schema.selector {
            check_labels(
                &selector.options,
                &selector_path.child(id.as_str()).child("options"),
                &mut warnings,
            );
        }

        warnings
    }
}

fn lint_flow(flow: &FlowStrings, path: &KeyPath, warnings: &mut Vec<LintWarning>) {
    let steps_path = path.child("step");
    for (step_id, step) in &flow.step {
        let step_path = steps_path.child(step_id.as_str());
        check_labels(&step.data, &step_path.child("data"), warnings);
        check_labels(&step.menu_options, &step_path.child("menu_options"), warnings);
    }
}

fn lint_entity(descriptor: &EntityDescriptor, path: &KeyPath, warnings: &mut Vec<LintWarning>) {
    let state_path = path.child("state");
    check_labels(&descriptor.state, &state_path, warnings);
    for (token, label) in &descriptor.state {
        if token == label {
            warnings.push(LintWarning::UntranslatedToken {
                path: state_path.clone(),
                token: token.clone(),
            });
        }
    }

    let attributes_path = path.child("state_attributes");
    check_names(&descriptor.state_attributes, &attributes_path, warnings);
    for (attr, attr_descriptor) in &descriptor.state_attributes {
        lint_entity(attr_descriptor, &attributes_path.child(attr.as_str()), warnings);
    }
}

/// Sibling descriptors must not share a name
fn check_names(
    descriptors: &IndexMap<String, EntityDescriptor>,
    path: &KeyPath,
    warnings: &mut Vec<LintWarning>,
) {
    let names = descriptors
        .iter()
        .filter_map(|(key, d)| d.name.as_deref().map(|name| (key.as_str(), name)));
    report_duplicates(names, path, warnings);
}

fn check_labels(labels: &Labels, path: &KeyPath, warnings: &mut Vec<LintWarning>) {
    report_duplicates(
        labels.iter().map(|(key, label)| (key.as_str(), label.as_str())),
        path,
        warnings,
    );
}

fn report_duplicates<'a>(
    entries: impl Iterator<Item = (&'a str, &'a str)>,
    path: &KeyPath,
    warnings: &mut Vec<LintWarning>,
) {
    let mut by_label: IndexMap<&str, Vec<String>> = IndexMap::new();
    for (key, label) in entries {
        by_label.entry(label).or_default().push(key.to_string());
    }

    for (label, keys) in by_label {
        if keys.len() > 1 {
            warnings.push(LintWarning::DuplicateLabel {
                path: path.clone(),
                keys,
                label: label.to_string(),
            });
        }
    }
}
