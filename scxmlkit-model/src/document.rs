//! The document root.

use crate::datamodel::Datamodel;
use crate::error::ModelError;
use crate::executable::Script;
use crate::state::{remove_child, Final, Parallel, State, StateChild};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Canonical namespace URI of the format.
pub const SCXML_NAMESPACE: &str = "http://www.w3.org/2005/07/scxml";

/// Prefix under which the canonical namespace is kept in [`Document::namespaces`].
pub const SCXML_PREFIX: &str = "scxml";

/// Version written when none is given.
pub const DEFAULT_VERSION: &str = "1.0";

/// Data binding mode of the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Binding {
    Early,
    Late,
}

impl Binding {
    pub fn as_str(&self) -> &'static str {
        match self {
            Binding::Early => "early",
            Binding::Late => "late",
        }
    }
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Binding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "early" => Ok(Binding::Early),
            "late" => Ok(Binding::Late),
            other => Err(format!("unknown binding '{}'", other)),
        }
    }
}

fn default_namespaces() -> BTreeMap<String, String> {
    let mut namespaces = BTreeMap::new();
    namespaces.insert(SCXML_PREFIX.to_string(), SCXML_NAMESPACE.to_string());
    namespaces
}

fn default_version() -> String {
    DEFAULT_VERSION.to_string()
}

/// A state-chart document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Document {
    /// Informational machine name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default = "default_version")]
    pub version: String,

    /// Execution profile.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,

    /// Data model language (the root `datamodel` attribute).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub datamodel_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub binding: Option<Binding>,

    /// Initial configuration. Should name a top-level child.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial: Option<String>,

    /// Prefix → URI. Always carries the canonical binding unless removed
    /// explicitly.
    #[serde(default = "default_namespaces")]
    pub namespaces: BTreeMap<String, String>,

    pub children: Vec<StateChild>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub datamodel: Option<Datamodel>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub script: Option<Script>,
}

impl Default for Document {
    fn default() -> Self {
        Self {
            name: None,
            version: default_version(),
            profile: None,
            datamodel_type: None,
            binding: None,
            initial: None,
            namespaces: default_namespaces(),
            children: Vec::new(),
            datamodel: None,
            script: None,
        }
    }
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(profile.into());
        self
    }

    pub fn with_datamodel_type(mut self, datamodel_type: impl Into<String>) -> Self {
        self.datamodel_type = Some(datamodel_type.into());
        self
    }

    pub fn with_binding(mut self, binding: Binding) -> Self {
        self.binding = Some(binding);
        self
    }

    /// Sets the initial reference without checking it.
    pub fn with_initial(mut self, initial: impl Into<String>) -> Self {
        self.initial = Some(initial.into());
        self
    }

    pub fn with_namespace(mut self, prefix: impl Into<String>, uri: impl Into<String>) -> Self {
        self.namespaces.insert(prefix.into(), uri.into());
        self
    }

    pub fn with_child(mut self, child: impl Into<StateChild>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn with_datamodel(mut self, datamodel: Datamodel) -> Self {
        self.datamodel = Some(datamodel);
        self
    }

    pub fn with_script(mut self, script: Script) -> Self {
        self.script = Some(script);
        self
    }

    pub fn add_child(&mut self, child: impl Into<StateChild>) {
        self.children.push(child.into());
    }

    pub fn remove_child(&mut self, id: &str) -> Result<StateChild, ModelError> {
        remove_child(&mut self.children, id)
    }

    /// Sets the initial reference, which must name a top-level child.
    pub fn set_initial(&mut self, id: &str) -> Result<(), ModelError> {
        if !self.children.iter().any(|c| c.id() == id) {
            return Err(ModelError::InvalidInitial {
                owner: self.name.clone().unwrap_or_else(|| SCXML_PREFIX.to_string()),
                id: id.to_string(),
            });
        }
        self.initial = Some(id.to_string());
        Ok(())
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    pub fn set_namespace(&mut self, prefix: impl Into<String>, uri: impl Into<String>) {
        self.namespaces.insert(prefix.into(), uri.into());
    }

    /// Removes a namespace binding and returns its URI.
    pub fn remove_namespace(&mut self, prefix: &str) -> Result<String, ModelError> {
        self.namespaces
            .remove(prefix)
            .ok_or_else(|| ModelError::not_found("namespace", prefix))
    }

    /// Namespace bindings other than the canonical `scxml` one, in prefix
    /// order. A `scxml` prefix bound to any other URI is included.
    pub fn extra_namespaces(&self) -> impl Iterator<Item = (&str, &str)> {
        self.namespaces
            .iter()
            .filter(|(prefix, uri)| {
                !(prefix.as_str() == SCXML_PREFIX && uri.as_str() == SCXML_NAMESPACE)
            })
            .map(|(prefix, uri)| (prefix.as_str(), uri.as_str()))
    }

    /// Top-level `<state>` children.
    pub fn states(&self) -> impl Iterator<Item = &State> {
        self.children.iter().filter_map(StateChild::as_state)
    }

    /// Top-level `<parallel>` children.
    pub fn parallels(&self) -> impl Iterator<Item = &Parallel> {
        self.children.iter().filter_map(StateChild::as_parallel)
    }

    /// Top-level `<final>` children.
    pub fn finals(&self) -> impl Iterator<Item = &Final> {
        self.children.iter().filter_map(StateChild::as_final)
    }

    /// Parses a document from its JSON representation.
    pub fn from_json(json: &serde_json::Value) -> Result<Self, ModelError> {
        Ok(serde_json::from_value(json.clone())?)
    }

    /// Returns the document as JSON.
    pub fn to_json(&self) -> Result<serde_json::Value, ModelError> {
        Ok(serde_json::to_value(self)?)
    }
}
