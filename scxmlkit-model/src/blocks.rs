//! Ordered executable-content containers.

use crate::executable::ExecutableContent;
use serde::{Deserialize, Serialize};

/// `<onentry>`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OnEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub actions: Vec<ExecutableContent>,
}

/// `<onexit>`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OnExit {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub actions: Vec<ExecutableContent>,
}

/// `<finalize>`: runs when an invoked service returns an event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Finalize {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub actions: Vec<ExecutableContent>,
}

impl OnEntry {
    pub fn new(actions: Vec<ExecutableContent>) -> Self {
        Self { id: None, actions }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_action(mut self, action: ExecutableContent) -> Self {
        self.actions.push(action);
        self
    }
}

impl OnExit {
    pub fn new(actions: Vec<ExecutableContent>) -> Self {
        Self { id: None, actions }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_action(mut self, action: ExecutableContent) -> Self {
        self.actions.push(action);
        self
    }
}

impl Finalize {
    pub fn new(actions: Vec<ExecutableContent>) -> Self {
        Self { id: None, actions }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_action(mut self, action: ExecutableContent) -> Self {
        self.actions.push(action);
        self
    }
}
