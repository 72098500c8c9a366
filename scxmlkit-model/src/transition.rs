//! Transition types.

use crate::error::ModelError;
use crate::executable::ExecutableContent;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Whether a transition exits its source state when targeting a descendant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionType {
    Internal,
    #[default]
    External,
}

impl TransitionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransitionType::Internal => "internal",
            TransitionType::External => "external",
        }
    }
}

impl fmt::Display for TransitionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransitionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "internal" => Ok(TransitionType::Internal),
            "external" => Ok(TransitionType::External),
            other => Err(format!("unknown transition type '{}'", other)),
        }
    }
}

/// A transition between states.
///
/// `targets` hold identifiers only; they are resolved against the whole
/// document on demand and may point forward in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Transition {
    /// Model-internal handle, never written to markup.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Event descriptors, in declaration order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<String>,

    /// Guard condition.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cond: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub targets: Vec<String>,

    #[serde(rename = "type")]
    pub kind: TransitionType,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<ExecutableContent>,
}

impl Transition {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand for `event` → `target`.
    pub fn on(event: impl Into<String>, target: impl Into<String>) -> Self {
        Self::new().with_event(event).with_target(target)
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_event(mut self, event: impl Into<String>) -> Self {
        self.events.push(event.into());
        self
    }

    pub fn with_events<I, S>(mut self, events: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.events.extend(events.into_iter().map(Into::into));
        self
    }

    pub fn with_cond(mut self, cond: impl Into<String>) -> Self {
        self.cond = Some(cond.into());
        self
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.targets.push(target.into());
        self
    }

    pub fn with_type(mut self, kind: TransitionType) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_action(mut self, action: ExecutableContent) -> Self {
        self.actions.push(action);
        self
    }

    pub fn add_event(&mut self, event: impl Into<String>) {
        self.events.push(event.into());
    }

    /// Removes the first occurrence of `event`.
    pub fn remove_event(&mut self, event: &str) -> Result<(), ModelError> {
        let index = self
            .events
            .iter()
            .position(|e| e == event)
            .ok_or_else(|| ModelError::not_found("event", event))?;
        self.events.remove(index);
        Ok(())
    }

    pub fn set_target(&mut self, target: impl Into<String>) {
        self.targets = vec![target.into()];
    }

    /// Returns true if no event descriptor triggers this transition.
    pub fn is_eventless(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let t = Transition::new();
        assert_eq!(t.kind, TransitionType::External);
        assert!(t.events.is_empty());
        assert!(t.targets.is_empty());
        assert!(t.cond.is_none());
    }

    #[test]
    fn test_event_list_preserves_order() {
        let mut t = Transition::new().with_events(["a", "b", "c"]);
        assert_eq!(t.events, vec!["a", "b", "c"]);

        t.remove_event("b").unwrap();
        assert_eq!(t.events, vec!["a", "c"]);

        let err = t.remove_event("zz").unwrap_err();
        assert!(matches!(err, ModelError::NotFound { kind: "event", .. }));
    }

    #[test]
    fn test_transition_type_parse() {
        assert_eq!(
            "internal".parse::<TransitionType>().unwrap(),
            TransitionType::Internal
        );
        assert!("sideways".parse::<TransitionType>().is_err());
        assert_eq!(TransitionType::External.to_string(), "external");
    }
}
