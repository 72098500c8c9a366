//! State-like nodes: `<state>`, `<parallel>`, `<final>` and `<history>`.

use crate::blocks::{OnEntry, OnExit};
use crate::datamodel::Datamodel;
use crate::error::ModelError;
use crate::invoke::Invoke;
use crate::transition::Transition;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A state-like child of the root or of a container state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "node", rename_all = "lowercase")]
pub enum StateChild {
    State(State),
    Parallel(Parallel),
    Final(Final),
}

impl StateChild {
    pub fn id(&self) -> &str {
        match self {
            StateChild::State(s) => &s.id,
            StateChild::Parallel(p) => &p.id,
            StateChild::Final(f) => &f.id,
        }
    }

    /// Returns the element name this child serializes as.
    pub fn tag(&self) -> &'static str {
        match self {
            StateChild::State(_) => "state",
            StateChild::Parallel(_) => "parallel",
            StateChild::Final(_) => "final",
        }
    }

    pub fn as_state(&self) -> Option<&State> {
        match self {
            StateChild::State(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_parallel(&self) -> Option<&Parallel> {
        match self {
            StateChild::Parallel(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_final(&self) -> Option<&Final> {
        match self {
            StateChild::Final(f) => Some(f),
            _ => None,
        }
    }
}

impl From<State> for StateChild {
    fn from(s: State) -> Self {
        StateChild::State(s)
    }
}

impl From<Parallel> for StateChild {
    fn from(p: Parallel) -> Self {
        StateChild::Parallel(p)
    }
}

impl From<Final> for StateChild {
    fn from(f: Final) -> Self {
        StateChild::Final(f)
    }
}

pub(crate) fn remove_child(
    children: &mut Vec<StateChild>,
    id: &str,
) -> Result<StateChild, ModelError> {
    let index = children
        .iter()
        .position(|c| c.id() == id)
        .ok_or_else(|| ModelError::not_found("state", id))?;
    Ok(children.remove(index))
}

pub(crate) fn remove_transition(
    transitions: &mut Vec<Transition>,
    id: &str,
) -> Result<Transition, ModelError> {
    let index = transitions
        .iter()
        .position(|t| t.id.as_deref() == Some(id))
        .ok_or_else(|| ModelError::not_found("transition", id))?;
    Ok(transitions.remove(index))
}

fn remove_history(histories: &mut Vec<History>, id: &str) -> Result<History, ModelError> {
    let index = histories
        .iter()
        .position(|h| h.id == id)
        .ok_or_else(|| ModelError::not_found("history", id))?;
    Ok(histories.remove(index))
}

/// Derived shape of a [`State`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateKind {
    Simple,
    Compound,
}

impl StateKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StateKind::Simple => "simple",
            StateKind::Compound => "compound",
        }
    }
}

/// `<state>`, atomic or compound.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct State {
    pub id: String,

    /// Default initial child. Only meaningful on compound states.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub transitions: Vec<Transition>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<StateChild>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub histories: Vec<History>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub invokes: Vec<Invoke>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub onentry: Option<OnEntry>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub onexit: Option<OnExit>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub datamodel: Option<Datamodel>,
}

impl State {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    /// Compound when it has children, simple otherwise. Always derived.
    pub fn kind(&self) -> StateKind {
        if self.children.is_empty() {
            StateKind::Simple
        } else {
            StateKind::Compound
        }
    }

    pub fn is_compound(&self) -> bool {
        self.kind() == StateKind::Compound
    }

    pub fn with_initial(mut self, initial: impl Into<String>) -> Self {
        self.initial = Some(initial.into());
        self
    }

    pub fn with_transition(mut self, transition: Transition) -> Self {
        self.transitions.push(transition);
        self
    }

    pub fn with_child(mut self, child: impl Into<StateChild>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn with_history(mut self, history: History) -> Self {
        self.histories.push(history);
        self
    }

    pub fn with_invoke(mut self, invoke: Invoke) -> Self {
        self.invokes.push(invoke);
        self
    }

    pub fn with_onentry(mut self, onentry: OnEntry) -> Self {
        self.onentry = Some(onentry);
        self
    }

    pub fn with_onexit(mut self, onexit: OnExit) -> Self {
        self.onexit = Some(onexit);
        self
    }

    pub fn with_datamodel(mut self, datamodel: Datamodel) -> Self {
        self.datamodel = Some(datamodel);
        self
    }

    pub fn add_transition(&mut self, transition: Transition) {
        self.transitions.push(transition);
    }

    pub fn remove_transition(&mut self, id: &str) -> Result<Transition, ModelError> {
        remove_transition(&mut self.transitions, id)
    }

    pub fn add_child(&mut self, child: impl Into<StateChild>) {
        self.children.push(child.into());
    }

    pub fn remove_child(&mut self, id: &str) -> Result<StateChild, ModelError> {
        remove_child(&mut self.children, id)
    }

    pub fn add_history(&mut self, history: History) {
        self.histories.push(history);
    }

    pub fn remove_history(&mut self, id: &str) -> Result<History, ModelError> {
        remove_history(&mut self.histories, id)
    }

    pub fn add_invoke(&mut self, invoke: Invoke) {
        self.invokes.push(invoke);
    }

    /// Sets the initial child, which must be a direct child or history.
    pub fn set_initial(&mut self, id: &str) -> Result<(), ModelError> {
        let known = self.children.iter().any(|c| c.id() == id)
            || self.histories.iter().any(|h| h.id == id);
        if !known {
            return Err(ModelError::InvalidInitial {
                owner: self.id.clone(),
                id: id.to_string(),
            });
        }
        self.initial = Some(id.to_string());
        Ok(())
    }

    pub fn clear_initial(&mut self) {
        self.initial = None;
    }
}

/// `<parallel>`: all children are active together, so there is no initial.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Parallel {
    pub id: String,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub transitions: Vec<Transition>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<StateChild>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub histories: Vec<History>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub invokes: Vec<Invoke>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub onentry: Option<OnEntry>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub onexit: Option<OnExit>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub datamodel: Option<Datamodel>,
}

impl Parallel {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn with_transition(mut self, transition: Transition) -> Self {
        self.transitions.push(transition);
        self
    }

    pub fn with_child(mut self, child: impl Into<StateChild>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn with_history(mut self, history: History) -> Self {
        self.histories.push(history);
        self
    }

    pub fn with_invoke(mut self, invoke: Invoke) -> Self {
        self.invokes.push(invoke);
        self
    }

    pub fn with_onentry(mut self, onentry: OnEntry) -> Self {
        self.onentry = Some(onentry);
        self
    }

    pub fn with_onexit(mut self, onexit: OnExit) -> Self {
        self.onexit = Some(onexit);
        self
    }

    pub fn with_datamodel(mut self, datamodel: Datamodel) -> Self {
        self.datamodel = Some(datamodel);
        self
    }

    pub fn add_transition(&mut self, transition: Transition) {
        self.transitions.push(transition);
    }

    pub fn remove_transition(&mut self, id: &str) -> Result<Transition, ModelError> {
        remove_transition(&mut self.transitions, id)
    }

    pub fn add_child(&mut self, child: impl Into<StateChild>) {
        self.children.push(child.into());
    }

    pub fn remove_child(&mut self, id: &str) -> Result<StateChild, ModelError> {
        remove_child(&mut self.children, id)
    }

    pub fn add_history(&mut self, history: History) {
        self.histories.push(history);
    }

    pub fn remove_history(&mut self, id: &str) -> Result<History, ModelError> {
        remove_history(&mut self.histories, id)
    }

    pub fn add_invoke(&mut self, invoke: Invoke) {
        self.invokes.push(invoke);
    }
}

/// `<final>`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Final {
    pub id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub onentry: Option<OnEntry>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub onexit: Option<OnExit>,
}

impl Final {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn with_onentry(mut self, onentry: OnEntry) -> Self {
        self.onentry = Some(onentry);
        self
    }

    pub fn with_onexit(mut self, onexit: OnExit) -> Self {
        self.onexit = Some(onexit);
        self
    }
}

/// Depth of configuration a history pseudo-state records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryType {
    #[default]
    Shallow,
    Deep,
}

impl HistoryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            HistoryType::Shallow => "shallow",
            HistoryType::Deep => "deep",
        }
    }
}

impl fmt::Display for HistoryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HistoryType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "shallow" => Ok(HistoryType::Shallow),
            "deep" => Ok(HistoryType::Deep),
            other => Err(format!("unknown history type '{}'", other)),
        }
    }
}

/// `<history>` pseudo-state.
///
/// A conformant document gives it exactly one transition: the default
/// target, with no event or condition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct History {
    pub id: String,

    #[serde(rename = "type")]
    pub kind: HistoryType,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub transitions: Vec<Transition>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub onentry: Option<OnEntry>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub onexit: Option<OnExit>,
}

impl History {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn deep(id: impl Into<String>) -> Self {
        Self::new(id).with_type(HistoryType::Deep)
    }

    pub fn with_type(mut self, kind: HistoryType) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_transition(mut self, transition: Transition) -> Self {
        self.transitions.push(transition);
        self
    }

    /// Adds the default-target transition.
    pub fn with_default_target(self, target: impl Into<String>) -> Self {
        self.with_transition(Transition::new().with_target(target))
    }

    pub fn add_transition(&mut self, transition: Transition) {
        self.transitions.push(transition);
    }

    pub fn remove_transition(&mut self, id: &str) -> Result<Transition, ModelError> {
        remove_transition(&mut self.transitions, id)
    }

    /// The default-target transition, if present.
    pub fn default_transition(&self) -> Option<&Transition> {
        self.transitions.first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_is_derived_from_children() {
        let mut state = State::new("s");
        assert_eq!(state.kind(), StateKind::Simple);

        state.add_child(State::new("inner"));
        assert_eq!(state.kind(), StateKind::Compound);

        state.remove_child("inner").unwrap();
        assert_eq!(state.kind(), StateKind::Simple);

        let built = State::new("p").with_child(Final::new("done"));
        assert!(built.is_compound());
    }

    #[test]
    fn test_set_initial_requires_child() {
        let mut state = State::new("main")
            .with_child(State::new("a"))
            .with_history(History::new("h"));

        state.set_initial("a").unwrap();
        assert_eq!(state.initial.as_deref(), Some("a"));

        state.set_initial("h").unwrap();
        assert_eq!(state.initial.as_deref(), Some("h"));

        let err = state.set_initial("nope").unwrap_err();
        assert!(matches!(err, ModelError::InvalidInitial { .. }));
        assert_eq!(state.initial.as_deref(), Some("h"));
    }

    #[test]
    fn test_remove_missing_reports_kind() {
        let mut parallel = Parallel::new("p");
        let err = parallel.remove_history("h").unwrap_err();
        assert_eq!(err.to_string(), "history not found: h");

        let err = parallel.remove_child("x").unwrap_err();
        assert_eq!(err.to_string(), "state not found: x");
    }

    #[test]
    fn test_remove_transition_by_id() {
        let mut state = State::new("s")
            .with_transition(Transition::on("go", "t").with_id("t1"))
            .with_transition(Transition::on("stop", "u").with_id("t2"));

        let removed = state.remove_transition("t1").unwrap();
        assert_eq!(removed.events, vec!["go"]);
        assert_eq!(state.transitions.len(), 1);
        assert!(state.remove_transition("t1").is_err());
    }

    #[test]
    fn test_history_defaults() {
        let history = History::new("h");
        assert_eq!(history.kind, HistoryType::Shallow);
        assert!(history.default_transition().is_none());

        let deep = History::deep("h2").with_default_target("a");
        assert_eq!(deep.kind, HistoryType::Deep);
        assert_eq!(deep.default_transition().unwrap().targets, vec!["a"]);
    }

    #[test]
    fn test_child_accessors() {
        let child: StateChild = Final::new("end").into();
        assert_eq!(child.id(), "end");
        assert_eq!(child.tag(), "final");
        assert!(child.as_final().is_some());
        assert!(child.as_state().is_none());
    }
}
