//! # scxmlkit-model
//!
//! In-memory model of SCXML state-chart documents.
//!
//! This crate provides:
//! - The document tree (states, parallels, finals, histories, transitions)
//! - Executable content, invocations and data models
//! - A builder and mutation API on the same tree
//! - Depth-first traversal and document-wide id resolution
//! - Optional reference validation

pub mod blocks;
pub mod datamodel;
pub mod document;
pub mod error;
pub mod executable;
pub mod invoke;
pub mod node;
pub mod state;
pub mod transition;
pub mod validate;

pub use blocks::{Finalize, OnEntry, OnExit};
pub use datamodel::{Data, Datamodel};
pub use document::{Binding, Document, DEFAULT_VERSION, SCXML_NAMESPACE, SCXML_PREFIX};
pub use error::{ModelError, ReferenceError};
pub use executable::{
    Assign, Cancel, Custom, CustomBody, Else, ElseIf, ExecutableContent, Foreach, If, Log, Raise,
    Script, SendEvent, ACTION_TAGS,
};
pub use invoke::{Content, Invoke, Param};
pub use node::Node;
pub use state::{Final, History, HistoryType, Parallel, State, StateChild, StateKind};
pub use transition::{Transition, TransitionType};
