//! Borrowed view over every structural entity, plus tree walk and id
//! resolution.

use crate::blocks::{Finalize, OnEntry, OnExit};
use crate::datamodel::{Data, Datamodel};
use crate::document::Document;
use crate::invoke::Invoke;
use crate::state::{Final, History, Parallel, State, StateChild};
use crate::transition::Transition;

/// A reference to one node of the tree, discriminated by entity kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Node<'a> {
    Document(&'a Document),
    State(&'a State),
    Parallel(&'a Parallel),
    Final(&'a Final),
    History(&'a History),
    Transition(&'a Transition),
    Invoke(&'a Invoke),
    Datamodel(&'a Datamodel),
    Data(&'a Data),
    OnEntry(&'a OnEntry),
    OnExit(&'a OnExit),
    Finalize(&'a Finalize),
}

impl<'a> Node<'a> {
    /// Element name of the node.
    pub fn tag(&self) -> &'static str {
        match self {
            Node::Document(_) => "scxml",
            Node::State(_) => "state",
            Node::Parallel(_) => "parallel",
            Node::Final(_) => "final",
            Node::History(_) => "history",
            Node::Transition(_) => "transition",
            Node::Invoke(_) => "invoke",
            Node::Datamodel(_) => "datamodel",
            Node::Data(_) => "data",
            Node::OnEntry(_) => "onentry",
            Node::OnExit(_) => "onexit",
            Node::Finalize(_) => "finalize",
        }
    }

    /// Identifier of the node, if it carries one.
    pub fn id(&self) -> Option<&'a str> {
        match *self {
            Node::Document(d) => d.name.as_deref(),
            Node::State(s) => Some(&s.id),
            Node::Parallel(p) => Some(&p.id),
            Node::Final(f) => Some(&f.id),
            Node::History(h) => Some(&h.id),
            Node::Transition(t) => t.id.as_deref(),
            Node::Invoke(i) => i.id.as_deref(),
            Node::Datamodel(d) => d.id.as_deref(),
            Node::Data(d) => Some(&d.id),
            Node::OnEntry(b) => b.id.as_deref(),
            Node::OnExit(b) => b.id.as_deref(),
            Node::Finalize(b) => b.id.as_deref(),
        }
    }

    /// True for nodes a transition may target.
    pub fn is_targetable(&self) -> bool {
        matches!(
            self,
            Node::State(_) | Node::Parallel(_) | Node::Final(_) | Node::History(_)
        )
    }
}

impl<'a> From<&'a StateChild> for Node<'a> {
    fn from(child: &'a StateChild) -> Self {
        match child {
            StateChild::State(s) => Node::State(s),
            StateChild::Parallel(p) => Node::Parallel(p),
            StateChild::Final(f) => Node::Final(f),
        }
    }
}

impl Document {
    /// Visits every node depth-first, pre-order, in the order the nodes are
    /// written to markup.
    pub fn walk<'a, F>(&'a self, mut visit: F)
    where
        F: FnMut(Node<'a>),
    {
        visit(Node::Document(self));
        if let Some(dm) = &self.datamodel {
            walk_datamodel(dm, &mut visit);
        }
        for child in &self.children {
            walk_child(child, &mut visit);
        }
    }

    /// Looks up a state, parallel, final or history by id anywhere in the
    /// document. Returns the first match in document order.
    pub fn resolve(&self, id: &str) -> Option<Node<'_>> {
        resolve_in(&self.children, id)
    }

    /// Collects every node into a vector, in walk order.
    pub fn nodes(&self) -> Vec<Node<'_>> {
        let mut out = Vec::new();
        self.walk(|node| out.push(node));
        out
    }
}

fn walk_datamodel<'a, F: FnMut(Node<'a>)>(dm: &'a Datamodel, visit: &mut F) {
    visit(Node::Datamodel(dm));
    for data in &dm.data {
        visit(Node::Data(data));
    }
}

fn walk_blocks<'a, F: FnMut(Node<'a>)>(
    onentry: &'a Option<OnEntry>,
    onexit: &'a Option<OnExit>,
    visit: &mut F,
) {
    if let Some(block) = onentry {
        visit(Node::OnEntry(block));
    }
    if let Some(block) = onexit {
        visit(Node::OnExit(block));
    }
}

fn walk_invoke<'a, F: FnMut(Node<'a>)>(invoke: &'a Invoke, visit: &mut F) {
    visit(Node::Invoke(invoke));
    if let Some(finalize) = &invoke.finalize {
        visit(Node::Finalize(finalize));
    }
}

fn walk_history<'a, F: FnMut(Node<'a>)>(history: &'a History, visit: &mut F) {
    visit(Node::History(history));
    walk_blocks(&history.onentry, &history.onexit, visit);
    for t in &history.transitions {
        visit(Node::Transition(t));
    }
}

#[allow(clippy::too_many_arguments)]
fn walk_container<'a, F: FnMut(Node<'a>)>(
    onentry: &'a Option<OnEntry>,
    onexit: &'a Option<OnExit>,
    datamodel: &'a Option<Datamodel>,
    invokes: &'a [Invoke],
    histories: &'a [History],
    transitions: &'a [Transition],
    children: &'a [StateChild],
    visit: &mut F,
) {
    walk_blocks(onentry, onexit, visit);
    if let Some(dm) = datamodel {
        walk_datamodel(dm, visit);
    }
    for invoke in invokes {
        walk_invoke(invoke, visit);
    }
    for history in histories {
        walk_history(history, visit);
    }
    for t in transitions {
        visit(Node::Transition(t));
    }
    for child in children {
        walk_child(child, visit);
    }
}

fn walk_child<'a, F: FnMut(Node<'a>)>(child: &'a StateChild, visit: &mut F) {
    visit(Node::from(child));
    match child {
        StateChild::State(s) => walk_container(
            &s.onentry,
            &s.onexit,
            &s.datamodel,
            &s.invokes,
            &s.histories,
            &s.transitions,
            &s.children,
            visit,
        ),
        StateChild::Parallel(p) => walk_container(
            &p.onentry,
            &p.onexit,
            &p.datamodel,
            &p.invokes,
            &p.histories,
            &p.transitions,
            &p.children,
            visit,
        ),
        StateChild::Final(f) => walk_blocks(&f.onentry, &f.onexit, visit),
    }
}

fn resolve_in<'a>(children: &'a [StateChild], id: &str) -> Option<Node<'a>> {
    for child in children {
        if child.id() == id {
            return Some(Node::from(child));
        }
        let (histories, nested) = match child {
            StateChild::State(s) => (s.histories.as_slice(), s.children.as_slice()),
            StateChild::Parallel(p) => (p.histories.as_slice(), p.children.as_slice()),
            StateChild::Final(_) => continue,
        };
        if let Some(h) = histories.iter().find(|h| h.id == id) {
            return Some(Node::History(h));
        }
        if let Some(found) = resolve_in(nested, id) {
            return Some(found);
        }
    }
    None
}
