//! Optional reference validation.
//!
//! Construction and parsing never call this; a document with dangling
//! references is still a representable document.

use crate::document::Document;
use crate::error::ReferenceError;
use crate::state::{History, StateChild};
use crate::transition::Transition;
use std::collections::HashSet;

impl Document {
    /// Checks identifier references and returns every finding, in document
    /// order. An empty result means every reference resolves.
    pub fn validate(&self) -> Vec<ReferenceError> {
        let mut checker = Checker {
            doc: self,
            errors: Vec::new(),
            seen: HashSet::new(),
            reported: HashSet::new(),
        };

        if let Some(initial) = &self.initial {
            for id in initial.split_whitespace() {
                if !self.children.iter().any(|c| c.id() == id) {
                    checker
                        .errors
                        .push(ReferenceError::InitialNotTopLevel { id: id.to_string() });
                }
            }
        }

        checker.children(&self.children);

        tracing::debug!(findings = checker.errors.len(), "validated document");
        checker.errors
    }
}

struct Checker<'a> {
    doc: &'a Document,
    errors: Vec<ReferenceError>,
    seen: HashSet<&'a str>,
    reported: HashSet<&'a str>,
}

impl<'a> Checker<'a> {
    fn id(&mut self, id: &'a str) {
        if id.is_empty() {
            return;
        }
        if !self.seen.insert(id) && self.reported.insert(id) {
            self.errors
                .push(ReferenceError::DuplicateId { id: id.to_string() });
        }
    }

    fn transitions(&mut self, owner: &str, transitions: &[Transition]) {
        for t in transitions {
            for target in t.targets.iter().flat_map(|ids| ids.split_whitespace()) {
                if self.doc.resolve(target).is_none() {
                    self.errors.push(ReferenceError::DanglingTarget {
                        source_id: owner.to_string(),
                        target: target.to_string(),
                    });
                }
            }
        }
    }

    fn histories(&mut self, histories: &'a [History]) {
        for h in histories {
            self.id(&h.id);
            self.transitions(&h.id, &h.transitions);
        }
    }

    fn children(&mut self, children: &'a [StateChild]) {
        for child in children {
            self.id(child.id());
            match child {
                StateChild::State(s) => {
                    if let Some(initial) = &s.initial {
                        if !s.is_compound() {
                            self.errors.push(ReferenceError::InitialOnAtomic {
                                state: s.id.clone(),
                            });
                        } else {
                            for id in initial.split_whitespace() {
                                if self.doc.resolve(id).is_none() {
                                    self.errors.push(ReferenceError::DanglingInitial {
                                        state: s.id.clone(),
                                        id: id.to_string(),
                                    });
                                }
                            }
                        }
                    }
                    self.histories(&s.histories);
                    self.transitions(&s.id, &s.transitions);
                    self.children(&s.children);
                }
                StateChild::Parallel(p) => {
                    self.histories(&p.histories);
                    self.transitions(&p.id, &p.transitions);
                    self.children(&p.children);
                }
                StateChild::Final(_) => {}
            }
        }
    }
}
