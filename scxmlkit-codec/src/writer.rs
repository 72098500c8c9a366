//! Document → markup.
//!
//! A single depth-first emission walk. Children are written in stored
//! order; nothing is reordered. An element with no child content is
//! self-closed, and text bodies are written inline so they survive a
//! re-parse unchanged.

use std::borrow::Cow;

use quick_xml::escape::{escape, partial_escape};
use scxmlkit_model::{
    Content, Custom, CustomBody, Data, Datamodel, Document, ExecutableContent, Final, Finalize,
    History, If, Invoke, OnEntry, OnExit, Parallel, Param, Script, SendEvent, State,
    StateChild, Transition, TransitionType, DEFAULT_VERSION, SCXML_NAMESPACE,
};
use serde::{Deserialize, Serialize};

/// XML declaration written at the top of every document.
pub const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// Output formatting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerializeOptions {
    /// Indentation unit, repeated once per nesting level.
    pub indent: String,
    pub newline: String,
    /// When false, indentation and newlines are suppressed.
    pub pretty: bool,
}

impl Default for SerializeOptions {
    fn default() -> Self {
        Self {
            indent: "  ".to_string(),
            newline: "\n".to_string(),
            pretty: true,
        }
    }
}

impl SerializeOptions {
    /// Single-line output.
    pub fn compact() -> Self {
        Self {
            pretty: false,
            ..Default::default()
        }
    }

    pub fn with_indent(mut self, indent: impl Into<String>) -> Self {
        self.indent = indent.into();
        self
    }

    pub fn with_newline(mut self, newline: impl Into<String>) -> Self {
        self.newline = newline.into();
        self
    }
}

/// Serializes a document to markup text.
pub fn serialize(doc: &Document, options: &SerializeOptions) -> String {
    let mut w = MarkupWriter::new(options);
    w.out.push_str(XML_DECLARATION);
    w.out.push_str(w.newline);
    w.document(doc);

    let text = w.out.trim().to_string();
    tracing::debug!(
        bytes = text.len(),
        children = doc.children.len(),
        "serialized document"
    );
    text
}

/// Serializes with default options.
pub fn to_string(doc: &Document) -> String {
    serialize(doc, &SerializeOptions::default())
}

/// CRC32C of the serialized text, as 8 lowercase hex digits.
pub fn checksum(doc: &Document, options: &SerializeOptions) -> String {
    let text = serialize(doc, options);
    format!("{:08x}", crc32c::crc32c(text.as_bytes()))
}

/// Ordered attribute list. Absent and empty values are skipped unless
/// added with [`Attrs::raw`].
#[derive(Default)]
struct Attrs<'a>(Vec<(Cow<'a, str>, Cow<'a, str>)>);

impl<'a> Attrs<'a> {
    fn new() -> Self {
        Self::default()
    }

    fn opt(mut self, name: &'a str, value: Option<&'a str>) -> Self {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            self.0.push((Cow::Borrowed(name), Cow::Borrowed(value)));
        }
        self
    }

    fn req(self, name: &'a str, value: &'a str) -> Self {
        self.opt(name, Some(value))
    }

    /// Space-joined token list.
    fn list(mut self, name: &'a str, values: &'a [String]) -> Self {
        let joined = values
            .iter()
            .flat_map(|v| v.split_whitespace())
            .collect::<Vec<_>>()
            .join(" ");
        if !joined.is_empty() {
            self.0.push((Cow::Borrowed(name), Cow::Owned(joined)));
        }
        self
    }

    fn raw(mut self, name: impl Into<Cow<'a, str>>, value: impl Into<Cow<'a, str>>) -> Self {
        self.0.push((name.into(), value.into()));
        self
    }
}

struct MarkupWriter<'o> {
    out: String,
    indent: &'o str,
    newline: &'o str,
    depth: usize,
}

impl<'o> MarkupWriter<'o> {
    fn new(options: &'o SerializeOptions) -> Self {
        let (indent, newline) = if options.pretty {
            (options.indent.as_str(), options.newline.as_str())
        } else {
            ("", "")
        };
        Self {
            out: String::with_capacity(1024),
            indent,
            newline,
            depth: 0,
        }
    }

    fn pad(&mut self) {
        for _ in 0..self.depth {
            self.out.push_str(self.indent);
        }
    }

    fn tag(&mut self, name: &str, attrs: &Attrs<'_>) {
        self.out.push('<');
        self.out.push_str(name);
        for (key, value) in &attrs.0 {
            self.out.push(' ');
            self.out.push_str(key);
            self.out.push_str("=\"");
            self.out.push_str(&escape(value.as_ref()));
            self.out.push('"');
        }
    }

    fn empty(&mut self, name: &str, attrs: &Attrs<'_>) {
        self.pad();
        self.tag(name, attrs);
        self.out.push_str("/>");
        self.out.push_str(self.newline);
    }

    fn open(&mut self, name: &str, attrs: &Attrs<'_>) {
        self.pad();
        self.tag(name, attrs);
        self.out.push('>');
        self.out.push_str(self.newline);
        self.depth += 1;
    }

    fn close(&mut self, name: &str) {
        self.depth -= 1;
        self.pad();
        self.out.push_str("</");
        self.out.push_str(name);
        self.out.push('>');
        self.out.push_str(self.newline);
    }

    /// Open/body/close when `has_body`, self-closed otherwise.
    fn element<F>(&mut self, name: &str, attrs: Attrs<'_>, has_body: bool, body: F)
    where
        F: FnOnce(&mut Self),
    {
        if has_body {
            self.open(name, &attrs);
            body(self);
            self.close(name);
        } else {
            self.empty(name, &attrs);
        }
    }

    /// `<name attrs>text</name>` on one line, or self-closed when empty.
    fn text_element(&mut self, name: &str, attrs: Attrs<'_>, text: Option<&str>) {
        match text.filter(|t| !t.is_empty()) {
            Some(text) => {
                self.pad();
                self.tag(name, &attrs);
                self.out.push('>');
                self.out.push_str(&partial_escape(text));
                self.out.push_str("</");
                self.out.push_str(name);
                self.out.push('>');
                self.out.push_str(self.newline);
            }
            None => self.empty(name, &attrs),
        }
    }

    fn document(&mut self, doc: &Document) {
        let version = if doc.version.is_empty() {
            DEFAULT_VERSION
        } else {
            doc.version.as_str()
        };

        let mut attrs = Attrs::new()
            .raw("xmlns", SCXML_NAMESPACE)
            .req("version", version)
            .opt("name", doc.name.as_deref())
            .opt("profile", doc.profile.as_deref())
            .opt("datamodel", doc.datamodel_type.as_deref())
            .opt("initial", doc.initial.as_deref())
            .opt("binding", doc.binding.as_ref().map(|b| b.as_str()));
        for (prefix, uri) in doc.extra_namespaces() {
            if !prefix.is_empty() && !uri.is_empty() {
                attrs = attrs.raw(format!("xmlns:{}", prefix), uri);
            }
        }

        let has_body = doc.datamodel.is_some() || doc.script.is_some() || !doc.children.is_empty();
        self.element("scxml", attrs, has_body, |w| {
            if let Some(dm) = &doc.datamodel {
                w.datamodel(dm);
            }
            if let Some(script) = &doc.script {
                w.script(script);
            }
            for child in &doc.children {
                w.child(child);
            }
        });
    }

    fn child(&mut self, child: &StateChild) {
        match child {
            StateChild::State(s) => self.state(s),
            StateChild::Parallel(p) => self.parallel(p),
            StateChild::Final(f) => self.final_state(f),
        }
    }

    fn state(&mut self, s: &State) {
        let attrs = Attrs::new()
            .req("id", &s.id)
            .opt("initial", s.initial.as_deref());
        let has_body = s.onentry.is_some()
            || s.onexit.is_some()
            || s.datamodel.is_some()
            || !s.invokes.is_empty()
            || !s.histories.is_empty()
            || !s.transitions.is_empty()
            || !s.children.is_empty();
        self.element("state", attrs, has_body, |w| {
            w.blocks(&s.onentry, &s.onexit);
            if let Some(dm) = &s.datamodel {
                w.datamodel(dm);
            }
            s.invokes.iter().for_each(|i| w.invoke(i));
            s.histories.iter().for_each(|h| w.history(h));
            s.transitions.iter().for_each(|t| w.transition(t));
            s.children.iter().for_each(|c| w.child(c));
        });
    }

    fn parallel(&mut self, p: &Parallel) {
        let attrs = Attrs::new().req("id", &p.id);
        let has_body = p.onentry.is_some()
            || p.onexit.is_some()
            || p.datamodel.is_some()
            || !p.invokes.is_empty()
            || !p.histories.is_empty()
            || !p.transitions.is_empty()
            || !p.children.is_empty();
        self.element("parallel", attrs, has_body, |w| {
            w.blocks(&p.onentry, &p.onexit);
            if let Some(dm) = &p.datamodel {
                w.datamodel(dm);
            }
            p.invokes.iter().for_each(|i| w.invoke(i));
            p.histories.iter().for_each(|h| w.history(h));
            p.transitions.iter().for_each(|t| w.transition(t));
            p.children.iter().for_each(|c| w.child(c));
        });
    }

    fn final_state(&mut self, f: &Final) {
        let attrs = Attrs::new().req("id", &f.id);
        let has_body = f.onentry.is_some() || f.onexit.is_some();
        self.element("final", attrs, has_body, |w| w.blocks(&f.onentry, &f.onexit));
    }

    fn history(&mut self, h: &History) {
        let attrs = Attrs::new().req("id", &h.id).raw("type", h.kind.as_str());
        let has_body = h.onentry.is_some() || h.onexit.is_some() || !h.transitions.is_empty();
        self.element("history", attrs, has_body, |w| {
            w.blocks(&h.onentry, &h.onexit);
            h.transitions.iter().for_each(|t| w.transition(t));
        });
    }

    fn transition(&mut self, t: &Transition) {
        let attrs = Attrs::new()
            .list("event", &t.events)
            .opt("cond", t.cond.as_deref())
            .list("target", &t.targets)
            .opt(
                "type",
                (t.kind == TransitionType::Internal).then_some(t.kind.as_str()),
            );
        self.element("transition", attrs, !t.actions.is_empty(), |w| {
            w.actions(&t.actions)
        });
    }

    fn blocks(&mut self, onentry: &Option<OnEntry>, onexit: &Option<OnExit>) {
        if let Some(block) = onentry {
            self.action_block("onentry", block.id.as_deref(), &block.actions);
        }
        if let Some(block) = onexit {
            self.action_block("onexit", block.id.as_deref(), &block.actions);
        }
    }

    fn finalize(&mut self, block: &Finalize) {
        self.action_block("finalize", block.id.as_deref(), &block.actions);
    }

    fn action_block(&mut self, name: &str, id: Option<&str>, actions: &[ExecutableContent]) {
        let attrs = Attrs::new().opt("id", id);
        self.element(name, attrs, !actions.is_empty(), |w| w.actions(actions));
    }

    fn datamodel(&mut self, dm: &Datamodel) {
        let attrs = Attrs::new().opt("id", dm.id.as_deref());
        self.element("datamodel", attrs, !dm.data.is_empty(), |w| {
            dm.data.iter().for_each(|d| w.data(d));
        });
    }

    fn data(&mut self, d: &Data) {
        let attrs = Attrs::new()
            .req("id", &d.id)
            .opt("src", d.src.as_deref())
            .opt("expr", d.expr.as_deref())
            .opt("location", d.location.as_deref());
        self.text_element("data", attrs, d.content.as_deref());
    }

    fn invoke(&mut self, i: &Invoke) {
        let attrs = Attrs::new()
            .opt("id", i.id.as_deref())
            .opt("idlocation", i.idlocation.as_deref())
            .opt("type", i.kind.as_deref())
            .opt("typeexpr", i.typeexpr.as_deref())
            .opt("src", i.src.as_deref())
            .opt("srcexpr", i.srcexpr.as_deref())
            .opt("namelist", i.namelist.as_deref())
            .opt("autoforward", i.autoforward.then_some("true"));
        let has_body = !i.params.is_empty() || i.finalize.is_some() || i.content.is_some();
        self.element("invoke", attrs, has_body, |w| {
            i.params.iter().for_each(|p| w.param(p));
            if let Some(finalize) = &i.finalize {
                w.finalize(finalize);
            }
            if let Some(content) = &i.content {
                w.content(content);
            }
        });
    }

    fn param(&mut self, p: &Param) {
        let attrs = Attrs::new()
            .req("name", &p.name)
            .opt("expr", p.expr.as_deref())
            .opt("location", p.location.as_deref());
        self.empty("param", &attrs);
    }

    fn content(&mut self, c: &Content) {
        let attrs = Attrs::new().opt("expr", c.expr.as_deref());
        self.text_element("content", attrs, c.body.as_deref());
    }

    fn script(&mut self, s: &Script) {
        let attrs = Attrs::new().opt("src", s.src.as_deref());
        self.text_element("script", attrs, Some(s.content.as_str()));
    }

    fn actions(&mut self, actions: &[ExecutableContent]) {
        for action in actions {
            self.action(action);
        }
    }

    fn action(&mut self, action: &ExecutableContent) {
        match action {
            ExecutableContent::Raise(r) => {
                self.empty("raise", &Attrs::new().req("event", &r.event));
            }
            ExecutableContent::Send(s) => self.send(s),
            ExecutableContent::Log(l) => {
                let attrs = Attrs::new()
                    .opt("label", l.label.as_deref())
                    .opt("expr", l.expr.as_deref());
                self.empty("log", &attrs);
            }
            ExecutableContent::Cancel(c) => {
                let attrs = Attrs::new()
                    .opt("sendid", c.sendid.as_deref())
                    .opt("sendidexpr", c.sendidexpr.as_deref());
                self.empty("cancel", &attrs);
            }
            ExecutableContent::Assign(a) => {
                let attrs = Attrs::new()
                    .req("location", &a.location)
                    .opt("expr", a.expr.as_deref())
                    .opt("src", a.src.as_deref());
                self.empty("assign", &attrs);
            }
            ExecutableContent::If(i) => self.conditional(i),
            ExecutableContent::Foreach(f) => {
                let attrs = Attrs::new()
                    .req("array", &f.array)
                    .req("item", &f.item)
                    .opt("index", f.index.as_deref());
                self.element("foreach", attrs, !f.actions.is_empty(), |w| {
                    w.actions(&f.actions)
                });
            }
            ExecutableContent::Script(s) => self.script(s),
            ExecutableContent::Custom(c) => self.custom(c),
        }
    }

    fn send(&mut self, s: &SendEvent) {
        let attrs = Attrs::new()
            .opt("event", s.event.as_deref())
            .opt("eventexpr", s.eventexpr.as_deref())
            .opt("target", s.target.as_deref())
            .opt("targetexpr", s.targetexpr.as_deref())
            .opt("type", s.kind.as_deref())
            .opt("typeexpr", s.typeexpr.as_deref())
            .opt("id", s.id.as_deref())
            .opt("idlocation", s.idlocation.as_deref())
            .opt("delay", s.delay.as_deref())
            .opt("delayexpr", s.delayexpr.as_deref())
            .opt("namelist", s.namelist.as_deref());
        let has_body = !s.params.is_empty() || s.content.is_some();
        self.element("send", attrs, has_body, |w| {
            s.params.iter().for_each(|p| w.param(p));
            if let Some(content) = &s.content {
                w.content(content);
            }
        });
    }

    /// Flat form: `<elseif/>` and `<else/>` separate the branches.
    fn conditional(&mut self, i: &If) {
        let attrs = Attrs::new().req("cond", &i.cond);
        let has_body =
            !i.actions.is_empty() || !i.else_ifs.is_empty() || i.else_branch.is_some();
        self.element("if", attrs, has_body, |w| {
            w.actions(&i.actions);
            for branch in &i.else_ifs {
                w.empty("elseif", &Attrs::new().req("cond", &branch.cond));
                w.actions(&branch.actions);
            }
            if let Some(branch) = &i.else_branch {
                w.empty("else", &Attrs::new());
                w.actions(&branch.actions);
            }
        });
    }

    fn custom(&mut self, c: &Custom) {
        if c.shadows_action() {
            tracing::warn!(element = %c.name, "extension element uses a built-in action name");
        }

        // A repeated name is written once, at its first position, with its last value.
        let mut attrs = Attrs::new();
        for (i, (name, first)) in c.attributes.iter().enumerate() {
            if c.attributes[..i].iter().any(|(earlier, _)| earlier == name) {
                continue;
            }
            let value = match c.attributes[i + 1..].iter().rev().find(|(k, _)| k == name) {
                Some((_, last)) => {
                    tracing::warn!(element = %c.name, attribute = %name, "duplicate attribute");
                    last
                }
                None => first,
            };
            attrs = attrs.raw(name.as_str(), value.as_str());
        }
        match &c.body {
            Some(CustomBody::Text(text)) => self.text_element(&c.name, attrs, Some(text.as_str())),
            Some(CustomBody::Children(children)) => {
                self.element(&c.name, attrs, !children.is_empty(), |w| {
                    w.actions(children)
                });
            }
            None => self.empty(&c.name, &attrs),
        }
    }
}
