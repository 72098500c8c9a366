//! Markup → document.
//!
//! One top-down typed walk over the generic element tree. Attribute values
//! that are present but empty are read as absent. Unknown elements where
//! executable content is expected become [`Custom`] values; unknown elements
//! anywhere else are skipped.

use std::fmt::Display;
use std::str::FromStr;

use scxmlkit_model::{
    Assign, Binding, Cancel, Content, Custom, CustomBody, Data, Datamodel, Document, Else, ElseIf,
    ExecutableContent, Final, Finalize, Foreach, History, HistoryType, If, Invoke, Log, OnEntry,
    OnExit, Parallel, Param, Raise, Script, SendEvent, State, StateChild, Transition,
    TransitionType,
};
use tracing::{debug, trace, warn};

use crate::error::CodecError;
use crate::xml::{MarkupParser, QuickXmlParser, XmlElement};

/// Tag name of the document root.
pub const ROOT_TAG: &str = "scxml";

/// Parses markup text with the default tokenizer.
pub fn parse(text: &str) -> Result<Document, CodecError> {
    parse_with(&QuickXmlParser::new(), text)
}

/// Parses markup text with the given tokenizer.
pub fn parse_with<P>(parser: &P, text: &str) -> Result<Document, CodecError>
where
    P: MarkupParser + ?Sized,
{
    let root = parser.parse_tree(text)?;
    if root.name != ROOT_TAG {
        return Err(CodecError::Format { found: root.name });
    }

    let doc = read_document(&root);
    debug!(
        children = doc.children.len(),
        namespaces = doc.namespaces.len(),
        "parsed document"
    );
    Ok(doc)
}

fn attr(el: &XmlElement, name: &str) -> Option<String> {
    el.attr(name)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn attr_or_default(el: &XmlElement, name: &str) -> String {
    attr(el, name).unwrap_or_default()
}

fn tokens(el: &XmlElement, name: &str) -> Vec<String> {
    el.attr(name)
        .map(|v| v.split_whitespace().map(str::to_string).collect())
        .unwrap_or_default()
}

/// Reads an enumerated attribute, falling back to the default on unknown
/// values.
fn enum_attr<T>(el: &XmlElement, name: &str) -> T
where
    T: FromStr + Default,
    T::Err: Display,
{
    match attr(el, name) {
        Some(value) => value.parse().unwrap_or_else(|err| {
            warn!(element = %el.name, attribute = name, "{}; using default", err);
            T::default()
        }),
        None => T::default(),
    }
}

/// Inline text body; empty text reads as absent.
fn body_text(el: &XmlElement) -> Option<String> {
    if el.has_elements() {
        warn!(element = %el.name, "markup inside a text body is not supported; dropped");
    }
    Some(el.text()).filter(|t| !t.is_empty())
}

/// Stores a singleton child, keeping the first occurrence.
fn set_once<T>(slot: &mut Option<T>, value: T, tag: &str, owner: &str) {
    if slot.is_some() {
        warn!(owner, element = tag, "duplicate element dropped");
        return;
    }
    *slot = Some(value);
}

fn read_document(root: &XmlElement) -> Document {
    let mut doc = Document::new();

    if let Some(version) = attr(root, "version") {
        doc.version = version;
    }
    doc.name = attr(root, "name");
    doc.profile = attr(root, "profile");
    doc.datamodel_type = attr(root, "datamodel");
    doc.initial = attr(root, "initial");
    doc.binding = attr(root, "binding")
        .or_else(|| attr(root, "bindings"))
        .and_then(|value| match value.parse::<Binding>() {
            Ok(binding) => Some(binding),
            Err(err) => {
                warn!("{}; ignoring", err);
                None
            }
        });

    for (key, value) in &root.attributes {
        if let Some(prefix) = key.strip_prefix("xmlns:") {
            if !prefix.is_empty() && !value.is_empty() {
                doc.namespaces.insert(prefix.to_string(), value.clone());
            }
        }
    }

    for el in root.elements() {
        match el.name.as_str() {
            "state" | "parallel" | "final" => doc.children.push(read_child(el)),
            "datamodel" => set_once(&mut doc.datamodel, read_datamodel(el), "datamodel", ROOT_TAG),
            "script" => set_once(&mut doc.script, read_script(el), "script", ROOT_TAG),
            other => trace!(element = other, "ignoring element in <scxml>"),
        }
    }

    doc
}

fn read_child(el: &XmlElement) -> StateChild {
    match el.name.as_str() {
        "parallel" => StateChild::Parallel(read_parallel(el)),
        "final" => StateChild::Final(read_final(el)),
        _ => StateChild::State(read_state(el)),
    }
}

/// Children shared by `<state>` and `<parallel>`.
#[derive(Default)]
struct Body {
    transitions: Vec<Transition>,
    children: Vec<StateChild>,
    histories: Vec<History>,
    invokes: Vec<Invoke>,
    onentry: Option<OnEntry>,
    onexit: Option<OnExit>,
    datamodel: Option<Datamodel>,
    /// Targets of an `<initial>` child element.
    initial: Option<String>,
}

fn read_body(el: &XmlElement, owner: &str) -> Body {
    let mut body = Body::default();
    for child in el.elements() {
        match child.name.as_str() {
            "state" | "parallel" | "final" => body.children.push(read_child(child)),
            "transition" => body.transitions.push(read_transition(child)),
            "history" => body.histories.push(read_history(child)),
            "invoke" => body.invokes.push(read_invoke(child)),
            "onentry" => set_once(&mut body.onentry, read_onentry(child), "onentry", owner),
            "onexit" => set_once(&mut body.onexit, read_onexit(child), "onexit", owner),
            "datamodel" => set_once(&mut body.datamodel, read_datamodel(child), "datamodel", owner),
            "initial" => {
                let targets: Vec<String> = child
                    .elements()
                    .filter(|t| t.name == "transition")
                    .flat_map(|t| tokens(t, "target"))
                    .collect();
                if !targets.is_empty() {
                    set_once(&mut body.initial, targets.join(" "), "initial", owner);
                }
            }
            other => trace!(owner, element = other, "ignoring element"),
        }
    }
    body
}

fn read_state(el: &XmlElement) -> State {
    let id = attr_or_default(el, "id");
    let body = read_body(el, &id);
    State {
        initial: attr(el, "initial").or(body.initial),
        transitions: body.transitions,
        children: body.children,
        histories: body.histories,
        invokes: body.invokes,
        onentry: body.onentry,
        onexit: body.onexit,
        datamodel: body.datamodel,
        id,
    }
}

fn read_parallel(el: &XmlElement) -> Parallel {
    let id = attr_or_default(el, "id");
    let body = read_body(el, &id);
    if body.initial.is_some() {
        warn!(owner = %id, "<initial> has no meaning in <parallel>; dropped");
    }
    Parallel {
        transitions: body.transitions,
        children: body.children,
        histories: body.histories,
        invokes: body.invokes,
        onentry: body.onentry,
        onexit: body.onexit,
        datamodel: body.datamodel,
        id,
    }
}

fn read_final(el: &XmlElement) -> Final {
    let mut f = Final::new(attr_or_default(el, "id"));
    for child in el.elements() {
        match child.name.as_str() {
            "onentry" => set_once(&mut f.onentry, read_onentry(child), "onentry", &f.id),
            "onexit" => set_once(&mut f.onexit, read_onexit(child), "onexit", &f.id),
            other => trace!(owner = %f.id, element = other, "ignoring element"),
        }
    }
    f
}

fn read_history(el: &XmlElement) -> History {
    let mut h = History::new(attr_or_default(el, "id")).with_type(enum_attr::<HistoryType>(el, "type"));
    for child in el.elements() {
        match child.name.as_str() {
            "transition" => h.transitions.push(read_transition(child)),
            "onentry" => set_once(&mut h.onentry, read_onentry(child), "onentry", &h.id),
            "onexit" => set_once(&mut h.onexit, read_onexit(child), "onexit", &h.id),
            other => trace!(owner = %h.id, element = other, "ignoring element"),
        }
    }
    h
}

fn read_transition(el: &XmlElement) -> Transition {
    Transition {
        id: attr(el, "id"),
        events: tokens(el, "event"),
        cond: attr(el, "cond"),
        targets: tokens(el, "target"),
        kind: enum_attr::<TransitionType>(el, "type"),
        actions: read_actions(el),
    }
}

fn read_onentry(el: &XmlElement) -> OnEntry {
    OnEntry {
        id: attr(el, "id"),
        actions: read_actions(el),
    }
}

fn read_onexit(el: &XmlElement) -> OnExit {
    OnExit {
        id: attr(el, "id"),
        actions: read_actions(el),
    }
}

fn read_finalize(el: &XmlElement) -> Finalize {
    Finalize {
        id: attr(el, "id"),
        actions: read_actions(el),
    }
}

fn read_datamodel(el: &XmlElement) -> Datamodel {
    let mut dm = Datamodel::new();
    dm.id = attr(el, "id");
    for child in el.elements() {
        if child.name == "data" {
            dm.data.push(read_data(child));
        } else {
            trace!(element = %child.name, "ignoring element in <datamodel>");
        }
    }
    dm
}

fn read_data(el: &XmlElement) -> Data {
    Data {
        id: attr_or_default(el, "id"),
        src: attr(el, "src"),
        expr: attr(el, "expr"),
        location: attr(el, "location"),
        content: body_text(el),
    }
}

fn read_invoke(el: &XmlElement) -> Invoke {
    let mut invoke = Invoke {
        id: attr(el, "id"),
        idlocation: attr(el, "idlocation"),
        kind: attr(el, "type"),
        typeexpr: attr(el, "typeexpr"),
        src: attr(el, "src"),
        srcexpr: attr(el, "srcexpr"),
        namelist: attr(el, "namelist"),
        autoforward: el.attr("autoforward") == Some("true"),
        ..Default::default()
    };
    let owner = invoke.id.clone().unwrap_or_else(|| "invoke".to_string());
    for child in el.elements() {
        match child.name.as_str() {
            "param" => invoke.params.push(read_param(child)),
            "finalize" => set_once(&mut invoke.finalize, read_finalize(child), "finalize", &owner),
            "content" => set_once(&mut invoke.content, read_content(child), "content", &owner),
            other => trace!(owner = %owner, element = other, "ignoring element"),
        }
    }
    invoke
}

fn read_param(el: &XmlElement) -> Param {
    Param {
        name: attr_or_default(el, "name"),
        expr: attr(el, "expr"),
        location: attr(el, "location"),
    }
}

fn read_content(el: &XmlElement) -> Content {
    Content {
        expr: attr(el, "expr"),
        body: body_text(el),
    }
}

fn read_script(el: &XmlElement) -> Script {
    Script {
        src: attr(el, "src"),
        content: body_text(el).unwrap_or_default(),
    }
}

fn read_actions(el: &XmlElement) -> Vec<ExecutableContent> {
    el.elements().map(read_action).collect()
}

fn read_action(el: &XmlElement) -> ExecutableContent {
    match el.name.as_str() {
        "raise" => ExecutableContent::Raise(Raise {
            event: attr_or_default(el, "event"),
        }),
        "send" => ExecutableContent::Send(read_send(el)),
        "log" => ExecutableContent::Log(Log {
            label: attr(el, "label"),
            expr: attr(el, "expr"),
        }),
        "cancel" => ExecutableContent::Cancel(Cancel {
            sendid: attr(el, "sendid"),
            sendidexpr: attr(el, "sendidexpr"),
        }),
        "assign" => ExecutableContent::Assign(Assign {
            location: attr_or_default(el, "location"),
            expr: attr(el, "expr"),
            src: attr(el, "src"),
        }),
        "if" => ExecutableContent::If(read_if(el)),
        "foreach" => ExecutableContent::Foreach(Foreach {
            array: attr_or_default(el, "array"),
            item: attr_or_default(el, "item"),
            index: attr(el, "index"),
            actions: read_actions(el),
        }),
        "script" => ExecutableContent::Script(read_script(el)),
        _ => ExecutableContent::Custom(read_custom(el)),
    }
}

fn read_send(el: &XmlElement) -> SendEvent {
    let mut send = SendEvent {
        event: attr(el, "event"),
        eventexpr: attr(el, "eventexpr"),
        target: attr(el, "target"),
        targetexpr: attr(el, "targetexpr"),
        kind: attr(el, "type"),
        typeexpr: attr(el, "typeexpr"),
        id: attr(el, "id"),
        idlocation: attr(el, "idlocation"),
        delay: attr(el, "delay"),
        delayexpr: attr(el, "delayexpr"),
        namelist: attr(el, "namelist"),
        ..Default::default()
    };
    for child in el.elements() {
        match child.name.as_str() {
            "param" => send.params.push(read_param(child)),
            "content" => set_once(&mut send.content, read_content(child), "content", "send"),
            other => trace!(element = other, "ignoring element in <send>"),
        }
    }
    send
}

/// Accepts the flat form (`<elseif/>` and `<else/>` as separators) and the
/// nested form (branch actions inside `<elseif>`/`<else>`).
fn read_if(el: &XmlElement) -> If {
    let mut cond = If::new(attr_or_default(el, "cond"));
    for child in el.elements() {
        match child.name.as_str() {
            "elseif" => {
                if cond.else_branch.is_some() {
                    warn!("<elseif> after <else> moved before it");
                }
                cond.else_ifs.push(ElseIf {
                    cond: attr_or_default(child, "cond"),
                    actions: read_actions(child),
                });
            }
            "else" => {
                let branch = Else {
                    actions: read_actions(child),
                };
                set_once(&mut cond.else_branch, branch, "else", "if");
            }
            _ => {
                let action = read_action(child);
                if let Some(branch) = cond.else_branch.as_mut() {
                    branch.actions.push(action);
                } else if let Some(branch) = cond.else_ifs.last_mut() {
                    branch.actions.push(action);
                } else {
                    cond.actions.push(action);
                }
            }
        }
    }
    cond
}

fn read_custom(el: &XmlElement) -> Custom {
    let body = if el.has_elements() {
        Some(CustomBody::Children(read_actions(el)))
    } else {
        Some(el.text())
            .filter(|t| !t.is_empty())
            .map(CustomBody::Text)
    };
    Custom {
        name: el.name.clone(),
        attributes: el.attributes.clone(),
        body,
    }
}
