//! Executable content: the action vocabulary attached to transitions and
//! entry/exit/finalize blocks.
//!
//! Every expression-bearing field (`cond`, `expr`, `location`, `array`, ...)
//! is opaque text. Nothing here parses or evaluates it.

use crate::invoke::{Content, Param};
use serde::{Deserialize, Serialize};

/// One executable-content element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum ExecutableContent {
    Raise(Raise),
    Send(SendEvent),
    Log(Log),
    Cancel(Cancel),
    Assign(Assign),
    If(If),
    Foreach(Foreach),
    Script(Script),
    /// Any element the format does not define, kept verbatim.
    Custom(Custom),
}

impl ExecutableContent {
    pub fn raise(event: impl Into<String>) -> Self {
        ExecutableContent::Raise(Raise::new(event))
    }

    pub fn log(label: Option<&str>, expr: Option<&str>) -> Self {
        ExecutableContent::Log(Log {
            label: label.map(str::to_string),
            expr: expr.map(str::to_string),
        })
    }

    pub fn cancel(sendid: impl Into<String>) -> Self {
        ExecutableContent::Cancel(Cancel {
            sendid: Some(sendid.into()),
            sendidexpr: None,
        })
    }

    pub fn assign(location: impl Into<String>, expr: impl Into<String>) -> Self {
        ExecutableContent::Assign(Assign::new(location).with_expr(expr))
    }

    pub fn script(content: impl Into<String>) -> Self {
        ExecutableContent::Script(Script::new(content))
    }

    /// Returns the element name this content serializes as.
    pub fn tag(&self) -> &str {
        match self {
            ExecutableContent::Raise(_) => "raise",
            ExecutableContent::Send(_) => "send",
            ExecutableContent::Log(_) => "log",
            ExecutableContent::Cancel(_) => "cancel",
            ExecutableContent::Assign(_) => "assign",
            ExecutableContent::If(_) => "if",
            ExecutableContent::Foreach(_) => "foreach",
            ExecutableContent::Script(_) => "script",
            ExecutableContent::Custom(c) => &c.name,
        }
    }

    /// Returns nested action lists (if/elseif/else bodies, loop bodies,
    /// custom children) in document order.
    pub fn nested(&self) -> Vec<&[ExecutableContent]> {
        match self {
            ExecutableContent::If(i) => {
                let mut out = vec![i.actions.as_slice()];
                out.extend(i.else_ifs.iter().map(|e| e.actions.as_slice()));
                if let Some(e) = &i.else_branch {
                    out.push(e.actions.as_slice());
                }
                out
            }
            ExecutableContent::Foreach(f) => vec![f.actions.as_slice()],
            ExecutableContent::Custom(Custom {
                body: Some(CustomBody::Children(children)),
                ..
            }) => vec![children.as_slice()],
            _ => Vec::new(),
        }
    }
}

/// `<raise>`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Raise {
    pub event: String,
}

impl Raise {
    pub fn new(event: impl Into<String>) -> Self {
        Self {
            event: event.into(),
        }
    }
}

/// `<send>`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SendEvent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eventexpr: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub targetexpr: Option<String>,
    /// The `type` attribute (I/O processor).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub typeexpr: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub idlocation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delay: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delayexpr: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namelist: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<Param>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<Content>,
}

impl SendEvent {
    pub fn new(event: impl Into<String>) -> Self {
        Self {
            event: Some(event.into()),
            ..Default::default()
        }
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn with_delay(mut self, delay: impl Into<String>) -> Self {
        self.delay = Some(delay.into());
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_namelist(mut self, namelist: impl Into<String>) -> Self {
        self.namelist = Some(namelist.into());
        self
    }

    pub fn with_param(mut self, param: Param) -> Self {
        self.params.push(param);
        self
    }

    pub fn with_content(mut self, content: Content) -> Self {
        self.content = Some(content);
        self
    }
}

/// `<log>`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Log {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expr: Option<String>,
}

/// `<cancel>`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Cancel {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sendid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sendidexpr: Option<String>,
}

/// `<assign>`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Assign {
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expr: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
}

impl Assign {
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            ..Default::default()
        }
    }

    pub fn with_expr(mut self, expr: impl Into<String>) -> Self {
        self.expr = Some(expr.into());
        self
    }

    pub fn with_src(mut self, src: impl Into<String>) -> Self {
        self.src = Some(src.into());
        self
    }
}

/// `<if>` with its ordered `<elseif>` branches and optional `<else>`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct If {
    pub cond: String,
    pub actions: Vec<ExecutableContent>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub else_ifs: Vec<ElseIf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub else_branch: Option<Else>,
}

impl If {
    pub fn new(cond: impl Into<String>) -> Self {
        Self {
            cond: cond.into(),
            ..Default::default()
        }
    }

    pub fn with_action(mut self, action: ExecutableContent) -> Self {
        self.actions.push(action);
        self
    }

    pub fn with_else_if(mut self, else_if: ElseIf) -> Self {
        self.else_ifs.push(else_if);
        self
    }

    pub fn with_else(mut self, else_branch: Else) -> Self {
        self.else_branch = Some(else_branch);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElseIf {
    pub cond: String,
    pub actions: Vec<ExecutableContent>,
}

impl ElseIf {
    pub fn new(cond: impl Into<String>) -> Self {
        Self {
            cond: cond.into(),
            actions: Vec::new(),
        }
    }

    pub fn with_action(mut self, action: ExecutableContent) -> Self {
        self.actions.push(action);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Else {
    pub actions: Vec<ExecutableContent>,
}

impl Else {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_action(mut self, action: ExecutableContent) -> Self {
        self.actions.push(action);
        self
    }
}

/// `<foreach>`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Foreach {
    pub array: String,
    pub item: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<String>,
    pub actions: Vec<ExecutableContent>,
}

impl Foreach {
    pub fn new(array: impl Into<String>, item: impl Into<String>) -> Self {
        Self {
            array: array.into(),
            item: item.into(),
            ..Default::default()
        }
    }

    pub fn with_index(mut self, index: impl Into<String>) -> Self {
        self.index = Some(index.into());
        self
    }

    pub fn with_action(mut self, action: ExecutableContent) -> Self {
        self.actions.push(action);
        self
    }
}

/// `<script>`, either inline or loaded from `src`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Script {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    pub content: String,
}

impl Script {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            src: None,
            content: content.into(),
        }
    }

    pub fn from_src(src: impl Into<String>) -> Self {
        Self {
            src: Some(src.into()),
            content: String::new(),
        }
    }
}

/// Tags of the built-in executable elements.
pub const ACTION_TAGS: &[&str] = &["raise", "send", "log", "cancel", "assign", "if", "foreach", "script"];

/// An extension element: tag name and attributes kept verbatim, in order.
/// Attribute names are unique.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Custom {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<CustomBody>,
}

impl Custom {
    /// Creates an extension element.
    ///
    /// The name should not be one of [`ACTION_TAGS`]: such an element is
    /// read back as the built-in action, and attributes it does not define
    /// are lost.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Sets an attribute. An existing attribute keeps its position and
    /// takes the new value.
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| *k == name) {
            Some((_, existing)) => *existing = value,
            None => self.attributes.push((name, value)),
        }
    }

    /// True when the name collides with a built-in action tag.
    pub fn shadows_action(&self) -> bool {
        ACTION_TAGS.contains(&self.name.as_str())
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.body = Some(CustomBody::Text(text.into()));
        self
    }

    pub fn with_children(mut self, children: Vec<ExecutableContent>) -> Self {
        self.body = Some(CustomBody::Children(children));
        self
    }

    /// Looks up an attribute value by name.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Body of a [`Custom`] element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CustomBody {
    Text(String),
    Children(Vec<ExecutableContent>),
}
