//! External service invocation descriptors.

use crate::blocks::Finalize;
use serde::{Deserialize, Serialize};

/// `<invoke>`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Invoke {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Location that receives a platform-generated id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub idlocation: Option<String>,
    /// The `type` attribute.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub typeexpr: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub srcexpr: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namelist: Option<String>,
    pub autoforward: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<Param>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finalize: Option<Finalize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<Content>,
}

impl Invoke {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_type(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    pub fn with_src(mut self, src: impl Into<String>) -> Self {
        self.src = Some(src.into());
        self
    }

    pub fn with_srcexpr(mut self, srcexpr: impl Into<String>) -> Self {
        self.srcexpr = Some(srcexpr.into());
        self
    }

    pub fn with_idlocation(mut self, location: impl Into<String>) -> Self {
        self.idlocation = Some(location.into());
        self
    }

    pub fn with_namelist(mut self, namelist: impl Into<String>) -> Self {
        self.namelist = Some(namelist.into());
        self
    }

    pub fn with_autoforward(mut self, autoforward: bool) -> Self {
        self.autoforward = autoforward;
        self
    }

    pub fn with_param(mut self, param: Param) -> Self {
        self.params.push(param);
        self
    }

    pub fn with_finalize(mut self, finalize: Finalize) -> Self {
        self.finalize = Some(finalize);
        self
    }

    pub fn with_content(mut self, content: Content) -> Self {
        self.content = Some(content);
        self
    }
}

/// `<param>`: a named value passed to a sent event or invoked service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Param {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expr: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl Param {
    pub fn expr(name: impl Into<String>, expr: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            expr: Some(expr.into()),
            location: None,
        }
    }

    pub fn location(name: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            expr: None,
            location: Some(location.into()),
        }
    }
}

/// `<content>`: inline payload text or an expression that yields it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expr: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

impl Content {
    pub fn inline(body: impl Into<String>) -> Self {
        Self {
            expr: None,
            body: Some(body.into()),
        }
    }

    pub fn expr(expr: impl Into<String>) -> Self {
        Self {
            expr: Some(expr.into()),
            body: None,
        }
    }
}
