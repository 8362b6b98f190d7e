//! Request tree produced by the parser

use indexmap::IndexMap;
use serde_json::{Value, json};

/// Argument literal as written in the query text
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Null,
    Int(i64),
    Float(f64),
    String(String),
    Boolean(bool),
}

impl Literal {
    /// Wire form handed to a scalar's `parse_input`
    pub fn to_json(&self) -> Value {
        match self {
            Literal::Null => Value::Null,
            Literal::Int(i) => json!(i),
            Literal::Float(f) => json!(f),
            Literal::String(s) => json!(s),
            Literal::Boolean(b) => json!(b),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Literal::Null)
    }
}

/// One selected field
///
/// The operation root is an anonymous node (empty `name`) whose children are
/// the top-level selections.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestNode {
    pub name: String,
    pub alias: Option<String>,
    /// Arguments in order of appearance
    pub arguments: IndexMap<String, Literal>,
    pub children: Vec<RequestNode>,
    /// Byte offset of the field in the query text
    pub position: usize,
}

impl RequestNode {
    pub fn field(name: impl Into<String>, position: usize) -> Self {
        Self {
            name: name.into(),
            alias: None,
            arguments: IndexMap::new(),
            children: Vec::new(),
            position,
        }
    }

    pub fn root(children: Vec<RequestNode>) -> Self {
        Self {
            name: String::new(),
            alias: None,
            arguments: IndexMap::new(),
            children,
            position: 0,
        }
    }

    /// Key of this field in the result object: the alias if given, else the name
    pub fn response_key(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// A parsed query operation
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    pub name: Option<String>,
    pub root: RequestNode,
}

impl Operation {
    /// Top-level selections
    pub fn selections(&self) -> &[RequestNode] {
        &self.root.children
    }
}
