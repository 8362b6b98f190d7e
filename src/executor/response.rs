//! Response shapes returned by execution
//!
//! A [`Response`] serializes to the conventional `{"data": ..., "errors": [...]}`
//! envelope. `data` is absent when the request never reached execution (syntax
//! or validation failure) and `errors` is absent when there are none.

use crate::core::error::{SyntaxError, ValidationError};
use indexmap::IndexMap;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::fmt;

/// One step of an error path: an object key or a list index
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        PathSegment::Key(key.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(key: String) -> Self {
        PathSegment::Key(key)
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        PathSegment::Index(index)
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(key) => write!(f, "{}", key),
            PathSegment::Index(index) => write!(f, "{}", index),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorExtensions {
    pub code: String,
}

/// An error entry in the response `errors` list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphQLError {
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub locations: Vec<Location>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<Vec<PathSegment>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions: Option<ErrorExtensions>,
}

impl GraphQLError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            locations: Vec::new(),
            path: None,
            extensions: None,
        }
    }

    pub fn with_path(mut self, path: Vec<PathSegment>) -> Self {
        self.path = Some(path);
        self
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.extensions = Some(ErrorExtensions { code: code.into() });
        self
    }

    pub fn with_location(mut self, line: usize, column: usize) -> Self {
        self.locations.push(Location { line, column });
        self
    }

    pub fn code(&self) -> Option<&str> {
        self.extensions.as_ref().map(|e| e.code.as_str())
    }
}

impl From<&SyntaxError> for GraphQLError {
    fn from(err: &SyntaxError) -> Self {
        GraphQLError::new(err.to_string())
            .with_location(err.line, err.column)
            .with_code("GRAPHQL_PARSE_FAILED")
    }
}

impl From<&ValidationError> for GraphQLError {
    fn from(err: &ValidationError) -> Self {
        let error = GraphQLError::new(err.message.clone()).with_code(err.kind.error_code());
        if err.path.is_empty() {
            error
        } else {
            error.with_path(err.path.iter().cloned().map(PathSegment::Key).collect())
        }
    }
}

/// Completed value tree mirroring the shape of the request
#[derive(Debug, Clone, PartialEq)]
pub enum ResultNode {
    Null,
    Scalar(Value),
    List(Vec<ResultNode>),
    /// Keys in request order
    Object(IndexMap<String, ResultNode>),
}

impl ResultNode {
    pub fn is_null(&self) -> bool {
        matches!(self, ResultNode::Null)
    }

    pub fn get(&self, key: &str) -> Option<&ResultNode> {
        match self {
            ResultNode::Object(fields) => fields.get(key),
            _ => None,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            ResultNode::Null => Value::Null,
            ResultNode::Scalar(value) => value.clone(),
            ResultNode::List(items) => Value::Array(items.iter().map(ResultNode::to_json).collect()),
            ResultNode::Object(fields) => Value::Object(
                fields
                    .iter()
                    .map(|(key, node)| (key.clone(), node.to_json()))
                    .collect(),
            ),
        }
    }
}

impl Serialize for ResultNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ResultNode::Null => serializer.serialize_unit(),
            ResultNode::Scalar(value) => value.serialize(serializer),
            ResultNode::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            ResultNode::Object(fields) => {
                let mut map = serializer.serialize_map(Some(fields.len()))?;
                for (key, node) in fields {
                    map.serialize_entry(key, node)?;
                }
                map.end()
            }
        }
    }
}

/// Result of running one request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ResultNode>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<GraphQLError>,
}

impl Response {
    pub fn from_data(data: ResultNode, errors: Vec<GraphQLError>) -> Self {
        Self {
            data: Some(data),
            errors,
        }
    }

    /// A request rejected before execution; carries no `data` entry
    pub fn from_errors(errors: Vec<GraphQLError>) -> Self {
        Self { data: None, errors }
    }

    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn to_json(&self) -> Value {
        let mut body = serde_json::Map::new();
        if let Some(data) = &self.data {
            body.insert("data".to_string(), data.to_json());
        }
        if !self.errors.is_empty() {
            body.insert(
                "errors".to_string(),
                serde_json::to_value(&self.errors).unwrap_or(Value::Null),
            );
        }
        Value::Object(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_error_path_mixes_keys_and_indices() {
        let error = GraphQLError::new("boom").with_path(vec!["users".into(), 1.into(), "name".into()]);
        assert_eq!(
            serde_json::to_value(&error).unwrap(),
            json!({"message": "boom", "path": ["users", 1, "name"]})
        );
    }

    #[test]
    fn test_response_omits_empty_errors() {
        let mut fields = IndexMap::new();
        fields.insert("hello".to_string(), ResultNode::Scalar(json!("world")));
        let response = Response::from_data(ResultNode::Object(fields), Vec::new());
        assert_eq!(
            serde_json::to_string(&response).unwrap(),
            r#"{"data":{"hello":"world"}}"#
        );
        assert_eq!(response.to_json(), json!({"data": {"hello": "world"}}));
    }

    #[test]
    fn test_rejected_request_has_no_data_key() {
        let response = Response::from_errors(vec![GraphQLError::new("bad")]);
        let value = serde_json::to_value(&response).unwrap();
        assert!(value.get("data").is_none());
        assert_eq!(value["errors"][0]["message"], "bad");
    }

    #[test]
    fn test_null_data_is_serialized() {
        let response = Response::from_data(ResultNode::Null, vec![GraphQLError::new("x")]);
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["data"], Value::Null);
        assert!(value.as_object().unwrap().contains_key("data"));
    }

    #[test]
    fn test_object_keys_keep_request_order() {
        let mut fields = IndexMap::new();
        fields.insert("zeta".to_string(), ResultNode::Null);
        fields.insert("alpha".to_string(), ResultNode::List(vec![ResultNode::Scalar(json!(1))]));
        let text = serde_json::to_string(&ResultNode::Object(fields)).unwrap();
        assert_eq!(text, r#"{"zeta":null,"alpha":[1]}"#);
    }
}
