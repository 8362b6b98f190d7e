//! Resolver binding
//!
//! A resolver produces one field's value from its parent value, the coerced
//! arguments and the per-request [`ExecutionContext`]. Resolvers are stored in
//! the [`FieldDefinition`](super::schema::FieldDefinition) they belong to, so
//! every schema build carries its own set.

use super::context::ExecutionContext;
use super::error::ResolverError;
use super::field::FieldValue;
use async_trait::async_trait;
use indexmap::IndexMap;
use std::sync::Arc;

/// Coerced argument values for one field invocation
///
/// Only arguments that were supplied in the query or have a default are present.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments {
    values: IndexMap<String, FieldValue>,
}

impl Arguments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: FieldValue) {
        self.values.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.values.get(name)
    }

    /// Get a string-like argument (String or ID)
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(FieldValue::as_string)
    }

    pub fn get_i64(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(FieldValue::as_integer)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromIterator<(String, FieldValue)> for Arguments {
    fn from_iter<I: IntoIterator<Item = (String, FieldValue)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// Produces the value of a field
///
/// Resolvers may suspend; the executor awaits them before descending into
/// the field's sub-selections.
#[async_trait]
pub trait Resolver: Send + Sync {
    async fn resolve(
        &self,
        parent: &FieldValue,
        args: &Arguments,
        ctx: &ExecutionContext,
    ) -> Result<FieldValue, ResolverError>;
}

/// Shared handle to a resolver
pub type SharedResolver = Arc<dyn Resolver>;

/// Adapter turning a synchronous closure into a [`Resolver`]
pub struct FnResolver<F>(F);

#[async_trait]
impl<F> Resolver for FnResolver<F>
where
    F: Fn(&FieldValue, &Arguments, &ExecutionContext) -> Result<FieldValue, ResolverError>
        + Send
        + Sync,
{
    async fn resolve(
        &self,
        parent: &FieldValue,
        args: &Arguments,
        ctx: &ExecutionContext,
    ) -> Result<FieldValue, ResolverError> {
        (self.0)(parent, args, ctx)
    }
}

/// Bind a synchronous closure as a resolver
///
/// ```rust,ignore
/// let hello = FieldDefinition::new("hello", FieldType::named("String"))
///     .resolver(resolver_fn(|_, _, _| Ok(FieldValue::string("world"))));
/// ```
pub fn resolver_fn<F>(f: F) -> SharedResolver
where
    F: Fn(&FieldValue, &Arguments, &ExecutionContext) -> Result<FieldValue, ResolverError>
        + Send
        + Sync
        + 'static,
{
    Arc::new(FnResolver(f))
}

/// Reads one key off an object parent; missing keys and non-object parents give null
///
/// This is the resolver bound to fields that do not declare their own.
#[derive(Debug, Clone)]
pub struct KeyResolver {
    key: String,
}

impl KeyResolver {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    pub fn shared(key: impl Into<String>) -> SharedResolver {
        Arc::new(Self::new(key))
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

#[async_trait]
impl Resolver for KeyResolver {
    async fn resolve(
        &self,
        parent: &FieldValue,
        _args: &Arguments,
        _ctx: &ExecutionContext,
    ) -> Result<FieldValue, ResolverError> {
        Ok(parent
            .as_object()
            .and_then(|object| object.get(&self.key))
            .cloned()
            .unwrap_or(FieldValue::Null))
    }
}
