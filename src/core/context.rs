//! Per-request execution state

use super::schema::Schema;
use crate::executor::response::GraphQLError;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Flag used to abandon an execution
///
/// Cancelling stops further resolver invocations; resolvers already running
/// are left to finish and their results are discarded.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    cancelled: Arc<AtomicBool>,
}

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// Caller-supplied ambient data, passed unchanged to every resolver of a request
///
/// Values are keyed by their type, e.g. request headers or an auth principal.
#[derive(Clone, Default)]
pub struct ContextData {
    values: HashMap<TypeId, Arc<dyn Any + Send + Sync>>,
    cancel: CancelHandle,
}

impl ContextData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a value; a second value of the same type replaces the first
    pub fn insert<T: Any + Send + Sync>(mut self, value: T) -> Self {
        self.values.insert(TypeId::of::<T>(), Arc::new(value));
        self
    }

    pub fn get<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.values
            .get(&TypeId::of::<T>())
            .and_then(|value| value.downcast_ref::<T>())
    }

    /// Handle that cancels executions started with this data
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }
}

impl std::fmt::Debug for ContextData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextData")
            .field("values", &self.values.len())
            .field("cancelled", &self.cancel.is_cancelled())
            .finish()
    }
}

/// State of one execution: schema snapshot, ambient data and collected errors
pub struct ExecutionContext {
    schema: Arc<Schema>,
    data: ContextData,
    errors: Mutex<Vec<GraphQLError>>,
}

impl ExecutionContext {
    pub fn new(schema: Arc<Schema>, data: ContextData) -> Self {
        Self {
            schema,
            data,
            errors: Mutex::new(Vec::new()),
        }
    }

    /// The schema snapshot this execution started with
    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Ambient value of type `T`, if the caller supplied one
    pub fn data<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.data.get::<T>()
    }

    pub fn is_cancelled(&self) -> bool {
        self.data.cancel.is_cancelled()
    }

    pub fn push_error(&self, error: GraphQLError) {
        self.errors
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(error);
    }

    pub fn error_count(&self) -> usize {
        self.errors
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    /// Take the collected errors, leaving the list empty
    pub fn take_errors(&self) -> Vec<GraphQLError> {
        std::mem::take(
            &mut *self
                .errors
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner()),
        )
    }
}
