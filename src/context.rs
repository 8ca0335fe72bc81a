//! Request-scoped context store.
//!
//! A [`Context`] is an immutable, singly-linked chain of bindings. Every
//! middleware layer that wants to attach data calls [`Context::derive`], which
//! returns a *new* context pointing at its parent:
//!
//! ```text
//! root ──▶ correlation_id ──▶ logger        (each arrow is an Arc)
//! ```
//!
//! Lookups walk from the newest binding back to the root, so a child sees all
//! of its parent's bindings while the parent never sees the child's. Nothing
//! is ever mutated after construction, which is why the chain can be shared
//! across `.await` points and threads without a lock.
//!
//! Keys are zero-sized marker types implementing [`Key`]. The key type fixes
//! the value type at compile time, so callers get a typed reference back
//! instead of casting an `Any` themselves.

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

use crate::correlation::CorrelationId;
use crate::logging::Logger;

/// A well-known context key. The associated `Value` is the type stored under it.
pub trait Key: 'static {
    /// Human-readable name, used in error messages.
    const NAME: &'static str;
    type Value: Send + Sync + 'static;
}

/// Key for the request's resolved [`CorrelationId`].
pub struct CorrelationIdKey;

impl Key for CorrelationIdKey {
    const NAME: &'static str = "correlation_id";
    type Value = CorrelationId;
}

/// Key for the request's contextual [`Logger`].
pub struct LoggerKey;

impl Key for LoggerKey {
    const NAME: &'static str = "logger";
    type Value = Logger;
}

/// Raised when a layer asks for a binding no earlier layer provided.
///
/// This is a wiring defect, not a runtime condition: the middleware chain is
/// ordered wrongly or a stage is missing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContextError {
    #[error("request context has no `{0}` binding")]
    Missing(&'static str),
}

struct Binding {
    key: TypeId,
    value: Box<dyn Any + Send + Sync>,
    parent: Option<Arc<Binding>>,
}

/// Immutable per-request key-value carrier. Cloning is one `Arc` increment.
#[derive(Clone, Default)]
pub struct Context {
    head: Option<Arc<Binding>>,
}

impl Context {
    /// An empty root context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a child context that resolves `K` to `value` and delegates
    /// every other lookup to `self`. `self` is left untouched.
    pub fn derive<K: Key>(&self, value: K::Value) -> Self {
        let binding = Binding {
            key: TypeId::of::<K>(),
            value: Box::new(value),
            parent: self.head.clone(),
        };
        Self { head: Some(Arc::new(binding)) }
    }

    /// Resolves `K`, newest binding first.
    pub fn lookup<K: Key>(&self) -> Result<&K::Value, ContextError> {
        let wanted = TypeId::of::<K>();
        let mut node = self.head.as_deref();
        while let Some(binding) = node {
            if binding.key == wanted {
                return binding
                    .value
                    .downcast_ref::<K::Value>()
                    .ok_or(ContextError::Missing(K::NAME));
            }
            node = binding.parent.as_deref();
        }
        Err(ContextError::Missing(K::NAME))
    }

    pub fn with_correlation_id(&self, id: CorrelationId) -> Self {
        self.derive::<CorrelationIdKey>(id)
    }

    pub fn correlation_id(&self) -> Result<&CorrelationId, ContextError> {
        self.lookup::<CorrelationIdKey>()
    }

    pub fn with_logger(&self, logger: Logger) -> Self {
        self.derive::<LoggerKey>(logger)
    }

    pub fn logger(&self) -> Result<&Logger, ContextError> {
        self.lookup::<LoggerKey>()
    }

    fn depth(&self) -> usize {
        let mut depth = 0;
        let mut node = self.head.as_deref();
        while let Some(binding) = node {
            depth += 1;
            node = binding.parent.as_deref();
        }
        depth
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut dbg = f.debug_struct("Context");
        dbg.field("bindings", &self.depth());
        if let Ok(id) = self.correlation_id() {
            dbg.field("correlation_id", id);
        }
        dbg.finish()
    }
}

/// Terminates the process after a wiring defect.
///
/// Carrying on would emit records without their identity fields, which hides
/// the mis-ordered chain instead of exposing it.
pub(crate) fn wiring_defect(err: &ContextError) -> ! {
    tracing::error!(error = %err, "request pipeline is mis-wired, shutting down");
    std::process::exit(1)
}
