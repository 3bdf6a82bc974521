//! Listener registry: custom id -> handler, kind, and one-shot flag.
//! One registry per client; keys form a single namespace across all messages.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::TsxResult;
use crate::interaction::Interaction;

pub type HandlerFuture = Pin<Box<dyn Future<Output = TsxResult<()>> + Send>>;

/// Which interactive element a listener belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionKind {
    Button,
    SelectMenu,
    Modal,
}

/// Kinds whose listeners are one-shot unless the element says otherwise.
pub const DEFAULT_ONCE_KINDS: &[InteractionKind] = &[InteractionKind::Modal];

/// An interaction callback. Receives the interaction and an [`Off`] that removes
/// the listener.
#[derive(Clone)]
pub struct Handler(Arc<dyn Fn(Interaction, Off) -> HandlerFuture + Send + Sync>);

impl Handler {
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: Fn(Interaction, Off) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = TsxResult<()>> + Send + 'static,
    {
        Handler(Arc::new(move |interaction, off| Box::pin(f(interaction, off))))
    }

    /// Wrap a synchronous callback.
    pub fn sync<F>(f: F) -> Self
    where
        F: Fn(&Interaction, &Off) -> TsxResult<()> + Send + Sync + 'static,
    {
        Handler::new(move |interaction, off| {
            let result = f(&interaction, &off);
            async move { result }
        })
    }

    pub fn call(&self, interaction: Interaction, off: Off) -> HandlerFuture {
        (self.0)(interaction, off)
    }

    pub fn ptr_eq(&self, other: &Handler) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

#[derive(Clone)]
pub struct Listener {
    pub handler: Handler,
    pub kind: InteractionKind,
    /// Explicit `once` prop; `None` falls back to the per-kind default.
    pub once: Option<bool>,
}

impl Listener {
    pub fn new(handler: Handler, kind: InteractionKind, once: Option<bool>) -> Self {
        Listener {
            handler,
            kind,
            once,
        }
    }

    pub fn resolves_once(&self, once_kinds: &[InteractionKind]) -> bool {
        self.once.unwrap_or_else(|| once_kinds.contains(&self.kind))
    }
}

impl std::fmt::Debug for Listener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listener")
            .field("kind", &self.kind)
            .field("once", &self.once)
            .finish_non_exhaustive()
    }
}

/// Shared listener map. Cloning shares the same underlying map.
#[derive(Clone, Default)]
pub struct ListenerRegistry {
    listeners: Arc<DashMap<String, Listener>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `listener` under `key`, replacing any previous entry.
    pub fn set(&self, key: impl Into<String>, listener: Listener) -> Option<Listener> {
        let key = key.into();
        tracing::debug!(key = %key, kind = ?listener.kind, once = ?listener.once, "listener registered");
        self.listeners.insert(key, listener)
    }

    /// Clone of the entry under `key`. No guard is held after return.
    pub fn get(&self, key: &str) -> Option<Listener> {
        self.listeners.get(key).map(|entry| entry.value().clone())
    }

    /// Remove the entry under `key`; returns whether one existed.
    pub fn delete(&self, key: &str) -> bool {
        let removed = self.listeners.remove(key).is_some();
        if removed {
            tracing::debug!(key = %key, "listener removed");
        }
        removed
    }

    pub fn contains(&self, key: &str) -> bool {
        self.listeners.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    pub fn clear(&self) {
        self.listeners.clear();
    }

    pub fn off(&self, key: impl Into<String>) -> Off {
        Off {
            registry: self.clone(),
            key: key.into(),
        }
    }

    /// A fresh custom id for elements that do not need a stable one.
    pub fn unique_key(prefix: &str) -> String {
        format!("{}:{}", prefix, Uuid::new_v4().simple())
    }
}

/// Removes one listener from its registry when called.
#[derive(Clone)]
pub struct Off {
    registry: ListenerRegistry,
    key: String,
}

impl Off {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn off(&self) -> bool {
        self.registry.delete(&self.key)
    }
}
