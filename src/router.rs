//! Routes incoming interactions to registered listeners by custom id.

use crate::error::TsxResult;
use crate::interaction::Interaction;
use crate::registry::{InteractionKind, ListenerRegistry, DEFAULT_ONCE_KINDS};

#[derive(Clone)]
pub struct InteractionRouter {
    registry: ListenerRegistry,
    once_kinds: Vec<InteractionKind>,
}

impl InteractionRouter {
    pub fn new(registry: ListenerRegistry) -> Self {
        Self::with_once_kinds(registry, DEFAULT_ONCE_KINDS.to_vec())
    }

    /// `once_kinds` lists the kinds whose listeners are one-shot when the
    /// element does not say otherwise.
    pub fn with_once_kinds(registry: ListenerRegistry, once_kinds: Vec<InteractionKind>) -> Self {
        InteractionRouter {
            registry,
            once_kinds,
        }
    }

    pub fn registry(&self) -> &ListenerRegistry {
        &self.registry
    }

    pub fn once_kinds(&self) -> &[InteractionKind] {
        &self.once_kinds
    }

    /// Invoke the listener registered under the interaction's custom id.
    ///
    /// Returns `Ok(false)` when the interaction carries no custom id or nothing
    /// is registered for it. A one-shot key is removed after its handler runs,
    /// whether or not the handler succeeded and even if the handler registered
    /// the key again; the handler's error is then returned.
    pub async fn dispatch(&self, interaction: Interaction) -> TsxResult<bool> {
        let Some(key) = interaction.custom_id().map(str::to_string) else {
            return Ok(false);
        };
        let Some(listener) = self.registry.get(&key) else {
            tracing::trace!(key = %key, "no listener for interaction");
            return Ok(false);
        };

        let once = listener.resolves_once(&self.once_kinds);
        tracing::debug!(key = %key, kind = ?listener.kind, once, "dispatching interaction");
        let off = self.registry.off(key.clone());
        let result = listener.handler.call(interaction, off).await;
        if once {
            // Also drops whatever a re-render registered under the key meanwhile.
            self.registry.delete(&key);
        }
        result.map(|()| true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{Handler, Listener};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counting(counter: &Arc<AtomicUsize>) -> Handler {
        let counter = counter.clone();
        Handler::sync(move |_, _| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
    }

    #[tokio::test]
    async fn test_button_listener_persists() {
        let registry = ListenerRegistry::new();
        let calls = Arc::new(AtomicUsize::new(0));
        registry.set("b1", Listener::new(counting(&calls), InteractionKind::Button, None));
        let router = InteractionRouter::new(registry.clone());

        assert!(router.dispatch(Interaction::button("b1")).await.unwrap());
        assert!(router.dispatch(Interaction::button("b1")).await.unwrap());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(registry.contains("b1"));
    }

    #[tokio::test]
    async fn test_modal_listener_is_one_shot() {
        let registry = ListenerRegistry::new();
        let calls = Arc::new(AtomicUsize::new(0));
        registry.set("m1", Listener::new(counting(&calls), InteractionKind::Modal, None));
        let router = InteractionRouter::new(registry.clone());

        assert!(router.dispatch(Interaction::modal_submit("m1", HashMap::new())).await.unwrap());
        assert!(!registry.contains("m1"));
        assert!(!router.dispatch(Interaction::modal_submit("m1", HashMap::new())).await.unwrap());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_off_inside_handler() {
        let registry = ListenerRegistry::new();
        registry.set(
            "s1",
            Listener::new(
                Handler::sync(|_, off| {
                    assert!(off.off());
                    Ok(())
                }),
                InteractionKind::SelectMenu,
                None,
            ),
        );
        let router = InteractionRouter::new(registry.clone());
        assert!(router
            .dispatch(Interaction::select("s1", vec!["a".into()]))
            .await
            .unwrap());
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_key_is_ignored() {
        let router = InteractionRouter::new(ListenerRegistry::new());
        assert!(!router.dispatch(Interaction::button("nobody")).await.unwrap());
    }

    #[tokio::test]
    async fn test_once_listener_removed_even_on_error() {
        let registry = ListenerRegistry::new();
        registry.set(
            "b",
            Listener::new(
                Handler::sync(|_, _| Err(crate::TsxError::render("handler failed"))),
                InteractionKind::Button,
                Some(true),
            ),
        );
        let router = InteractionRouter::new(registry.clone());
        assert!(router.dispatch(Interaction::button("b")).await.is_err());
        assert!(!registry.contains("b"));
    }

    #[tokio::test]
    async fn test_once_key_removed_after_reregistration() {
        let registry = ListenerRegistry::new();
        let inner = registry.clone();
        registry.set(
            "again",
            Listener::new(
                Handler::sync(move |_, _| {
                    inner.set(
                        "again",
                        Listener::new(Handler::sync(|_, _| Ok(())), InteractionKind::Button, Some(true)),
                    );
                    Ok(())
                }),
                InteractionKind::Button,
                Some(true),
            ),
        );
        let router = InteractionRouter::new(registry.clone());
        assert!(router.dispatch(Interaction::button("again")).await.unwrap());
        assert!(!registry.contains("again"));
        assert!(!router.dispatch(Interaction::button("again")).await.unwrap());
    }

    #[tokio::test]
    async fn test_handler_can_reregister_its_key() {
        let registry = ListenerRegistry::new();
        let inner = registry.clone();
        registry.set(
            "again",
            Listener::new(
                Handler::sync(move |_, _| {
                    inner.set(
                        "again",
                        Listener::new(Handler::sync(|_, _| Ok(())), InteractionKind::Button, None),
                    );
                    Ok(())
                }),
                InteractionKind::Button,
                None,
            ),
        );
        let router = InteractionRouter::new(registry.clone());
        assert!(router.dispatch(Interaction::button("again")).await.unwrap());
        assert!(registry.contains("again"));
    }
}
