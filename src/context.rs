//! The "current render" slot.
//!
//! A thread-local stack of render contexts. Entering pushes, and the guard pops on
//! drop, so a nested render restores its parent's context instead of clearing it.
//! Renders are synchronous; a context is never held across an `.await`.

use std::cell::RefCell;
use std::sync::Arc;
use uuid::Uuid;

use crate::hooks::FnNode;
use crate::registry::ListenerRegistry;

thread_local! {
    static RENDER_STACK: RefCell<Vec<RenderContext>> = const { RefCell::new(Vec::new()) };
}

/// Who is rendering.
#[derive(Clone)]
pub enum Owner {
    /// A scope with no stateful owner (plain element building).
    Scope,
    /// A stateful component instance.
    Component { id: Uuid, name: &'static str },
    /// A function component; hook state attaches here.
    Function(Arc<FnNode>),
}

#[derive(Clone)]
pub struct RenderContext {
    pub registry: ListenerRegistry,
    pub owner: Owner,
}

impl RenderContext {
    pub fn scope(registry: ListenerRegistry) -> Self {
        RenderContext {
            registry,
            owner: Owner::Scope,
        }
    }
}

struct Guard;

impl Drop for Guard {
    fn drop(&mut self) {
        RENDER_STACK.with(|stack| {
            stack.borrow_mut().pop();
        });
    }
}

/// Run `f` with `cx` as the current render context.
pub fn enter<R>(cx: RenderContext, f: impl FnOnce() -> R) -> R {
    RENDER_STACK.with(|stack| stack.borrow_mut().push(cx));
    let guard = Guard;
    let result = f();
    drop(guard);
    result
}

pub fn current() -> Option<RenderContext> {
    RENDER_STACK.with(|stack| stack.borrow().last().cloned())
}

pub fn current_registry() -> Option<ListenerRegistry> {
    RENDER_STACK.with(|stack| stack.borrow().last().map(|cx| cx.registry.clone()))
}

pub(crate) fn current_function_owner() -> Option<Arc<FnNode>> {
    RENDER_STACK.with(|stack| match stack.borrow().last() {
        Some(RenderContext {
            owner: Owner::Function(node),
            ..
        }) => Some(node.clone()),
        _ => None,
    })
}

pub fn is_rendering() -> bool {
    RENDER_STACK.with(|stack| !stack.borrow().is_empty())
}

pub fn depth() -> usize {
    RENDER_STACK.with(|stack| stack.borrow().len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enter_restores_parent() {
        let outer = ListenerRegistry::new();
        let inner = ListenerRegistry::new();
        inner.set(
            "marker",
            crate::registry::Listener::new(
                crate::registry::Handler::sync(|_, _| Ok(())),
                crate::registry::InteractionKind::Button,
                None,
            ),
        );

        assert!(!is_rendering());
        enter(RenderContext::scope(outer.clone()), || {
            assert_eq!(depth(), 1);
            enter(RenderContext::scope(inner.clone()), || {
                assert_eq!(depth(), 2);
                assert!(current_registry().unwrap().contains("marker"));
            });
            assert_eq!(depth(), 1);
            assert!(!current_registry().unwrap().contains("marker"));
        });
        assert!(!is_rendering());
        assert!(current().is_none());
    }

    #[test]
    fn test_guard_pops_on_panic() {
        let result = std::panic::catch_unwind(|| {
            enter(RenderContext::scope(ListenerRegistry::new()), || {
                panic!("render blew up");
            })
        });
        assert!(result.is_err());
        assert_eq!(depth(), 0);
    }
}
