//! Stateful components.
//!
//! A component owns local state and renders it into a message. Once mounted it
//! is bound to the delivered message; every accepted state change re-renders the
//! whole component and redelivers it to that message, in place through the
//! triggering interaction when a button or select caused the change. There is
//! no diffing.
//!
//! ```text
//! Unbound ──mount──▶ Mounted ──set_state──▶ Updating ──▶ Mounted
//!                       │                                  │
//!                       └──────────── delete ──────────────┴──▶ Unmounted
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::context::{self, Owner, RenderContext};
use crate::dispatch::Dispatcher;
use crate::element::Node;
use crate::error::{TsxError, TsxResult};
use crate::interaction::{Interaction, MessageHandle, Target};
use crate::payload::Outgoing;
use crate::platform::MessagePayload;

/// User-defined stateful component.
///
/// Only [`render`](Component::render) is required; the lifecycle hooks default
/// to no-ops and `component_did_catch` defaults to propagating the error.
pub trait Component: Send + Sync + Sized + 'static {
    type State: Clone + Default + Send + Sync + 'static;

    fn initial_state(&self) -> Self::State {
        Self::State::default()
    }

    fn render(&self, cx: &RenderCx<'_, Self>) -> TsxResult<Node>;

    /// Consulted before a state change is redelivered. The change is committed
    /// either way.
    fn should_component_update(&self, _current: &Self::State, _next: &Self::State) -> bool {
        true
    }

    fn component_did_mount(&mut self, _message: &MessageHandle) {}

    fn component_did_update(&mut self, _previous: &Self::State) {}

    fn component_will_unmount(&mut self) {}

    /// Called when `render` fails. Returning `Ok` swallows the error and skips
    /// delivery for this render.
    fn component_did_catch(&mut self, error: TsxError) -> TsxResult<()> {
        Err(error)
    }

    fn name() -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// What a component sees while rendering.
pub struct RenderCx<'a, C: Component> {
    state: &'a C::State,
    handle: &'a ComponentHandle<C>,
}

impl<'a, C: Component> RenderCx<'a, C> {
    pub fn state(&self) -> &C::State {
        self.state
    }

    /// A handle to this component, for use inside event handlers.
    pub fn handle(&self) -> ComponentHandle<C> {
        self.handle.clone()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Unbound,
    Mounted,
    Updating,
    Unmounted,
}

pub(crate) struct Instance<C: Component> {
    component: C,
    state: C::State,
    phase: Phase,
    message: Option<MessageHandle>,
}

/// Something the dispatcher can unmount when its message goes away.
#[async_trait]
pub(crate) trait Unmount: Send + Sync {
    async fn unmount(&self);
}

#[async_trait]
impl<C: Component> Unmount for Mutex<Instance<C>> {
    async fn unmount(&self) {
        let mut instance = self.lock().await;
        if instance.phase == Phase::Unmounted {
            return;
        }
        instance.component.component_will_unmount();
        instance.phase = Phase::Unmounted;
        tracing::debug!(component = C::name(), "component unmounted");
    }
}

/// Shared handle to a component instance.
pub struct ComponentHandle<C: Component> {
    inner: Arc<Mutex<Instance<C>>>,
    dispatcher: Dispatcher,
    id: Uuid,
}

impl<C: Component> Clone for ComponentHandle<C> {
    fn clone(&self) -> Self {
        ComponentHandle {
            inner: self.inner.clone(),
            dispatcher: self.dispatcher.clone(),
            id: self.id,
        }
    }
}

impl<C: Component> ComponentHandle<C> {
    pub(crate) fn new(component: C, dispatcher: Dispatcher) -> Self {
        let state = component.initial_state();
        ComponentHandle {
            inner: Arc::new(Mutex::new(Instance {
                component,
                state,
                phase: Phase::Unbound,
                message: None,
            })),
            dispatcher,
            id: Uuid::new_v4(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub async fn phase(&self) -> Phase {
        self.inner.lock().await.phase
    }

    /// The message this component is bound to, once mounted.
    pub async fn message(&self) -> Option<MessageHandle> {
        self.inner.lock().await.message.clone()
    }

    pub async fn state(&self) -> C::State {
        self.inner.lock().await.state.clone()
    }

    /// First render and delivery. A render error swallowed by
    /// `component_did_catch` leaves the component unbound.
    pub(crate) async fn mount(&self, target: Target) -> TsxResult<()> {
        let mut instance = self.inner.lock().await;
        if instance.phase != Phase::Unbound {
            return Err(TsxError::render("component is already mounted"));
        }
        let Some(payload) = self.render_caught(&mut instance)? else {
            return Ok(());
        };
        let message = self.dispatcher.deliver(&target, payload).await?;
        instance.message = Some(message.clone());
        instance.phase = Phase::Mounted;
        self.track(&message);
        instance.component.component_did_mount(&message);
        tracing::debug!(component = C::name(), message = %message.id, "component mounted");
        Ok(())
    }

    /// Apply `update` to the state, then re-render and redeliver unless
    /// `should_component_update` declines.
    ///
    /// A button or select interaction gets an in-place update; anything else
    /// edits the bound message.
    pub async fn set_state<F>(&self, update: F, interaction: Option<&Interaction>) -> TsxResult<()>
    where
        F: FnOnce(&mut C::State) + Send,
    {
        let mut instance = self.inner.lock().await;
        ensure_bound(&instance)?;

        let previous = instance.state.clone();
        let mut next = previous.clone();
        update(&mut next);
        let proceed = instance.component.should_component_update(&previous, &next);
        instance.state = next;
        if !proceed {
            return Ok(());
        }

        if self.redeliver(&mut instance, interaction).await? {
            instance.component.component_did_update(&previous);
        }
        Ok(())
    }

    /// Re-render and edit the bound message, bypassing `should_component_update`.
    pub async fn force_update(&self) -> TsxResult<()> {
        let mut instance = self.inner.lock().await;
        ensure_bound(&instance)?;
        self.redeliver(&mut instance, None).await?;
        Ok(())
    }

    /// Delete the bound message and unmount.
    pub async fn delete(&self) -> TsxResult<()> {
        let message = {
            let instance = self.inner.lock().await;
            ensure_bound(&instance)?;
            instance.message.clone()
        };
        match message {
            Some(message) => self.dispatcher.delete(&message).await,
            None => Err(TsxError::NotMounted),
        }
    }

    /// Returns whether a render was delivered. The bound message never changes
    /// after mount.
    async fn redeliver(
        &self,
        instance: &mut Instance<C>,
        interaction: Option<&Interaction>,
    ) -> TsxResult<bool> {
        let Some(message) = instance.message.clone() else {
            return Err(TsxError::NotMounted);
        };

        instance.phase = Phase::Updating;
        let result = match self.render_caught(instance) {
            Ok(Some(payload)) => self
                .dispatcher
                .redeliver(&message, interaction, payload)
                .await
                .map(|_| true),
            Ok(None) => Ok(false),
            Err(e) => Err(e),
        };
        if instance.phase == Phase::Updating {
            instance.phase = Phase::Mounted;
        }
        result
    }

    fn track(&self, message: &MessageHandle) {
        let unmount: Arc<dyn Unmount> = self.inner.clone();
        self.dispatcher.track(message, Arc::downgrade(&unmount));
    }

    /// Render inside this component's context, routing failures through
    /// `component_did_catch`. `None` means the error was swallowed.
    fn render_caught(&self, instance: &mut Instance<C>) -> TsxResult<Option<MessagePayload>> {
        let cx = RenderContext {
            registry: self.dispatcher.registry().clone(),
            owner: Owner::Component {
                id: self.id,
                name: C::name(),
            },
        };
        let rendered = context::enter(cx, || {
            let render_cx = RenderCx {
                state: &instance.state,
                handle: self,
            };
            instance
                .component
                .render(&render_cx)
                .and_then(|node| Outgoing::from(node).into_payload())
        });
        match rendered {
            Ok(payload) => Ok(Some(payload)),
            Err(error) => {
                let reason = error.to_string();
                instance.component.component_did_catch(error)?;
                tracing::warn!(component = C::name(), error = %reason, "render error caught by component");
                Ok(None)
            }
        }
    }
}

fn ensure_bound<C: Component>(instance: &Instance<C>) -> TsxResult<()> {
    match instance.phase {
        Phase::Unbound => Err(TsxError::NotMounted),
        Phase::Unmounted => Err(TsxError::Unmounted),
        Phase::Mounted | Phase::Updating => Ok(()),
    }
}
