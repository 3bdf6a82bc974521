//! The dispatch wrapper.
//!
//! [`Dispatcher`] sits between application code and a [`Transport`]. Every
//! outgoing call accepts anything convertible to [`Outgoing`] (a ready payload,
//! a resolved element, or a node tree), turns it into a platform payload and
//! forwards it. Components are mounted through it so later state changes can be
//! redelivered, and deletions are observed so mounted components unmount.

use std::sync::{Arc, Weak};

use dashmap::DashMap;

use crate::component::{Component, ComponentHandle, Unmount};
use crate::context::{self, RenderContext};
use crate::element::Node;
use crate::error::TsxResult;
use crate::hooks::{FnComponentHandle, FnNode};
use crate::interaction::{Interaction, MessageHandle, Target};
use crate::payload::Outgoing;
use crate::platform::MessagePayload;
use crate::registry::ListenerRegistry;
use crate::transport::Transport;

#[derive(Clone)]
pub struct Dispatcher {
    transport: Arc<dyn Transport>,
    registry: ListenerRegistry,
    /// Mounted components by message id.
    mounted: Arc<DashMap<String, Weak<dyn Unmount>>>,
}

impl Dispatcher {
    /// Wrap `transport`, registering handlers of delivered elements in `registry`.
    pub fn wrap(transport: Arc<dyn Transport>, registry: ListenerRegistry) -> Self {
        Dispatcher {
            transport,
            registry,
            mounted: Arc::new(DashMap::new()),
        }
    }

    pub fn registry(&self) -> &ListenerRegistry {
        &self.registry
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    /// Build with this dispatcher's registry as the active render scope.
    ///
    /// Elements carrying handlers must be created inside a scope so their
    /// listeners land in the registry the router reads.
    pub fn scope<R>(&self, f: impl FnOnce() -> R) -> R {
        context::enter(RenderContext::scope(self.registry.clone()), f)
    }

    /// Flatten an outgoing value into a payload, rendering nested components
    /// inside this dispatcher's scope.
    fn prepare(&self, outgoing: impl Into<Outgoing>) -> TsxResult<MessagePayload> {
        let outgoing = outgoing.into();
        self.scope(|| outgoing.into_payload())
    }

    pub async fn send(&self, channel_id: &str, outgoing: impl Into<Outgoing>) -> TsxResult<MessageHandle> {
        let payload = self.prepare(outgoing)?;
        tracing::debug!(channel = %channel_id, "sending message");
        Ok(self.transport.send(channel_id, payload).await?)
    }

    pub async fn reply(
        &self,
        interaction: &Interaction,
        outgoing: impl Into<Outgoing>,
    ) -> TsxResult<MessageHandle> {
        let payload = self.prepare(outgoing)?;
        tracing::debug!(interaction = %interaction.id, "replying to interaction");
        Ok(self.transport.reply(interaction, payload).await?)
    }

    pub async fn update(
        &self,
        interaction: &Interaction,
        outgoing: impl Into<Outgoing>,
    ) -> TsxResult<MessageHandle> {
        let payload = self.prepare(outgoing)?;
        tracing::debug!(interaction = %interaction.id, "updating interaction message");
        Ok(self.transport.update(interaction, payload).await?)
    }

    pub async fn edit(
        &self,
        message: &MessageHandle,
        outgoing: impl Into<Outgoing>,
    ) -> TsxResult<MessageHandle> {
        let payload = self.prepare(outgoing)?;
        tracing::debug!(message = %message.id, "editing message");
        Ok(self.transport.edit(message, payload).await?)
    }

    /// Show a modal in response to `interaction`. The outgoing value must
    /// resolve to exactly one `<modal>`.
    pub async fn show_modal(
        &self,
        interaction: &Interaction,
        outgoing: impl Into<Outgoing>,
    ) -> TsxResult<()> {
        let outgoing = outgoing.into();
        let modal = self.scope(|| outgoing.into_modal())?;
        tracing::debug!(interaction = %interaction.id, modal = %modal.custom_id, "showing modal");
        Ok(self.transport.show_modal(interaction, modal).await?)
    }

    /// Deliver to whatever `target` is: a channel gets a new message, a
    /// component interaction updates its message, any other interaction gets a
    /// reply, and a message is edited.
    pub async fn deliver(&self, target: &Target, outgoing: impl Into<Outgoing>) -> TsxResult<MessageHandle> {
        match target {
            Target::Channel(channel_id) => self.send(channel_id, outgoing).await,
            Target::Interaction(interaction) if interaction.is_component() => {
                self.update(interaction, outgoing).await
            }
            Target::Interaction(interaction) => self.reply(interaction, outgoing).await,
            Target::Message(message) => self.edit(message, outgoing).await,
        }
    }

    /// Redeliver a mounted render: an in-place `update` when a button or select
    /// triggered it, otherwise an edit of `bound`.
    pub(crate) async fn redeliver(
        &self,
        bound: &MessageHandle,
        interaction: Option<&Interaction>,
        outgoing: impl Into<Outgoing>,
    ) -> TsxResult<MessageHandle> {
        match interaction {
            Some(interaction) if interaction.is_component() => self.update(interaction, outgoing).await,
            _ => self.edit(bound, outgoing).await,
        }
    }

    /// Render `component` for the first time, deliver it to `target`, and bind
    /// it to the resulting message.
    pub async fn mount<C: Component>(
        &self,
        target: impl Into<Target>,
        component: C,
    ) -> TsxResult<ComponentHandle<C>> {
        let handle = ComponentHandle::new(component, self.clone());
        handle.mount(target.into()).await?;
        Ok(handle)
    }

    /// Mount a function component. State is declared with
    /// [`use_state`](crate::hooks::use_state) inside `render`.
    pub async fn mount_fn<F>(&self, target: impl Into<Target>, render: F) -> TsxResult<FnComponentHandle>
    where
        F: Fn() -> TsxResult<Node> + Send + Sync + 'static,
    {
        let node = FnNode::new(Box::new(render), self.clone());
        node.mount(target.into()).await?;
        Ok(FnComponentHandle::new(node))
    }

    /// Delete a message, unmounting the component bound to it.
    pub async fn delete(&self, message: &MessageHandle) -> TsxResult<()> {
        tracing::debug!(message = %message.id, "deleting message");
        self.transport.delete(message).await?;
        self.notify_deleted(message).await;
        Ok(())
    }

    /// A message was deleted elsewhere; unmount whatever was bound to it.
    pub async fn notify_deleted(&self, message: &MessageHandle) {
        let Some((_, weak)) = self.mounted.remove(&message.id) else {
            return;
        };
        if let Some(mounted) = weak.upgrade() {
            mounted.unmount().await;
        }
    }

    pub(crate) fn track(&self, message: &MessageHandle, mounted: Weak<dyn Unmount>) {
        self.mounted.retain(|_, weak| weak.strong_count() > 0);
        self.mounted.insert(message.id.clone(), mounted);
    }

    /// Number of live mounted components.
    pub fn mounted_count(&self) -> usize {
        self.mounted
            .iter()
            .filter(|entry| entry.value().strong_count() > 0)
            .count()
    }
}
