//! Delivery seam to the chat platform.
//!
//! The reconciler never speaks HTTP or gateway frames itself; it hands finished
//! payloads to a [`Transport`] and keeps the returned [`MessageHandle`]s.

use async_trait::async_trait;

use crate::interaction::{Interaction, MessageHandle};
use crate::platform::{MessagePayload, Modal};

/// Any error raised by a transport implementation.
pub type TransportError = Box<dyn std::error::Error + Send + Sync>;

pub type TransportResult<T> = Result<T, TransportError>;

#[async_trait]
pub trait Transport: Send + Sync {
    /// Post a new message into a channel.
    async fn send(&self, channel_id: &str, payload: MessagePayload) -> TransportResult<MessageHandle>;

    /// Respond to an interaction with a new message.
    async fn reply(
        &self,
        interaction: &Interaction,
        payload: MessagePayload,
    ) -> TransportResult<MessageHandle>;

    /// Replace the message a component interaction came from, acknowledging it.
    async fn update(
        &self,
        interaction: &Interaction,
        payload: MessagePayload,
    ) -> TransportResult<MessageHandle>;

    /// Edit a previously delivered message.
    async fn edit(
        &self,
        message: &MessageHandle,
        payload: MessagePayload,
    ) -> TransportResult<MessageHandle>;

    async fn show_modal(&self, interaction: &Interaction, modal: Modal) -> TransportResult<()>;

    async fn delete(&self, message: &MessageHandle) -> TransportResult<()>;
}
