#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use discord_tsx::platform::{MessagePayload, Modal};
use discord_tsx::{Interaction, MessageHandle, Transport, TransportResult};

/// One recorded transport call.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Send {
        channel_id: String,
        payload: MessagePayload,
    },
    Reply {
        interaction_id: String,
        payload: MessagePayload,
    },
    Update {
        interaction_id: String,
        payload: MessagePayload,
    },
    Edit {
        message: MessageHandle,
        payload: MessagePayload,
    },
    ShowModal {
        interaction_id: String,
        modal: Modal,
    },
    Delete {
        message: MessageHandle,
    },
}

impl Call {
    pub fn payload(&self) -> Option<&MessagePayload> {
        match self {
            Call::Send { payload, .. }
            | Call::Reply { payload, .. }
            | Call::Update { payload, .. }
            | Call::Edit { payload, .. } => Some(payload),
            Call::ShowModal { .. } | Call::Delete { .. } => None,
        }
    }

    pub fn content(&self) -> Option<&str> {
        self.payload().and_then(|p| p.content.as_deref())
    }
}

/// Records every call and hands out sequential message ids (`m1`, `m2`, ...).
#[derive(Default)]
pub struct MockTransport {
    calls: Mutex<Vec<Call>>,
    next_id: AtomicUsize,
    fail_next: AtomicBool,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn last(&self) -> Option<Call> {
        self.calls.lock().unwrap().last().cloned()
    }

    pub fn count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Make the next delivery fail with a transport error.
    pub fn fail_next(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    fn record(&self, call: Call) -> TransportResult<()> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err("connection reset".into());
        }
        self.calls.lock().unwrap().push(call);
        Ok(())
    }

    fn new_message(&self, channel_id: &str) -> MessageHandle {
        let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        MessageHandle::new(format!("m{}", n), channel_id)
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, channel_id: &str, payload: MessagePayload) -> TransportResult<MessageHandle> {
        self.record(Call::Send {
            channel_id: channel_id.to_string(),
            payload,
        })?;
        Ok(self.new_message(channel_id))
    }

    async fn reply(
        &self,
        interaction: &Interaction,
        payload: MessagePayload,
    ) -> TransportResult<MessageHandle> {
        self.record(Call::Reply {
            interaction_id: interaction.id.clone(),
            payload,
        })?;
        let channel = interaction.channel_id.clone().unwrap_or_else(|| "dm".to_string());
        Ok(self.new_message(&channel))
    }

    async fn update(
        &self,
        interaction: &Interaction,
        payload: MessagePayload,
    ) -> TransportResult<MessageHandle> {
        self.record(Call::Update {
            interaction_id: interaction.id.clone(),
            payload,
        })?;
        match &interaction.message {
            Some(message) => Ok(message.clone()),
            None => Err("component interaction without a message".into()),
        }
    }

    async fn edit(
        &self,
        message: &MessageHandle,
        payload: MessagePayload,
    ) -> TransportResult<MessageHandle> {
        self.record(Call::Edit {
            message: message.clone(),
            payload,
        })?;
        Ok(message.clone())
    }

    async fn show_modal(&self, interaction: &Interaction, modal: Modal) -> TransportResult<()> {
        self.record(Call::ShowModal {
            interaction_id: interaction.id.clone(),
            modal,
        })
    }

    async fn delete(&self, message: &MessageHandle) -> TransportResult<()> {
        self.record(Call::Delete {
            message: message.clone(),
        })
    }
}
