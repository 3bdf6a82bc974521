use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::registry::InteractionKind;

/// Reference to a delivered message, used for later edits and deletes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageHandle {
    pub id: String,
    pub channel_id: String,
}

impl MessageHandle {
    pub fn new(id: impl Into<String>, channel_id: impl Into<String>) -> Self {
        MessageHandle {
            id: id.into(),
            channel_id: channel_id.into(),
        }
    }
}

/// Kind-specific data carried by an interaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InteractionData {
    Command {
        name: String,
        command_id: String,
        #[serde(default)]
        options: Vec<serde_json::Value>,
    },
    Button {
        custom_id: String,
    },
    SelectMenu {
        custom_id: String,
        #[serde(default)]
        values: Vec<String>,
    },
    ModalSubmit {
        custom_id: String,
        #[serde(default)]
        fields: HashMap<String, String>,
    },
}

/// An interaction received from the platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    pub id: String,
    pub token: String,
    #[serde(default)]
    pub channel_id: Option<String>,
    /// The message the interacted component is attached to, if any.
    #[serde(default)]
    pub message: Option<MessageHandle>,
    pub data: InteractionData,
}

impl Interaction {
    pub fn new(id: impl Into<String>, data: InteractionData) -> Self {
        Interaction {
            id: id.into(),
            token: String::new(),
            channel_id: None,
            message: None,
            data,
        }
    }

    pub fn with_message(mut self, message: MessageHandle) -> Self {
        self.channel_id = Some(message.channel_id.clone());
        self.message = Some(message);
        self
    }

    pub fn button(custom_id: impl Into<String>) -> Self {
        Interaction::new(
            uuid::Uuid::new_v4().to_string(),
            InteractionData::Button {
                custom_id: custom_id.into(),
            },
        )
    }

    pub fn select(custom_id: impl Into<String>, values: Vec<String>) -> Self {
        Interaction::new(
            uuid::Uuid::new_v4().to_string(),
            InteractionData::SelectMenu {
                custom_id: custom_id.into(),
                values,
            },
        )
    }

    pub fn modal_submit(custom_id: impl Into<String>, fields: HashMap<String, String>) -> Self {
        Interaction::new(
            uuid::Uuid::new_v4().to_string(),
            InteractionData::ModalSubmit {
                custom_id: custom_id.into(),
                fields,
            },
        )
    }

    /// Identifier of the interacted element, if this interaction carries one.
    pub fn custom_id(&self) -> Option<&str> {
        match &self.data {
            InteractionData::Button { custom_id }
            | InteractionData::SelectMenu { custom_id, .. }
            | InteractionData::ModalSubmit { custom_id, .. } => Some(custom_id),
            InteractionData::Command { .. } => None,
        }
    }

    pub fn kind(&self) -> Option<InteractionKind> {
        match &self.data {
            InteractionData::Button { .. } => Some(InteractionKind::Button),
            InteractionData::SelectMenu { .. } => Some(InteractionKind::SelectMenu),
            InteractionData::ModalSubmit { .. } => Some(InteractionKind::Modal),
            InteractionData::Command { .. } => None,
        }
    }

    pub fn command_name(&self) -> Option<&str> {
        match &self.data {
            InteractionData::Command { name, .. } => Some(name),
            _ => None,
        }
    }

    pub fn is_command(&self) -> bool {
        matches!(self.data, InteractionData::Command { .. })
    }

    /// Component interactions can update the message they came from.
    pub fn is_component(&self) -> bool {
        matches!(
            self.data,
            InteractionData::Button { .. } | InteractionData::SelectMenu { .. }
        )
    }

    pub fn values(&self) -> &[String] {
        match &self.data {
            InteractionData::SelectMenu { values, .. } => values,
            _ => &[],
        }
    }

    pub fn field(&self, custom_id: &str) -> Option<&str> {
        match &self.data {
            InteractionData::ModalSubmit { fields, .. } => fields.get(custom_id).map(String::as_str),
            _ => None,
        }
    }
}

/// A message-like container output can be delivered to.
#[derive(Debug, Clone, PartialEq)]
pub enum Target {
    Channel(String),
    Interaction(Interaction),
    Message(MessageHandle),
}

impl From<MessageHandle> for Target {
    fn from(handle: MessageHandle) -> Self {
        Target::Message(handle)
    }
}

impl From<Interaction> for Target {
    fn from(interaction: Interaction) -> Self {
        Target::Interaction(interaction)
    }
}

impl From<&Interaction> for Target {
    fn from(interaction: &Interaction) -> Self {
        Target::Interaction(interaction.clone())
    }
}

/// A bare string names a channel.
impl From<&str> for Target {
    fn from(channel_id: &str) -> Self {
        Target::Channel(channel_id.to_string())
    }
}

impl From<String> for Target {
    fn from(channel_id: String) -> Self {
        Target::Channel(channel_id)
    }
}
