use thiserror::Error;

use crate::transport::TransportError;

pub type TsxResult<T> = Result<T, TsxError>;

#[derive(Error, Debug)]
pub enum TsxError {
    #[error("Invalid tag '{tag}': not an intrinsic element")]
    InvalidTag { tag: String },

    #[error("Invalid props for <{tag}>: {reason}")]
    InvalidProps { tag: String, reason: String },

    #[error("<{tag}> with a handler must have a customId")]
    MissingCustomId { tag: String },

    #[error("<{tag}> cannot use both '{first}' and '{second}'")]
    ConflictingProps {
        tag: String,
        first: String,
        second: String,
    },

    #[error("<{child}> cannot be placed inside <{parent}>")]
    UnexpectedChild { parent: String, child: String },

    #[error("Invalid color value '{value}'")]
    InvalidColor { value: String },

    #[error("Invalid command '{name}': {reason}")]
    InvalidCommand { name: String, reason: String },

    #[error("<{tag}> registers a listener but no render scope is active")]
    NoActiveRegistry { tag: String },

    #[error("use_state called outside of a function component render")]
    HookOutsideRender,

    #[error("Hook order changed between renders: expected {expected} state cells, found {found}")]
    HookOrderMismatch { expected: usize, found: usize },

    #[error("State cell {index} was read with a different type than it was created with")]
    HookTypeMismatch { index: usize },

    #[error("Component is not mounted: no message has been delivered yet")]
    NotMounted,

    #[error("Component has been unmounted")]
    Unmounted,

    #[error("<{kind}> cannot be delivered as a message")]
    NotAMessage { kind: String },

    #[error("Only a <modal> can be shown as a modal, got <{kind}>")]
    NotAModal { kind: String },

    #[error("Render error: {0}")]
    Render(String),

    #[error("Markup error: {0}")]
    Markup(String),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
}

impl TsxError {
    /// Convenience for user render code that wants to bail out with a message.
    pub fn render(message: impl Into<String>) -> Self {
        TsxError::Render(message.into())
    }

    pub(crate) fn invalid_props(tag: &str, reason: impl ToString) -> Self {
        TsxError::InvalidProps {
            tag: tag.to_string(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn invalid_command(name: &str, reason: impl Into<String>) -> Self {
        TsxError::InvalidCommand {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<serde_yaml::Error> for TsxError {
    fn from(err: serde_yaml::Error) -> Self {
        TsxError::Markup(err.to_string())
    }
}
