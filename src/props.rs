use std::future::Future;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::element::Tag;
use crate::error::{TsxError, TsxResult};
use crate::interaction::Interaction;
use crate::registry::{Handler, Off};

/// Attributes of an element: JSON-valued data props plus typed handler slots.
///
/// Keys use the markup spelling (`customId`, `minValues`, ...).
#[derive(Clone, Default)]
pub struct Props {
    values: Map<String, Value>,
    pub(crate) on_click: Option<Handler>,
    pub(crate) on_change: Option<Handler>,
    pub(crate) on_submit: Option<Handler>,
}

impl Props {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(values: Map<String, Value>) -> Self {
        Props {
            values,
            ..Default::default()
        }
    }

    pub fn set(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.values.insert(key.to_string(), value.into());
        self
    }

    pub fn on_click<F, Fut>(mut self, handler: F) -> Self
    where
        F: Fn(Interaction, Off) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = TsxResult<()>> + Send + 'static,
    {
        self.on_click = Some(Handler::new(handler));
        self
    }

    pub fn on_change<F, Fut>(mut self, handler: F) -> Self
    where
        F: Fn(Interaction, Off) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = TsxResult<()>> + Send + 'static,
    {
        self.on_change = Some(Handler::new(handler));
        self
    }

    pub fn on_submit<F, Fut>(mut self, handler: F) -> Self
    where
        F: Fn(Interaction, Off) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = TsxResult<()>> + Send + 'static,
    {
        self.on_submit = Some(Handler::new(handler));
        self
    }

    /// Attach an already constructed handler to the slot matching `tag`.
    pub fn with_handler(mut self, tag: Tag, handler: Handler) -> Self {
        match tag {
            Tag::Button => self.on_click = Some(handler),
            Tag::Select => self.on_change = Some(handler),
            Tag::Modal => self.on_submit = Some(handler),
            _ => {}
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn values(&self) -> &Map<String, Value> {
        &self.values
    }

    /// Decode the data props into the typed prop record of `tag`.
    pub(crate) fn decode<T: DeserializeOwned>(&self, tag: Tag) -> TsxResult<T> {
        serde_json::from_value(Value::Object(self.values.clone()))
            .map_err(|e| TsxError::invalid_props(tag.as_str(), e))
    }
}

impl std::fmt::Debug for Props {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Props")
            .field("values", &self.values)
            .field("on_click", &self.on_click.is_some())
            .field("on_change", &self.on_change.is_some())
            .field("on_submit", &self.on_submit.is_some())
            .finish()
    }
}

/// Build [`Props`] from `key => value` pairs.
///
/// ```ignore
/// let props = props! { "customId" => "b1", "disabled" => true };
/// ```
#[macro_export]
macro_rules! props {
    () => { $crate::Props::new() };
    ($($key:literal => $value:expr),+ $(,)?) => {
        $crate::Props::new()$(.set($key, $value))+
    };
}
