//! Application entry point: owns the registry, dispatcher and router, and runs
//! the gateway event loop.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::dispatch::Dispatcher;
use crate::error::TsxResult;
use crate::interaction::{Interaction, MessageHandle};
use crate::registry::{InteractionKind, ListenerRegistry, DEFAULT_ONCE_KINDS};
use crate::router::InteractionRouter;
use crate::transport::Transport;

fn default_event_buffer() -> usize {
    64
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientOptions {
    /// Kinds whose listeners are one-shot by default, in addition to modals.
    #[serde(default)]
    pub once: Vec<InteractionKind>,
    /// Capacity of the channel returned by [`Client::channel`].
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,
}

impl Default for ClientOptions {
    fn default() -> Self {
        ClientOptions {
            once: Vec::new(),
            event_buffer: default_event_buffer(),
        }
    }
}

impl ClientOptions {
    /// Load options from YAML (or JSON, which YAML accepts).
    pub fn from_yaml(source: &str) -> TsxResult<Self> {
        Ok(serde_yaml::from_str(source)?)
    }

    fn once_kinds(&self) -> Vec<InteractionKind> {
        let mut kinds = DEFAULT_ONCE_KINDS.to_vec();
        for kind in &self.once {
            if !kinds.contains(kind) {
                kinds.push(*kind);
            }
        }
        kinds
    }
}

/// Events the client consumes from the platform gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "t", content = "d", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GatewayEvent {
    InteractionCreate(Interaction),
    MessageDelete(MessageHandle),
}

#[derive(Clone)]
pub struct Client {
    dispatcher: Dispatcher,
    router: InteractionRouter,
    options: Arc<ClientOptions>,
}

impl Client {
    pub fn new(transport: Arc<dyn Transport>, options: ClientOptions) -> Self {
        let registry = ListenerRegistry::new();
        let router = InteractionRouter::with_once_kinds(registry.clone(), options.once_kinds());
        Client {
            dispatcher: Dispatcher::wrap(transport, registry),
            router,
            options: Arc::new(options),
        }
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn registry(&self) -> &ListenerRegistry {
        self.dispatcher.registry()
    }

    pub fn router(&self) -> &InteractionRouter {
        &self.router
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// Run `f` with this client's registry as the active render scope.
    pub fn scope<R>(&self, f: impl FnOnce() -> R) -> R {
        self.dispatcher.scope(f)
    }

    pub async fn handle_interaction(&self, interaction: Interaction) -> TsxResult<bool> {
        self.router.dispatch(interaction).await
    }

    pub async fn handle_event(&self, event: GatewayEvent) -> TsxResult<()> {
        match event {
            GatewayEvent::InteractionCreate(interaction) => {
                self.handle_interaction(interaction).await?;
            }
            GatewayEvent::MessageDelete(message) => {
                self.dispatcher.notify_deleted(&message).await;
            }
        }
        Ok(())
    }

    /// A channel sized by `event_buffer`, for feeding [`Client::attach`].
    pub fn channel(&self) -> (mpsc::Sender<GatewayEvent>, mpsc::Receiver<GatewayEvent>) {
        mpsc::channel(self.options.event_buffer.max(1))
    }

    /// Process gateway events in order until every sender is dropped. Handler
    /// failures are logged and do not stop the loop.
    pub fn attach(&self, events: mpsc::Receiver<GatewayEvent>) -> JoinHandle<()> {
        let client = self.clone();
        tokio::spawn(async move {
            let mut events = events;
            while let Some(event) = events.recv().await {
                if let Err(e) = client.handle_event(event).await {
                    tracing::error!(error = %e, "gateway event handler failed");
                }
            }
            tracing::debug!("gateway event stream closed");
        })
    }

    /// [`channel`](Client::channel) and [`attach`](Client::attach) in one call.
    pub fn listen(&self) -> (mpsc::Sender<GatewayEvent>, JoinHandle<()>) {
        let (tx, rx) = self.channel();
        (tx, self.attach(rx))
    }
}
