//! # discord-tsx
//!
//! Declarative element trees and stateful components for chat-platform messages.
//!
//! ## Features
//! - Intrinsic elements (`embed`, `field`, `row`, `button`, `select`, `modal`, ...)
//!   built eagerly into platform payloads
//! - Handler props registered in a per-client listener registry and routed by custom id
//! - Stateful components with lifecycle hooks, and function components with `use_state`
//! - An explicit dispatch wrapper around any [`Transport`]
//! - Slash-command tags and registration request shapes
//! - Static trees from YAML/JSON markup
//!
//! ## Example
//! ```ignore
//! use discord_tsx::{create_element, props, Client, ClientOptions, Tag};
//!
//! let client = Client::new(transport, ClientOptions::default());
//! let button = client.scope(|| {
//!     create_element(
//!         Tag::Button,
//!         props! { "customId" => "hello" }.on_click(|interaction, _off| async move {
//!             println!("clicked by {}", interaction.id);
//!             Ok(())
//!         }),
//!         vec!["Say hello".into()],
//!     )
//! })?;
//! client.dispatcher().send("channel-id", button).await?;
//! ```

pub mod builder;
pub mod client;
pub mod command;
pub mod component;
pub mod context;
pub mod dispatch;
pub mod element;
pub mod error;
pub mod hooks;
pub mod interaction;
pub mod markup;
pub mod payload;
pub mod platform;
pub mod props;
pub mod registry;
pub mod router;
pub mod transport;

// --- Core types ---
pub use builder::{create_element, ElementBuilder};
pub use element::{fragment, Node, Render, Resolved, Tag};
pub use error::{TsxError, TsxResult};
pub use props::Props;

// --- Components ---
pub use component::{Component, ComponentHandle, Phase, RenderCx};
pub use hooks::{use_state, FnComponentHandle, StateSetter};

// --- Runtime ---
pub use client::{Client, ClientOptions, GatewayEvent};
pub use dispatch::Dispatcher;
pub use interaction::{Interaction, InteractionData, MessageHandle, Target};
pub use payload::Outgoing;
pub use registry::{Handler, InteractionKind, Listener, ListenerRegistry, Off};
pub use router::InteractionRouter;
pub use transport::{Transport, TransportError, TransportResult};

// --- Commands & markup ---
pub use command::{ApplicationCommand, CommandChoice, CommandOption, CommandRequest, CommandScope, OptionKind};
pub use markup::{parse_markup, render_markup, MarkupNode};
