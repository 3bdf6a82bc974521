//! Function components and `use_state`.
//!
//! A function component is a plain render closure. State lives in cells owned by
//! the mounted node and is addressed by call order: the n-th `use_state` call of
//! a render always reads the n-th cell. Calling `use_state` a different number of
//! times across renders is reported as [`TsxError::HookOrderMismatch`].

use std::any::Any;
use std::marker::PhantomData;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use uuid::Uuid;

use crate::component::{Phase, Unmount};
use crate::context::{self, Owner, RenderContext};
use crate::dispatch::Dispatcher;
use crate::element::Node;
use crate::error::{TsxError, TsxResult};
use crate::interaction::{Interaction, MessageHandle, Target};
use crate::payload::Outgoing;
use crate::platform::MessagePayload;

type RenderFn = Box<dyn Fn() -> TsxResult<Node> + Send + Sync>;

#[derive(Default)]
struct Cells {
    values: Vec<Box<dyn Any + Send>>,
    cursor: usize,
    initialized: bool,
}

struct Delivery {
    phase: Phase,
    message: Option<MessageHandle>,
}

/// A mounted function component: its render closure, state cells, and the
/// message it is bound to.
pub struct FnNode {
    id: Uuid,
    render: RenderFn,
    cells: Mutex<Cells>,
    delivery: tokio::sync::Mutex<Delivery>,
    dispatcher: Dispatcher,
}

impl FnNode {
    pub(crate) fn new(render: RenderFn, dispatcher: Dispatcher) -> Arc<Self> {
        Arc::new(FnNode {
            id: Uuid::new_v4(),
            render,
            cells: Mutex::new(Cells::default()),
            delivery: tokio::sync::Mutex::new(Delivery {
                phase: Phase::Unbound,
                message: None,
            }),
            dispatcher,
        })
    }

    fn cells(&self) -> std::sync::MutexGuard<'_, Cells> {
        self.cells.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn render_payload(self: &Arc<Self>) -> TsxResult<MessagePayload> {
        self.cells().cursor = 0;
        let cx = RenderContext {
            registry: self.dispatcher.registry().clone(),
            owner: Owner::Function(self.clone()),
        };
        let rendered = context::enter(cx, || {
            (self.render)().and_then(|node| Outgoing::from(node).into_payload())
        });

        let mut cells = self.cells();
        match rendered {
            Ok(payload) => {
                if cells.initialized && cells.cursor != cells.values.len() {
                    return Err(TsxError::HookOrderMismatch {
                        expected: cells.values.len(),
                        found: cells.cursor,
                    });
                }
                cells.initialized = true;
                Ok(payload)
            }
            Err(error) => {
                if !cells.initialized {
                    cells.values.clear();
                }
                Err(error)
            }
        }
    }

    pub(crate) async fn mount(self: &Arc<Self>, target: Target) -> TsxResult<()> {
        let mut delivery = self.delivery.lock().await;
        if delivery.phase != Phase::Unbound {
            return Err(TsxError::render("function component is already mounted"));
        }
        let payload = self.render_payload()?;
        let message = self.dispatcher.deliver(&target, payload).await?;
        delivery.message = Some(message.clone());
        delivery.phase = Phase::Mounted;
        self.track(&message);
        tracing::debug!(node = %self.id, message = %message.id, "function component mounted");
        Ok(())
    }

    /// Re-render and redeliver to the bound message. `apply` runs only once the
    /// node is known to be mounted.
    async fn update<F>(self: &Arc<Self>, interaction: Option<&Interaction>, apply: F) -> TsxResult<()>
    where
        F: FnOnce() -> TsxResult<()> + Send,
    {
        let mut delivery = self.delivery.lock().await;
        let message = match (delivery.phase, &delivery.message) {
            (Phase::Unmounted, _) => return Err(TsxError::Unmounted),
            (Phase::Unbound, _) | (_, None) => return Err(TsxError::NotMounted),
            (Phase::Mounted | Phase::Updating, Some(message)) => message.clone(),
        };
        apply()?;

        delivery.phase = Phase::Updating;
        let result = match self.render_payload() {
            Ok(payload) => self.dispatcher.redeliver(&message, interaction, payload).await,
            Err(e) => Err(e),
        };
        if delivery.phase == Phase::Updating {
            delivery.phase = Phase::Mounted;
        }
        result.map(|_| ())
    }

    fn track(self: &Arc<Self>, message: &MessageHandle) {
        let unmount: Arc<dyn Unmount> = self.clone();
        self.dispatcher.track(message, Arc::downgrade(&unmount));
    }

    fn store<T: Send + 'static>(&self, index: usize, value: T) -> TsxResult<()> {
        let mut cells = self.cells();
        let slot = cells
            .values
            .get_mut(index)
            .ok_or(TsxError::HookTypeMismatch { index })?;
        if !slot.is::<T>() {
            return Err(TsxError::HookTypeMismatch { index });
        }
        *slot = Box::new(value);
        Ok(())
    }
}

#[async_trait]
impl Unmount for FnNode {
    async fn unmount(&self) {
        let mut delivery = self.delivery.lock().await;
        if delivery.phase != Phase::Unmounted {
            delivery.phase = Phase::Unmounted;
            tracing::debug!(node = %self.id, "function component unmounted");
        }
    }
}

/// Read (or on the first render, create) the next state cell of the function
/// component currently rendering.
pub fn use_state<T>(initial: T) -> TsxResult<(T, StateSetter<T>)>
where
    T: Clone + Send + 'static,
{
    let node = context::current_function_owner().ok_or(TsxError::HookOutsideRender)?;
    let (value, index) = {
        let mut cells = node.cells();
        let index = cells.cursor;
        cells.cursor += 1;
        if cells.initialized {
            let expected = cells.values.len();
            let stored = cells.values.get(index).ok_or(TsxError::HookOrderMismatch {
                expected,
                found: index + 1,
            })?;
            let value = stored
                .downcast_ref::<T>()
                .ok_or(TsxError::HookTypeMismatch { index })?;
            (value.clone(), index)
        } else {
            cells.values.push(Box::new(initial.clone()));
            (initial, index)
        }
    };
    Ok((
        value,
        StateSetter {
            node,
            index,
            _marker: PhantomData,
        },
    ))
}

/// Writes one state cell and redelivers the component.
pub struct StateSetter<T> {
    node: Arc<FnNode>,
    index: usize,
    _marker: PhantomData<fn(T)>,
}

impl<T> Clone for StateSetter<T> {
    fn clone(&self) -> Self {
        StateSetter {
            node: self.node.clone(),
            index: self.index,
            _marker: PhantomData,
        }
    }
}

impl<T: Send + 'static> StateSetter<T> {
    pub fn index(&self) -> usize {
        self.index
    }

    /// Store `value`, re-render, and redeliver: an in-place update for a button
    /// or select `interaction`, otherwise an edit of the bound message. Nothing
    /// is stored when the component is not mounted.
    pub async fn set(&self, value: T, interaction: Option<&Interaction>) -> TsxResult<()> {
        self.node
            .update(interaction, || self.node.store(self.index, value))
            .await
    }
}

/// Handle to a mounted function component.
#[derive(Clone)]
pub struct FnComponentHandle {
    node: Arc<FnNode>,
}

impl FnComponentHandle {
    pub(crate) fn new(node: Arc<FnNode>) -> Self {
        FnComponentHandle { node }
    }

    pub fn id(&self) -> Uuid {
        self.node.id
    }

    pub async fn phase(&self) -> Phase {
        self.node.delivery.lock().await.phase
    }

    pub async fn message(&self) -> Option<MessageHandle> {
        self.node.delivery.lock().await.message.clone()
    }

    pub async fn force_update(&self) -> TsxResult<()> {
        self.node.update(None, || Ok(())).await
    }

    pub async fn delete(&self) -> TsxResult<()> {
        let message = {
            let delivery = self.node.delivery.lock().await;
            match delivery.phase {
                Phase::Unbound => return Err(TsxError::NotMounted),
                Phase::Unmounted => return Err(TsxError::Unmounted),
                _ => delivery.message.clone(),
            }
        };
        match message {
            Some(message) => self.node.dispatcher.delete(&message).await,
            None => Err(TsxError::NotMounted),
        }
    }
}
