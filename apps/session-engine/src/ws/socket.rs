//! Socket abstraction between the engine and whatever transport carries it.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::ws::protocol::Notification;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SocketId(pub Uuid);

impl SocketId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SocketId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SocketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SocketError {
    #[error("socket closed")]
    Closed,
}

/// Outbound half of a client connection. Sends never block.
pub trait Socket: fmt::Debug + Send + Sync {
    fn id(&self) -> SocketId;
    fn send(&self, msg: Notification) -> Result<(), SocketError>;
}

/// Socket backed by an unbounded channel; the receiver is handed to the transport.
#[derive(Debug)]
pub struct ChannelSocket {
    id: SocketId,
    tx: mpsc::UnboundedSender<Notification>,
}

impl ChannelSocket {
    pub fn pair() -> (Arc<Self>, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let socket = Arc::new(Self {
            id: SocketId::new(),
            tx,
        });
        (socket, rx)
    }
}

impl Socket for ChannelSocket {
    fn id(&self) -> SocketId {
        self.id
    }

    fn send(&self, msg: Notification) -> Result<(), SocketError> {
        self.tx.send(msg).map_err(|_| SocketError::Closed)
    }
}
