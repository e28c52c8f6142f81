//! Boundary with the transport: sockets, messages, session lookup and routing.

pub mod dispatch;
pub mod protocol;
pub mod registry;
pub mod socket;

pub use dispatch::ActionRouter;
pub use protocol::{ActionReply, Notification, Request};
pub use registry::SessionRegistry;
pub use socket::{ChannelSocket, Socket, SocketError, SocketId};
