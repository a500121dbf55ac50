//! Order lifecycle events.
//!
//! The checkout and reconciliation APIs publish an event whenever an order is created, paid or annulled. Anything
//! that wants to react (send an email, notify a warehouse, write an audit log) registers a hook in [`EventHooks`],
//! and the hook runs on its own task, off the request path.
mod channel;
mod event_types;
mod hooks;

pub use channel::{EventHandler, EventProducer, Handler};
pub use event_types::*;
pub use hooks::{EventHandlers, EventHooks, EventProducers};
