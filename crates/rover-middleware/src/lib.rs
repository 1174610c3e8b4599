//! `rover-middleware` – the in-process middleware runtime.
//!
//! Routes typed messages between publishers and subscriptions over named
//! topics, and owns the process-wide lifecycle (init, interrupt flag,
//! shutdown) that the rest of the stack polls against.
//!
//! # Modules
//!
//! - [`bus`] – [`TopicBus`][bus::TopicBus]: dynamic, topic-keyed
//!   publish/subscribe bus built on Tokio broadcast channels.
//! - [`context`] – [`Context`][context::Context]: process-wide runtime
//!   handle: installs the interrupt handler, answers the "still running"
//!   query, hands out named nodes, and shuts the graph down.
//! - [`node`] – [`Node`][node::Node], [`Subscription`][node::Subscription],
//!   [`Publisher`][node::Publisher]: one addressable participant in the
//!   graph and the endpoint handles it owns.
//! - [`spin`] – [`spin`][spin::spin]: the non-blocking poll-and-sleep
//!   dispatch loop that keeps the process responsive to Ctrl-C.

pub mod bus;
pub mod context;
pub mod node;
pub mod spin;

pub use bus::TopicBus;
pub use context::Context;
pub use node::{Node, Publisher, Subscription};
pub use spin::{SPIN_SLEEP, spin};
