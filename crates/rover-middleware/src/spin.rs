//! The poll-and-sleep dispatch loop.
//!
//! [`spin`] never parks inside a blocking wait: each iteration asks the
//! node for at most one pending message ([`Node::spin_once`], timeout = 0)
//! and then sleeps a fixed [`SPIN_SLEEP`]. The loop re-checks the runtime's
//! running flag every iteration, so an interrupt stops the process within
//! one sleep interval – at the cost of a little busy-polling CPU. Swapping
//! this for an indefinitely-blocking dispatch call would leave Ctrl-C
//! unanswered until the next message happened to arrive.

use std::thread;
use std::time::Duration;

use crate::node::Node;

/// Fixed pause between poll attempts.
pub const SPIN_SLEEP: Duration = Duration::from_micros(100);

/// Drive `node` until the runtime's running flag clears.
///
/// At most one message is dispatched per iteration. Returns once
/// [`Context::ok`][crate::context::Context::ok] reports false; after that
/// no further dispatch occurs and the caller proceeds to node teardown and
/// context shutdown, in that order.
pub fn spin(node: &mut Node) {
    while node.context().ok() {
        node.spin_once();
        thread::sleep(SPIN_SLEEP);
    }
}
