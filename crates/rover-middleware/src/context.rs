//! [`Context`] – the process-wide middleware runtime handle.
//!
//! One `Context` plays the role the surrounding framework plays for a
//! middleware node: it owns the topic bus, the exclusive node-name
//! registry, and the "still running" flag that the spin loop polls. A
//! Ctrl-C handler installed at init time clears the flag, so interrupt
//! handling lives entirely in here and the dispatch path never needs to be
//! interruptible itself.

use std::collections::HashSet;
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, Ordering},
};

use rover_types::RoverError;
use tracing::{info, warn};

use crate::bus::TopicBus;
use crate::node::Node;

/// Process-wide runtime state. Clone it cheaply – all clones share the
/// same bus, registry, and running flag.
#[derive(Clone, Debug)]
pub struct Context {
    running: Arc<AtomicBool>,
    bus: TopicBus,
    node_names: Arc<Mutex<HashSet<String>>>,
}

impl Context {
    /// Initialise the middleware runtime.
    ///
    /// Installs a Ctrl-C handler that clears the running flag. The install
    /// is best-effort: when another handler already owns the signal (e.g.
    /// a second `Context` in the same process, as in tests) a warning is
    /// logged and the flag can still be cleared via [`Context::shutdown`].
    pub fn init() -> Self {
        let running = Arc::new(AtomicBool::new(true));

        let running_for_signal = Arc::clone(&running);
        if let Err(e) = ctrlc::set_handler(move || {
            println!();
            info!("interrupt received; stopping the middleware graph");
            running_for_signal.store(false, Ordering::SeqCst);
        }) {
            warn!(error = %e, "failed to install Ctrl-C handler; interrupt will not stop the graph");
        }

        Self {
            running,
            bus: TopicBus::new(),
            node_names: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// The "still running" query polled by the spin loop.
    ///
    /// `true` until an interrupt arrives or [`Context::shutdown`] runs.
    pub fn ok(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Shut the runtime down: clear the running flag and drop every topic
    /// channel. Idempotent. Nodes must be destroyed before this runs if
    /// they are destroyed at all.
    pub fn shutdown(&self) {
        self.running.store(false, Ordering::SeqCst);
        self.bus.close();
    }

    /// Create a node registered under `name`.
    ///
    /// # Errors
    ///
    /// - [`RoverError::ContextShutDown`] when the runtime is no longer
    ///   running.
    /// - [`RoverError::DuplicateNodeName`] when `name` is already in
    ///   exclusive use by another live node.
    pub fn create_node(&self, name: &str) -> Result<Node, RoverError> {
        if !self.ok() {
            return Err(RoverError::ContextShutDown);
        }
        {
            let mut names = self.lock_names();
            if !names.insert(name.to_string()) {
                return Err(RoverError::DuplicateNodeName(name.to_string()));
            }
        }
        Ok(Node::new(name.to_string(), self.clone()))
    }

    /// Handle to the shared topic bus.
    pub fn bus(&self) -> &TopicBus {
        &self.bus
    }

    /// Release `name` back to the registry. Called by [`Node::destroy`].
    pub(crate) fn deregister_node(&self, name: &str) {
        self.lock_names().remove(name);
    }

    fn lock_names(&self) -> std::sync::MutexGuard<'_, HashSet<String>> {
        self.node_names
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_context_reports_ok() {
        let ctx = Context::init();
        assert!(ctx.ok());
    }

    #[test]
    fn shutdown_clears_running_flag() {
        let ctx = Context::init();
        ctx.shutdown();
        assert!(!ctx.ok());
    }

    #[test]
    fn shutdown_is_idempotent() {
        let ctx = Context::init();
        ctx.shutdown();
        ctx.shutdown();
        assert!(!ctx.ok());
    }

    #[test]
    fn clones_share_the_running_flag() {
        let ctx = Context::init();
        let clone = ctx.clone();
        ctx.shutdown();
        assert!(!clone.ok());
    }

    #[test]
    fn create_node_rejects_duplicate_names() {
        let ctx = Context::init();
        let _first = ctx.create_node("navigator").unwrap();
        let second = ctx.create_node("navigator");
        assert_eq!(
            second.err(),
            Some(RoverError::DuplicateNodeName("navigator".to_string()))
        );
    }

    #[test]
    fn create_node_rejected_after_shutdown() {
        let ctx = Context::init();
        ctx.shutdown();
        let result = ctx.create_node("navigator");
        assert_eq!(result.err(), Some(RoverError::ContextShutDown));
    }

    #[test]
    fn destroyed_node_frees_its_name() {
        let ctx = Context::init();
        let mut node = ctx.create_node("navigator").unwrap();
        node.destroy();
        assert!(ctx.create_node("navigator").is_ok());
    }

    #[test]
    fn dropped_node_frees_its_name() {
        let ctx = Context::init();
        {
            let _node = ctx.create_node("navigator").unwrap();
        }
        assert!(ctx.create_node("navigator").is_ok());
    }
}
