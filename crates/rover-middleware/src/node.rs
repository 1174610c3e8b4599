//! [`Node`] – one addressable participant in the middleware graph.
//!
//! A node is composition, not inheritance: it holds a handle to the
//! runtime [`Context`] that created it plus the subscription and publisher
//! endpoints it owns. Subscriptions bind a topic name, a declared
//! [`MessageType`], a [`QosProfile`], and a callback; [`Node::spin_once`]
//! is the non-blocking dispatch call that hands one pending message to its
//! callback.

use rover_types::{Message, MessagePayload, MessageType, QosProfile, RoverError};
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::bus::TopicBus;
use crate::context::Context;

/// An immutable binding of (topic, message type, QoS, callback) owned by
/// the node that created it.
pub struct Subscription {
    topic: String,
    msg_type: MessageType,
    qos: QosProfile,
    receiver: broadcast::Receiver<Message>,
    callback: Box<dyn FnMut(Message) + Send>,
    /// Set once the topic channel reports `Closed`; the subscription is
    /// skipped from then on.
    closed: bool,
}

impl Subscription {
    /// Topic this subscription listens on.
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Message type the subscription declared at creation.
    pub fn message_type(&self) -> MessageType {
        self.msg_type
    }

    /// QoS profile the subscription was created with.
    pub fn qos(&self) -> QosProfile {
        self.qos
    }
}

/// Sending endpoint bound to one topic and one declared message type.
#[derive(Clone)]
pub struct Publisher {
    topic: String,
    msg_type: MessageType,
    bus: TopicBus,
}

impl Publisher {
    /// Wrap `payload` in a stamped envelope and publish it.
    ///
    /// Returns the number of subscriptions the message was handed to
    /// (`Ok(0)` when nobody listens yet).
    ///
    /// # Errors
    ///
    /// [`RoverError::TypeMismatch`] when `payload` does not carry the
    /// message type this publisher declared.
    pub fn publish(&self, payload: MessagePayload) -> Result<usize, RoverError> {
        let got = payload.message_type();
        if got != self.msg_type {
            return Err(RoverError::TypeMismatch {
                topic: self.topic.clone(),
                expected: self.msg_type,
                got,
            });
        }
        self.bus
            .publish(&self.topic, Message::new(self.topic.as_str(), payload))
    }

    /// Topic this publisher sends on.
    pub fn topic(&self) -> &str {
        &self.topic
    }
}

/// One participant in the graph: a registered name plus the endpoints it
/// owns. Created through [`Context::create_node`]; the name stays in
/// exclusive use until [`Node::destroy`] (or drop) releases it.
pub struct Node {
    name: String,
    context: Context,
    subscriptions: Vec<Subscription>,
    destroyed: bool,
}

impl Node {
    pub(crate) fn new(name: String, context: Context) -> Self {
        Self {
            name,
            context,
            subscriptions: Vec::new(),
            destroyed: false,
        }
    }

    /// The node's registered name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The runtime context this node belongs to.
    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Create a subscription to `topic`.
    ///
    /// `callback` runs on the spin thread, once per dispatched message.
    /// Messages whose payload type differs from `msg_type` never reach it.
    ///
    /// # Errors
    ///
    /// [`RoverError::ContextShutDown`] when the runtime is no longer
    /// running.
    pub fn create_subscription(
        &mut self,
        topic: &str,
        msg_type: MessageType,
        qos: QosProfile,
        callback: impl FnMut(Message) + Send + 'static,
    ) -> Result<(), RoverError> {
        if !self.context.ok() {
            return Err(RoverError::ContextShutDown);
        }
        let receiver = self.context.bus().subscribe(topic, qos);
        debug!(node = %self.name, topic, %msg_type, "subscription created");
        self.subscriptions.push(Subscription {
            topic: topic.to_string(),
            msg_type,
            qos,
            receiver,
            callback: Box::new(callback),
            closed: false,
        });
        Ok(())
    }

    /// Create a publisher on `topic` declaring `msg_type`.
    ///
    /// # Errors
    ///
    /// [`RoverError::ContextShutDown`] when the runtime is no longer
    /// running.
    pub fn create_publisher(
        &self,
        topic: &str,
        msg_type: MessageType,
    ) -> Result<Publisher, RoverError> {
        if !self.context.ok() {
            return Err(RoverError::ContextShutDown);
        }
        Ok(Publisher {
            topic: topic.to_string(),
            msg_type,
            bus: self.context.bus().clone(),
        })
    }

    /// Dispatch at most one pending message to its subscription callback.
    ///
    /// Non-blocking (timeout = 0): subscriptions are scanned in
    /// registration order, the first with a pending message gets exactly
    /// one delivery and the call returns `true`; with nothing pending the
    /// call returns `false` immediately.
    ///
    /// A message whose payload type contradicts the subscription's
    /// declared type is dropped with a warning. `Lagged(n)` means the
    /// history depth was exceeded and `n` messages were discarded
    /// oldest-first; the scan keeps going on the same subscription.
    pub fn spin_once(&mut self) -> bool {
        for sub in &mut self.subscriptions {
            if sub.closed {
                continue;
            }
            loop {
                match sub.receiver.try_recv() {
                    Ok(msg) => {
                        let got = msg.payload.message_type();
                        if got != sub.msg_type {
                            warn!(
                                topic = %sub.topic,
                                expected = %sub.msg_type,
                                %got,
                                "dropping message with mismatched type"
                            );
                            continue;
                        }
                        (sub.callback)(msg);
                        return true;
                    }
                    Err(broadcast::error::TryRecvError::Lagged(n)) => {
                        warn!(
                            topic = %sub.topic,
                            dropped = n,
                            reliability = ?sub.qos.reliability,
                            "subscription lagged; history depth exceeded"
                        );
                        continue;
                    }
                    Err(broadcast::error::TryRecvError::Empty) => break,
                    Err(broadcast::error::TryRecvError::Closed) => {
                        sub.closed = true;
                        break;
                    }
                }
            }
        }
        false
    }

    /// Release the node's subscriptions and deregister its name.
    ///
    /// Idempotent best-effort: dropping the node does the same work, so an
    /// explicit call is optional – but when made at all it must precede
    /// [`Context::shutdown`].
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.subscriptions.clear();
        self.context.deregister_node(&self.name);
        self.destroyed = true;
        debug!(node = %self.name, "node destroyed");
    }
}

impl Drop for Node {
    fn drop(&mut self) {
        self.destroy();
    }
}
