//! [`NavigatorNode`] – the example GPS subscriber.
//!
//! Owns one middleware [`Node`] with a single subscription to the GPS
//! topic. Every dispatched fix is turned into one line of text on standard
//! output. There is deliberately nothing else here: the node exists to
//! show what a node, a subscription, and a QoS profile look like.

use rover_middleware::{Context, Node, spin};
use rover_types::{GpsFix, MessagePayload, MessageType, QosProfile, RoverError};

/// Topic the navigator listens on.
pub const GPS_TOPIC: &str = "/sensors/gps";

/// Name the node registers under with the runtime.
pub const NODE_NAME: &str = "navigator";

/// The example node: one subscription, one callback, no other state.
pub struct NavigatorNode {
    node: Node,
}

impl NavigatorNode {
    /// Register the node and its GPS subscription, printing each received
    /// fix to standard output.
    ///
    /// # Errors
    ///
    /// Propagates the runtime's registration failures: a duplicate node
    /// name or a context that is already shut down.
    pub fn new(ctx: &Context) -> Result<Self, RoverError> {
        Self::with_line_sink(ctx, |line| println!("{line}"))
    }

    /// Like [`NavigatorNode::new`] but sending each formatted line to
    /// `sink` instead of standard output. Tests use this to capture the
    /// node's exact output.
    pub fn with_line_sink(
        ctx: &Context,
        mut sink: impl FnMut(String) + Send + 'static,
    ) -> Result<Self, RoverError> {
        let mut node = ctx.create_node(NODE_NAME)?;
        node.create_subscription(
            GPS_TOPIC,
            MessageType::NavSatFix,
            QosProfile::sensor_data(),
            move |msg| {
                // The dispatch path already filtered on the declared type,
                // so anything else arriving here is unreachable.
                if let MessagePayload::NavSatFix(fix) = msg.payload {
                    sink(gps_line(&fix));
                }
            },
        )?;
        Ok(Self { node })
    }

    /// Poll-and-sleep until the runtime stops.
    pub fn spin(&mut self) {
        spin(&mut self.node);
    }

    /// Dispatch at most one pending message. Exposed for tests that step
    /// the node manually.
    pub fn spin_once(&mut self) -> bool {
        self.node.spin_once()
    }

    /// Release the subscription and deregister from the runtime. Must run
    /// before [`Context::shutdown`] when called at all.
    pub fn destroy(&mut self) {
        self.node.destroy();
    }
}

/// Render one received fix as the node's output line.
///
/// `{:?}` rather than `{}`: Display drops the `.0` on whole-number
/// coordinates, and the output contract is `lat: 1.0`, not `lat: 1`.
pub fn gps_line(fix: &GpsFix) -> String {
    format!(
        "Got a GPS message! lat: {:?}, lon: {:?}, alt: {:?}",
        fix.latitude, fix.longitude, fix.altitude
    )
}
