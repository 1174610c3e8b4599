//! `rover-navigator` – the example GPS subscriber node.
//!
//! The smallest complete participant in the rover middleware graph:
//!
//! 1. Initialise structured logging (and the optional OTLP exporter).
//! 2. Initialise the middleware [`Context`] (installs the Ctrl-C handler).
//! 3. Register the `navigator` node with its one subscription to
//!    `/sensors/gps`.
//! 4. Poll-and-sleep until interrupted, printing every received fix.
//! 5. Destroy the node, then shut the runtime down – in that order.

mod node;
mod telemetry;

use colored::Colorize;
use rover_middleware::Context;
use rover_types::RoverError;
use tracing::info;

use crate::node::NavigatorNode;

fn main() -> Result<(), RoverError> {
    let _guard = telemetry::init_tracing("rover-navigator");

    let ctx = Context::init();
    let mut navigator = NavigatorNode::new(&ctx)?;
    info!(node = node::NODE_NAME, topic = node::GPS_TOPIC, "navigator node registered");

    print_banner();

    // Runs until Ctrl-C clears the context's running flag.
    navigator.spin();

    // Teardown before runtime shutdown; the reverse order would leave the
    // node deregistering against a dead runtime.
    navigator.destroy();
    ctx.shutdown();
    info!("navigator stopped cleanly");
    Ok(())
}

fn print_banner() {
    println!("The Navigator node is now running! You can press Ctrl + C at any time to stop it.");
    println!();
    println!("Please paste the following command into a companion terminal to publish a test fix:");
    println!(
        "{} {} {} {}",
        "rover".blue(),
        "topic pub".magenta(),
        "/sensors/gps NavSatFix".green(),
        r#""{ latitude: 1.0, longitude: 2.0, altitude: 3.0 }""#.red()
    );
    println!();
}
