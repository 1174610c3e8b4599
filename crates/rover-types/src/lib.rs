//! `rover-types` – shared vocabulary for the rover middleware graph.
//!
//! Message payloads, the transport envelope, quality-of-service profiles,
//! and the global error type. Everything here is plain data: the crates that
//! move these values around (`rover-middleware`, `rover-navigator`) never
//! need to know what the payloads mean.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// A single GPS fix as produced by the positioning sensor.
///
/// Raw sensor values: no validation, no units conversion, no bounds
/// checking. Latitude and longitude are in degrees, altitude in meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GpsFix {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
}

/// A battery level report from the power board.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BatteryState {
    pub voltage: f64,
    /// Remaining charge in `[0.0, 100.0]`.
    pub percentage: f64,
}

/// Message-type descriptor declared by publishers and subscriptions.
///
/// A subscription only accepts messages whose payload carries the type it
/// declared; anything else is dropped at dispatch time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageType {
    /// A satellite navigation fix ([`GpsFix`]).
    NavSatFix,
    /// A battery level report ([`BatteryState`]).
    BatteryState,
}

impl std::fmt::Display for MessageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MessageType::NavSatFix => write!(f, "NavSatFix"),
            MessageType::BatteryState => write!(f, "BatteryState"),
        }
    }
}

/// Typed payloads routed over the topic bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MessagePayload {
    NavSatFix(GpsFix),
    BatteryState(BatteryState),
}

impl MessagePayload {
    /// The [`MessageType`] descriptor matching this payload variant.
    pub fn message_type(&self) -> MessageType {
        match self {
            MessagePayload::NavSatFix(_) => MessageType::NavSatFix,
            MessagePayload::BatteryState(_) => MessageType::BatteryState,
        }
    }
}

/// Transport envelope wrapped around every payload on the bus.
///
/// `id` and `timestamp` are stamped by the publishing side; subscribers are
/// free to ignore them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    /// Topic the message was published on, e.g. `/sensors/gps`.
    pub topic: String,
    pub payload: MessagePayload,
}

impl Message {
    /// Build a new envelope around `payload`, stamping a fresh id and the
    /// current UTC time.
    pub fn new(topic: impl Into<String>, payload: MessagePayload) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            topic: topic.into(),
            payload,
        }
    }
}

/// Delivery guarantee requested by a subscription.
///
/// Carried as opaque configuration: the bus records it and sizes its
/// buffers from the companion `depth`, nothing more.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Reliability {
    /// Every message should reach the subscriber.
    Reliable,
    /// Messages may be dropped when the subscriber falls behind.
    BestEffort,
}

/// Quality-of-service profile bound to a subscription at creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QosProfile {
    pub reliability: Reliability,
    /// History depth: how many undelivered messages a topic buffers before
    /// the oldest is discarded.
    pub depth: usize,
}

impl QosProfile {
    /// Preset for high-frequency sensor streams: best-effort, shallow
    /// history. A stale GPS fix is worthless, so dropping is the right
    /// failure mode.
    pub fn sensor_data() -> Self {
        Self {
            reliability: Reliability::BestEffort,
            depth: 5,
        }
    }

    /// Preset for ordinary command/response traffic: reliable, depth 10.
    pub fn services_default() -> Self {
        Self {
            reliability: Reliability::Reliable,
            depth: 10,
        }
    }
}

impl Default for QosProfile {
    fn default() -> Self {
        Self::services_default()
    }
}

/// Global error type spanning runtime-lifecycle and channel failures.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RoverError {
    #[error("middleware context has been shut down")]
    ContextShutDown,

    #[error("node name already in use: {0}")]
    DuplicateNodeName(String),

    #[error("channel error: {0}")]
    Channel(String),

    #[error("type mismatch on {topic}: expected {expected}, got {got}")]
    TypeMismatch {
        topic: String,
        expected: MessageType,
        got: MessageType,
    },
}
