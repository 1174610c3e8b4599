//! Dynamic, topic-keyed publish/subscribe bus.
//!
//! Uses [`tokio::sync::broadcast`] channels under the hood so that every
//! subscriber on a topic receives every message without any single
//! subscriber blocking the others. Topics are created lazily: the first
//! endpoint (publisher or subscription) that touches a topic name brings
//! its channel into existence.
//!
//! Delivery order per topic is the broadcast channel's FIFO order. A
//! subscriber that falls more than the history depth behind observes
//! `Lagged(n)`: the oldest `n` messages were discarded, which is exactly
//! the best-effort behaviour the sensor-data QoS preset asks for.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use rover_types::{Message, QosProfile, RoverError};
use tokio::sync::broadcast;

/// Buffer depth used when a publisher touches a topic before any
/// subscription has declared a QoS profile for it.
const DEFAULT_DEPTH: usize = 16;

/// Shared topic bus. Clone it cheaply – all clones share the same
/// underlying channel map.
#[derive(Clone, Debug, Default)]
pub struct TopicBus {
    topics: Arc<Mutex<HashMap<String, broadcast::Sender<Message>>>>,
}

impl TopicBus {
    /// Create an empty bus with no topics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish `message` to every current subscriber of `topic`.
    ///
    /// Returns the number of active receivers that were handed the
    /// message. `Ok(0)` when no subscription is currently listening on the
    /// topic (a normal condition, not an error).
    pub fn publish(&self, topic: &str, message: Message) -> Result<usize, RoverError> {
        let sender = self.sender_for(topic, DEFAULT_DEPTH);
        match sender.send(message) {
            Ok(n) => Ok(n),
            // send fails only when there are zero receivers; the message
            // simply has no audience yet.
            Err(broadcast::error::SendError(_)) => Ok(0),
        }
    }

    /// Subscribe to `topic` with the given QoS profile.
    ///
    /// The first endpoint on a topic fixes the channel's buffer size from
    /// `qos.depth`; later endpoints share the existing channel and its
    /// depth.
    pub fn subscribe(&self, topic: &str, qos: QosProfile) -> broadcast::Receiver<Message> {
        self.sender_for(topic, qos.depth.max(1)).subscribe()
    }

    /// Number of active subscriptions on `topic`.
    pub fn subscriber_count(&self, topic: &str) -> usize {
        let topics = self.lock_topics();
        topics
            .get(topic)
            .map(|sender| sender.receiver_count())
            .unwrap_or(0)
    }

    /// Drop every topic channel.
    ///
    /// Existing receivers keep draining messages already buffered, then
    /// observe `Closed`. Called by the context on shutdown.
    pub fn close(&self) {
        self.lock_topics().clear();
    }

    fn sender_for(&self, topic: &str, depth: usize) -> broadcast::Sender<Message> {
        let mut topics = self.lock_topics();
        topics
            .entry(topic.to_string())
            .or_insert_with(|| broadcast::channel(depth).0)
            .clone()
    }

    fn lock_topics(&self) -> std::sync::MutexGuard<'_, HashMap<String, broadcast::Sender<Message>>> {
        self.topics
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rover_types::{GpsFix, MessagePayload};

    fn gps_message(lat: f64) -> Message {
        Message::new(
            "/sensors/gps",
            MessagePayload::NavSatFix(GpsFix {
                latitude: lat,
                longitude: 2.0,
                altitude: 3.0,
            }),
        )
    }

    #[tokio::test]
    async fn publish_and_receive() -> Result<(), Box<dyn std::error::Error>> {
        let bus = TopicBus::new();
        let mut rx = bus.subscribe("/sensors/gps", QosProfile::sensor_data());

        let msg = gps_message(1.0);
        let delivered = bus.publish("/sensors/gps", msg.clone())?;
        assert_eq!(delivered, 1);

        let received = rx.recv().await?;
        assert_eq!(received.id, msg.id);
        assert_eq!(received.payload, msg.payload);
        Ok(())
    }

    #[test]
    fn publish_without_subscribers_is_ok_zero() {
        let bus = TopicBus::new();
        let delivered = bus.publish("/sensors/gps", gps_message(1.0)).unwrap();
        assert_eq!(delivered, 0);
    }

    #[tokio::test]
    async fn multiple_subscribers_receive_same_message() -> Result<(), Box<dyn std::error::Error>> {
        let bus = TopicBus::new();
        let mut rx1 = bus.subscribe("/sensors/gps", QosProfile::sensor_data());
        let mut rx2 = bus.subscribe("/sensors/gps", QosProfile::sensor_data());

        let msg = gps_message(1.0);
        bus.publish("/sensors/gps", msg.clone())?;

        assert_eq!(rx1.recv().await?.id, msg.id);
        assert_eq!(rx2.recv().await?.id, msg.id);
        Ok(())
    }

    #[tokio::test]
    async fn subscriber_does_not_receive_other_topic_messages() {
        let bus = TopicBus::new();
        let mut imu_rx = bus.subscribe("/sensors/imu", QosProfile::sensor_data());
        let _gps_rx = bus.subscribe("/sensors/gps", QosProfile::sensor_data());

        bus.publish("/sensors/gps", gps_message(1.0)).unwrap();

        let result = tokio::time::timeout(
            std::time::Duration::from_millis(50),
            imu_rx.recv(),
        )
        .await;
        assert!(
            result.is_err(),
            "an /sensors/imu subscriber must not receive /sensors/gps traffic"
        );
    }

    #[test]
    fn messages_arrive_in_publish_order() {
        let bus = TopicBus::new();
        let mut rx = bus.subscribe("/sensors/gps", QosProfile::sensor_data());

        bus.publish("/sensors/gps", gps_message(1.0)).unwrap();
        bus.publish("/sensors/gps", gps_message(2.0)).unwrap();

        let first = rx.try_recv().unwrap();
        let second = rx.try_recv().unwrap();
        assert!(matches!(
            first.payload,
            MessagePayload::NavSatFix(GpsFix { latitude, .. }) if latitude == 1.0
        ));
        assert!(matches!(
            second.payload,
            MessagePayload::NavSatFix(GpsFix { latitude, .. }) if latitude == 2.0
        ));
    }

    #[tokio::test]
    async fn slow_subscriber_lags_past_history_depth() {
        let bus = TopicBus::new();
        // Depth comes from the first subscription on the topic.
        let mut slow_rx = bus.subscribe("/sensors/gps", QosProfile::sensor_data());

        // Flood far more messages than the 5-deep sensor-data buffer holds.
        for i in 0..100 {
            bus.publish("/sensors/gps", gps_message(i as f64)).unwrap();
        }

        let result = slow_rx.recv().await;
        assert!(
            matches!(result, Err(broadcast::error::RecvError::Lagged(_))),
            "expected Lagged error, got: {result:?}"
        );
    }

    #[test]
    fn close_disconnects_receivers_after_drain() {
        let bus = TopicBus::new();
        let mut rx = bus.subscribe("/sensors/gps", QosProfile::sensor_data());
        bus.publish("/sensors/gps", gps_message(1.0)).unwrap();

        bus.close();

        // Buffered message still drains, then the channel reports closed.
        assert!(rx.try_recv().is_ok());
        assert!(matches!(
            rx.try_recv(),
            Err(broadcast::error::TryRecvError::Closed)
        ));
    }

    #[test]
    fn subscriber_count_tracks_subscriptions() {
        let bus = TopicBus::new();
        assert_eq!(bus.subscriber_count("/sensors/gps"), 0);
        let _rx = bus.subscribe("/sensors/gps", QosProfile::sensor_data());
        assert_eq!(bus.subscriber_count("/sensors/gps"), 1);
    }
}
