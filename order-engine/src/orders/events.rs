//! Order event publishing
//!
//! Events are published after commit on a spawned task; the request never
//! waits for delivery and a failed publish never fails the operation.

use std::sync::Arc;

use async_trait::async_trait;
use shared::order::OrderEvent;

#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, event: OrderEvent);
}

/// Writes events to the log
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingPublisher;

#[async_trait]
impl EventPublisher for TracingPublisher {
    async fn publish(&self, event: OrderEvent) {
        tracing::info!(
            event = event.name(),
            order_id = event.order_id,
            merchant_id = event.merchant_id,
            "Order event"
        );
    }
}

/// Fire-and-forget publish
pub fn spawn_publish(publisher: &Arc<dyn EventPublisher>, event: OrderEvent) {
    let publisher = Arc::clone(publisher);
    tokio::spawn(async move {
        publisher.publish(event).await;
    });
}
