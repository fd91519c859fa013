use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Sending half of the domain event channel
#[derive(Clone, Debug)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    /// Creates a new EventSender
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }

    /// Sends an event; a closed channel is logged rather than failing the caller
    pub async fn send_or_log(&self, event: Event) {
        if let Err(e) = self.send(event).await {
            warn!("{}", e);
        }
    }
}

/// Things that happened in the shop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    UserRegistered {
        user_id: i32,
        profile_id: i32,
    },
    UserSignedIn(i32),
    UserSignedOut(i32),
    PasswordChanged(i32),
    ProfileUpdated(i32),
    AvatarUploaded {
        profile_id: i32,
        src: String,
    },
    ReviewPosted {
        product_id: i32,
        review_id: i32,
        rate: i16,
    },
    BasketItemAdded {
        user_id: i32,
        product_id: i32,
        count: i32,
    },
    BasketItemRemoved {
        user_id: i32,
        product_id: i32,
        count: i32,
    },
    OrderCreated(i32),
    OrderConfirmed(i32),
    CategoryCreated(i32),
    CategoryDeleted(i32),
    ProductCreated(i32),
    ProductArchived(i32),
    ProductImported {
        product_id: i32,
        title: String,
    },
    SaleCreated {
        sale_id: i32,
        product_id: i32,
    },
}

/// Drains the event channel, logging each event, until every sender is dropped
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        match &event {
            Event::OrderCreated(order_id) => info!(order_id, "order created"),
            Event::ReviewPosted {
                product_id, rate, ..
            } => info!(product_id, rate, "review posted"),
            other => info!(event = ?other, "event received"),
        }
    }

    info!("Event channel closed; event processing stopped");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn events_reach_the_receiver_in_order() {
        let (tx, mut rx) = mpsc::channel(4);
        let sender = EventSender::new(tx);
        sender.send_or_log(Event::OrderCreated(1)).await;
        sender.send_or_log(Event::OrderConfirmed(1)).await;

        assert_eq!(rx.recv().await, Some(Event::OrderCreated(1)));
        assert_eq!(rx.recv().await, Some(Event::OrderConfirmed(1)));
    }

    #[tokio::test]
    async fn closed_channel_does_not_fail_sender() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let sender = EventSender::new(tx);
        assert!(sender.send(Event::ProductArchived(3)).await.is_err());
        sender.send_or_log(Event::ProductArchived(3)).await;
    }
}
