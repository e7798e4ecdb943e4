use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::entities::maintenance_request::RequestStage;

/// Domain events emitted by the services. Delivery is fire-and-forget;
/// nothing in the request path waits on a consumer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    RequestCreated {
        request_id: Uuid,
        company_id: Uuid,
    },
    RequestStageChanged {
        request_id: Uuid,
        old_stage: RequestStage,
        new_stage: RequestStage,
    },
    RequestAssigned {
        request_id: Uuid,
        technician_id: Option<Uuid>,
        assigned_by: Uuid,
    },
    RequestCompleted {
        request_id: Uuid,
        duration_hours: f64,
        completed_at: DateTime<Utc>,
    },
    /// Informational notice raised when a request is scrapped: the linked
    /// equipment should be reviewed. The event does not mutate equipment;
    /// scrapping equipment is a separate explicit action.
    EquipmentReviewSuggested {
        request_id: Uuid,
        equipment_id: Uuid,
    },
    EquipmentScrapped {
        equipment_id: Uuid,
        scrapped_at: DateTime<Utc>,
    },
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event; a full or closed channel is logged, never propagated.
    pub async fn send(&self, event: Event) {
        if let Err(e) = self.sender.send(event).await {
            warn!("Failed to send event: {}", e);
        }
    }
}

/// Event processing loop, spawned once at startup. A notification gateway
/// would subscribe here; for now events are logged.
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        match &event {
            Event::RequestStageChanged {
                request_id,
                old_stage,
                new_stage,
            } => {
                info!(
                    request_id = %request_id,
                    "Request stage changed: {} -> {}",
                    old_stage, new_stage
                );
            }
            Event::EquipmentReviewSuggested {
                request_id,
                equipment_id,
            } => {
                info!(
                    request_id = %request_id,
                    equipment_id = %equipment_id,
                    "Equipment linked to a scrapped request should be reviewed"
                );
            }
            other => info!("Event: {:?}", other),
        }
    }

    info!("Event channel closed; processing loop exiting");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn send_delivers_to_receiver() {
        let (tx, mut rx) = mpsc::channel(4);
        let sender = EventSender::new(tx);

        let id = Uuid::new_v4();
        sender
            .send(Event::RequestCreated {
                request_id: id,
                company_id: Uuid::new_v4(),
            })
            .await;

        match rx.recv().await {
            Some(Event::RequestCreated { request_id, .. }) => assert_eq!(request_id, id),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn send_on_closed_channel_does_not_panic() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let sender = EventSender::new(tx);
        sender
            .send(Event::EquipmentScrapped {
                equipment_id: Uuid::new_v4(),
                scrapped_at: Utc::now(),
            })
            .await;
    }
}
