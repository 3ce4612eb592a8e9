//! In-process fan-out of application status changes.
//!
//! Handlers publish after a successful submit or review; every open
//! `GET /api/applications/events` stream holds one receiver.

use internhub_core::model::application::{ApplicationId, ApplicationStatus};
use internhub_core::model::intern::InternId;
use internhub_core::repo::application_repo::ApplicationRecord;
use log::debug;
use serde::Serialize;
use tokio::sync::broadcast;

/// Slow subscribers skip events beyond this backlog.
const FEED_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdate {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub id: ApplicationId,
    pub intern_id: InternId,
    pub status: ApplicationStatus,
}

impl StatusUpdate {
    pub fn from_record(record: &ApplicationRecord) -> Self {
        Self {
            kind: "APPLICATION_STATUS",
            id: record.application.id,
            intern_id: record.application.intern_id,
            status: record.application.status,
        }
    }
}

#[derive(Clone)]
pub struct StatusFeed {
    sender: broadcast::Sender<StatusUpdate>,
}

impl Default for StatusFeed {
    fn default() -> Self {
        let (sender, _) = broadcast::channel(FEED_CAPACITY);
        Self { sender }
    }
}

impl StatusFeed {
    pub fn publish(&self, update: StatusUpdate) {
        let status = update.status;
        match self.sender.send(update) {
            Ok(listeners) => debug!(
                "event=status_publish module=server status=ok application_status={status} listeners={listeners}"
            ),
            Err(_) => debug!(
                "event=status_publish module=server status=skipped application_status={status} listeners=0"
            ),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StatusUpdate> {
        self.sender.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::{StatusFeed, StatusUpdate};
    use internhub_core::model::application::ApplicationStatus;
    use serde_json::json;
    use uuid::Uuid;

    fn update(status: ApplicationStatus) -> StatusUpdate {
        StatusUpdate {
            kind: "APPLICATION_STATUS",
            id: Uuid::nil(),
            intern_id: Uuid::nil(),
            status,
        }
    }

    #[test]
    fn updates_serialize_with_type_tag() {
        let value = serde_json::to_value(update(ApplicationStatus::Approved)).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "APPLICATION_STATUS",
                "id": Uuid::nil(),
                "internId": Uuid::nil(),
                "status": "APPROVED"
            })
        );
    }

    #[tokio::test]
    async fn subscribers_receive_published_updates() {
        let feed = StatusFeed::default();
        feed.publish(update(ApplicationStatus::Submitted));

        let mut receiver = feed.subscribe();
        feed.publish(update(ApplicationStatus::Rejected));
        assert_eq!(
            receiver.recv().await.unwrap().status,
            ApplicationStatus::Rejected
        );
    }
}
