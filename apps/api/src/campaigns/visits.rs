//! Reading-history tracking and the analytics side channel.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::models::client::{ClientProfile, PostRead};
use crate::models::visit::{Visit, VisitEvent};
use crate::store::{CampaignStore, StoreError};

/// Analytics sink for page views. Best-effort: implementations log and swallow
/// their own failures so a broken sink never affects a visibility decision.
#[async_trait]
pub trait VisitLogger: Send + Sync {
    async fn log_visit(&self, event: &VisitEvent);
}

/// Writes visits to the service log only. Used when no database is configured.
pub struct TracingVisitLogger;

#[async_trait]
impl VisitLogger for TracingVisitLogger {
    async fn log_visit(&self, event: &VisitEvent) {
        info!(
            client_id = %event.client_id,
            post_id = ?event.post_id,
            categories = ?event.category_ids,
            "Reader visit"
        );
    }
}

/// Appends visits to the `reader_visits` table.
pub struct PgVisitLogger {
    pool: PgPool,
}

impl PgVisitLogger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VisitLogger for PgVisitLogger {
    async fn log_visit(&self, event: &VisitEvent) {
        let category_ids: Vec<i64> = event.category_ids.iter().map(|&id| id as i64).collect();
        let result = sqlx::query(
            r#"
            INSERT INTO reader_visits (id, client_id, post_id, category_ids, payload, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&event.client_id)
        .bind(event.post_id.map(|id| id as i64))
        .bind(&category_ids)
        .bind(&event.payload)
        .bind(event.recorded_at)
        .execute(&self.pool)
        .await;

        if let Err(e) = result {
            warn!("Failed to log visit for client {}: {e}", event.client_id);
        }
    }
}

/// Adds the visited post to the reading history unless it is already there.
/// Returns whether the profile changed.
pub fn append_post_read(profile: &mut ClientProfile, visit: &Visit) -> bool {
    let Some(post_id) = visit.post_id else {
        return false;
    };
    if profile.has_read(post_id) {
        return false;
    }
    profile.posts_read.push(PostRead {
        post_id,
        category_ids: visit.categories.clone(),
    });
    true
}

/// Records a page view for `client_id`.
///
/// Does nothing unless `event_logging_enabled` is set and the visit is a post view.
/// The profile is written at most once, and only when the post is new to the visitor;
/// the analytics sink sees every qualifying view.
pub async fn record_visit(
    store: &dyn CampaignStore,
    logger: &dyn VisitLogger,
    client_id: &str,
    visit: &Visit,
    event_logging_enabled: bool,
    now: DateTime<Utc>,
) -> Result<bool, StoreError> {
    if !event_logging_enabled || !visit.is_post {
        return Ok(false);
    }

    let mut profile = store.get_client_profile(client_id).await?;
    let appended = append_post_read(&mut profile, visit);
    if appended {
        store.save_client_profile(client_id, &profile).await?;
        debug!(
            "Client {client_id} has now read {} posts",
            profile.posts_read_count()
        );
    }

    logger
        .log_visit(&VisitEvent::from_visit(client_id, visit, now))
        .await;

    Ok(appended)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;
    use serde_json::Map;
    use tokio::sync::Mutex;

    #[derive(Default)]
    struct RecordingLogger {
        events: Mutex<Vec<VisitEvent>>,
    }

    #[async_trait]
    impl VisitLogger for RecordingLogger {
        async fn log_visit(&self, event: &VisitEvent) {
            self.events.lock().await.push(event.clone());
        }
    }

    fn post_view(post_id: u64) -> Visit {
        Visit {
            is_post: true,
            is_new_page_view: true,
            post_id: Some(post_id),
            categories: vec![7, 8],
            extra: Map::new(),
        }
    }

    #[tokio::test]
    async fn test_new_post_appended_and_logged() {
        let store = InMemoryStore::new();
        let logger = RecordingLogger::default();

        let appended = record_visit(&store, &logger, "amp-1", &post_view(5), true, Utc::now())
            .await
            .unwrap();
        assert!(appended);

        let profile = store.get_client_profile("amp-1").await.unwrap();
        assert_eq!(
            profile.posts_read,
            vec![PostRead {
                post_id: 5,
                category_ids: vec![7, 8]
            }]
        );
        assert_eq!(logger.events.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn test_repeat_post_logged_but_not_duplicated() {
        let store = InMemoryStore::new();
        let logger = RecordingLogger::default();

        for _ in 0..3 {
            record_visit(&store, &logger, "amp-1", &post_view(5), true, Utc::now())
                .await
                .unwrap();
        }
        record_visit(&store, &logger, "amp-1", &post_view(6), true, Utc::now())
            .await
            .unwrap();

        let profile = store.get_client_profile("amp-1").await.unwrap();
        assert_eq!(profile.posts_read_count(), 2);
        assert_eq!(logger.events.lock().await.len(), 4);
    }

    #[tokio::test]
    async fn test_disabled_logging_is_noop() {
        let store = InMemoryStore::new();
        let logger = RecordingLogger::default();

        let appended = record_visit(&store, &logger, "amp-1", &post_view(5), false, Utc::now())
            .await
            .unwrap();
        assert!(!appended);
        assert_eq!(store.get_client_profile("amp-1").await.unwrap().posts_read_count(), 0);
        assert!(logger.events.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_non_post_views_ignored() {
        let store = InMemoryStore::new();
        let logger = RecordingLogger::default();
        let visit = Visit {
            is_post: false,
            ..post_view(5)
        };

        record_visit(&store, &logger, "amp-1", &visit, true, Utc::now())
            .await
            .unwrap();
        assert!(logger.events.lock().await.is_empty());
    }

    #[test]
    fn test_visit_without_post_id_changes_nothing() {
        let mut profile = ClientProfile::default();
        let visit = Visit {
            post_id: None,
            ..post_view(1)
        };
        assert!(!append_post_read(&mut profile, &visit));
        assert!(profile.posts_read.is_empty());
    }

    #[tokio::test]
    async fn test_fresh_page_view_is_not_a_post_read() {
        let store = InMemoryStore::new();
        let logger = RecordingLogger::default();
        let visit: Visit =
            serde_json::from_str(r#"{"is_post": false, "is_new_page_view": true, "post_id": 5}"#)
                .unwrap();

        let appended = record_visit(&store, &logger, "amp-1", &visit, true, Utc::now())
            .await
            .unwrap();
        assert!(!appended);
        assert!(store.get_client_profile("amp-1").await.unwrap().posts_read.is_empty());
        assert!(logger.events.lock().await.is_empty());
    }
}
