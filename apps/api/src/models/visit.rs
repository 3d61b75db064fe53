use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::models::de::{id_list, optional_id};

/// The page-view descriptor sent alongside a visibility request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Visit {
    #[serde(default)]
    pub is_post: bool,
    /// Set by the page for any fresh page load, posts or not. Forwarded, never
    /// used to decide whether a post was read.
    #[serde(default)]
    pub is_new_page_view: bool,
    #[serde(default, deserialize_with = "optional_id")]
    pub post_id: Option<u64>,
    #[serde(default, alias = "category_ids", deserialize_with = "id_list")]
    pub categories: Vec<u64>,
    /// Remaining descriptor fields, forwarded untouched to the analytics sink.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Normalized visit handed to a [`crate::campaigns::visits::VisitLogger`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisitEvent {
    pub client_id: String,
    pub post_id: Option<u64>,
    pub category_ids: Vec<u64>,
    pub recorded_at: DateTime<Utc>,
    pub payload: Value,
}

impl VisitEvent {
    pub fn from_visit(client_id: &str, visit: &Visit, recorded_at: DateTime<Utc>) -> Self {
        let mut payload = visit.extra.clone();
        payload.insert("clientId".to_string(), Value::String(client_id.to_string()));
        payload.insert("is_post".to_string(), Value::Bool(visit.is_post));
        payload.insert(
            "is_new_page_view".to_string(),
            Value::Bool(visit.is_new_page_view),
        );
        if let Some(post_id) = visit.post_id {
            payload.insert("post_id".to_string(), Value::from(post_id));
        }
        payload.insert("categories".to_string(), Value::from(visit.categories.clone()));

        Self {
            client_id: client_id.to_string(),
            post_id: visit.post_id,
            category_ids: visit.categories.clone(),
            recorded_at,
            payload: Value::Object(payload),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visit_keeps_unknown_fields() {
        let visit: Visit = serde_json::from_str(
            r#"{"is_post": true, "post_id": "55", "categories": "1,2", "author": 9}"#,
        )
        .unwrap();
        assert!(visit.is_post);
        assert_eq!(visit.post_id, Some(55));
        assert_eq!(visit.categories, vec![1, 2]);
        assert_eq!(visit.extra.get("author"), Some(&Value::from(9)));
    }

    #[test]
    fn test_event_payload_merges_client_id() {
        let visit = Visit {
            is_post: true,
            is_new_page_view: true,
            post_id: Some(3),
            categories: vec![4],
            extra: Map::new(),
        };
        let event = VisitEvent::from_visit("amp-123", &visit, Utc::now());
        assert_eq!(event.payload["clientId"], "amp-123");
        assert_eq!(event.payload["post_id"], 3);
        assert_eq!(event.payload["is_new_page_view"], true);
        assert_eq!(event.category_ids, vec![4]);
    }

    #[test]
    fn test_page_view_flag_is_separate_from_is_post() {
        let visit: Visit = serde_json::from_str(
            r#"{"is_post": false, "is_new_page_view": true, "post_id": 5, "categories": [1]}"#,
        )
        .unwrap();
        assert!(!visit.is_post);
        assert!(visit.is_new_page_view);
        assert!(visit.extra.is_empty());

        let page_view: Visit =
            serde_json::from_str(r#"{"is_new_page_view": true, "post_id": 5}"#).unwrap();
        assert!(!page_view.is_post);
    }
}
