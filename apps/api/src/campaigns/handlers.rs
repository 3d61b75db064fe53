//! Axum route handlers for the Campaigns API.

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap},
    Json,
};
use chrono::Utc;
use serde::{de::DeserializeOwned, Deserialize};
use tracing::warn;

use crate::campaigns::batch::{evaluate_batch, Decisions};
use crate::campaigns::report::{report_campaign, ReportOutcome, ReportRequest};
use crate::campaigns::visits::record_visit;
use crate::errors::AppError;
use crate::models::campaign::{CampaignConfig, SiteSettings};
use crate::models::visit::Visit;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request types
// ────────────────────────────────────────────────────────────────────────────

/// Query string of the visibility request. `popups`, `settings` and `visit` are
/// JSON documents encoded into single parameters.
#[derive(Debug, Deserialize)]
pub struct MaybeShowQuery {
    pub cid: Option<String>,
    pub popups: Option<String>,
    pub settings: Option<String>,
    pub visit: Option<String>,
}

/// Validated form of [`MaybeShowQuery`].
#[derive(Debug)]
pub struct MaybeShowInput {
    pub client_id: String,
    pub campaigns: Vec<CampaignConfig>,
    pub settings: SiteSettings,
    pub visit: Option<Visit>,
}

impl TryFrom<MaybeShowQuery> for MaybeShowInput {
    type Error = AppError;

    fn try_from(query: MaybeShowQuery) -> Result<Self, Self::Error> {
        let client_id = query
            .cid
            .filter(|cid| !cid.trim().is_empty())
            .ok_or_else(|| AppError::Validation("cid is required".to_string()))?;
        let campaigns = parse_param("popups", query.popups.as_deref())?;
        let settings = parse_param("settings", query.settings.as_deref())?;
        let visit = match query.visit.as_deref().map(str::trim) {
            None | Some("") | Some("null") => None,
            Some(raw) => Some(parse_param("visit", Some(raw))?),
        };

        Ok(Self {
            client_id,
            campaigns,
            settings,
            visit,
        })
    }
}

fn parse_param<T: DeserializeOwned>(name: &str, raw: Option<&str>) -> Result<T, AppError> {
    let raw = raw.ok_or_else(|| AppError::Validation(format!("{name} is required")))?;
    serde_json::from_str(raw)
        .map_err(|e| AppError::Validation(format!("{name} is not valid: {e}")))
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/campaigns/maybe-show
///
/// Records the page view (when event logging is on), then decides every candidate
/// campaign for the visitor. Responds with `{campaign_id: bool}`.
pub async fn handle_maybe_show(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<MaybeShowQuery>,
) -> Result<Json<Decisions>, AppError> {
    let input = MaybeShowInput::try_from(query)?;
    let referer = headers
        .get(header::REFERER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    let now = Utc::now();

    if let Some(visit) = &input.visit {
        if let Err(e) = record_visit(
            state.store.as_ref(),
            state.visit_logger.as_ref(),
            &input.client_id,
            visit,
            state.config.campaign_event_logging,
            now,
        )
        .await
        {
            warn!("Could not record visit for client {}: {e}", input.client_id);
        }
    }

    let decisions = evaluate_batch(
        state.store.as_ref(),
        &input.client_id,
        &input.campaigns,
        &input.settings,
        referer,
        now,
    )
    .await;

    Ok(Json(decisions))
}

/// POST /api/v1/campaigns/report
///
/// Records a display, a permanent dismissal, or a subscription for one campaign.
pub async fn handle_report(
    State(state): State<AppState>,
    Json(request): Json<ReportRequest>,
) -> Result<Json<ReportOutcome>, AppError> {
    if request.cid.trim().is_empty() {
        return Err(AppError::Validation("cid cannot be empty".to_string()));
    }
    if request.popup_id.trim().is_empty() {
        return Err(AppError::Validation("popup_id cannot be empty".to_string()));
    }

    let outcome = report_campaign(state.store.as_ref(), &request, Utc::now()).await?;
    Ok(Json(outcome))
}
