//! Channel route handlers: what is on air now, and the full programme.
//!
//! The rendering itself lives in [`render_channel`], which takes the post
//! source as an explicit collaborator. The Axum handlers only adapt a pooled
//! connection into that collaborator and pick a response format.

use axum::extract::{Query, State};
use axum::response::{Html, IntoResponse, Response};
use axum::{Extension, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use peephole_core::{Channel, Error, MediaItem, PostSource, Result};
use peephole_db::SqlitePostSource;

use crate::context::AppContext;
use crate::error::AppError;
use crate::middleware::request_id::RequestId;

/// Query parameters accepted by the channel routes.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ChannelParams {
    /// Response format for `/raw/peephole`: `html` (default) or `json`.
    pub format: Option<String>,
    /// Instant to tune in at, RFC 3339. Defaults to the current time.
    pub at: Option<String>,
}

/// One rendered media item.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct ChannelView {
    pub kind: String,
    pub url: Option<String>,
    pub embed_url: Option<String>,
    pub html: String,
}

impl ChannelView {
    pub fn from_item(item: &MediaItem) -> Self {
        Self {
            kind: item.kind().to_string(),
            url: item.url().map(|u| u.to_string()),
            embed_url: item.embed_url().map(|u| u.to_string()),
            html: item.render(),
        }
    }
}

/// The whole programme for a window.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ProgrammeResponse {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub items: Vec<ChannelView>,
}

/// Compute and render the item on air at `now`.
pub fn render_channel(
    source: &dyn PostSource,
    channel: &Channel,
    now: DateTime<Utc>,
) -> Result<ChannelView> {
    let item = channel.now_playing(source, now)?;
    tracing::debug!(kind = %item.kind(), "now playing");
    Ok(ChannelView::from_item(&item))
}

/// Compute and render every item in the window around `now`.
pub fn render_programme(
    source: &dyn PostSource,
    channel: &Channel,
    now: DateTime<Utc>,
) -> Result<ProgrammeResponse> {
    let (start, end) = channel.window(now);
    let items = channel
        .programme(source, now)?
        .iter()
        .map(ChannelView::from_item)
        .collect();
    Ok(ProgrammeResponse { start, end, items })
}

/// Wrap a fragment in the minimal page the channel is shown in.
pub fn blank_layout(fragment: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
         <title>peephole</title>\n</head>\n<body>\n{fragment}\n</body>\n</html>\n"
    )
}

fn parse_at(at: Option<&str>) -> Result<DateTime<Utc>> {
    match at {
        None => Ok(Utc::now()),
        Some(s) => DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| Error::Validation(format!("invalid 'at' timestamp '{s}': {e}"))),
    }
}

fn current_view(ctx: &AppContext, now: DateTime<Utc>) -> Result<ChannelView> {
    let conn = peephole_db::pool::get_conn(&ctx.db)?;
    let source = SqlitePostSource::new(&conn);
    render_channel(&source, &ctx.channel, now)
}

/// GET /raw/peephole
#[utoipa::path(
    get,
    path = "/raw/peephole",
    params(ChannelParams),
    responses(
        (status = 200, description = "Current channel as an HTML page, or JSON with format=json", body = ChannelView),
        (status = 400, description = "Invalid format or timestamp")
    )
)]
pub async fn peephole(
    State(ctx): State<AppContext>,
    Extension(request_id): Extension<RequestId>,
    Query(params): Query<ChannelParams>,
) -> std::result::Result<Response, AppError> {
    respond_peephole(&ctx, &params)
        .map_err(|e| AppError::from(e).with_request_id(request_id.0))
}

fn respond_peephole(ctx: &AppContext, params: &ChannelParams) -> Result<Response> {
    let wants_json = match params.format.as_deref() {
        None | Some("html") => false,
        Some("json") => true,
        Some(other) => {
            return Err(Error::Validation(format!("unsupported format '{other}'")));
        }
    };
    let now = parse_at(params.at.as_deref())?;
    let view = current_view(ctx, now)?;

    if wants_json {
        Ok(Json(view).into_response())
    } else {
        Ok(Html(blank_layout(&view.html)).into_response())
    }
}

/// GET /raw/peephole.json
#[utoipa::path(
    get,
    path = "/raw/peephole.json",
    params(ChannelParams),
    responses(
        (status = 200, description = "Current channel as JSON", body = ChannelView),
        (status = 400, description = "Invalid timestamp")
    )
)]
pub async fn peephole_json(
    State(ctx): State<AppContext>,
    Extension(request_id): Extension<RequestId>,
    Query(params): Query<ChannelParams>,
) -> std::result::Result<Json<ChannelView>, AppError> {
    parse_at(params.at.as_deref())
        .and_then(|now| current_view(&ctx, now))
        .map(Json)
        .map_err(|e| AppError::from(e).with_request_id(request_id.0))
}

/// GET /api/programme
#[utoipa::path(
    get,
    path = "/api/programme",
    params(ChannelParams),
    responses(
        (status = 200, description = "Every media item in the window", body = ProgrammeResponse),
        (status = 400, description = "Invalid timestamp")
    )
)]
pub async fn programme(
    State(ctx): State<AppContext>,
    Extension(request_id): Extension<RequestId>,
    Query(params): Query<ChannelParams>,
) -> std::result::Result<Json<ProgrammeResponse>, AppError> {
    current_programme(&ctx, &params)
        .map(Json)
        .map_err(|e| AppError::from(e).with_request_id(request_id.0))
}

fn current_programme(ctx: &AppContext, params: &ChannelParams) -> Result<ProgrammeResponse> {
    let now = parse_at(params.at.as_deref())?;
    let conn = peephole_db::pool::get_conn(&ctx.db)?;
    let source = SqlitePostSource::new(&conn);
    render_programme(&source, &ctx.channel, now)
}
