//! REST API endpoint handlers.
//!
//! Every handler is a thin adapter: extract the path, caller, and body,
//! call one [`BoxOffice`](boxoffice_core::office::BoxOffice) operation, and
//! shape the result as JSON.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | Minimal HTML status page |
//! | `GET` | `/health` | Liveness probe |
//! | `POST` | `/api/events` | Create an event (owner only) |
//! | `GET` | `/api/events` | List event names in creation order |
//! | `GET` | `/api/events/{name}` | Single event snapshot |
//! | `POST` | `/api/events/{name}/tickets` | Buy a ticket |
//! | `GET` | `/api/events/{name}/holder` | Whether the caller holds a ticket |
//! | `POST` | `/api/events/{name}/resale` | Hand the caller's ticket to another account |
//! | `GET` | `/api/tickets` | Events the caller holds tickets for |
//! | `POST` | `/api/withdraw` | Withdraw the balance (owner only) |
//! | `GET` | `/api/balance` | Accumulated balance |
//! | `GET` | `/api/audit` | Ledger conservation check |

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse};
use boxoffice_core::registry::NewEvent;
use boxoffice_ledger::ConservationResult;
use boxoffice_types::AccountId;

use crate::caller::Caller;
use crate::error::ApiError;
use crate::extract::{JsonBody, PathParam};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

/// Body of `POST /api/events`.
#[derive(Debug, serde::Deserialize)]
pub struct CreateEventRequest {
    /// Event name.
    pub name: String,
    /// Event date as a Unix timestamp in seconds.
    pub date: i64,
    /// Ticket price in the smallest currency unit.
    pub price: u64,
    /// Ticket capacity.
    pub max_tickets: u64,
}

/// Body of `POST /api/events/{name}/tickets`.
#[derive(Debug, serde::Deserialize)]
pub struct BuyTicketRequest {
    /// Amount paid; anything above the price is retained.
    pub payment: u64,
}

/// Body of `POST /api/events/{name}/resale`.
#[derive(Debug, serde::Deserialize)]
pub struct ResaleRequest {
    /// The account receiving the ticket.
    pub recipient: AccountId,
}

// ---------------------------------------------------------------------------
// GET / -- minimal HTML status page
// ---------------------------------------------------------------------------

/// Serve a minimal HTML page showing registry status and API links.
pub async fn index(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let event_count = state.office.event_count().await;
    let balance = state.office.balance().await;

    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>Box Office</title>
    <style>
        body {{
            background: #0d1117;
            color: #c9d1d9;
            font-family: 'Cascadia Code', 'Fira Code', 'Consolas', monospace;
            padding: 2rem;
            max-width: 800px;
            margin: 0 auto;
        }}
        h1 {{ color: #58a6ff; }}
        .metric {{
            display: inline-block;
            background: #161b22;
            border: 1px solid #30363d;
            border-radius: 6px;
            padding: 1rem 1.5rem;
            margin: 0.5rem 0.5rem 0.5rem 0;
            min-width: 120px;
        }}
        .metric .label {{ color: #8b949e; font-size: 0.85rem; }}
        .metric .value {{ color: #58a6ff; font-size: 1.5rem; font-weight: bold; }}
        a {{ color: #58a6ff; text-decoration: none; }}
        ul {{ list-style: none; padding: 0; }}
        li {{ padding: 0.3rem 0; }}
    </style>
</head>
<body>
    <h1>Box Office</h1>
    <div>
        <div class="metric">
            <div class="label">Events</div>
            <div class="value">{event_count}</div>
        </div>
        <div class="metric">
            <div class="label">Balance</div>
            <div class="value">{balance}</div>
        </div>
    </div>
    <h2>API</h2>
    <ul>
        <li><a href="/api/events">GET /api/events</a></li>
        <li><a href="/api/balance">GET /api/balance</a></li>
        <li><a href="/api/audit">GET /api/audit</a></li>
        <li><a href="/health">GET /health</a></li>
    </ul>
</body>
</html>"#
    ))
}

// ---------------------------------------------------------------------------
// GET /health
// ---------------------------------------------------------------------------

/// Liveness probe.
#[allow(clippy::unused_async)]
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// Create an event. Only the registry owner may call this.
pub async fn create_event(
    State(state): State<Arc<AppState>>,
    Caller(caller): Caller,
    JsonBody(body): JsonBody<CreateEventRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let info = state
        .office
        .create_event(
            caller,
            NewEvent {
                name: body.name,
                date: body.date,
                price: body.price,
                max_tickets: body.max_tickets,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(info)))
}

/// List event names in creation order.
pub async fn list_events(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let events = state.office.list_events().await;
    Json(serde_json::json!({
        "count": events.len(),
        "events": events,
    }))
}

/// Return a point-in-time snapshot of one event.
pub async fn get_event(
    State(state): State<Arc<AppState>>,
    PathParam(name): PathParam<String>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.office.event_info(&name).await?))
}

// ---------------------------------------------------------------------------
// Tickets
// ---------------------------------------------------------------------------

/// Buy a ticket for the caller.
pub async fn buy_ticket(
    State(state): State<Arc<AppState>>,
    PathParam(name): PathParam<String>,
    Caller(caller): Caller,
    JsonBody(body): JsonBody<BuyTicketRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let key = state.office.buy_ticket(&name, caller, body.payment).await?;
    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "ok": true,
            "name": name,
            "key": key,
            "holder": caller,
            "payment": body.payment,
        })),
    ))
}

/// Report whether the caller holds a ticket for the event.
pub async fn is_ticket_holder(
    State(state): State<Arc<AppState>>,
    PathParam(name): PathParam<String>,
    Caller(caller): Caller,
) -> Result<impl IntoResponse, ApiError> {
    let holder = state.office.is_ticket_holder(&name, caller).await?;
    Ok(Json(serde_json::json!({
        "name": name,
        "holder": holder,
    })))
}

/// Transfer the caller's ticket to the recipient named in the body.
pub async fn resell_ticket(
    State(state): State<Arc<AppState>>,
    PathParam(name): PathParam<String>,
    Caller(caller): Caller,
    JsonBody(body): JsonBody<ResaleRequest>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .office
        .resell_ticket(&name, caller, body.recipient)
        .await?;
    Ok(Json(serde_json::json!({
        "ok": true,
        "name": name,
        "from": caller,
        "to": body.recipient,
    })))
}

/// List the events the caller holds tickets for.
pub async fn held_events(
    State(state): State<Arc<AppState>>,
    Caller(caller): Caller,
) -> impl IntoResponse {
    let events = state.office.held_events(caller).await;
    Json(serde_json::json!({
        "count": events.len(),
        "events": events,
    }))
}

// ---------------------------------------------------------------------------
// Treasury
// ---------------------------------------------------------------------------

/// Withdraw the accumulated balance to the owner.
pub async fn withdraw(
    State(state): State<Arc<AppState>>,
    Caller(caller): Caller,
) -> Result<impl IntoResponse, ApiError> {
    let amount = state.office.withdraw_funds(caller).await?;
    Ok(Json(serde_json::json!({
        "ok": true,
        "amount": amount,
    })))
}

/// Return the accumulated balance.
pub async fn balance(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(serde_json::json!({ "balance": state.office.balance().await }))
}

/// Run the ledger conservation check.
///
/// Totals are reported as strings since they are 128-bit.
pub async fn audit(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let body = match state.office.audit().await {
        ConservationResult::Balanced => serde_json::json!({ "balanced": true }),
        ConservationResult::Anomaly(anomaly) => serde_json::json!({
            "balanced": false,
            "inflow": anomaly.inflow.to_string(),
            "outflow": anomaly.outflow.to_string(),
            "held": anomaly.held,
            "message": anomaly.message,
        }),
    };
    Json(body)
}
