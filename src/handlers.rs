use crate::{
    auth, db,
    error::AppError,
    models::{self, Event, EventFields, Occurrence, ServiceTime, ServiceTimeFields},
    recurrence,
    state::AppState,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::Html,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub async fn index() -> Html<String> {
    tokio::fs::read_to_string("templates/index.html")
        .await
        .map(Html)
        .unwrap_or_else(|_| Html("<h1>Page unavailable</h1>".to_string()))
}

// --- public API ---

#[derive(Deserialize)]
pub struct OccurrencesQuery {
    pub from: Option<NaiveDate>,
}

/// Upcoming occurrences across all events, recurring series expanded and
/// the merged set re-sorted by date.
pub async fn get_occurrences(
    State(app_state): State<AppState>,
    Query(query): Query<OccurrencesQuery>,
) -> Result<Json<Vec<Occurrence>>, AppError> {
    let events = db::list_events(&app_state.pool, query.from).await?;

    let mut occurrences = Vec::new();
    for event in &events {
        occurrences.extend(recurrence::expand_event(event)?);
    }
    if let Some(from) = query.from {
        occurrences.retain(|occurrence| occurrence.date() >= from);
    }
    occurrences.sort_by_key(|occurrence| (occurrence.date(), occurrence.event.id));

    Ok(Json(occurrences))
}

#[derive(Debug, Serialize)]
pub struct ServiceTimeGroup {
    pub day_of_week: String,
    pub times: Vec<ServiceTime>,
}

/// The schedule grouped by day of week, Sunday first.
pub async fn get_service_times(
    State(app_state): State<AppState>,
) -> Result<Json<Vec<ServiceTimeGroup>>, AppError> {
    let rows = db::list_service_times(&app_state.pool).await?;

    let mut groups: Vec<ServiceTimeGroup> = models::DAY_ORDER
        .iter()
        .map(|day| ServiceTimeGroup {
            day_of_week: day.to_string(),
            times: Vec::new(),
        })
        .collect();
    for row in rows {
        if let Some(i) = models::day_index(&row.day_of_week) {
            groups[i].times.push(row);
        }
    }
    groups.retain(|group| !group.times.is_empty());

    Ok(Json(groups))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ContactPayload {
    pub name: String,
    pub email: String,
    pub message: String,
}

/// Forwards the contact form to the configured relay endpoint, form-encoded.
pub async fn submit_contact(
    State(app_state): State<AppState>,
    Json(payload): Json<ContactPayload>,
) -> Result<StatusCode, AppError> {
    if payload.name.trim().is_empty()
        || payload.email.trim().is_empty()
        || payload.message.trim().is_empty()
    {
        return Err(AppError::BadRequest(
            "name, email and message are all required".to_string(),
        ));
    }

    let relay_url = app_state
        .config
        .contact_relay_url
        .as_deref()
        .ok_or(AppError::RelayUnavailable)?;

    let form = [
        ("name", payload.name.as_str()),
        ("email", payload.email.as_str()),
        ("message", payload.message.as_str()),
    ];
    app_state
        .http
        .post(relay_url)
        .form(&form)
        .send()
        .await?
        .error_for_status()?;

    Ok(StatusCode::ACCEPTED)
}

// --- auth ---

#[derive(Deserialize)]
pub struct LoginPayload {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub token: String,
}

pub async fn login(
    State(app_state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<Json<LoginResponse>, AppError> {
    let token = auth::login(&app_state.pool, &payload.email, &payload.password).await?;
    Ok(Json(LoginResponse { token }))
}

pub async fn logout(
    State(app_state): State<AppState>,
    headers: HeaderMap,
) -> Result<StatusCode, AppError> {
    let token = auth::bearer_token(&headers)?;
    db::delete_session(&app_state.pool, token).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Serialize)]
pub struct AdminInfo {
    pub id: i64,
    pub email: String,
}

pub async fn me(
    State(app_state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<AdminInfo>, AppError> {
    let admin = auth::require_admin(&app_state.pool, &headers).await?;
    Ok(Json(AdminInfo {
        id: admin.id,
        email: admin.email,
    }))
}

// --- admin API ---

/// Raw event rows for the admin screen, series unexpanded.
pub async fn admin_list_events(
    State(app_state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<Event>>, AppError> {
    auth::require_admin(&app_state.pool, &headers).await?;
    db::list_events(&app_state.pool, None).await.map(Json)
}

pub async fn admin_create_event(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    Json(fields): Json<EventFields>,
) -> Result<(StatusCode, Json<Event>), AppError> {
    auth::require_admin(&app_state.pool, &headers).await?;
    let event = db::create_event(&app_state.pool, &fields).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

pub async fn admin_update_event(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(fields): Json<EventFields>,
) -> Result<Json<Event>, AppError> {
    auth::require_admin(&app_state.pool, &headers).await?;
    db::update_event(&app_state.pool, id, &fields).await.map(Json)
}

pub async fn admin_delete_event(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Result<StatusCode, AppError> {
    auth::require_admin(&app_state.pool, &headers).await?;
    db::delete_event(&app_state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn admin_upsert_service_time(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    Json(fields): Json<ServiceTimeFields>,
) -> Result<Json<ServiceTime>, AppError> {
    auth::require_admin(&app_state.pool, &headers).await?;
    db::upsert_service_time(&app_state.pool, &fields).await.map(Json)
}

pub async fn admin_update_service_time(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(fields): Json<ServiceTimeFields>,
) -> Result<Json<ServiceTime>, AppError> {
    auth::require_admin(&app_state.pool, &headers).await?;
    db::update_service_time(&app_state.pool, id, &fields).await.map(Json)
}

pub async fn admin_delete_service_time(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Result<StatusCode, AppError> {
    auth::require_admin(&app_state.pool, &headers).await?;
    db::delete_service_time(&app_state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
