use chrono::{Duration, NaiveDate, Utc};
use nanoid::nanoid;
use sqlx::SqlitePool;

use crate::error::AppError;
use crate::models::{canonical_day, Admin, Event, EventFields, ServiceTime, ServiceTimeFields};

/// Sessions older than this are treated as expired and deleted on sight.
const SESSION_MAX_AGE_HOURS: i64 = 24;

pub async fn init_schema(pool: &SqlitePool) -> Result<(), AppError> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS events (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            description TEXT,
            location TEXT,
            event_date DATE NOT NULL,
            event_time TEXT,
            is_recurring BOOLEAN NOT NULL DEFAULT 0,
            recurrence_pattern TEXT,
            end_date DATE,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        );",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS service_times (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            service_name TEXT NOT NULL,
            day_of_week TEXT NOT NULL,
            time TEXT NOT NULL
        );",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS admins (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            email TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        );",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS sessions (
            token TEXT PRIMARY KEY,
            admin_id INTEGER NOT NULL,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            FOREIGN KEY (admin_id) REFERENCES admins (id) ON DELETE CASCADE
        );",
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// The three historical services, inserted only when the table is empty so
/// a fresh deployment renders a sensible schedule before the first login.
pub async fn seed_service_times(pool: &SqlitePool) -> Result<(), AppError> {
    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM service_times")
        .fetch_one(pool)
        .await?;
    if count.0 > 0 {
        return Ok(());
    }

    let defaults = [
        ("Sunday Morning", "Sunday", "12:00 PM"),
        ("Sunday Evening", "Sunday", "6:00 PM"),
        ("Wednesday Evening", "Wednesday", "6:30 PM"),
    ];
    for (service_name, day_of_week, time) in defaults {
        sqlx::query("INSERT INTO service_times (service_name, day_of_week, time) VALUES (?, ?, ?)")
            .bind(service_name)
            .bind(day_of_week)
            .bind(time)
            .execute(pool)
            .await?;
    }
    log::info!("seeded default service times");
    Ok(())
}

// --- events ---

fn validate_event(fields: &EventFields) -> Result<(), AppError> {
    if fields.title.trim().is_empty() {
        return Err(AppError::BadRequest("title must not be empty".to_string()));
    }
    if fields.is_recurring && (fields.recurrence_pattern.is_none() || fields.end_date.is_none()) {
        return Err(AppError::BadRequest(
            "recurring events need a recurrence pattern and an end date".to_string(),
        ));
    }
    Ok(())
}

/// All events ascending by date. With `from`, keeps rows whose anchor is on
/// or after `from`, plus recurring rows whose series may still produce
/// instances in the window.
pub async fn list_events(
    pool: &SqlitePool,
    from: Option<NaiveDate>,
) -> Result<Vec<Event>, AppError> {
    match from {
        Some(from) => sqlx::query_as(
            "SELECT * FROM events
             WHERE event_date >= ?1 OR (is_recurring AND end_date >= ?1)
             ORDER BY event_date ASC",
        )
        .bind(from)
        .fetch_all(pool)
        .await
        .map_err(AppError::from),
        None => sqlx::query_as("SELECT * FROM events ORDER BY event_date ASC")
            .fetch_all(pool)
            .await
            .map_err(AppError::from),
    }
}

pub async fn create_event(pool: &SqlitePool, fields: &EventFields) -> Result<Event, AppError> {
    validate_event(fields)?;
    let event = sqlx::query_as(
        "INSERT INTO events (title, description, location, event_date, event_time, is_recurring, recurrence_pattern, end_date)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?) RETURNING *",
    )
    .bind(&fields.title)
    .bind(&fields.description)
    .bind(&fields.location)
    .bind(fields.event_date)
    .bind(&fields.event_time)
    .bind(fields.is_recurring)
    .bind(fields.recurrence_pattern)
    .bind(fields.end_date)
    .fetch_one(pool)
    .await?;
    Ok(event)
}

pub async fn update_event(
    pool: &SqlitePool,
    id: i64,
    fields: &EventFields,
) -> Result<Event, AppError> {
    validate_event(fields)?;
    sqlx::query_as(
        "UPDATE events
         SET title = ?, description = ?, location = ?, event_date = ?, event_time = ?,
             is_recurring = ?, recurrence_pattern = ?, end_date = ?
         WHERE id = ? RETURNING *",
    )
    .bind(&fields.title)
    .bind(&fields.description)
    .bind(&fields.location)
    .bind(fields.event_date)
    .bind(&fields.event_time)
    .bind(fields.is_recurring)
    .bind(fields.recurrence_pattern)
    .bind(fields.end_date)
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound("no such event".to_string()))
}

pub async fn delete_event(pool: &SqlitePool, id: i64) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM events WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("no such event".to_string()));
    }
    Ok(())
}

// --- service times ---

fn validate_service_time(fields: &ServiceTimeFields) -> Result<&'static str, AppError> {
    if fields.service_name.trim().is_empty() || fields.time.trim().is_empty() {
        return Err(AppError::BadRequest(
            "service name and time must not be empty".to_string(),
        ));
    }
    canonical_day(&fields.day_of_week).ok_or_else(|| {
        AppError::BadRequest(format!("'{}' is not a day of the week", fields.day_of_week))
    })
}

pub async fn list_service_times(pool: &SqlitePool) -> Result<Vec<ServiceTime>, AppError> {
    sqlx::query_as("SELECT * FROM service_times ORDER BY id")
        .fetch_all(pool)
        .await
        .map_err(AppError::from)
}

/// Updates the row with a matching service name if one exists, otherwise
/// inserts a new one.
pub async fn upsert_service_time(
    pool: &SqlitePool,
    fields: &ServiceTimeFields,
) -> Result<ServiceTime, AppError> {
    let day = validate_service_time(fields)?;
    let existing: Option<(i64,)> =
        sqlx::query_as("SELECT id FROM service_times WHERE service_name = ?")
            .bind(&fields.service_name)
            .fetch_optional(pool)
            .await?;

    match existing {
        Some((id,)) => update_service_time(pool, id, fields).await,
        None => {
            let service = sqlx::query_as(
                "INSERT INTO service_times (service_name, day_of_week, time) VALUES (?, ?, ?) RETURNING *",
            )
            .bind(&fields.service_name)
            .bind(day)
            .bind(&fields.time)
            .fetch_one(pool)
            .await?;
            Ok(service)
        }
    }
}

pub async fn update_service_time(
    pool: &SqlitePool,
    id: i64,
    fields: &ServiceTimeFields,
) -> Result<ServiceTime, AppError> {
    let day = validate_service_time(fields)?;
    sqlx::query_as(
        "UPDATE service_times SET service_name = ?, day_of_week = ?, time = ? WHERE id = ? RETURNING *",
    )
    .bind(&fields.service_name)
    .bind(day)
    .bind(&fields.time)
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound("no such service time".to_string()))
}

pub async fn delete_service_time(pool: &SqlitePool, id: i64) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM service_times WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("no such service time".to_string()));
    }
    Ok(())
}

// --- admins and sessions ---

pub async fn find_admin_by_email(
    pool: &SqlitePool,
    email: &str,
) -> Result<Option<Admin>, AppError> {
    sqlx::query_as("SELECT * FROM admins WHERE email = ?")
        .bind(email)
        .fetch_optional(pool)
        .await
        .map_err(AppError::from)
}

/// Creates the initial admin account when none exists yet. A no-op once any
/// admin row is present, so a changed env password never overwrites a live
/// account.
pub async fn seed_admin(pool: &SqlitePool, email: &str, password: &str) -> Result<(), AppError> {
    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM admins")
        .fetch_one(pool)
        .await?;
    if count.0 > 0 {
        return Ok(());
    }

    let password_hash = bcrypt::hash(password, bcrypt::DEFAULT_COST)?;
    sqlx::query("INSERT INTO admins (email, password_hash) VALUES (?, ?)")
        .bind(email)
        .bind(password_hash)
        .execute(pool)
        .await?;
    log::info!("seeded admin account {email}");
    Ok(())
}

pub async fn create_session(pool: &SqlitePool, admin_id: i64) -> Result<String, AppError> {
    let token = nanoid!(32);
    sqlx::query("INSERT INTO sessions (token, admin_id) VALUES (?, ?)")
        .bind(&token)
        .bind(admin_id)
        .execute(pool)
        .await?;
    Ok(token)
}

/// Resolves a token to its admin, deleting the session instead when it has
/// outlived [`SESSION_MAX_AGE_HOURS`].
pub async fn find_live_session(
    pool: &SqlitePool,
    token: &str,
) -> Result<Option<Admin>, AppError> {
    let row: Option<(i64, chrono::NaiveDateTime)> =
        sqlx::query_as("SELECT admin_id, created_at FROM sessions WHERE token = ?")
            .bind(token)
            .fetch_optional(pool)
            .await?;

    let Some((admin_id, created_at)) = row else {
        return Ok(None);
    };

    if Utc::now().naive_utc() - created_at > Duration::hours(SESSION_MAX_AGE_HOURS) {
        delete_session(pool, token).await?;
        return Ok(None);
    }

    sqlx::query_as("SELECT * FROM admins WHERE id = ?")
        .bind(admin_id)
        .fetch_optional(pool)
        .await
        .map_err(AppError::from)
}

pub async fn delete_session(pool: &SqlitePool, token: &str) -> Result<(), AppError> {
    sqlx::query("DELETE FROM sessions WHERE token = ?")
        .bind(token)
        .execute(pool)
        .await?;
    Ok(())
}
