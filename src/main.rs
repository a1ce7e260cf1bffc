use parish_web::{app, config::Config, db, state::AppState};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    env_logger::init();

    let config = Config::from_env().expect("DATABASE_URL must be set");

    let connect_options = SqliteConnectOptions::from_str(&config.database_url)
        .expect("failed to parse DATABASE_URL")
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(connect_options)
        .await
        .expect("failed to connect to db");

    db::init_schema(&pool).await.expect("failed to create schema");
    db::seed_service_times(&pool)
        .await
        .expect("failed to seed service times");
    if let (Some(email), Some(password)) = (&config.admin_email, &config.admin_password) {
        db::seed_admin(&pool, email, password)
            .await
            .expect("failed to seed admin account");
    } else {
        log::warn!("ADMIN_EMAIL/ADMIN_PASSWORD not set; admin login disabled until an admin exists");
    }

    let addr = config.bind_addr.clone();
    let state = AppState {
        pool,
        config,
        http: reqwest::Client::new(),
    };

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");
    log::info!("listening on {addr}");
    axum::serve(listener, app(state)).await.expect("server error");
}
