use sitewatch::config::{environment::Config, init_db};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sitewatch=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().expect("Failed to load environment configuration");

    let db = init_db(&config.database_url).await;
    tracing::info!("Connected to MySQL");

    let (app, state) = sitewatch::create_app(db, &config).await;

    // Background check loop; each tick picks up whatever is due.
    tokio::spawn(
        state
            .scheduler
            .clone()
            .start_periodic(config.scheduler_interval_secs),
    );
    tracing::info!(
        interval_secs = config.scheduler_interval_secs,
        "Check scheduler started"
    );

    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();
    tracing::info!("Server running on http://localhost:3000");
    axum::serve(listener, app).await.unwrap();
}
