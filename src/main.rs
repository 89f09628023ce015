use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pickup_reservations::{
    api::GraphQlClient,
    config::AppConfig,
    notify::ChannelAlertSink,
    pollers::NotificationShell,
    session::{FileSessionStore, SessionStore},
    state::AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,pickup_reservations=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;
    let api = GraphQlClient::from_config(&config)?;
    let session = Arc::new(FileSessionStore::new(config.session_file.clone()));
    let state = AppState::new(Arc::new(api), session.clone())
        .with_catalog_page_size(config.catalog_page_size);

    let (alerts, mut rx) = ChannelAlertSink::new();
    let shell = NotificationShell::new(state, Arc::new(alerts))
        .with_intervals(config.customer_poll_interval, config.business_poll_interval);

    match session.user().await? {
        Some(user) => {
            tracing::info!(user_id = %user.id, role = ?user.role, "session found, starting notifications");
            shell.start(user).await;
        }
        None => tracing::warn!(path = %config.session_file.display(), "no signed-in user, nothing to poll"),
    }

    loop {
        tokio::select! {
            Some(alert) = rx.recv() => {
                tracing::info!(kind = ?alert.kind, title = %alert.title, "{}", alert.message);
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("shutting down");
                break;
            }
        }
    }

    shell.stop().await;
    Ok(())
}
