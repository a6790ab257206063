use mimalloc::MiMalloc;
use postgrad_office::{
    config::CONFIG,
    notify::{DisabledMailer, Mailer, Notifier, SmtpMailer},
    scheduler::{RegistrationReminders, spawn_sweep},
    server::{AppState, app_router},
    utils::logging::init_tracing,
};
use std::{net::SocketAddr, sync::Arc};
use tokio::{net::TcpListener, signal};
use tracing::{info, warn};
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cfg = &*CONFIG;
    init_tracing(&cfg.basic.loglevel);

    info!(
        database_url = %cfg.basic.database_url,
        loglevel = %cfg.basic.loglevel,
        listen_addr = %cfg.basic.listen_addr,
        listen_port = cfg.basic.listen_port,
        registration_delay_secs = cfg.reminders.registration_delay_secs,
        sweep = ?cfg.reminders.sweep,
        "Configuration loaded"
    );

    let db = postgrad_office::db::spawn(&cfg.basic.database_url).await;

    let mailer: Arc<dyn Mailer> = match SmtpMailer::from_config(&cfg.mail) {
        Ok(mailer) => Arc::new(mailer),
        Err(e) => {
            warn!(error = %e, "SMTP mailer unavailable; reminder emails will fail and be logged");
            Arc::new(DisabledMailer::new(e.to_string()))
        }
    };
    let notifier = Notifier::new(mailer);

    let reminders = RegistrationReminders::new(
        db.clone(),
        notifier.clone(),
        cfg.reminders.registration_delay_secs,
    );
    if reminders.is_enabled() {
        if let Err(e) = reminders.restore().await {
            warn!(error = %e, "failed to restore pending registration reminders");
        }
    }
    let _sweep = spawn_sweep(cfg.reminders.sweep, db.clone(), notifier.clone());

    let state = AppState::new(db, notifier, reminders);
    let app = app_router(state);

    let addr = SocketAddr::from((cfg.basic.listen_addr, cfg.basic.listen_port));
    let listener = TcpListener::bind(addr).await?;
    info!("HTTP server listening on {}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Server has shut down gracefully.");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
