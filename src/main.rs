use reclaim::{
    AppState, Config, FileStore, KeyValueStore, Session,
    clock::{Clock, SystemClock},
    habits::Habits,
    reminder::{LogNotifier, ReminderGate},
    remote::{HttpRemote, OfflineRemote, RemoteStore},
    router,
    status::StatusConfig,
    sync::SyncCoordinator,
    ticker::Ticker,
};
use std::{net::SocketAddr, sync::Arc};
use tokio::fs;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = Config::from_env()?;
    if let Some(parent) = config.data_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await?;
        }
    }

    let file_store = FileStore::open(&config.data_path).await;
    info!("using local store at {}", file_store.path().display());
    let store: Arc<dyn KeyValueStore> = Arc::new(file_store);

    let remote: Arc<dyn RemoteStore> = match &config.remote_url {
        Some(url) => {
            info!("remote sync enabled");
            Arc::new(HttpRemote::new(url.clone(), config.remote_timeout)?)
        }
        None => {
            info!("RECLAIM_REMOTE_URL not set, running offline");
            Arc::new(OfflineRemote)
        }
    };

    let coordinator = Arc::new(SyncCoordinator::new(Arc::clone(&store), remote));
    let local = coordinator.load_local().await;
    info!(streak = local.streak, days = local.history.len(), "loaded local progress");
    {
        let coordinator = Arc::clone(&coordinator);
        tokio::spawn(async move {
            coordinator.sync_remote().await;
        });
    }

    let notifier = Arc::new(LogNotifier::new());
    let reminders = notifier.subscribe();
    let gate = Arc::new(ReminderGate::new(Arc::clone(&store), notifier));
    let permission = gate.ensure_permission().await;
    info!(?permission, "notification permission");

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let status_config = StatusConfig {
        deadline: config.deadline,
        ..StatusConfig::default()
    };
    let (ticker, ticks) = Ticker::new(Arc::clone(&clock), status_config.clone(), gate).spawn();

    let state = AppState {
        clock,
        status_config,
        coordinator,
        habits: Arc::new(Habits::new(store)),
        session: Arc::new(Session::new()),
        ticks,
        reminders,
    };
    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    ticker.shutdown().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
