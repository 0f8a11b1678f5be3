//! Parley demo
//!
//! Composition root that wires in-memory clients into a session store and
//! walks through server, channel and call workflows.

use anyhow::Context;
use parley_core::{
    CallId, CreateOutcome, InMemoryMessagingClient, InMemoryVideoClient, SessionStore,
    StoreSettings,
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn load_settings() -> anyhow::Result<StoreSettings> {
    match std::env::var_os("PARLEY_SETTINGS") {
        Some(path) => StoreSettings::load(&path)
            .with_context(|| format!("Failed to load settings from {:?}", path)),
        None => StoreSettings::load_or_default().context("Failed to load settings"),
    }
}

fn print_snapshot(store: &SessionStore) -> anyhow::Result<()> {
    let snapshot = store.snapshot();
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Parley demo v{}", env!("CARGO_PKG_VERSION"));

    let settings = load_settings()?;
    let store = SessionStore::with_settings(settings);
    let messaging = InMemoryMessagingClient::new("alice");
    let video = InMemoryVideoClient::new();

    let mut updates = store.subscribe();
    let watcher = tokio::spawn(async move {
        while updates.changed().await.is_ok() {
            let snapshot = updates.borrow_and_update().clone();
            info!(
                "Snapshot changed: server={:?} call={:?} categories={}",
                snapshot.server.as_ref().map(|s| s.name.as_str()),
                snapshot.call_id.as_ref().map(CallId::as_str),
                snapshot.channels_by_category.len()
            );
        }
    });

    let team: Vec<String> = ["alice", "bob", "carol"].iter().map(|s| s.to_string()).collect();
    let pair: Vec<String> = ["alice", "bob"].iter().map(|s| s.to_string()).collect();

    // A direct message shows up once no server is selected
    store.create_channel(&messaging, "alice-bob", "", &pair).await;
    store.select_server(None, &messaging).await?;
    print_snapshot(&store)?;

    let first = store
        .create_server(&messaging, &video, "Rustaceans", "https://img.example/crab.png", &team)
        .await;
    let Some(created) = first.created() else {
        anyhow::bail!("Server creation failed: {:?}", first);
    };
    info!("Welcome channel: {}", created.welcome_channel.id);

    for (name, category) in [("borrow-checker", "Help"), ("showcase", "Text Channels")] {
        if let CreateOutcome::Failed(reason) =
            store.create_channel(&messaging, name, category, &team).await
        {
            warn!("Channel {} not created: {}", name, reason);
        }
    }
    if let Some(server) = store.server() {
        store.select_server(Some(server), &messaging).await?;
    }
    print_snapshot(&store)?;

    // Second server: the default voice call lands on the previous selection
    let second = store
        .create_server(&messaging, &video, "Gophers", "https://img.example/gopher.png", &team)
        .await;
    if let Some(call) = second.created().and_then(|c| c.voice_call.as_ref()) {
        store.set_active_call(Some(call.id.clone()));
    }

    let standup = store
        .create_call(
            &video,
            &parley_core::Server::new("Gophers", "https://img.example/gopher.png"),
            "Standup",
            &team,
        )
        .await;
    if let Some(call) = standup.into_created() {
        store.set_active_call(Some(call.id));
    }
    print_snapshot(&store)?;

    store.set_active_call(None);

    drop(store);
    watcher.await?;
    info!("Calls created: {}", video.calls().len());

    Ok(())
}
