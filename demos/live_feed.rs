//! Live dashboard feed.
//!
//! Demonstrates:
//! - Loading configuration from `FRAUDWATCH_*` environment variables
//! - Resuming a stored session, or signing in when credentials are given
//! - Typed subscriptions to every realtime event
//! - Watching lifecycle notifications, including reconnect exhaustion
//!
//! Usage:
//!   cargo run --example live_feed
//!   cargo run --example live_feed -- --debug
//!   FRAUDWATCH_EMAIL=a@b.c FRAUDWATCH_PASSWORD=secret cargo run --example live_feed

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use anyhow::Context;
use fraudwatch_client::{
    ApiClient, AuthSession, ClientConfig, FileStore, KeyValueStore, LifecycleEvent, LoginRequest,
    RealtimeClient,
};
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::EnvFilter;

// ============================================================================
// Constants
// ============================================================================

const SESSION_FILE: &str = "./fraudwatch_session.json";

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() {
    let debug = std::env::args().any(|a| a == "--debug");
    init_logging(debug);

    if let Err(e) = run().await {
        eprintln!("\n[ERROR] {e:#}");
        std::process::exit(1);
    }
}

fn init_logging(debug: bool) {
    let filter = if debug {
        "fraudwatch_client=debug"
    } else {
        "fraudwatch_client=info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();
}

async fn run() -> anyhow::Result<()> {
    println!("=== FraudWatch live feed ===\n");

    let config = ClientConfig::from_env().context("invalid FRAUDWATCH_* configuration")?;
    println!("[Setup] ws  = {}", config.ws_url);
    println!("        api = {}\n", config.api_url);

    // ========================================================================
    // Session
    // ========================================================================

    let store: Arc<dyn KeyValueStore> =
        Arc::new(FileStore::open(SESSION_FILE).context("cannot open session file")?);
    let api = ApiClient::new(&config, Arc::clone(&store))?;
    let session = Arc::new(AuthSession::new(api, store));

    if !session.is_authenticated() {
        if let (Ok(email), Ok(password)) = (
            std::env::var("FRAUDWATCH_EMAIL"),
            std::env::var("FRAUDWATCH_PASSWORD"),
        ) {
            let user = session
                .login(&LoginRequest::new(email, password))
                .await
                .context("login failed")?;
            println!("[Auth] Signed in as {} {}\n", user.first_name, user.last_name);
        } else {
            println!("[Auth] No session; connecting anonymously\n");
        }
    }

    // ========================================================================
    // Subscriptions
    // ========================================================================

    let client = RealtimeClient::new(&config, Arc::clone(&session));

    let _transactions = client.on_transaction_update(|tx| {
        println!("[tx]     {} {} {:?} ({})", tx.id, tx.amount, tx.status, tx.location);
    });
    let _alerts = client.on_new_alert(|alert| {
        println!("[alert]  {:?} {} - {}", alert.severity, alert.title, alert.account_number);
    });
    let _status = client.on_system_status(|status| {
        println!(
            "[status] {:.1} tx/s, {} flagged, {:.2}% success",
            status.transactions_per_second, status.flagged_transactions, status.success_rate
        );
    });
    let _risk = client.on_risk_update(|risk| {
        println!("[risk]   {:.1} ({:?})", risk.risk_level, risk.risk_category);
    });

    // ========================================================================
    // Run
    // ========================================================================

    let mut lifecycle = client.lifecycle();
    client.connect();
    println!("Press Ctrl+C to exit...\n");

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            event = lifecycle.recv() => match event {
                Ok(LifecycleEvent::ReconnectsExhausted { attempts }) => {
                    println!("[lifecycle] gave up after {attempts} reconnects");
                    break;
                }
                Ok(event) => println!("[lifecycle] {event:?}"),
                Err(RecvError::Lagged(n)) => println!("[lifecycle] skipped {n} events"),
                Err(RecvError::Closed) => break,
            },
        }
    }

    client.disconnect().await;
    println!("\n=== Done ===");
    Ok(())
}
