//! Send a test notification and look for servers on the local network
//!
//! Usage: `cargo run --example notify -- <host[:port][, host...]> [username] [password]`

use liftcup::{MediaBrowserConfig, MediaBrowserNotifier};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("liftcup=debug,info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false).compact())
        .init();

    let mut args = std::env::args().skip(1);
    let host = args.next();
    let username = args.next();
    let password = args.next();

    let notifier = MediaBrowserNotifier::new(MediaBrowserConfig::default())?;

    match notifier.server_broadcast().await {
        Some(id) => println!("Discovered server: {id}"),
        None => println!("No server answered the discovery broadcast"),
    }

    let Some(host) = host else {
        return Ok(());
    };

    let results = notifier
        .test_notify(Some(&host), username.as_deref(), password.as_deref())
        .await;
    for result in results {
        match result.error {
            None => println!("{}: ok", result.host),
            Some(error) => println!("{}: {error}", result.host),
        }
    }

    Ok(())
}
