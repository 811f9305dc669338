//! Post-process one episode file
//!
//! Usage: `cargo run --example post_process -- <file> [config.json]`
//!
//! Without a config file the pipeline runs in test mode: tools are resolved
//! and every command is logged instead of executed. Set `RUST_LOG=liftcup=debug`
//! to see the resolved tool paths and command lines.

use liftcup::tools::{Platform, ToolResolver};
use liftcup::{Config, Quality, ReleaseOutcome, ReleasePipeline};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("liftcup=info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false).compact())
        .init();

    let mut args = std::env::args().skip(1);
    let Some(source) = args.next().map(PathBuf::from) else {
        eprintln!("usage: post_process <file> [config.json]");
        std::process::exit(2);
    };

    let config = match args.next() {
        Some(path) => Config::from_json_file(Path::new(&path))?,
        None => {
            let mut config = Config::default();
            config.release.test_mode = true;
            config
        }
    };

    let platform = Platform::detect().await;
    println!("Platform: {platform:?}");

    let resolver = Arc::new(ToolResolver::from_config(platform, &config.tools));
    let tools = resolver.resolve().await;
    println!("rar:  {:?}", tools.rar);
    println!("par2: {:?}", tools.par2);

    let pipeline = ReleasePipeline::new(&config, resolver.clone());
    match pipeline.run(&source, Quality::HdTv).await? {
        ReleaseOutcome::Completed {
            release_dir,
            volume_size_mb,
            uploaded,
            cleaned_up,
        } => {
            println!("Release built in {}", release_dir.display());
            println!("  volume size: {volume_size_mb} MB");
            println!("  uploaded:    {uploaded}");
            println!("  cleaned up:  {cleaned_up}");
        }
        ReleaseOutcome::Skipped(reason) => println!("Skipped: {reason:?}"),
    }

    Ok(())
}
