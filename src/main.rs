use std::sync::Arc;

use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use tracing::{debug, info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use themefinder::adapters::{FileCredentialStore, JellyfinClientFactory, YtDlpThemeSource};
use themefinder::catalog::medias_without_theme;
use themefinder::cli::{handle_version_command, parse_args, CliCommand};
use themefinder::manager::ClientManager;
use themefinder::startup::{cli_connect, DownloadConfig, ManagerConfig, StdinPrompter};
use themefinder::themes::ThemeDownloader;

fn main() -> Result<()> {
    let command = parse_args(std::env::args());
    if command == CliCommand::Version {
        handle_version_command();
    }

    color_eyre::install()?;
    init_tracing();

    let runtime = tokio::runtime::Runtime::new().wrap_err("Failed to start async runtime")?;
    runtime.block_on(run(command == CliCommand::Add))
}

/// Logs go to stderr so prompts on stdout stay readable.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(env_filter)
        .init();
}

async fn run(add_another: bool) -> Result<()> {
    let config = ManagerConfig::from_env().wrap_err("Invalid configuration")?;
    let download_config = DownloadConfig::from_env().wrap_err("Invalid configuration")?;

    let factory = Arc::new(JellyfinClientFactory::new(config.ignore_ssl_cert));
    let store = Arc::new(FileCredentialStore::with_path(config.credentials_path.clone()));
    let manager = ClientManager::new(config, factory, store);

    let mut events = manager.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            debug!("Server {}: {:?}", event.uuid, event.kind);
        }
    });

    let mut prompter = StdinPrompter;
    if !cli_connect(&manager, add_another, &mut prompter).await? {
        warn!("No server connected, nothing to do");
        manager.stop().await;
        return Ok(());
    }

    let downloader = ThemeDownloader::new(Arc::new(YtDlpThemeSource::new()), download_config);
    for handle in manager.clients().await {
        let username = manager.username_for(&handle).await;
        let items = match medias_without_theme(&*handle).await {
            Ok(items) => items,
            Err(e) => {
                warn!("Could not list items for {}: {}", username, e);
                continue;
            }
        };
        info!("{} item(s) without a theme for {}", items.len(), username);

        let report = downloader.download_themes(&*handle, &items).await;
        println!(
            "{}: {} downloaded, {} without theme, {} failed",
            username,
            report.downloaded.len(),
            report.not_found.len(),
            report.failed.len()
        );
    }

    manager.stop().await;
    Ok(())
}
