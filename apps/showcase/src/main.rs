mod config;
mod render;
mod shell;

use std::{path::PathBuf, sync::Arc};

use anyhow::{ensure, Context, Result};
use catalog_client::{
    CatalogApi, CatalogEvent, DetailController, HomeController, MemoryAddressBar,
    RestCatalogApi, SearchController,
};
use chrono::Utc;
use clap::{Parser, Subcommand};
use config::{load_settings, Settings};
use shell::{ShellCommand, HELP};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::broadcast::{self, error::RecvError},
    task::JoinHandle,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "showcase", about = "Browse the creative works catalog from a terminal")]
struct Args {
    /// Data API root, e.g. https://<project>.supabase.co
    #[arg(long)]
    api_url: Option<String>,
    #[arg(long)]
    anon_key: Option<String>,
    #[arg(long)]
    page_size: Option<u32>,
    #[arg(long, default_value = "showcase.toml")]
    config: PathBuf,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one search from a query string such as `search=fern&sort=views_desc&page=2`.
    Search {
        #[arg(default_value = "")]
        query: String,
    },
    /// Show a single work with its related works.
    Work { id: String },
    /// Featured works and creators.
    Home,
    /// Open a random work.
    Random,
    /// Interactive search page driven from stdin.
    Shell {
        #[arg(default_value = "")]
        query: String,
    },
}

impl Args {
    fn apply(&self, settings: &mut Settings) {
        if let Some(v) = &self.api_url {
            settings.api_url = v.clone();
        }
        if let Some(v) = &self.anon_key {
            settings.anon_key = v.clone();
        }
        if let Some(v) = self.page_size.filter(|size| *size > 0) {
            settings.page_size = v;
        }
    }
}

fn spawn_renderer(mut events: broadcast::Receiver<CatalogEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut categories = Vec::new();
        loop {
            match events.recv().await {
                Ok(event) => {
                    if let CatalogEvent::CategoriesLoaded(loaded) = &event {
                        categories = loaded.clone();
                    }
                    if let Some(text) = render::render_event(&event, &categories, Utc::now()) {
                        println!("{text}");
                    }
                }
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "renderer fell behind"),
                Err(RecvError::Closed) => break,
            }
        }
    })
}

async fn run_search(api: Arc<dyn CatalogApi>, settings: &Settings, query: &str) -> Result<()> {
    let bar = Arc::new(MemoryAddressBar::new("/search", query));
    let controller =
        SearchController::new_with_options(api, bar.clone(), settings.search_options());
    let renderer = spawn_renderer(controller.subscribe_events());

    let outcome = controller.initialize().await;
    info!(?outcome, address = %bar.href(), "search finished");

    drop(controller);
    renderer.await.context("renderer task failed")?;
    Ok(())
}

async fn run_work(api: Arc<dyn CatalogApi>, settings: &Settings, id: &str) -> Result<()> {
    let query = format!("id={}", id.trim());
    let bar = Arc::new(MemoryAddressBar::new("/work", query));
    let controller = DetailController::new_with_random_interval(api, bar, settings.random_interval());
    let renderer = spawn_renderer(controller.subscribe_events());

    let outcome = controller.initialize().await;
    info!(?outcome, "work page finished");

    drop(controller);
    renderer.await.context("renderer task failed")?;
    Ok(())
}

async fn run_home(api: Arc<dyn CatalogApi>, settings: &Settings) -> Result<()> {
    let home = HomeController::new_with_random_interval(api, settings.random_interval());
    let renderer = spawn_renderer(home.subscribe_events());

    home.initialize().await;

    drop(home);
    renderer.await.context("renderer task failed")?;
    Ok(())
}

async fn run_random(api: Arc<dyn CatalogApi>, settings: &Settings) -> Result<()> {
    let home = HomeController::new_with_random_interval(api.clone(), settings.random_interval());
    let renderer = spawn_renderer(home.subscribe_events());
    let picked = home.random_work().await;
    drop(home);
    renderer.await.context("renderer task failed")?;

    match picked {
        Some(work_id) => run_work(api, settings, &work_id.to_string()).await,
        None => Ok(()),
    }
}

async fn run_shell(api: Arc<dyn CatalogApi>, settings: &Settings, query: &str) -> Result<()> {
    let bar = Arc::new(MemoryAddressBar::new("/search", query));
    let controller =
        SearchController::new_with_options(api, bar.clone(), settings.search_options());
    let renderer = spawn_renderer(controller.subscribe_events());
    let input = controller.debounced_search_input();

    controller.initialize().await;
    println!("{HELP}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        let command = match ShellCommand::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(message) => {
                eprintln!("{message}");
                continue;
            }
        };
        match command {
            ShellCommand::Type(text) => input.call(text),
            ShellCommand::Search(text) => {
                if controller.set_search_text(&text).await.is_none() {
                    println!("search text unchanged");
                }
            }
            ShellCommand::Category(category) => {
                controller.set_category_filter(category).await;
            }
            ShellCommand::Sort(token) => {
                controller.set_sort_token(&token).await;
            }
            ShellCommand::Page(raw) => {
                if controller.go_to_page_raw(&raw).await.is_none() {
                    println!("no pages to move between");
                }
            }
            ShellCommand::Clear => {
                controller.clear_all().await;
            }
            ShellCommand::Random => {
                controller.random_work().await;
            }
            ShellCommand::Url => println!("{}", bar.href()),
            ShellCommand::Help => println!("{HELP}"),
            ShellCommand::Quit => break,
        }
    }

    drop(input);
    drop(controller);
    renderer.await.context("renderer task failed")?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = load_settings(&args.config);
    args.apply(&mut settings);
    ensure!(
        settings.api_url.starts_with("http://") || settings.api_url.starts_with("https://"),
        "api url '{}' must start with http:// or https://",
        settings.api_url
    );
    if settings.anon_key.is_empty() {
        warn!("no anon key configured; the data api may reject requests");
    }

    let api: Arc<dyn CatalogApi> =
        Arc::new(RestCatalogApi::new(&settings.api_url, settings.anon_key.clone()));

    match &args.command {
        Command::Search { query } => run_search(api, &settings, query).await,
        Command::Work { id } => run_work(api, &settings, id).await,
        Command::Home => run_home(api, &settings).await,
        Command::Random => run_random(api, &settings).await,
        Command::Shell { query } => run_shell(api, &settings, query).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_loaded_settings() {
        let args = Args::parse_from([
            "showcase",
            "--api-url",
            "https://flag.example",
            "--page-size",
            "0",
            "home",
        ]);
        let mut settings = Settings::default();
        args.apply(&mut settings);
        assert_eq!(settings.api_url, "https://flag.example");
        assert_eq!(settings.page_size, Settings::default().page_size);
        assert!(matches!(args.command, Command::Home));
    }

    #[test]
    fn environment_is_left_to_the_settings_loader() {
        std::env::set_var("SHOWCASE_API_URL", "https://env.example");
        let args = Args::parse_from(["showcase", "home"]);
        std::env::remove_var("SHOWCASE_API_URL");
        assert_eq!(args.api_url, None);
        assert_eq!(args.anon_key, None);

        let mut settings = Settings {
            api_url: "https://app-prefixed.example".into(),
            ..Settings::default()
        };
        args.apply(&mut settings);
        assert_eq!(settings.api_url, "https://app-prefixed.example");
    }

    #[test]
    fn search_takes_an_address_bar_query() {
        let args = Args::parse_from(["showcase", "search", "search=fern&page=2"]);
        match args.command {
            Command::Search { query } => assert_eq!(query, "search=fern&page=2"),
            other => panic!("unexpected command {other:?}"),
        }
    }
}
