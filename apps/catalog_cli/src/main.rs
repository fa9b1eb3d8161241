use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{CatalogController, CatalogView, DialogKind, HttpCatalogApi, RowAction};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod terminal;

use commands::{Command, HELP};
use config::{load_settings, normalize_api_url, DEFAULT_CONFIG_PATH};
use terminal::{begin_edit_session, prompt_form, Prompt, TerminalStatus, TerminalView};

#[derive(Parser, Debug)]
#[command(name = "catalog", about = "Browse and edit the book catalog")]
struct Args {
    /// Books API root, e.g. http://127.0.0.1:8080/api
    #[arg(long)]
    api_url: Option<String>,
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let mut settings = load_settings(&args.config)?;
    if let Some(api_url) = args.api_url {
        settings.api_url = normalize_api_url(&api_url);
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&settings.log_filter)),
        )
        .with_writer(std::io::stderr)
        .init();
    info!(api_url = %settings.api_url, "starting catalog client");

    let api = HttpCatalogApi::new(&settings.api_url)
        .with_context(|| format!("invalid api url {}", settings.api_url))?;
    let prompt = Arc::new(Prompt::stdin());
    let view = Arc::new(TerminalView::new(prompt.clone()));
    let controller = CatalogController::new(
        Arc::new(api),
        view.clone(),
        Arc::new(TerminalStatus::default()),
    );

    controller.load_page(1).await;
    println!("type 'help' for commands");
    run(&controller, &view, &prompt).await
}

async fn run(controller: &CatalogController, view: &TerminalView, prompt: &Prompt) -> Result<()> {
    loop {
        let Some(line) = prompt.ask("catalog> ").await.context("failed to read input")? else {
            return Ok(());
        };
        if line.trim().is_empty() {
            continue;
        }
        let command = match Command::parse(&line) {
            Ok(command) => command,
            Err(message) => {
                println!("{message}");
                continue;
            }
        };
        debug!(command = command.name(), "dispatching command");

        match command {
            Command::List(page) => {
                let page = page.unwrap_or_else(|| controller.current_page());
                controller.load_page(page).await;
            }
            Command::Next if !view.next_enabled() => println!("no next page"),
            Command::Next => controller.next_page().await,
            Command::Prev if !view.prev_enabled() => println!("no previous page"),
            Command::Prev => controller.previous_page().await,
            Command::Search(query) => controller.search(&query).await,
            Command::Add => {
                controller.open_create();
                // a rejected create leaves the previous entries in the dialog
                let current = view.dialog_form(DialogKind::Create);
                match prompt_form(prompt, &current).await? {
                    Some(form) => {
                        view.fill_dialog(DialogKind::Create, &form);
                        controller.submit_create().await;
                    }
                    None => view.close_dialog(DialogKind::Create),
                }
            }
            Command::Edit(id) => {
                let Some(current) = begin_edit_session(controller, view, id).await else {
                    continue;
                };
                match prompt_form(prompt, &current).await? {
                    Some(form) => {
                        view.fill_dialog(DialogKind::Edit, &form);
                        controller.submit_edit().await;
                    }
                    None => view.close_dialog(DialogKind::Edit),
                }
            }
            Command::Toggle(id) => {
                controller
                    .dispatch(RowAction::ToggleAvailability(id))
                    .await
            }
            Command::Delete(id) => controller.dispatch(RowAction::Delete(id)).await,
            Command::Help => println!("{HELP}"),
            Command::Quit => return Ok(()),
        }
    }
}
