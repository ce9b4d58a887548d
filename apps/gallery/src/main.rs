use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    http_client, load_settings, wait_for_suggestions, ClientSettings, PageController,
    ProductCatalogClient, RecipeSearchClient, SuggestionController,
};
use shared::domain::{PageEntry, Recipe};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(about = "Drive the search and catalog controllers from a terminal")]
struct Args {
    /// Overrides the configured debounce interval.
    #[arg(long)]
    debounce_ms: Option<u64>,
    #[arg(long, default_value_t = 10)]
    timeout_secs: u64,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Type each argument in turn as if entered into the search box.
    Search {
        #[arg(required = true)]
        keystrokes: Vec<String>,
        /// Delay between simulated keystrokes.
        #[arg(long, default_value_t = 120)]
        typing_delay_ms: u64,
        /// 1-based index of the suggestion to open.
        #[arg(long)]
        select: Option<usize>,
    },
    /// Load the catalog and print one page.
    Browse {
        #[arg(long, default_value_t = 1)]
        page: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let args = Args::parse();

    let mut settings = load_settings().context("failed to load settings")?;
    if let Some(ms) = args.debounce_ms {
        settings.debounce_ms = ms;
    }
    tracing::debug!(?settings, "loaded settings");
    let http = http_client(Duration::from_secs(args.timeout_secs))?;

    match args.command {
        Command::Search {
            keystrokes,
            typing_delay_ms,
            select,
        } => run_search(http, &settings, keystrokes, typing_delay_ms, select).await,
        Command::Browse { page } => run_browse(http, &settings, page).await,
    }
}

async fn run_search(
    http: reqwest::Client,
    settings: &ClientSettings,
    keystrokes: Vec<String>,
    typing_delay_ms: u64,
    select: Option<usize>,
) -> Result<()> {
    let source = RecipeSearchClient::from_settings(http, settings);
    let controller = SuggestionController::from_settings(source, settings);
    let mut events = controller.subscribe();

    controller.focus();
    for text in keystrokes {
        controller.set_query(text);
        tokio::time::sleep(Duration::from_millis(typing_delay_ms)).await;
    }

    let query = controller.view().query;
    if !query.is_empty() {
        // Wait for the debounced lookup of the final query to publish.
        let deadline = settings.debounce() + Duration::from_secs(15);
        let settled = wait_for_suggestions(&mut events, &query);
        match tokio::time::timeout(deadline, settled).await {
            Ok(Some(_)) => {}
            Ok(None) => bail!("suggestion controller stopped before '{query}' settled"),
            Err(_) => bail!("no suggestions for '{query}' before timeout"),
        }
    }

    let view = controller.view();
    if view.suggestions.is_empty() {
        println!("No suggestions for '{}'.", view.query);
        return Ok(());
    }
    for (index, recipe) in view.suggestions.iter().enumerate() {
        println!("{:>2}. {}", index + 1, recipe.name);
    }

    if let Some(index) = select {
        let Some(recipe) = view.suggestions.get(index.wrapping_sub(1)).cloned() else {
            bail!(
                "--select {index} is out of range (1..={})",
                view.suggestions.len()
            );
        };
        controller.select_result(recipe);
        if let Some(selected) = controller.view().selection {
            print_recipe(&selected);
        }
    }

    controller.shutdown();
    Ok(())
}

fn print_recipe(recipe: &Recipe) {
    println!();
    println!("{}", recipe.name);
    println!("Ingredients:");
    for ingredient in &recipe.ingredients {
        println!("  - {ingredient}");
    }
    println!("Instructions:");
    for (step, instruction) in recipe.instructions.iter().enumerate() {
        println!("  {}. {instruction}", step + 1);
    }
}

async fn run_browse(http: reqwest::Client, settings: &ClientSettings, page: usize) -> Result<()> {
    let source = ProductCatalogClient::from_settings(http, settings);
    let mut controller = PageController::from_settings(source, settings);
    controller.load().await;

    if let Some(failure) = controller.failure() {
        println!("No products found ({failure}).");
        return Ok(());
    }
    if page != 1 && !controller.go_to_page(page) {
        bail!(
            "page {page} is out of range (1..={})",
            controller.total_pages()
        );
    }

    let view = controller.view();
    if view.is_empty_after_load() {
        println!("No products found.");
        return Ok(());
    }
    for product in view.items {
        println!(
            "#{:<4} {:<40} {:>10}",
            product.id.0,
            product.title,
            product.display_price()
        );
    }

    let nav: Vec<String> = view
        .range
        .iter()
        .map(|entry| match entry {
            PageEntry::Page(n) if *n == view.page => format!("[{n}]"),
            other => other.to_string(),
        })
        .collect();
    println!();
    println!(
        "{} {} {}",
        if view.has_previous { "<" } else { " " },
        nav.join(" "),
        if view.has_next { ">" } else { " " }
    );
    Ok(())
}
