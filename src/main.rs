use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use spirit_trade::config::DEFAULT_CONFIG_FILE;
use spirit_trade::item::total_count;
use spirit_trade::{
    Config, ItemStack, Recipe, RecipeBook, ReloadEvent, ResourceLocation, SerializerRegistry,
    SharedRecipeBook,
};

#[derive(Debug, Parser)]
#[command(name = "spirit-trade", about = "Inspect and run spirit trade recipes")]
struct Cli {
    /// Config file
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Override the configured data directory
    #[arg(long)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List loaded recipes
    List,
    /// Check an offer against one recipe, e.g. `check occultism:foo stick*2 coal`
    Check {
        recipe: String,
        items: Vec<String>,
    },
    /// Run the first spirit trade the offer satisfies
    Trade { items: Vec<String> },
    /// Print a recipe packet as base64
    Encode { recipe: String },
    /// Decode a base64 recipe packet
    Decode { packet: String },
    /// Reload recipes whenever the data directory changes
    Watch,
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(&cli.config)
        .with_context(|| format!("Failed to load config {:?}", cli.config))?;
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }

    // Initialize logging; RUST_LOG wins over the config file
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let registry = SerializerRegistry::with_defaults(&config.namespace)?;

    match cli.command {
        Command::List => list(&load_book(&config, &registry)?, &registry),
        Command::Check { recipe, items } => {
            check(&load_book(&config, &registry)?, &recipe, &items)?
        }
        Command::Trade { items } => trade(&load_book(&config, &registry)?, &items)?,
        Command::Encode { recipe } => {
            let book = load_book(&config, &registry)?;
            let recipe = find_recipe(&book, &recipe)?;
            let packet = registry.encode(recipe)?;
            println!("{}", BASE64.encode(packet));
        }
        Command::Decode { packet } => {
            let bytes = BASE64
                .decode(packet.trim())
                .context("Packet is not valid base64")?;
            let recipe = registry.decode(&bytes)?;
            print_recipe(recipe.as_recipe(), &registry);
        }
        Command::Watch => watch(&config, registry).await?,
    }

    Ok(())
}

// ============================================================================
// Commands
// ============================================================================

fn list(book: &RecipeBook, registry: &SerializerRegistry) {
    if book.is_empty() {
        warn!("No recipes loaded");
    }
    for id in book.ids() {
        if let Some(recipe) = book.get(id) {
            print_recipe(recipe.as_recipe(), registry);
        }
    }
}

fn check(book: &RecipeBook, recipe: &str, items: &[String]) -> Result<()> {
    let recipe = find_recipe(book, recipe)?;
    let Some(trade) = recipe.as_spirit_trade() else {
        bail!("{} is not a spirit trade", recipe.id());
    };

    let offer = parse_offer(items)?;
    let valid = trade.is_valid(&offer);
    println!("valid: {}", valid);
    if valid {
        print_stacks("remainder", &trade.consume(&offer));
    }
    Ok(())
}

fn trade(book: &RecipeBook, items: &[String]) -> Result<()> {
    let offer = parse_offer(items)?;
    match book.trade(&offer) {
        Some((trade, outcome)) => {
            println!("trade: {}", trade.id());
            println!("result: {}", outcome.result);
            print_stacks("remainder", &outcome.remainder);
            info!(
                "Traded {} items for {}",
                total_count(&offer) - total_count(&outcome.remainder),
                outcome.result
            );
        }
        None => println!("no trade accepts this offer"),
    }
    Ok(())
}

async fn watch(config: &Config, registry: SerializerRegistry) -> Result<()> {
    let shared = Arc::new(SharedRecipeBook::new(config, registry));
    let count = shared.reload().await?;
    info!("Loaded {} recipes, watching {:?}", count, shared.data_dir());

    let mut rx = shared.start_file_watcher()?;
    while let Some(event) = rx.recv().await {
        match event {
            ReloadEvent::Reloaded { path, recipes } => {
                info!("Reloaded {} recipes after change to {}", recipes, path)
            }
            ReloadEvent::Error(e) => warn!("Reload failed: {}", e),
        }
    }
    Ok(())
}

// ============================================================================
// Helpers
// ============================================================================

fn load_book(config: &Config, registry: &SerializerRegistry) -> Result<RecipeBook> {
    RecipeBook::load(&config.data_dir, &config.namespace, registry)
        .with_context(|| format!("Failed to load recipes from {:?}", config.data_dir))
}

fn find_recipe<'a>(book: &'a RecipeBook, id: &str) -> Result<&'a spirit_trade::AnyRecipe> {
    let id: ResourceLocation = id.parse()?;
    book.get(&id)
        .with_context(|| format!("No recipe named {}", id))
}

fn parse_offer(items: &[String]) -> Result<Vec<ItemStack>> {
    items
        .iter()
        .map(|s| s.parse::<ItemStack>().with_context(|| format!("Bad item '{}'", s)))
        .collect()
}

fn print_recipe(recipe: &dyn Recipe, registry: &SerializerRegistry) {
    let type_name = registry
        .name_of(recipe.kind())
        .map(|n| n.to_string())
        .unwrap_or_else(|| recipe.kind().as_str().to_string());
    println!(
        "{} [{}] {} ingredients -> {}",
        recipe.id(),
        type_name,
        recipe.ingredients().len(),
        recipe.result()
    );
}

fn print_stacks(label: &str, stacks: &[ItemStack]) {
    let rendered: Vec<String> = stacks.iter().map(|s| s.to_string()).collect();
    println!("{}: [{}]", label, rendered.join(", "));
}
