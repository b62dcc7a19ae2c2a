use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::info;
use std::fs;
use std::path::PathBuf;

use inventory::domain::{Category, CategoryPatch, Entity, Product, ProductPatch};
use inventory::storage::{JsonlStorage, MemoryStorage, SqliteStorage, Storage};
use inventory::store::ProductsByCategoryLookup;
use inventory::{Inventory, InventoryError};

mod cli;
mod config;

use cli::Cli;
use cli::commands::{CategoryCommands, Commands, ProductCommands};
use config::{Backend, Config};

fn setup_logging() -> Result<()> {
    // Create log directory
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("inventory")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("inventory.log");

    // Setup env_logger with file output
    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("trace"))
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

/// Narrow the log level to the configured one unless RUST_LOG is set.
fn apply_log_level(config: &Config) {
    if std::env::var_os("RUST_LOG").is_some() {
        return;
    }
    let level = config
        .log_level
        .as_deref()
        .and_then(|l| l.parse::<log::LevelFilter>().ok())
        .unwrap_or(log::LevelFilter::Info);
    log::set_max_level(level);
}

fn run_application(cli: &Cli, config: &Config) -> Result<()> {
    info!("Starting application with {:?} backend", config.storage.backend);

    if cli.is_verbose() {
        println!(
            "{} {:?} storage in {}",
            "Using".yellow(),
            config.storage.backend,
            config.storage.data_dir.display()
        );
    }

    match config.storage.backend {
        Backend::Memory => execute(&Inventory::new(MemoryStorage::new())?, &cli.command, config),
        Backend::Jsonl => {
            let storage = JsonlStorage::new(&config.storage.data_dir).context("Failed to open JSONL storage")?;
            execute(&Inventory::new(storage)?, &cli.command, config)
        }
        Backend::Sqlite => {
            let path = config.storage.sqlite_path();
            let storage = SqliteStorage::open(&path)
                .with_context(|| format!("Failed to open SQLite database {}", path.display()))?;
            execute(&Inventory::new(storage)?, &cli.command, config)
        }
    }
}

fn execute<S: Storage + 'static>(inventory: &Inventory<S>, command: &Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Category { command } => handle_category_command(inventory, command, config),
        Commands::Product { command } => handle_product_command(inventory, command, config),
    }
}

/// Blank input means "keep the current value".
fn keep_if_blank(value: &Option<String>) -> Option<String> {
    value.clone().filter(|v| !v.trim().is_empty())
}

fn handle_category_command<S: Storage + 'static>(
    inventory: &Inventory<S>,
    command: &CategoryCommands,
    config: &Config,
) -> Result<()> {
    info!("Handling category command: {:?}", command);
    let categories = inventory.categories();
    match command {
        CategoryCommands::Add { id, name, description } => {
            categories.add(&Category::new(id, name, description))?;
            println!("{} {}", "Added category:".green(), id);
        }
        CategoryCommands::List => {
            let all = categories.list()?;
            if all.is_empty() {
                println!("{}", "No categories".yellow());
            }
            for category in &all {
                print_category(category);
            }
        }
        CategoryCommands::Show { id } => match categories.get_by_id(id)? {
            Some(category) => print_category(&category),
            None => println!("{} {}", "Category not found:".red(), id),
        },
        CategoryCommands::Update { id, name, description } => {
            let patch = CategoryPatch {
                name: keep_if_blank(name),
                description: keep_if_blank(description),
            };
            categories.update(id, &patch)?;
            if patch.is_empty() {
                println!("{} {}", "Nothing to update for category".yellow(), id);
            } else {
                println!("{} {}", "Updated category:".green(), id);
            }
        }
        CategoryCommands::Delete { id } => {
            categories.delete(id)?;
            println!("{} {}", "Deleted category:".red(), id);
        }
        CategoryCommands::Products { id } => {
            let category = categories
                .get_by_id(id)?
                .ok_or_else(|| InventoryError::not_found(Entity::Category, id))?;
            let linked = inventory.products().list_by_category(id)?;
            if linked.is_empty() {
                println!("{} {}", "No products in category".yellow(), id);
            }
            for product in &linked {
                print_product(product, Some(&category), &config.display.currency);
            }
        }
    }
    Ok(())
}

fn handle_product_command<S: Storage + 'static>(
    inventory: &Inventory<S>,
    command: &ProductCommands,
    config: &Config,
) -> Result<()> {
    info!("Handling product command: {:?}", command);
    let products = inventory.products();
    let currency = config.display.currency.as_str();
    match command {
        ProductCommands::Add {
            id,
            name,
            description,
            price,
            quantity,
            category,
        } => {
            products.add(&Product::new(id, name, description, *price, *quantity, category))?;
            println!("{} {}", "Added product:".green(), id);
        }
        ProductCommands::List { category } => {
            let all = match category {
                Some(category_id) => products.list_by_category(category_id)?,
                None => products.list()?,
            };
            if all.is_empty() {
                println!("{}", "No products".yellow());
            }
            for product in &all {
                let category = inventory.categories().get_by_id(&product.category_id)?;
                print_product(product, category.as_ref(), currency);
            }
        }
        ProductCommands::Show { id } => match products.get_by_id(id)? {
            Some(product) => {
                let category = inventory.categories().get_by_id(&product.category_id)?;
                print_product(&product, category.as_ref(), currency);
            }
            None => println!("{} {}", "Product not found:".red(), id),
        },
        ProductCommands::Update {
            id,
            name,
            description,
            price,
            quantity,
            category,
        } => {
            let patch = ProductPatch {
                name: keep_if_blank(name),
                description: keep_if_blank(description),
                price: *price,
                quantity: *quantity,
                category_id: keep_if_blank(category),
            };
            products.update(id, &patch)?;
            if patch.is_empty() {
                println!("{} {}", "Nothing to update for product".yellow(), id);
            } else {
                println!("{} {}", "Updated product:".green(), id);
            }
        }
        ProductCommands::Delete { id } => {
            products.delete(id)?;
            println!("{} {}", "Deleted product:".red(), id);
        }
        ProductCommands::Stock { id, quantity } => {
            products.update_stock(id, *quantity)?;
            println!("{} {} -> {}", "Stock updated:".green(), id, quantity);
        }
    }
    Ok(())
}

fn print_category(category: &Category) {
    println!(
        "{} | Name: {} | Description: {}",
        category.id.cyan(),
        category.name,
        category.description
    );
}

fn print_product(product: &Product, category: Option<&Category>, currency: &str) {
    let category = match category {
        Some(c) => format!("{} ({})", c.name, c.id),
        None => product.category_id.clone(),
    };
    println!(
        "{} | Name: {} | Description: {} | Price: {}{:.2} | Quantity: {} | Category: {}",
        product.id.cyan(),
        product.name,
        product.description,
        currency,
        product.price,
        product.quantity,
        category
    );
}

fn main() -> Result<()> {
    // Setup logging first
    setup_logging().context("Failed to setup logging")?;

    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(cli.config.as_ref())
        .context("Failed to load configuration")?
        .with_overrides(cli.backend, cli.data_dir.as_ref());
    apply_log_level(&config);

    info!("Starting with config from: {:?}", cli.config);

    // Run the main application logic
    run_application(&cli, &config).context("Application failed")?;

    Ok(())
}
