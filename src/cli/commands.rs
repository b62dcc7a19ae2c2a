//! CLI command definitions using clap.
//!
//! Defines the main CLI structure and subcommands:
//! - category: add/list/show/update/delete categories, list their products
//! - product: add/list/show/update/delete products, set stock

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use std::path::PathBuf;

use crate::config::Backend;

/// Inventory - categories and products with referential integrity
#[derive(Parser, Debug)]
#[command(name = "inventory")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Optional config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Storage backend (overrides the config file)
    #[arg(short, long, global = true, value_enum)]
    pub backend: Option<Backend>,

    /// Data directory (overrides the config file)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

/// Main subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage categories
    Category {
        #[command(subcommand)]
        command: CategoryCommands,
    },

    /// Manage products
    Product {
        #[command(subcommand)]
        command: ProductCommands,
    },
}

/// Category subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum CategoryCommands {
    /// Add a new category
    Add {
        /// Category ID
        id: String,
        /// Category name
        name: String,
        /// Category description
        #[arg(default_value = "")]
        description: String,
    },

    /// List all categories
    List,

    /// Show a single category
    Show {
        /// Category ID
        id: String,
    },

    /// Update a category; blank values keep the current value
    Update {
        /// Category ID
        id: String,
        #[arg(short, long)]
        name: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
    },

    /// Delete a category with no linked products
    Delete {
        /// Category ID
        id: String,
    },

    /// List the products linked to a category
    Products {
        /// Category ID
        id: String,
    },
}

/// Product subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ProductCommands {
    /// Add a new product
    Add {
        /// Product ID
        id: String,
        /// Product name
        name: String,
        #[arg(short, long, default_value = "")]
        description: String,
        /// Unit price
        #[arg(short, long, allow_negative_numbers = true)]
        price: Decimal,
        /// Units in stock
        #[arg(short, long)]
        quantity: u32,
        /// ID of an existing category
        #[arg(long)]
        category: String,
    },

    /// List all products
    List {
        /// Only products in this category
        #[arg(long)]
        category: Option<String>,
    },

    /// Show a single product
    Show {
        /// Product ID
        id: String,
    },

    /// Update a product; blank values keep the current value
    Update {
        /// Product ID
        id: String,
        #[arg(short, long)]
        name: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(short, long, allow_negative_numbers = true)]
        price: Option<Decimal>,
        #[arg(short, long)]
        quantity: Option<u32>,
        #[arg(long)]
        category: Option<String>,
    },

    /// Delete a product
    Delete {
        /// Product ID
        id: String,
    },

    /// Set the stock quantity of a product
    Stock {
        /// Product ID
        id: String,
        /// New quantity
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
}
