//! Command-line interface for Wayfarer.

use clap::{Parser, Subcommand};

/// Wayfarer - Travel Destination Catalog
/// A token-authenticated REST backend for destinations, tags, and features
#[derive(Parser)]
#[command(name = "wayfarer")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP API server (default)
    Serve,

    /// Create default config file
    Init,

    /// Create a staff account with superuser rights
    #[command(name = "create-superuser")]
    CreateSuperuser {
        /// Email address for the account
        email: String,

        /// Password for the account
        password: String,

        /// Display name
        #[arg(long, default_value = "Admin")]
        name: String,
    },
}
