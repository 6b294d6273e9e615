pub mod ask;
pub mod chat;
pub mod common;
pub mod config;
pub mod diagnose;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "ghiras")]
#[command(author, version, about = "Smart-farming assistant: plant diagnosis and agricultural chat")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file
    #[arg(short, long, global = true, env = "GHIRAS_CONFIG")]
    pub config: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Diagnose a plant from a photo
    Diagnose(diagnose::DiagnoseArgs),

    /// Ask the assistant a single question
    Ask(ask::AskArgs),

    /// Start an interactive chat with the assistant
    Chat(chat::ChatArgs),

    /// Configuration management
    Config(config::ConfigArgs),
}
