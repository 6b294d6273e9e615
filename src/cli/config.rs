use anyhow::Result;
use clap::{Args, Subcommand};

use ghiras::advisor::CredentialResolver;
use ghiras::config::Config;

use crate::cli::common::{expand_path, load_config};

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Write the default config template
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Show the effective configuration and credential status
    Show,

    /// Print a single value (e.g. gemini.model)
    Get { key: String },

    /// Print the config file path
    Path,
}

/// `init` and `path` never read the file, so they work on a fresh setup.
pub fn run(args: ConfigArgs, path_override: Option<&str>) -> Result<()> {
    let path = match path_override {
        Some(p) => expand_path(p),
        None => Config::config_path()?,
    };

    match args.command {
        ConfigCommands::Init { force } => {
            if path.exists() && !force {
                anyhow::bail!(
                    "Config already exists at {} (use --force to overwrite)",
                    path.display()
                );
            }
            Config::save_template(&path)?;
            println!("{}", path.display());
        }
        ConfigCommands::Show => {
            let config = load_config(path_override)?;
            let resolver = CredentialResolver::from_config(&config);
            println!("Config file: {}", path.display());
            println!("Capability:  {}", resolver.resolve());
            match resolver.credential() {
                Some(key) => println!("API key:     {}", key.masked()),
                None => println!("API key:     (not set)"),
            }
            println!();

            // Never print the key itself.
            let mut shown = config.clone();
            shown.gemini.api_key = None;
            print!("{}", toml::to_string_pretty(&shown)?);
        }
        ConfigCommands::Get { key } => {
            println!("{}", load_config(path_override)?.get_value(&key)?);
        }
        ConfigCommands::Path => {
            println!("{}", path.display());
        }
    }

    Ok(())
}
