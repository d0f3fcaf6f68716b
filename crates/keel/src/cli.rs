use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use keel_core::kernel::constants::CORE_IDENTITY;
use keel_core::kernel::handle;
use keel_core::kernel::Result;
use keel_core::{Component, ComponentPackage, Config, CorePackage, Environment, Phase};

/// Keel: inspect and start a component environment
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Configuration file; defaults to the path in KEEL_CONFIG
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List instantiated components and their packages
    Components,
    /// Print the component order computed for a lifecycle phase
    Chain {
        /// Lifecycle phase (initialize or configure)
        #[arg(long, default_value = "initialize")]
        phase: Phase,
    },
    /// Initialize and configure every component
    Start,
    /// Print the creation script of the combined schema catalog
    Schema,
}

/// Packages compiled into this binary.
fn packages() -> [&'static dyn ComponentPackage; 1] {
    [&CorePackage]
}

fn load_environment(config_path: Option<PathBuf>) -> Result<Arc<Environment>> {
    match config_path {
        Some(path) => Environment::new(Config::load_interpolated(&path)?, &packages()),
        None => Environment::from_env(&packages()),
    }
}

pub fn run(args: CliArgs) -> Result<()> {
    let env = load_environment(args.config)?;

    match args.command {
        Commands::Components => {
            for (identity, _) in env.components() {
                println!("{}\t{}", identity, env.package_of(identity).unwrap_or("-"));
            }
        }
        Commands::Chain { phase } => {
            for identity in env.chain_order(phase, CORE_IDENTITY)? {
                println!("{}", identity);
            }
        }
        Commands::Start => {
            env.initialize()?;
            handle::publish(env.clone());
            println!("Environment started with {} component(s)", env.len());
            if let Some(store) = env.core().and_then(|core| core.store()) {
                println!("Store: {}", store);
            }
        }
        Commands::Schema => {
            env.initialize()?;
            let catalog = env.metadata()?;
            catalog.validate()?;
            println!("{}", catalog.creation_script());
        }
    }
    Ok(())
}
