use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use catalog::ScriptLibrary;
use clap::{Parser, Subcommand};
use control::{ActionRouter, SessionStore};
use input::{total_duration, DryRunDriver};
use shared::{
    domain::CombinationId,
    protocol::{Patch, SessionStateRequest},
};

#[derive(Parser, Debug)]
struct Cli {
    #[arg(long, default_value = "scripts")]
    script_dir: PathBuf,
    #[arg(long, default_value = "images")]
    images_dir: PathBuf,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Class/map combinations derived from the script directory.
    Combinations,
    /// Script files, newest first.
    Scripts,
    Resolve {
        combination_id: String,
    },
    /// Print the input an action would send, without sending it.
    Plan {
        family: String,
        name: String,
        #[arg(long)]
        combination: Option<String>,
        #[arg(long, default_value_t = 1.0)]
        step_size: f64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("warn")
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();
    let library = ScriptLibrary::new(&cli.script_dir, &cli.images_dir);

    match cli.command {
        Command::Combinations => {
            let catalog = library.build_catalog()?;
            println!("{}", serde_json::to_string_pretty(&catalog.list())?);
        }
        Command::Scripts => {
            for script in library.list_scripts()? {
                println!(
                    "{:<48} {:>8}  {}",
                    script.name, script.size, script.modified
                );
            }
        }
        Command::Resolve { combination_id } => {
            let catalog = library.build_catalog()?;
            let entry = catalog.resolve(&CombinationId::new(combination_id))?;
            println!("{}", serde_json::to_string_pretty(&entry.combination)?);
            match entry.map {
                Some(map) => println!("recorded routes: {}", map.display_name()),
                None => println!("recorded routes: none"),
            }
        }
        Command::Plan {
            family,
            name,
            combination,
            step_size,
        } => {
            let catalog = Arc::new(library.build_catalog()?);
            let session = Arc::new(SessionStore::new(Arc::clone(&catalog)));
            session
                .update(SessionStateRequest {
                    combination_id: match combination {
                        Some(id) => Patch::Set(Some(CombinationId::new(id))),
                        None => Patch::Keep,
                    },
                    step_size: Some(step_size),
                })
                .await
                .context("invalid session for plan")?;

            let driver = DryRunDriver::new();
            let router = ActionRouter::new(session, catalog, Arc::new(driver.clone()));
            let outcome = router.dispatch(&family, &name).await?;
            let steps = driver.played().await;
            for step in &steps {
                println!("{step:?}");
            }
            println!(
                "{} ({} steps, {:?})",
                outcome.message,
                steps.len(),
                total_duration(&steps)
            );
        }
    }

    Ok(())
}
