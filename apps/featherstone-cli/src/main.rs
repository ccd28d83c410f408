use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use featherstone_describe::{ConstructWorld, ConstructWorldFromDescription, WorldDescription};
use featherstone_memory::{MemoryFeatures, loader};
use featherstone_physics::{
    ForwardStep, GetContactsFromLastStep, GetEngineInfo, GetLinkFromModel, GetModelFromWorld,
    GetShapeFromLink, GetWorldFromEngine, StepInput, feature_list, kind,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

feature_list! {
    /// What `simulate` needs from a plugin.
    struct SimulateFeatures {
        GetEngineInfo,
        GetWorldFromEngine,
        GetModelFromWorld,
        GetLinkFromModel,
        GetShapeFromLink,
        ConstructWorldFromDescription,
        ForwardStep,
        GetContactsFromLastStep,
    }
}

#[derive(Parser)]
#[command(name = "featherstone-cli", about = "CLI tool for featherstone physics plugins")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and the memory plugin's feature set
    Info,
    /// List the registered plugins that can run `simulate`
    Features,
    /// Construct a described world and step it
    Simulate {
        /// World description (YAML, or JSON with a .json extension)
        file: PathBuf,
        /// Number of steps to take
        #[arg(short, long, default_value = "10")]
        steps: u64,
        /// Time step in seconds; defaults to the description's
        #[arg(long)]
        dt: Option<f64>,
        /// Plugin to simulate with
        #[arg(short, long, default_value = "memory")]
        plugin: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let loader = loader();

    match cli.command {
        Commands::Info => {
            println!("featherstone-cli v{}", env!("CARGO_PKG_VERSION"));
            for name in loader.plugin_names() {
                let instance = loader.instantiate(name)?;
                let features = instance.implemented()?;
                println!("plugin {name}: {} features", features.len());
                for feature in features.names() {
                    println!("  {feature}");
                }
            }
        }
        Commands::Features => {
            for (list, plugins) in [
                ("simulate", loader.find_features::<SimulateFeatures>()),
                ("everything", loader.find_features::<MemoryFeatures>()),
            ] {
                let plugins: Vec<_> = plugins.into_iter().collect();
                println!("{list}: {}", plugins.join(", "));
            }
        }
        Commands::Simulate {
            file,
            steps,
            dt,
            plugin,
        } => {
            let description = WorldDescription::load(&file)
                .with_context(|| format!("loading {}", file.display()))?;
            let engine = loader.request_engine::<SimulateFeatures>(&plugin)?;
            let world = engine
                .construct_world(&description)
                .with_context(|| format!("plugin `{plugin}` could not construct the world"))?;
            info!(
                world = %world.name(),
                models = world.model_count(),
                engine = %engine.name(),
                "constructed world"
            );

            let time_step = dt
                .map(Duration::try_from_secs_f64)
                .transpose()
                .context("--dt must be a non-negative number of seconds")?;
            let input = StepInput { time_step };
            let mut last = None;
            for _ in 0..steps {
                last = Some(world.step(&input));
            }

            let Some(output) = last else {
                println!("no steps taken");
                return Ok(());
            };
            println!(
                "{}: t={:.4}s, {} link(s) moved in the last step",
                world.name(),
                output.sim_time.as_secs_f64(),
                output.changed_poses.len()
            );
            for entry in &output.changed_poses.entries {
                let name = world
                    .related::<kind::Link>(entry.body.clone())
                    .map(|link| link.name())
                    .unwrap_or_default();
                let p = entry.pose.position;
                println!("  {name} (#{}): [{:.4}, {:.4}, {:.4}]", entry.body.id(), p.x, p.y, p.z);
            }
            let contacts = world.contacts_from_last_step();
            if !contacts.is_empty() {
                println!("{} contact(s):", contacts.len());
            }
            for contact in &contacts {
                let p = contact.point;
                println!(
                    "  {} / {}: [{:.4}, {:.4}, {:.4}]",
                    contact.collision1.name(),
                    contact.collision2.name(),
                    p.x,
                    p.y,
                    p.z
                );
            }
        }
    }

    Ok(())
}
