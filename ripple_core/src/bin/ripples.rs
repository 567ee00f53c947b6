//! `ripples` - drive the ripple engine from the command line.

use clap::{Parser, Subcommand};
use parking_lot::Mutex;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use ripple_core::{
    Autoplay, AudioBridge, EngineEvent, GridCompiler, LlmClient, LlmNarrator, PointCloudRenderer,
    Renderer, RippleEngine, RippleError, RipplesConfig, VoteWindow, WorldtextRenderer,
};
use world_rules::{Catalog, EntityId, ScenarioId, Vector};

#[derive(Parser)]
#[command(name = "ripples")]
#[command(about = "Inject narrative vectors into small hand-authored worlds")]
struct Args {
    /// Configuration file (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Disable ANSI styling in worldtext output
    #[arg(long, global = true)]
    plain: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the built-in scenarios
    Scenarios,

    /// Show a scenario's worldtext before anything happens
    Show { scenario: String },

    /// Apply one vector to one entity
    Trigger {
        scenario: String,
        entity: String,
        vector: String,
        /// Narrate with the configured LLM instead of the latent library
        #[arg(long)]
        llm: bool,
    },

    /// Let the autoplay timer trigger ripples
    Autoplay {
        scenario: String,
        /// Stop after this many ripples
        #[arg(short, long, default_value_t = 5)]
        ripples: u64,
    },

    /// Print the compiled grid, optionally writing it to a file
    Grid {
        scenario: String,
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Print the point cloud as JSON
    Cloud { scenario: String },

    /// Resolve a performance-mode vote on one entity
    Perform {
        scenario: String,
        entity: String,
        /// Votes, e.g. `goal shift shift`
        #[arg(required = true)]
        votes: Vec<String>,
    },
}

fn main() -> ExitCode {
    init_tracing();
    let args = Args::parse();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "ripples failed");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn run(args: Args) -> Result<(), RippleError> {
    let config = RipplesConfig::load(args.config.as_deref())?;
    let catalog = Catalog::builtin()?;
    let worldtext = WorldtextRenderer::new(!args.plain, 72);

    match args.command {
        Command::Scenarios => {
            for scenario in catalog.scenarios() {
                println!(
                    "{:<12} {} ({} entities)",
                    scenario.id,
                    scenario.name,
                    scenario.entities.len()
                );
            }
            Ok(())
        }
        Command::Show { scenario } => {
            let engine = build_engine(catalog, &config, &scenario)?;
            print_frame(&engine, &worldtext);
            Ok(())
        }
        Command::Trigger {
            scenario,
            entity,
            vector,
            llm,
        } => {
            let vector: Vector = vector.parse()?;
            let mut engine = build_engine(catalog, &config, &scenario)?;
            if llm || config.llm.enabled {
                let library = engine.catalog().library().clone();
                let client = LlmClient::new(config.llm.clone());
                engine.set_narrator(Box::new(LlmNarrator::new(client, library)));
            }
            engine.select_entity(&EntityId::new(entity))?;
            engine.trigger(vector)?;
            print_frame(&engine, &worldtext);
            Ok(())
        }
        Command::Autoplay { scenario, ripples } => {
            run_autoplay(catalog, &config, &scenario, ripples, &worldtext)
        }
        Command::Grid { scenario, out } => {
            let engine = build_engine(catalog, &config, &scenario)?;
            let grid = GridCompiler::new(config.grid.grid_config())
                .compile(engine.scenario().ok_or(RippleError::NoScenarioLoaded)?);
            print!("{grid}");
            if let Some(path) = out.or_else(|| config.grid.output.clone()) {
                grid.write_live(&path)?;
                info!(path = %path.display(), "grid written");
            }
            Ok(())
        }
        Command::Cloud { scenario } => {
            let engine = build_engine(catalog, &config, &scenario)?;
            if let Some(frame) = engine.frame() {
                println!("{}", PointCloudRenderer::default().render(&frame));
            }
            Ok(())
        }
        Command::Perform {
            scenario,
            entity,
            votes,
        } => {
            let mut engine = build_engine(catalog, &config, &scenario)?;
            engine.select_entity(&EntityId::new(entity))?;

            let opened = Instant::now();
            let mut window = VoteWindow::open(opened, config.performance.window());
            for vote in &votes {
                window.cast(vote.parse()?, opened)?;
            }
            for vector in Vector::ALL {
                println!("{:<9} {}", vector, window.tally(vector));
            }

            match engine.resolve_vote(&window)? {
                Some(_) => print_frame(&engine, &worldtext),
                None => println!("no votes"),
            }
            Ok(())
        }
    }
}

/// Load the scenario and wire the outputs the config asks for.
fn build_engine(catalog: Catalog, config: &RipplesConfig, scenario: &str) -> Result<RippleEngine, RippleError> {
    let mut engine = RippleEngine::new(catalog, config.engine_config());

    if let Some(path) = &config.grid.output {
        engine.attach_live_grid(GridCompiler::new(config.grid.grid_config()), path);
    }

    if config.bridge.enabled {
        match AudioBridge::bind(&config.bridge) {
            Ok(bridge) => {
                engine.subscribe(move |event| {
                    if let EngineEvent::RippleApplied(ripple) = event {
                        // Failures are already logged by the bridge.
                        let _ = bridge.send_ripple(ripple);
                    }
                });
            }
            Err(err) => warn!(error = %err, "audio bridge unavailable"),
        }
    }

    engine.load_scenario(&ScenarioId::new(scenario))?;
    Ok(engine)
}

fn run_autoplay(
    catalog: Catalog,
    config: &RipplesConfig,
    scenario: &str,
    ripples: u64,
    worldtext: &WorldtextRenderer,
) -> Result<(), RippleError> {
    let mut engine = build_engine(catalog, config, scenario)?;
    engine.subscribe(|event| {
        if let Some(ripple) = event.ripple() {
            println!("[t{:04}] {} -> {}: {}", ripple.tick, ripple.vector, ripple.source, ripple.text);
        }
    });

    let engine = Arc::new(Mutex::new(engine));
    let autoplay = Autoplay::start(Arc::clone(&engine), config.autoplay.interval());
    while autoplay.is_running() && autoplay.fired() < ripples {
        std::thread::sleep(Duration::from_millis(50));
    }
    let fired = autoplay.stop();
    info!(fired, "autoplay finished");

    println!();
    print_frame(&engine.lock(), worldtext);
    Ok(())
}

fn print_frame(engine: &RippleEngine, worldtext: &WorldtextRenderer) {
    if let Some(frame) = engine.frame() {
        print!("{}", worldtext.render(&frame));
    }
}
