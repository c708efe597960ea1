use clap::Parser;
use puzzle_sim::core::report::render_text;
use puzzle_sim::core::ConfigProvider;
use puzzle_sim::utils::{logger, validation::Validate};
use puzzle_sim::{
    LocalStorage, OutputFormat, ReportWriter, RunSettings, SimError, SimulationEngine,
    TomlConfig,
};

#[derive(Parser)]
#[command(name = "toml-sim")]
#[command(about = "Run the puzzle simulations described by a TOML file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "puzzle-sim.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Override the number of trials per case
    #[arg(long)]
    trials: Option<u64>,

    /// Override the seed used for every puzzle
    #[arg(long)]
    seed: Option<u64>,

    /// Show what would run without simulating
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    if config.json_logs() {
        logger::init_json_logger(args.verbose);
    } else {
        logger::init_cli_logger(args.verbose);
    }
    tracing::info!("📁 Loaded configuration from: {}", args.config);

    if let Some(trials) = args.trials {
        config.simulation.trials = Some(trials);
        tracing::info!("🔧 Trials overridden to: {}", trials);
    }
    if let Some(seed) = args.seed {
        config.simulation.seed = Some(seed);
        tracing::info!("🔧 Seed overridden to: {}", seed);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    display_config_summary(&config, &args)?;

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No simulation will run");
        perform_dry_run(&config)?;
        return Ok(());
    }

    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    if let Err(e) = run(&config, monitor_enabled).await {
        tracing::error!(
            "❌ Simulation failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

        let exit_code = e.severity().exit_code();
        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }

    Ok(())
}

async fn run(config: &TomlConfig, monitor_enabled: bool) -> Result<(), SimError> {
    let puzzles = config.params().build_all(&config.puzzles()?)?;
    let settings = RunSettings {
        run_id: config.run_id().map(str::to_string),
        ..RunSettings::from_config(config)
    };

    let engine = SimulationEngine::new_with_monitoring(puzzles, settings, monitor_enabled);
    let report = engine.run().await?;

    print!("{}", render_text(&report));

    let formats = OutputFormat::parse_list(config.output_formats())?;
    if !formats.is_empty() {
        let storage = LocalStorage::new(config.output_path().to_string());
        let writer = ReportWriter::new(storage, config.output_path());
        for path in writer.write(&report, &formats).await? {
            tracing::info!("📁 Report saved to: {}", path);
            println!("📁 Report saved to: {}", path);
        }
    }

    Ok(())
}

fn display_config_summary(config: &TomlConfig, args: &Args) -> anyhow::Result<()> {
    println!("📋 Configuration Summary:");
    println!("  Simulation: {}", config.simulation.name);
    if let Some(description) = &config.simulation.description {
        println!("  Description: {}", description);
    }
    let puzzles = config.puzzles()?;
    println!(
        "  Puzzles: {}",
        puzzles
            .iter()
            .map(|p| p.slug())
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!("  Trials: {}", config.trials());
    match config.seed() {
        Some(seed) => println!("  Seed: {} (all puzzles)", seed),
        None => println!("  Seed: per-puzzle defaults"),
    }
    println!("  Concurrency: {}", config.concurrency());
    if !config.output_formats().is_empty() {
        println!("  Output: {}", config.output_path());
        println!("  Formats: {}", config.output_formats().join(", "));
    }

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
    Ok(())
}

fn perform_dry_run(config: &TomlConfig) -> anyhow::Result<()> {
    println!("🔍 Dry Run Analysis:");

    let params = config.params();
    for kind in config.puzzles()? {
        let seed = config.seed().unwrap_or(kind.default_seed());
        println!();
        println!("🎲 {} [{}] seed {}", kind.title(), kind, seed);
        let detail = match kind {
            puzzle_sim::PuzzleKind::Dishwasher => serde_json::to_string(&params.dishwasher)?,
            puzzle_sim::PuzzleKind::MaltShop => serde_json::to_string(&params.malt_shop)?,
            puzzle_sim::PuzzleKind::ParallelParking => serde_json::to_string(&params.parking)?,
            puzzle_sim::PuzzleKind::CoinGame => serde_json::to_string(&params.coin_game)?,
            puzzle_sim::PuzzleKind::Elevator => serde_json::to_string(&params.elevator)?,
        };
        println!("  Parameters: {}", detail);
    }

    println!();
    println!("✅ Dry run analysis complete. Use --verbose for more details during actual run.");
    Ok(())
}
