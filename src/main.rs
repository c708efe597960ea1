use clap::Parser;
use puzzle_sim::core::report::render_text;
use puzzle_sim::core::ConfigProvider;
use puzzle_sim::utils::{logger, validation::Validate};
use puzzle_sim::{
    CliConfig, LocalStorage, OutputFormat, PuzzleParams, ReportWriter, SimError,
    SimulationEngine,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting puzzle-sim CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    if config.monitor {
        tracing::info!("🔍 System monitoring enabled");
    }

    if let Err(e) = run(&config).await {
        tracing::error!(
            "❌ Simulation failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

        let exit_code = e.severity().exit_code();
        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }

    Ok(())
}

async fn run(config: &CliConfig) -> Result<(), SimError> {
    let engine = SimulationEngine::from_config(config, &PuzzleParams::default(), config.monitor)?;
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
