use clap::Parser;
use shipquote::utils::error::{ErrorSeverity, QuoteError};
use shipquote::utils::{logger, validation::Validate};
use shipquote::{CliConfig, ServiceConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.json_logs {
        logger::init_service_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting shipquote CLI");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    if let Err(e) = run(&cli).await {
        tracing::error!(
            "❌ shipquote failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

        let exit_code = match e.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }

    Ok(())
}

async fn run(cli: &CliConfig) -> Result<(), QuoteError> {
    cli.validate()?;

    tracing::info!("📁 Loading configuration from: {}", cli.config);
    let config = ServiceConfig::from_file(&cli.config)?;
    config.validate()?;

    let addresses = cli.addresses()?;
    let orchestrator = config.build_orchestrator()?;

    let results = orchestrator.resolve_all(&addresses).await;
    let published: Vec<_> = results.into_iter().flatten().collect();
    if published.len() < addresses.len() {
        tracing::warn!(
            "{} results superseded by a later entry with the same id",
            addresses.len() - published.len()
        );
    }

    let blocked = published.iter().filter(|r| r.blocks_checkout()).count();
    if blocked > 0 {
        tracing::warn!("⚠️ {} address(es) have no matching province and cannot be quoted", blocked);
    }

    println!("{}", serde_json::to_string_pretty(&published)?);
    Ok(())
}
