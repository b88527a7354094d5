use clap::Parser;
use giftpay::utils::{logger, validation::Validate};
use giftpay::{
    resolve_cards_path, AppConfig, Cli, CsvCardSource, ErrorCategory, PaymentOrchestrator, Portal,
    PromptCardSource, RunReport, SandboxPortal,
};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logger::init_cli_logger(cli.verbose);

    tracing::info!("Starting giftpay");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let config = match AppConfig::from_env().and_then(|config| {
        config.validate()?;
        Ok(config)
    }) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            eprintln!("❌ {}", e);
            std::process::exit(2);
        }
    };

    match run(&cli, &config).await {
        Ok(report) => {
            tracing::info!("✅ Payment run finished: {:?}", report.stop);
            println!(
                "✅ {} payments made, {} paid, {} remaining on the account",
                report.payments_made, report.amount_paid, report.final_balance
            );
        }
        Err(e) => {
            tracing::error!("❌ Payment run failed: {} (Category: {:?})", e, e.category());
            eprintln!("❌ {}", e);

            let exit_code = match e.category() {
                ErrorCategory::Session => 1,
                ErrorCategory::Config | ErrorCategory::CardsLoad => 2,
                ErrorCategory::Io => 3,
            };
            std::process::exit(exit_code);
        }
    }
}

async fn run(cli: &Cli, config: &AppConfig) -> giftpay::Result<RunReport> {
    // Real automation against the portal plugs in behind the Portal trait;
    // the shipped binary rehearses the run against the in-process sandbox.
    let portal = SandboxPortal::new(cli.opening_balance, cli.fee_percent);
    tracing::info!("authenticating against {}", config.portal_url);
    let session = portal.authenticate(&config.credentials()).await?;
    let mut orchestrator = PaymentOrchestrator::new(session, config);

    let cards_path = resolve_cards_path(cli.cards_csv.as_deref(), config.cards_csv.as_deref());
    match CsvCardSource::load(&cards_path, &config.zip_code) {
        Ok(mut cards) if !cards.is_empty() => orchestrator.run(&mut cards).await,
        Ok(_) => {
            tracing::info!("card batch is empty; switching to manual entry");
            let mut cards = PromptCardSource::stdin(config.zip_code.clone());
            orchestrator.run(&mut cards).await
        }
        // The one recovered failure: an unusable batch means manual entry,
        // everything else keeps its fail-fast posture.
        Err(e) if e.is_recoverable_load() => {
            tracing::warn!("card batch unavailable ({}); switching to manual entry", e);
            let mut cards = PromptCardSource::stdin(config.zip_code.clone());
            orchestrator.run(&mut cards).await
        }
        Err(e) => Err(e),
    }
}
