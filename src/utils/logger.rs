use tracing_subscriber::EnvFilter;

/// Log filter for a payment run. The orchestrator narrates the run at info;
/// `--verbose` adds the per-submission detail from the card sources and the
/// portal adapter at debug. An explicit `RUST_LOG` always wins.
pub fn init_cli_logger(verbose: bool) {
    let mut directives = vec!["giftpay=info"];
    if verbose {
        directives.extend(["giftpay::core=debug", "giftpay::adapters=debug"]);
    }
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(directives.join(",")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbose)
        .compact()
        .init();
}
