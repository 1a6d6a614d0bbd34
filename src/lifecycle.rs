//! Process setup shared by every subcommand.

use tracing_subscriber::EnvFilter;

/// Initialize logging with tracing_subscriber.
///
/// `RUST_LOG` wins when set; otherwise `info`, or crate-level `debug` with
/// `--verbose`. `log` records are bridged through `tracing-log`.
pub fn init_logging(verbose: bool) {
    let crate_level = if verbose { "member_atlas=debug" } else { "member_atlas=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("info")
            .add_directive("hyper=warn".parse().unwrap())
            .add_directive("reqwest=warn".parse().unwrap())
            .add_directive(crate_level.parse().unwrap())
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .compact()
        .with_target(false)
        .with_ansi(true)
        .init();
}
