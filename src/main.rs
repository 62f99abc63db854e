// Entry point: parse arguments, set up logging, hand off to `app::run`.
use clap::Parser;
use palika_profile::{app, Args};
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

/// Initialize logging based on verbosity flags. `RUST_LOG` wins when set.
fn init_logging(args: &Args) {
    let level = args.log_level();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_lowercase()));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .try_init();
}

fn main() {
    let args = Args::parse();
    init_logging(&args);
    debug!("Arguments: {:?}", args);

    if let Err(e) = app::run(args) {
        error!("{:#}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
