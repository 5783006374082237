use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Filter directive used when no environment override is present.
fn default_directive(verbose: bool, full_screen: bool) -> &'static str {
    if verbose {
        "debug"
    } else if full_screen {
        // Anything below error would draw over the alternate screen.
        "error"
    } else {
        "info"
    }
}

/// Installs the global subscriber. Logs go to stderr so reports stay on stdout.
///
/// `STREAMPROBE_LOG` takes precedence over `RUST_LOG`.
pub fn init_logging(verbose: bool, no_color: bool, full_screen: bool) {
    let fallback = default_directive(verbose, full_screen);
    let filter = std::env::var("STREAMPROBE_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .map_or_else(
            |_| EnvFilter::new(fallback),
            |value| EnvFilter::try_new(value).unwrap_or_else(|_| EnvFilter::new(fallback)),
        );

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_ansi(!no_color)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set global default subscriber: {}", err);
    }
}
