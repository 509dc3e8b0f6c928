//! Logging setup for the command-line tool. Diagnostics go to stderr via
//! `tracing`; the level comes from the `-v` count unless `SCROLLMARK_LOG` is
//! set, in which case that filter wins.

use tracing_subscriber::EnvFilter;

/// Environment variable that overrides the verbosity flags.
pub const LOG_ENV: &str = "SCROLLMARK_LOG";

/// Maps a `-v` count to a filter directive: 0 → `warn`, 1 → `info`,
/// 2 → `debug`, 3 or more → `trace`.
pub fn verbosity_to_directive(verbosity: u64) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Installs the global subscriber. Safe to call more than once; later calls
/// are ignored.
pub fn init_logging(verbosity: u64) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(verbosity_to_directive(verbosity)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbosity >= 2)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_verbosity_to_directive() {
        assert_eq!("warn", verbosity_to_directive(0));
        assert_eq!("info", verbosity_to_directive(1));
        assert_eq!("debug", verbosity_to_directive(2));
        assert_eq!("trace", verbosity_to_directive(3));
        assert_eq!("trace", verbosity_to_directive(u64::MAX));
    }

    #[test]
    fn test_init_logging_twice() {
        init_logging(0);
        init_logging(3);
    }
}
