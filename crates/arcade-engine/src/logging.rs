//! Tracing subscriber bootstrap for hosts embedding the engine.

use tracing_subscriber::EnvFilter;

/// Installs a formatting subscriber.
///
/// Filter priority: `RUST_LOG` > `verbose` (`debug`) > `info`. Returns
/// `false` if a global subscriber was already installed.
pub fn init(verbose: bool) -> bool {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_is_tolerated() {
        let _first = init(true);
        assert!(!init(false));
    }
}
