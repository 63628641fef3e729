//! Tracing subscriber bootstrap.
//!
//! The subscriber is only installed when `LYRA_LOG` (or `RUST_LOG`) is set,
//! so there is zero overhead in normal builds.
//!
//! ```bash
//! LYRA_LOG=debug lyra file.lyra
//!
//! # Fine-grained filtering
//! LYRA_LOG="lyra_ast=trace" lyra file.lyra
//! ```

use tracing_subscriber::EnvFilter;

/// Build an `EnvFilter` from `LYRA_LOG`, falling back to `RUST_LOG`.
///
/// `LYRA_LOG` takes precedence when both are set.
fn env_filter() -> Option<EnvFilter> {
    let directives = std::env::var("LYRA_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .ok()?;
    Some(EnvFilter::new(directives))
}

/// Install the global tracing subscriber from the environment.
///
/// Does nothing when neither `LYRA_LOG` nor `RUST_LOG` is set, and is safe
/// to call more than once (later calls are ignored by the global registry).
pub fn init_from_env() {
    let Some(filter) = env_filter() else {
        return;
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}
