//! Resolution run configuration and cooperative cancellation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Tuning knobs for a single resolution run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Safety fuse: abort after this many expansion steps. Backtracking
    /// replays count against it, so pathological inputs terminate with a
    /// diagnosable error instead of looping.
    #[serde(default = "default_max_steps")]
    pub max_steps: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_steps: default_max_steps(),
        }
    }
}

fn default_max_steps() -> usize {
    10_000
}

/// Shared flag for cancelling a resolution run from outside.
///
/// The resolver checks it between queue iterations; a cancelled run discards
/// its partial graph and never produces a lock document.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_max_steps_is_fuse_sized() {
        assert_eq!(ResolverConfig::default().max_steps, 10_000);
    }

    #[test]
    fn config_deserializes_with_defaults() {
        let config: ResolverConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.max_steps, 10_000);
        let config: ResolverConfig = serde_json::from_str(r#"{"max_steps": 50}"#).unwrap();
        assert_eq!(config.max_steps, 50);
    }

    #[test]
    fn cancel_token_propagates_to_clones() {
        let token = CancelToken::new();
        let observer = token.clone();
        assert!(!observer.is_cancelled());
        token.cancel();
        assert!(observer.is_cancelled());
    }
}
