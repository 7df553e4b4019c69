//! Shared test utilities for integration tests
//!
//! Environment isolation for configuration tests and small builders for
//! trees whose resolvers record what happened to them.

use prefetch::{Descriptor, Node, NodeRef};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

/// Global mutex to serialize environment variable access across all tests
static ENV_MUTEX: Mutex<()> = Mutex::new(());

const ISOLATED_VARS: &[&str] = &[
    "HOME",
    "XDG_CONFIG_HOME",
    "PREFETCH_ENV",
    "PREFETCH__RESOLVER__MAX_DEPTH",
    "PREFETCH__RESOLVER__MAX_NESTING",
];

/// Environment variable state to restore after test
struct EnvState(Vec<(&'static str, Option<String>)>);

impl EnvState {
    fn capture() -> Self {
        Self(
            ISOLATED_VARS
                .iter()
                .map(|key| (*key, std::env::var(key).ok()))
                .collect(),
        )
    }

    fn restore(self) {
        for (key, value) in self.0 {
            match value {
                Some(orig) => std::env::set_var(key, orig),
                None => std::env::remove_var(key),
            }
        }
    }
}

/// Run `f` with HOME and XDG_CONFIG_HOME pointing into `test_dir` and every
/// PREFETCH_* override cleared. The original environment is restored after.
pub fn with_isolated_env<F, R>(test_dir: &TempDir, f: F) -> R
where
    F: FnOnce() -> R,
{
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let env_state = EnvState::capture();

    let test_home = test_dir.path().join("home");
    let test_config_home = test_dir.path().join("xdg");
    std::fs::create_dir_all(&test_home).unwrap();
    std::fs::create_dir_all(&test_config_home).unwrap();

    for key in ISOLATED_VARS {
        std::env::remove_var(key);
    }
    std::env::set_var("HOME", &test_home);
    std::env::set_var("XDG_CONFIG_HOME", &test_config_home);

    let result = f();

    env_state.restore();

    result
}

/// Ordered record of resolver events shared across a tree.
#[derive(Clone, Default)]
pub struct EventLog(Arc<Mutex<Vec<String>>>);

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, event: impl Into<String>) {
        self.0.lock().unwrap().push(event.into());
    }

    pub fn events(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self, event: &str) -> usize {
        self.events().iter().filter(|e| *e == event).count()
    }

    pub fn position(&self, event: &str) -> Option<usize> {
        self.events().iter().position(|e| e == event)
    }
}

/// Descriptor whose resolver logs `<id>:start` and `<id>:done` around an
/// optional delay and yields `value:<id>`.
pub fn recorded(id: &str, defer: bool, delay_ms: u64, log: &EventLog) -> Descriptor<String> {
    let id_owned = id.to_string();
    let log = log.clone();
    Descriptor::new(id, defer, move || {
        let id = id_owned.clone();
        let log = log.clone();
        async move {
            log.push(format!("{}:start", id));
            if delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
            log.push(format!("{}:done", id));
            Ok(format!("value:{}", id))
        }
    })
}

/// Descriptor whose resolver fails after `delay_ms`.
pub fn failing(id: &str, delay_ms: u64, log: &EventLog) -> Descriptor<String> {
    let id_owned = id.to_string();
    let log = log.clone();
    Descriptor::new(id, false, move || {
        let id = id_owned.clone();
        let log = log.clone();
        async move {
            log.push(format!("{}:start", id));
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            log.push(format!("{}:failed", id));
            Err(anyhow::anyhow!("{} is unavailable", id))
        }
    })
}

/// Dependency node rendering nothing once resolved.
pub fn leaf_dep(descriptor: Descriptor<String>) -> NodeRef<String> {
    Node::async_node(descriptor, |_| Vec::new())
}
