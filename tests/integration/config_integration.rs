//! Integration tests for the configuration system

use prefetch::config::{ConfigLoader, PrefetchConfig};
use prefetch::resolver::PruneLimit;
use prefetch::{Node, NodeRef, Resolver};
use tempfile::TempDir;

use crate::integration::test_utils::{leaf_dep, recorded, with_isolated_env, EventLog};

fn deep_tree(levels: usize, log: &EventLog) -> NodeRef<String> {
    let mut node = leaf_dep(recorded("deep", false, 0, log));
    for i in 0..levels {
        node = Node::element(format!("level{}", i), vec![node]);
    }
    node
}

#[test]
fn test_layered_sources_feed_the_resolver() {
    let temp_dir = TempDir::new().unwrap();
    with_isolated_env(&temp_dir, || {
        let global_dir = temp_dir.path().join("xdg").join("prefetch");
        std::fs::create_dir_all(&global_dir).unwrap();
        std::fs::write(
            global_dir.join("config.toml"),
            "[resolver]\nmax_depth = 1000\nmax_nesting = 5\n\n[logging]\nlevel = \"warn\"\n",
        )
        .unwrap();

        let workspace = temp_dir.path().join("ws");
        std::fs::create_dir_all(workspace.join("config")).unwrap();
        std::fs::write(workspace.join("prefetch.toml"), "[resolver]\nmax_depth = 8\n").unwrap();
        std::env::set_var("PREFETCH_ENV", "ci");
        std::fs::write(
            workspace.join("config").join("ci.toml"),
            "[logging]\nformat = \"json\"\n",
        )
        .unwrap();

        let config = ConfigLoader::load(&workspace).unwrap();
        assert_eq!(config.resolver.max_depth, Some(8));
        assert_eq!(config.resolver.max_nesting, Some(5));
        assert_eq!(config.logging.level, "warn");
        assert_eq!(config.logging.format, "json");
        assert!(config.validate().is_ok());

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .unwrap();
        let log = EventLog::new();
        let resolver = Resolver::new(config.resolver.clone());
        let resolution = runtime.block_on(resolver.resolve(deep_tree(12, &log), None));
        assert!(resolution.is_complete());
        assert!(!resolution.state.is_resolved("deep"));
        assert_eq!(resolution.report.pruned[0].limit, PruneLimit::Depth);

        let shallow = runtime.block_on(resolver.resolve(deep_tree(3, &log), None));
        assert!(shallow.state.is_resolved("deep"));
    });
}

#[test]
fn test_environment_override_wins() {
    let temp_dir = TempDir::new().unwrap();
    with_isolated_env(&temp_dir, || {
        std::fs::write(
            temp_dir.path().join("prefetch.toml"),
            "[resolver]\nmax_nesting = 9\n",
        )
        .unwrap();
        std::env::set_var("PREFETCH__RESOLVER__MAX_NESTING", "2");

        let config = ConfigLoader::load(temp_dir.path()).unwrap();
        assert_eq!(config.resolver.max_nesting, Some(2));
        assert_eq!(config.resolver.max_depth, None);
    });
}

#[test]
fn test_invalid_values_fail_validation() {
    let temp_dir = TempDir::new().unwrap();
    let config_file = temp_dir.path().join("bad.toml");
    std::fs::write(
        &config_file,
        "[resolver]\nmax_depth = 0\n\n[logging]\noutput = \"syslog\"\n",
    )
    .unwrap();

    let config: PrefetchConfig = ConfigLoader::load_from_file(&config_file).unwrap();
    let errors = config.validate().unwrap_err();
    assert_eq!(errors.len(), 2);
    let rendered: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
    assert!(rendered.iter().any(|e| e.starts_with("Resolver:")));
    assert!(rendered.iter().any(|e| e.contains("syslog")));
}

#[test]
fn test_missing_config_file_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    assert!(ConfigLoader::load_from_file(&temp_dir.path().join("absent.toml")).is_err());
}
