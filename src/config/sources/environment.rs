//! Environment source: PREFETCH__SECTION__KEY overrides, e.g. PREFETCH__RESOLVER__MAX_DEPTH=64

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::Environment;

pub fn add_to_builder(builder: ConfigBuilder<DefaultState>) -> ConfigBuilder<DefaultState> {
    builder.add_source(
        Environment::with_prefix("PREFETCH")
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true),
    )
}
