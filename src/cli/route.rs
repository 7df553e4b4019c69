//! CLI route: single route table and run context. Dispatches to the resolver and presentation.

use crate::cli::help::command_name;
use crate::cli::parse::{Commands, OutputFormat};
use crate::cli::presentation::{format_check_text, format_resolve_json, format_resolve_text};
use crate::config::{ConfigLoader, PrefetchConfig};
use crate::error::PrefetchError;
use crate::manifest::Manifest;
use crate::resolver::Resolver;
use crate::state::RehydrationState;
use crate::tree::render::render_outline;
use crate::tree::walker::{Walker, WalkerConfig};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

/// Runtime context for CLI execution: workspace, loaded configuration and resolver.
/// Built from workspace path and optional config path using ConfigLoader only.
pub struct RunContext {
    workspace_root: PathBuf,
    config: PrefetchConfig,
    resolver: Resolver,
}

impl RunContext {
    /// Create run context from workspace root and optional config path. Uses ConfigLoader only.
    pub fn new(workspace_root: PathBuf, config_path: Option<PathBuf>) -> Result<Self, PrefetchError> {
        let config = if let Some(ref cfg_path) = config_path {
            ConfigLoader::load_from_file(cfg_path)?
        } else {
            ConfigLoader::load(&workspace_root)?
        };
        config.ensure_valid()?;

        let resolver = Resolver::new(config.resolver.clone());
        Ok(Self {
            workspace_root,
            config,
            resolver,
        })
    }

    pub fn config(&self) -> &PrefetchConfig {
        &self.config
    }

    /// Execute a CLI command via the single route table.
    pub fn execute(&self, command: &Commands) -> Result<String, PrefetchError> {
        let started = Instant::now();
        let name = command_name(command);
        info!(command = name, "Executing command");

        let result = match command {
            Commands::Resolve {
                manifest,
                state,
                format,
                outline,
                save,
            } => self.handle_resolve(
                manifest,
                state.as_deref(),
                *format,
                *outline,
                save.as_deref(),
            ),
            Commands::Check { manifest } => self.handle_check(manifest),
        };

        debug!(
            command = name,
            ok = result.is_ok(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Command finished"
        );
        result
    }

    fn handle_resolve(
        &self,
        manifest_path: &Path,
        state_path: Option<&Path>,
        format: OutputFormat,
        outline: bool,
        save: Option<&Path>,
    ) -> Result<String, PrefetchError> {
        let manifest = Manifest::load(&self.workspace_path(manifest_path))?;
        let rehydrate = match state_path {
            Some(path) => Some(load_rehydration(&self.workspace_path(path))?),
            None => None,
        };

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()?;
        let resolution = runtime.block_on(self.resolver.resolve(manifest.build(), rehydrate.clone()));

        if let Some(path) = save {
            let path = self.workspace_path(path);
            std::fs::write(&path, resolution.state.to_json()?)?;
            info!(path = %path.display(), "Snapshot saved");
        }

        let outline = if outline {
            let walker = Walker::with_config(WalkerConfig {
                max_depth: self.config.resolver.max_depth,
            });
            Some(render_outline(&walker, &resolution.tree))
        } else {
            None
        };

        match format {
            OutputFormat::Json => {
                format_resolve_json(&resolution, rehydrate.as_ref(), outline.as_deref())
            }
            OutputFormat::Text => Ok(format_resolve_text(&resolution, outline.as_deref())),
        }
    }

    fn handle_check(&self, manifest_path: &Path) -> Result<String, PrefetchError> {
        let manifest = Manifest::load(&self.workspace_path(manifest_path))?;
        let duplicates = manifest.duplicate_ids();
        if !duplicates.is_empty() {
            return Err(PrefetchError::Manifest(format!(
                "Duplicate dependency ids: {}",
                duplicates.join(", ")
            )));
        }
        Ok(format_check_text(&manifest))
    }

    /// Relative paths are taken from the workspace root.
    fn workspace_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.workspace_root.join(path)
        }
    }
}

/// Read rehydration input. A plain snapshot (`{"resolved": {...}}`) is
/// accepted as well as the full rehydration shape.
fn load_rehydration(path: &Path) -> Result<RehydrationState, PrefetchError> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        PrefetchError::Config(format!("Failed to read state {}: {}", path.display(), e))
    })?;
    Ok(RehydrationState::from_json(&text)?)
}
