//! `guia build` and `guia dev` command implementation.
//!
//! Both commands validate the configuration, write the serialized model to
//! `.guia/config.json` and hand over to the external renderer. They differ
//! only in the mode passed to the renderer.

use std::path::{Path, PathBuf};
use std::process::Command;

use clap::Args;
use guia_config::{CliSettings, Config};

use crate::error::CliError;
use crate::output::Output;

/// Environment variable pointing the renderer at the serialized model.
const MODEL_ENV: &str = "GUIA_CONFIG";

/// Renderer mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum RenderMode {
    /// Produce the static site.
    Build,
    /// Run the development server.
    Dev,
}

impl RenderMode {
    fn as_str(self) -> &'static str {
        match self {
            Self::Build => "build",
            Self::Dev => "dev",
        }
    }
}

/// Arguments shared by `build` and `dev`.
#[derive(Args)]
pub(crate) struct RenderArgs {
    /// Path to configuration file (default: auto-discover guia.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Content source directory (overrides config).
    #[arg(short, long)]
    source_dir: Option<PathBuf>,

    /// Renderer program (overrides config).
    #[arg(long, env = "GUIA_RENDERER")]
    program: Option<String>,

    /// Validate and write the serialized model without starting the renderer.
    #[arg(long)]
    emit_only: bool,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Extra arguments passed through to the renderer.
    #[arg(last = true)]
    renderer_args: Vec<String>,
}

impl RenderArgs {
    /// Execute the command.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, a template is
    /// missing or the renderer fails.
    pub(crate) fn execute(self, mode: RenderMode) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            source_dir: self.source_dir,
            program: self.program,
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        if let Some(path) = &config.config_path {
            output.field("Config", &path.display());
        }
        output.field("Source directory", &config.docs.source_dir.display());

        for missing in config.missing_pages() {
            tracing::warn!(field = %missing.field, path = %missing.path, "No content file");
            output.missing_page(&missing);
        }

        check_required_files(&config)?;
        let model_path = write_model(&config)?;
        output.field("Model", &model_path.display());
        output.field("Renderer config", &config.command.entry.display());

        if self.emit_only {
            output.success("Configuration is valid");
            return Ok(());
        }

        let mut command = renderer_command(&config, mode, &model_path, &self.renderer_args);
        tracing::info!(program = %config.command.program, mode = mode.as_str(), "Starting renderer");

        let status = command.status().map_err(|e| {
            CliError::Render(format!(
                "Failed to start renderer '{}': {e}",
                config.command.program
            ))
        })?;
        if !status.success() {
            return Err(CliError::Render(format!(
                "Renderer '{}' failed ({status})",
                config.command.program
            )));
        }

        output.success(&format!("Renderer {} finished", mode.as_str()));
        Ok(())
    }
}

/// Fail if the renderer entry, a template or the theme file does not exist.
fn check_required_files(config: &Config) -> Result<(), CliError> {
    let entry = ("renderer.entry", config.command.entry.as_path());
    for (field, path) in std::iter::once(entry).chain(config.model.build.required_files()) {
        if !path.is_file() {
            return Err(CliError::Validation(format!(
                "{field} not found: {}",
                path.display()
            )));
        }
    }
    Ok(())
}

/// Write the serialized model into the project directory.
fn write_model(config: &Config) -> Result<PathBuf, CliError> {
    ensure_project_dir(&config.docs.project_dir)?;
    let path = config.docs.model_path();
    let json = config.to_renderer().to_json()?;
    std::fs::write(&path, json)?;
    tracing::debug!(path = %path.display(), "Wrote serialized model");
    Ok(path)
}

/// Ensure the `.guia/` project directory exists with a `.gitignore`.
fn ensure_project_dir(project_dir: &Path) -> Result<(), CliError> {
    std::fs::create_dir_all(project_dir)?;

    let gitignore_path = project_dir.join(".gitignore");
    if !gitignore_path.exists() {
        std::fs::write(&gitignore_path, "# Automatically created by guia\n*\n")?;
    }

    Ok(())
}

/// Renderer invocation: `program args... <mode> <source_dir> --config <entry> extra...`.
///
/// The entry file reads the serialized model from `GUIA_CONFIG`.
fn renderer_command(
    config: &Config,
    mode: RenderMode,
    model_path: &Path,
    extra: &[String],
) -> Command {
    let mut command = Command::new(&config.command.program);
    command
        .args(&config.command.args)
        .arg(mode.as_str())
        .arg(&config.docs.source_dir)
        .arg("--config")
        .arg(&config.command.entry)
        .args(extra)
        .env(MODEL_ENV, model_path);
    command
}
