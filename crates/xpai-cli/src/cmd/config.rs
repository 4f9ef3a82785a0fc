use crate::output::{print_json, print_structured, print_yaml};
use anyhow::Context;
use clap::Subcommand;
use std::path::Path;
use xpai_core::config::{Config, WarnLevel};
use xpai_core::types::OutputFormat;

// ---------------------------------------------------------------------------
// Subcommand types
// ---------------------------------------------------------------------------

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Show the effective configuration (API keys masked)
    Show,

    /// Validate the config for common mistakes
    Validate,

    /// Write a default config to ~/.crossplane-ai.yaml (or --config)
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run(
    subcmd: ConfigSubcommand,
    config: &Config,
    explicit: Option<&Path>,
    output: OutputFormat,
) -> anyhow::Result<()> {
    match subcmd {
        ConfigSubcommand::Show => show(config, explicit, output),
        ConfigSubcommand::Validate => validate(config, output),
        ConfigSubcommand::Init { force } => init(explicit, force),
    }
}

// ---------------------------------------------------------------------------
// show
// ---------------------------------------------------------------------------

fn show(config: &Config, explicit: Option<&Path>, output: OutputFormat) -> anyhow::Result<()> {
    let redacted = config.redacted();
    match output {
        OutputFormat::Json => print_json(&redacted),
        OutputFormat::Yaml | OutputFormat::Table => {
            match explicit.map(Path::to_path_buf).or_else(Config::discover) {
                Some(path) => println!("# {}", path.display()),
                None => println!("# built-in defaults"),
            }
            print_yaml(&redacted)
        }
    }
}

// ---------------------------------------------------------------------------
// validate
// ---------------------------------------------------------------------------

fn validate(config: &Config, output: OutputFormat) -> anyhow::Result<()> {
    let warnings = config.validate();

    if output != OutputFormat::Table {
        print_structured(output, &serde_json::json!({ "warnings": warnings }))?;
    } else if warnings.is_empty() {
        println!("Config is valid. No warnings.");
    } else {
        for w in &warnings {
            let prefix = match w.level {
                WarnLevel::Warning => "warning",
                WarnLevel::Error => "error",
            };
            println!("[{prefix}] {}", w.message);
        }
    }

    if warnings.iter().any(|w| w.level == WarnLevel::Error) {
        anyhow::bail!("config validation found errors");
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// init
// ---------------------------------------------------------------------------

fn init(explicit: Option<&Path>, force: bool) -> anyhow::Result<()> {
    let path = match explicit {
        Some(p) => p.to_path_buf(),
        None => Config::default_path().context("cannot determine home directory")?,
    };
    if path.exists() && !force {
        anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
    }
    Config::default()
        .save(&path)
        .with_context(|| format!("failed to write {}", path.display()))?;
    println!("Wrote default config to {}", path.display());
    Ok(())
}
