//! Implementation of the wftools subcommands.

pub mod cromwell;
pub mod tes;
pub mod wes;

use std::path::PathBuf;

use anyhow::{bail, Context as _};
use serde::Serialize;
use wftools::cli_config::CliConfig;

/// Settings shared by every subcommand.
pub struct Context {
    pub config: CliConfig,
    pub api_version: String,
}

/// Pick the server: `--host` (or its environment variable, which clap folds
/// into the flag) wins over the config file.
pub fn resolve_host(
    flag: Option<String>,
    configured: Option<&str>,
    env_var: &str,
) -> anyhow::Result<String> {
    if let Some(host) = flag.or_else(|| configured.map(str::to_string)) {
        return Ok(host);
    }
    bail!(
        "no server given; pass --host, set {} or add {} to ~/.wftools",
        env_var,
        env_var
    )
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("Rendering response as JSON")?;
    println!("{}", rendered);
    Ok(())
}

/// Parse a `KEY=VALUE` argument.
pub fn parse_key_value(arg: &str) -> Result<(String, String), String> {
    match arg.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got `{}`", arg)),
    }
}

/// Parse a `NAME=PATH` argument.
pub fn parse_named_path(arg: &str) -> Result<(String, PathBuf), String> {
    parse_key_value(arg).map(|(name, path)| (name, PathBuf::from(path)))
}
