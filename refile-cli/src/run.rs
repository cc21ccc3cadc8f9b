use anyhow::{bail, Context, Result};
use refile_core::{
    batch_operation, replace_operation, Config, ConsoleSink, OutputFormatter, RunOptions,
};
use std::io::{self, IsTerminal};
use std::path::Path;

use crate::cli::{Cli, OutputFormat};

/// Exit status when `--strict` is set and some files failed.
pub const STRICT_FAILURE_CODE: i32 = 3;

/// Run one invocation and return the process exit status.
pub fn handle_run(cli: Cli) -> Result<i32> {
    let config = match cli.config {
        Some(ref path) => Config::load_from_path(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => Config::load().context("Failed to load .refile/config.toml")?,
    };
    let defaults = &config.defaults;

    let options = RunOptions {
        text_extensions: if cli.extensions.is_empty() {
            defaults.text_extensions.clone()
        } else {
            cli.extensions.clone()
        },
        excludes: defaults
            .exclude
            .iter()
            .chain(&cli.exclude)
            .cloned()
            .collect(),
        delimiter: delimiter_byte(cli.delimiter.unwrap_or(defaults.delimiter))?,
        threads: cli.threads.unwrap_or(defaults.threads),
        keep_root: cli.keep_root || defaults.keep_root,
    };

    let use_color = !cli.no_color
        && defaults
            .use_color
            .unwrap_or_else(|| io::stdout().is_terminal());
    let quiet = cli.quiet || cli.output == OutputFormat::Json;

    let mut sink = ConsoleSink::new(use_color, quiet);
    if let Some(log_file) = cli.log_file.as_ref().or(defaults.log_file.as_ref()) {
        sink = sink.with_log_file(log_file)?;
    }

    let result = match cli.replacement {
        Some(ref replacement) => replace_operation(
            &cli.root,
            &cli.pattern_or_table,
            replacement,
            &options,
            &sink,
        )?,
        None => batch_operation(
            &cli.root,
            Path::new(&cli.pattern_or_table),
            &options,
            &sink,
        )?,
    };

    match cli.output {
        OutputFormat::Json => println!("{}", result.format(cli.output.into())),
        OutputFormat::Summary if !cli.quiet => print!("{}", result.format(cli.output.into())),
        OutputFormat::Summary => {},
    }

    if (cli.strict || defaults.strict) && result.has_errors() {
        return Ok(STRICT_FAILURE_CODE);
    }
    Ok(0)
}

fn delimiter_byte(delimiter: char) -> Result<u8> {
    if !delimiter.is_ascii() {
        bail!("Delimiter must be a single ASCII character, got '{}'", delimiter);
    }
    Ok(delimiter as u8)
}
