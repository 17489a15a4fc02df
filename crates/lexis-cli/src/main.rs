// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod logging;
mod runtime;

use anyhow::{Context, Result, anyhow, bail};
use config::Config;
use lexis_api::Client;
use lexis_app::LookupState;
use runtime::ApiRuntime;
use std::env;
use std::path::PathBuf;
use tracing::info;

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    match options.action {
        Action::Help => {
            print_help();
            return Ok(());
        }
        Action::PrintConfigPath => {
            println!("{}", options.config_path.display());
            return Ok(());
        }
        Action::PrintExampleConfig => {
            print!("{}", Config::example_config(&options.config_path));
            return Ok(());
        }
        Action::Check | Action::Run => {}
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `lexis --print-example-config` to generate a template",
            options.config_path.display()
        )
    })?;

    let client = Client::new(
        config.corpus_url(),
        config.definitions_url(),
        config.timeout()?,
    )
    .with_context(|| {
        format!(
            "invalid [sources] or [network] config in {}",
            options.config_path.display()
        )
    })?;

    if options.action == Action::Check {
        println!("{}", check_sources(&client)?);
        return Ok(());
    }

    let log_path = config.log_path()?;
    logging::init(&log_path, config.log_level())?;
    info!(
        corpus_url = client.corpus_url(),
        definitions_url = client.definitions_url(),
        timeout = ?client.timeout(),
        "lexis starting"
    );

    let mut state = LookupState::default();
    let mut runtime = ApiRuntime::new(client, config.throttle()?);
    lexis_tui::run_app(&mut state, &mut runtime)
}

/// Fetches the word list once and summarizes where lookups will go.
fn check_sources(client: &Client) -> Result<String> {
    let corpus = client
        .fetch_corpus()
        .context("check word list source; fix [sources].corpus_url or network access")?;
    Ok(format!(
        "ok: {} words from {}; definitions from {} (timeout {:?})",
        corpus.len(),
        client.corpus_url(),
        client.definitions_url(),
        client.timeout()
    ))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Run,
    Check,
    PrintConfigPath,
    PrintExampleConfig,
    Help,
}

impl Action {
    const fn flag(self) -> &'static str {
        match self {
            Self::Run => "",
            Self::Check => "--check",
            Self::PrintConfigPath => "--print-config-path",
            Self::PrintExampleConfig => "--print-example-config",
            Self::Help => "--help",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    action: Action,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut config_path = default_config_path;
    let mut action = Action::Run;
    let mut help = false;

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        let arg = arg.as_ref();
        let requested = match arg {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--config requires a file path"))?;
                config_path = config_value(value.as_ref())?;
                continue;
            }
            "--check" => Action::Check,
            "--print-config-path" => Action::PrintConfigPath,
            "--print-example-config" => Action::PrintExampleConfig,
            "--help" | "-h" => {
                help = true;
                continue;
            }
            other => {
                if let Some(value) = other.strip_prefix("--config=") {
                    config_path = config_value(value)?;
                    continue;
                }
                bail!("unknown argument {other:?}; run with --help to see supported options");
            }
        };

        if action != Action::Run && action != requested {
            bail!(
                "{} and {} cannot be combined; pick one",
                action.flag(),
                requested.flag()
            );
        }
        action = requested;
    }

    Ok(CliOptions {
        config_path,
        action: if help { Action::Help } else { action },
    })
}

fn config_value(raw: &str) -> Result<PathBuf> {
    if raw.is_empty() || raw.starts_with("--") {
        bail!("--config requires a file path, got {raw:?}");
    }
    Ok(PathBuf::from(raw))
}

fn print_help() {
    println!("lexis: look up English words as you type");
    println!("  --config <path>          Use a specific config path (also --config=<path>)");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-example-config   Print a config template");
    println!("  --check                  Validate config and fetch the word list once");
    println!("  --help                   Show this help");
    println!();
    println!("Logs go to the file set by [log].path; LEXIS_LOG overrides [log].level.");
}
