use std::io::{BufRead, Write};
use std::path::PathBuf;

use crate::config::{self, ConfigError};
use crate::contract::{CoreRequest, SearchRequest};
use crate::core_service::{CoreService, ServiceError};
use crate::preferences::PreferenceChange;
use crate::transport::{encode, handle_json, handle_request};

#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("service error: {0}")]
    Service(#[from] ServiceError),
    #[error("logging error: {0}")]
    Logging(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Search(String),
    ShowPreferences,
    Change(PreferenceChange),
    ResetPreferences,
    Stdio,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliOptions {
    pub config_path: Option<PathBuf>,
    pub command: Command,
}

pub const USAGE: &str = "usage: learnhub-core [--config <path>] \
(--search <query> | --prefs | --set-font-scale <percent> | \
--toggle <high-contrast|reduced-motion|dyslexic-font> | --reset-prefs | --stdio)";

pub fn parse_cli_args(args: &[String]) -> Result<CliOptions, String> {
    let mut config_path = None;
    let mut command = None;
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        let next = match arg.as_str() {
            "--config" => {
                let value = iter.next().ok_or("--config requires a path")?;
                config_path = Some(PathBuf::from(value));
                continue;
            }
            "--search" => {
                let value = iter.next().ok_or("--search requires a query")?;
                Command::Search(value.clone())
            }
            "--prefs" => Command::ShowPreferences,
            "--set-font-scale" => {
                let value = iter.next().ok_or("--set-font-scale requires a percent")?;
                let percent = value
                    .parse::<i32>()
                    .map_err(|_| format!("invalid font scale '{value}'"))?;
                Command::Change(PreferenceChange::FontScale(percent))
            }
            "--toggle" => {
                let value = iter.next().ok_or("--toggle requires a preference name")?;
                Command::Change(parse_toggle(value)?)
            }
            "--reset-prefs" => Command::ResetPreferences,
            "--stdio" => Command::Stdio,
            "-h" | "--help" => return Err(USAGE.to_string()),
            other => return Err(format!("unknown argument '{other}'\n{USAGE}")),
        };

        if command.replace(next).is_some() {
            return Err(format!("only one command may be given\n{USAGE}"));
        }
    }

    Ok(CliOptions {
        config_path,
        command: command.unwrap_or(Command::Stdio),
    })
}

fn parse_toggle(name: &str) -> Result<PreferenceChange, String> {
    match name.to_ascii_lowercase().as_str() {
        "high-contrast" => Ok(PreferenceChange::ToggleHighContrast),
        "reduced-motion" => Ok(PreferenceChange::ToggleReducedMotion),
        "dyslexic-font" => Ok(PreferenceChange::ToggleDyslexicFont),
        other => Err(format!("unknown preference '{other}'")),
    }
}

pub fn run_with_options(options: CliOptions) -> Result<(), RuntimeError> {
    let config = config::load(options.config_path.as_deref())?;
    if !config.config_path.exists() {
        config::save(&config)?;
    }
    crate::logging::init(&config.log_level, &crate::logging::logs_dir())
        .map_err(RuntimeError::Logging)?;
    log::info!(
        "event=startup config_path={} storage_dir={} shortcut={}",
        config.config_path.display(),
        config.storage_dir.display(),
        config.shortcut
    );

    let mut service = CoreService::new(config)?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    let requests = match options.command {
        Command::Stdio => return run_stdio(&mut service, std::io::stdin().lock(), &mut out),
        Command::Search(query) => vec![
            CoreRequest::OpenSearch,
            CoreRequest::Search(SearchRequest { query }),
        ],
        Command::ShowPreferences => vec![CoreRequest::GetPreferences],
        Command::Change(change) => vec![CoreRequest::UpdatePreference(change)],
        Command::ResetPreferences => vec![CoreRequest::ResetPreferences],
    };

    let mut last = None;
    for request in requests {
        last = Some(handle_request(&mut service, request));
    }
    if let Some(response) = last {
        writeln!(out, "{}", encode(&response))?;
    }
    Ok(())
}

/// One JSON request per input line, one JSON response per output line.
pub fn run_stdio<R, W>(service: &mut CoreService, input: R, out: &mut W) -> Result<(), RuntimeError>
where
    R: BufRead,
    W: Write,
{
    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        writeln!(out, "{}", handle_json(service, &line))?;
        out.flush()?;
    }
    log::info!("event=stdio_bridge status=closed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{parse_cli_args, CliOptions, Command};
    use crate::preferences::PreferenceChange;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn defaults_to_stdio_bridge() {
        let options = parse_cli_args(&[]).unwrap();
        assert_eq!(
            options,
            CliOptions {
                config_path: None,
                command: Command::Stdio
            }
        );
    }

    #[test]
    fn parses_toggle_with_config_path() {
        let options =
            parse_cli_args(&args(&["--config", "/tmp/lh.toml", "--toggle", "high-contrast"]))
                .unwrap();
        assert_eq!(options.config_path.unwrap().to_string_lossy(), "/tmp/lh.toml");
        assert_eq!(
            options.command,
            Command::Change(PreferenceChange::ToggleHighContrast)
        );
    }

    #[test]
    fn rejects_two_commands() {
        let result = parse_cli_args(&args(&["--prefs", "--reset-prefs"]));
        assert!(result.is_err());
    }

    #[test]
    fn rejects_non_numeric_font_scale() {
        let result = parse_cli_args(&args(&["--set-font-scale", "big"]));
        assert!(result.unwrap_err().contains("invalid font scale"));
    }
}
