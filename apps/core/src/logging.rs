use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};

const LOG_FILE_BASENAME: &str = "learnhub";
const MAX_LOG_BYTES: u64 = 1_000_000;
const MAX_ARCHIVES: usize = 5;

static LOGGER: OnceLock<LoggerState> = OnceLock::new();
static PANIC_HOOK_INSTALLED: OnceLock<()> = OnceLock::new();

struct LoggerState {
    log_dir: PathBuf,
    _handle: LoggerHandle,
}

pub fn logs_dir() -> PathBuf {
    crate::config::stable_app_data_dir().join("logs")
}

/// Starts the rolling file logger. Later calls are no-ops once a logger runs.
pub fn init(level: &str, log_dir: &Path) -> Result<(), String> {
    if let Some(state) = LOGGER.get() {
        if state.log_dir != log_dir {
            log::warn!(
                "event=logging_init status=ignored active_dir={} requested_dir={}",
                state.log_dir.display(),
                log_dir.display()
            );
        }
        return Ok(());
    }

    std::fs::create_dir_all(log_dir)
        .map_err(|e| format!("failed to create logs dir {}: {e}", log_dir.display()))?;

    let handle = Logger::try_with_str(level)
        .map_err(|e| format!("invalid log level '{level}': {e}"))?
        .log_to_file(
            FileSpec::default()
                .directory(log_dir)
                .basename(LOG_FILE_BASENAME),
        )
        .rotate(
            Criterion::Size(MAX_LOG_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(MAX_ARCHIVES),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .append()
        .format_for_files(flexi_logger::detailed_format)
        .start()
        .map_err(|e| format!("failed to start logger: {e}"))?;

    let _ = LOGGER.set(LoggerState {
        log_dir: log_dir.to_path_buf(),
        _handle: handle,
    });

    install_panic_hook();
    log::info!(
        "event=app_start platform={} version={} log_dir={}",
        std::env::consts::OS,
        env!("CARGO_PKG_VERSION"),
        log_dir.display()
    );
    Ok(())
}

pub fn is_initialized() -> bool {
    LOGGER.get().is_some()
}

fn install_panic_hook() {
    let _ = PANIC_HOOK_INSTALLED.get_or_init(|| {
        let prior = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |panic_info| {
            let location = panic_info
                .location()
                .map(|l| format!("{}:{}", l.file(), l.line()))
                .unwrap_or_else(|| "unknown".to_string());
            let payload = panic_info
                .payload()
                .downcast_ref::<&str>()
                .map(|s| (*s).to_string())
                .or_else(|| panic_info.payload().downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "panic payload unavailable".to_string());
            log::error!("event=panic location={location} payload={payload}");
            prior(panic_info);
        }));
    });
}
