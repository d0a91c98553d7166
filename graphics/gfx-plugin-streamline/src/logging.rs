//! Plugin log
//!
//! One `env_logger` instance writes every record to the log file beside the
//! executable, flushing per line so the file survives a player crash. Each
//! record is also handed to the host's log callback when one is set.
//!
//! The host callback runs while plugin state may be locked and must not call
//! back into the plugin.

use core::ffi::c_char;
use std::ffi::CString;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use env_logger::{Builder, Target, WriteStyle};
use parking_lot::Mutex;
use streamline::LogType;

use crate::config::{BridgeConfig, HostPaths, PLUGIN_NAME};

/// Host-side receiver for formatted log lines
pub type HostLogCallback = unsafe extern "C" fn(message: *const c_char);

static LOGGER: spin::Once<()> = spin::Once::new();
static LOG_FILE: Mutex<Option<File>> = parking_lot::const_mutex(None);
static HOST_CALLBACK: spin::RwLock<Option<HostLogCallback>> = spin::RwLock::new(None);

/// `env_logger` target writing into whichever log file is open
struct LogFileWriter;

impl Write for LogFileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if let Some(file) = LOG_FILE.lock().as_mut() {
            file.write_all(buf)?;
            file.flush()?;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        match LOG_FILE.lock().as_mut() {
            Some(file) => file.flush(),
            None => Ok(()),
        }
    }
}

struct PluginLogger {
    inner: env_logger::Logger,
}

impl log::Log for PluginLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        self.inner.enabled(metadata)
    }

    fn log(&self, record: &log::Record) {
        if !self.inner.matches(record) {
            return;
        }
        self.inner.log(record);
        forward_to_host(&record.args().to_string());
    }

    fn flush(&self) {
        self.inner.flush();
    }
}

/// Install the process-wide logger
///
/// Only the first call takes effect; `filter` uses `env_logger` syntax.
pub fn init(filter: &str) {
    LOGGER.call_once(|| {
        let inner = Builder::new()
            .parse_filters(filter)
            .format(|buf, record| {
                let timestamp = buf.timestamp_seconds();
                writeln!(buf, "[{}] {}", timestamp, record.args())
            })
            .write_style(WriteStyle::Never)
            .target(Target::Pipe(Box::new(LogFileWriter)))
            .build();

        let max_level = inner.filter();
        if log::set_boxed_logger(Box::new(PluginLogger { inner })).is_ok() {
            log::set_max_level(max_level);
        }
    });
}

/// Open the log file, read the config and install the logger
///
/// The config decides the log filter, so its outcome is only reported once
/// the logger is in place.
pub fn start(paths: &HostPaths) -> BridgeConfig {
    let log_path = paths.log_file();
    let log_opened = open_log_file(&log_path);

    let config_path = paths.config_file();
    let (config, config_err) = BridgeConfig::load_or_default(&config_path);
    init(&config.log_filter);

    log::info!("UnityPluginLoad called");
    if let Err(err) = log_opened {
        log::warn!("Failed to open {}: {}", log_path.display(), err);
    }
    match config_err {
        Some(err) => log::warn!("{} ({}), using defaults", err, config_path.display()),
        None if config_path.is_file() => {
            log::info!("Loaded config from {}", config_path.display())
        }
        None => {}
    }
    log::debug!("Configuration: {:?}", config);

    config
}

/// Truncate `path` and start logging into it
pub fn open_log_file(path: &Path) -> io::Result<()> {
    let mut file = File::create(path)?;
    let started = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or(0);

    writeln!(file, "=== {} Log ===", PLUGIN_NAME)?;
    writeln!(file, "Started: {} (unix time)", started)?;
    writeln!(file, "Log file: {}", path.display())?;
    writeln!(file, "================================")?;
    file.flush()?;

    *LOG_FILE.lock() = Some(file);
    Ok(())
}

/// Write the trailer and stop file logging
pub fn close_log_file() {
    if let Some(mut file) = LOG_FILE.lock().take() {
        let _ = writeln!(file, "\n=== Log Closed ===");
        let _ = file.flush();
    }
}

/// Set or clear (`None`) the host log callback
pub fn set_host_callback(callback: Option<HostLogCallback>) {
    *HOST_CALLBACK.write() = callback;
}

fn forward_to_host(message: &str) {
    let Some(callback) = *HOST_CALLBACK.read() else {
        return;
    };

    let message = CString::new(message)
        .or_else(|_| CString::new(message.replace('\0', " ")))
        .unwrap_or_default();
    // SAFETY: the host registered `callback` for exactly this signature and
    // `message` outlives the call.
    unsafe { callback(message.as_ptr()) };
}

fn sdk_tag(kind: LogType) -> &'static str {
    match kind {
        LogType::Info => "SL_INFO",
        LogType::Warn => "SL_WARN",
        LogType::Error => "SL_ERROR",
    }
}

/// Log sink handed to the SDK in its preferences
pub fn sdk_message(kind: LogType, message: &str) {
    let message = message.trim_end();
    match kind {
        LogType::Info => log::info!("[{}] {}", sdk_tag(kind), message),
        LogType::Warn => log::warn!("[{}] {}", sdk_tag(kind), message),
        LogType::Error => log::error!("[{}] {}", sdk_tag(kind), message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::ffi::CStr;

    static RECEIVED: Mutex<Vec<String>> = parking_lot::const_mutex(Vec::new());

    unsafe extern "C" fn record_message(message: *const c_char) {
        let text = CStr::from_ptr(message).to_string_lossy().into_owned();
        RECEIVED.lock().push(text);
    }

    #[test]
    fn test_file_banner_lines_and_trailer() {
        let path = std::env::temp_dir().join(format!("gfxps-log-{}.log", std::process::id()));
        open_log_file(&path).unwrap();
        LogFileWriter.write_all(b"[0] first line\n").unwrap();
        close_log_file();
        // Nothing is written once closed
        LogFileWriter.write_all(b"dropped\n").unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "=== GfxPluginStreamline Log ===");
        assert!(lines[1].starts_with("Started: "));
        assert!(lines[2].starts_with("Log file: "));
        assert_eq!(lines[3], "================================");
        assert_eq!(lines[4], "[0] first line");
        assert_eq!(lines.last().copied(), Some("=== Log Closed ==="));
        assert!(!text.contains("dropped"));
    }

    #[test]
    fn test_host_callback_forwarding() {
        set_host_callback(Some(record_message));
        forward_to_host("DLSS mode set");
        forward_to_host("embedded\0nul");
        set_host_callback(None);
        forward_to_host("not delivered");

        let received = RECEIVED.lock().clone();
        assert_eq!(received, vec!["DLSS mode set", "embedded nul"]);
    }

    #[test]
    fn test_sdk_tags() {
        assert_eq!(sdk_tag(LogType::Info), "SL_INFO");
        assert_eq!(sdk_tag(LogType::Warn), "SL_WARN");
        assert_eq!(sdk_tag(LogType::Error), "SL_ERROR");
    }
}
