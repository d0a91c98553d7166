//! Plugin configuration
//!
//! Read once at plugin load from `GfxPluginStreamline.toml` next to the
//! executable. Every field is optional; a missing file means defaults.

use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use streamline::{EngineType, Feature, LogLevel, LogSink, PreferenceFlags, Preferences, RenderApi};

/// Name shared by the log file and the config file
pub const PLUGIN_NAME: &str = "GfxPluginStreamline";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// SDK-side log verbosity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SdkLogLevel {
    Off,
    Default,
    #[default]
    Verbose,
}

impl From<SdkLogLevel> for LogLevel {
    fn from(level: SdkLogLevel) -> Self {
        match level {
            SdkLogLevel::Off => LogLevel::Off,
            SdkLogLevel::Default => LogLevel::Default,
            SdkLogLevel::Verbose => LogLevel::Verbose,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// NVIDIA-issued application id
    pub application_id: u32,
    pub engine_version: String,
    pub sdk_log_level: SdkLogLevel,
    /// Open the SDK's own console window
    pub show_console: bool,
    /// Allow over-the-air feature updates
    pub allow_ota: bool,
    pub load_downloaded_plugins: bool,
    pub disable_cl_state_tracking: bool,
    /// Searched after the built-in plugin locations
    pub extra_plugin_paths: Vec<PathBuf>,
    /// `env_logger` filter for the plugin log
    pub log_filter: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            application_id: 0x0E65_8700,
            engine_version: "6000.0".to_string(),
            sdk_log_level: SdkLogLevel::Verbose,
            show_console: true,
            allow_ota: true,
            load_downloaded_plugins: true,
            disable_cl_state_tracking: true,
            extra_plugin_paths: Vec::new(),
            log_filter: "debug".to_string(),
        }
    }
}

impl BridgeConfig {
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    /// Load `path`, falling back to defaults when it is missing or malformed
    ///
    /// Runs before the logger exists, so a read or parse failure is handed
    /// back for the caller to report. A missing file is not an error.
    pub fn load_or_default(path: &Path) -> (Self, Option<ConfigError>) {
        match Self::from_file(path) {
            Ok(config) => (config, None),
            Err(ConfigError::Io(err)) if err.kind() == io::ErrorKind::NotFound => {
                (Self::default(), None)
            }
            Err(err) => (Self::default(), Some(err)),
        }
    }

    pub fn preference_flags(&self) -> PreferenceFlags {
        let mut flags = PreferenceFlags::empty();
        flags.set(
            PreferenceFlags::DISABLE_CL_STATE_TRACKING,
            self.disable_cl_state_tracking,
        );
        flags.set(PreferenceFlags::ALLOW_OTA, self.allow_ota);
        flags.set(
            PreferenceFlags::LOAD_DOWNLOADED_PLUGINS,
            self.load_downloaded_plugins,
        );
        flags
    }

    /// SDK plugin search order
    ///
    /// Executable directory, the player's native plugin directory, the
    /// shared NGX model store, then configured extras.
    pub fn plugin_paths(&self, paths: &HostPaths) -> Vec<PathBuf> {
        let mut search = Vec::new();

        if let Some(exe_dir) = paths.exe_dir() {
            search.push(exe_dir.to_path_buf());
            if let Some(stem) = paths.exe.as_deref().and_then(Path::file_stem) {
                let mut data_dir = stem.to_os_string();
                data_dir.push("_Data");
                search.push(exe_dir.join(data_dir).join("Plugins").join("x86_64"));
            }
        }
        if let Some(program_data) = &paths.program_data {
            search.push(program_data.join("NVIDIA").join("NGX").join("models"));
        }
        search.extend(self.extra_plugin_paths.iter().cloned());

        search
    }

    /// Preferences handed to `slInit`
    pub fn preferences(&self, paths: &HostPaths, log_sink: Option<LogSink>) -> Preferences {
        Preferences {
            show_console: self.show_console,
            log_level: self.sdk_log_level.into(),
            log_sink,
            flags: self.preference_flags(),
            render_api: RenderApi::D3D12,
            application_id: self.application_id,
            engine: EngineType::Unity,
            engine_version: self.engine_version.clone(),
            plugin_paths: self.plugin_paths(paths),
            features: Feature::ALL.to_vec(),
        }
    }
}

/// Process locations the plugin derives its files from
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostPaths {
    /// Path of the running player executable
    pub exe: Option<PathBuf>,
    /// `%ProgramData%`
    pub program_data: Option<PathBuf>,
}

impl HostPaths {
    pub fn current() -> Self {
        Self {
            exe: std::env::current_exe().ok(),
            program_data: std::env::var_os("ProgramData").map(PathBuf::from),
        }
    }

    pub fn exe_dir(&self) -> Option<&Path> {
        self.exe.as_deref().and_then(Path::parent)
    }

    /// `<exe dir>/<name>`, or `name` relative to the working directory
    fn beside_exe(&self, name: &str) -> PathBuf {
        match self.exe_dir() {
            Some(dir) => dir.join(name),
            None => PathBuf::from(name),
        }
    }

    pub fn log_file(&self) -> PathBuf {
        self.beside_exe(&format!("{}.log", PLUGIN_NAME))
    }

    pub fn config_file(&self) -> PathBuf {
        self.beside_exe(&format!("{}.toml", PLUGIN_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player_paths() -> HostPaths {
        HostPaths {
            exe: Some(PathBuf::from("/games/Racer/Racer.exe")),
            program_data: Some(PathBuf::from("/ProgramData")),
        }
    }

    #[test]
    fn test_defaults() {
        let config = BridgeConfig::default();
        assert_eq!(config.application_id, 0x0E65_8700);
        assert_eq!(config.engine_version, "6000.0");
        assert_eq!(
            config.preference_flags(),
            PreferenceFlags::DISABLE_CL_STATE_TRACKING
                | PreferenceFlags::ALLOW_OTA
                | PreferenceFlags::LOAD_DOWNLOADED_PLUGINS
        );
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = BridgeConfig::from_toml(
            r#"
            sdk_log_level = "off"
            allow_ota = false
            extra_plugin_paths = ["/opt/sl"]
            "#,
        )
        .unwrap();

        assert_eq!(config.sdk_log_level, SdkLogLevel::Off);
        assert!(!config.preference_flags().contains(PreferenceFlags::ALLOW_OTA));
        assert_eq!(config.log_filter, "debug");
        assert_eq!(config.extra_plugin_paths, vec![PathBuf::from("/opt/sl")]);
    }

    #[test]
    fn test_malformed_toml() {
        assert!(matches!(
            BridgeConfig::from_toml("sdk_log_level = \"loud\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file_is_default() {
        let (config, err) =
            BridgeConfig::load_or_default(Path::new("/nonexistent/GfxPluginStreamline.toml"));
        assert_eq!(config, BridgeConfig::default());
        assert!(err.is_none());
    }

    #[test]
    fn test_malformed_file_returns_error_with_defaults() {
        let path = std::env::temp_dir().join(format!("gfxps-config-{}.toml", std::process::id()));
        std::fs::write(&path, "application_id = \"not a number\"\n").unwrap();

        let (config, err) = BridgeConfig::load_or_default(&path);
        let _ = std::fs::remove_file(&path);

        assert_eq!(config, BridgeConfig::default());
        assert!(matches!(err, Some(ConfigError::Parse(_))));
    }

    #[test]
    fn test_plugin_paths_order() {
        let config = BridgeConfig {
            extra_plugin_paths: vec![PathBuf::from("/opt/sl")],
            ..BridgeConfig::default()
        };

        assert_eq!(
            config.plugin_paths(&player_paths()),
            vec![
                PathBuf::from("/games/Racer"),
                PathBuf::from("/games/Racer/Racer_Data/Plugins/x86_64"),
                PathBuf::from("/ProgramData/NVIDIA/NGX/models"),
                PathBuf::from("/opt/sl"),
            ]
        );
    }

    #[test]
    fn test_plugin_paths_without_program_data() {
        let paths = HostPaths {
            program_data: None,
            ..player_paths()
        };
        assert_eq!(BridgeConfig::default().plugin_paths(&paths).len(), 2);
    }

    #[test]
    fn test_preferences() {
        let prefs = BridgeConfig::default().preferences(&player_paths(), None);
        assert_eq!(prefs.features, Feature::ALL.to_vec());
        assert_eq!(prefs.render_api, RenderApi::D3D12);
        assert_eq!(prefs.engine, EngineType::Unity);
        assert_eq!(prefs.log_level, LogLevel::Verbose);
        assert!(prefs.show_console);
    }

    #[test]
    fn test_file_locations() {
        let paths = player_paths();
        assert_eq!(
            paths.log_file(),
            PathBuf::from("/games/Racer/GfxPluginStreamline.log")
        );
        assert_eq!(
            paths.config_file(),
            PathBuf::from("/games/Racer/GfxPluginStreamline.toml")
        );
    }
}
