//! Configuration loading (`nvgrid.toml`).
//!
//! Load-or-default: a missing or unparsable file yields the defaults, never an error the caller
//! has to handle. Unknown fields are ignored so older binaries accept newer files. Raw values are
//! kept as parsed; `Config::settings` validates and clamps them into the typed `Settings` the
//! session consumes, logging every adjustment under the `config` target.

use anyhow::Result;
use core_input::PlatformId;
use core_style::{Color, DefaultColors};
use serde::Deserialize;
use std::time::Duration;
use std::{fs, path::PathBuf};
use tracing::{info, warn};

pub const FILE_NAME: &str = "nvgrid.toml";

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct QueryConfig {
    /// Deadline for synchronous probes (mode, command output).
    #[serde(default = "QueryConfig::default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            timeout_ms: Self::default_timeout_ms(),
        }
    }
}

impl QueryConfig {
    const fn default_timeout_ms() -> u64 {
        40
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct RedrawConfig {
    #[serde(default = "RedrawConfig::default_queue_capacity")]
    pub queue_capacity: usize,
    /// Flushes without any color event before the hold-over default colors are committed.
    /// Zero commits on the first flush.
    #[serde(default = "RedrawConfig::default_grace_flushes")]
    pub colorscheme_grace_flushes: u32,
}

impl Default for RedrawConfig {
    fn default() -> Self {
        Self {
            queue_capacity: Self::default_queue_capacity(),
            colorscheme_grace_flushes: Self::default_grace_flushes(),
        }
    }
}

impl RedrawConfig {
    const fn default_queue_capacity() -> usize {
        1000
    }
    const fn default_grace_flushes() -> u32 {
        2
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ColorsConfig {
    #[serde(default = "ColorsConfig::default_foreground")]
    pub foreground: String,
    #[serde(default = "ColorsConfig::default_background")]
    pub background: String,
    #[serde(default = "ColorsConfig::default_special")]
    pub special: String,
}

impl Default for ColorsConfig {
    fn default() -> Self {
        Self {
            foreground: Self::default_foreground(),
            background: Self::default_background(),
            special: Self::default_special(),
        }
    }
}

impl ColorsConfig {
    fn default_foreground() -> String {
        "#b4b9be".to_string()
    }
    fn default_background() -> String {
        "#090d11".to_string()
    }
    fn default_special() -> String {
        "#ffffff".to_string()
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct InputConfig {
    /// `auto`, `linux`, `macos` or `windows`.
    #[serde(default = "InputConfig::default_platform")]
    pub platform: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            platform: Self::default_platform(),
        }
    }
}

impl InputConfig {
    fn default_platform() -> String {
        "auto".to_string()
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct MetricsConfig {
    #[serde(default = "MetricsConfig::default_cell_width")]
    pub cell_width: u32,
    #[serde(default = "MetricsConfig::default_line_height")]
    pub line_height: u32,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            cell_width: Self::default_cell_width(),
            line_height: Self::default_line_height(),
        }
    }
}

impl MetricsConfig {
    const fn default_cell_width() -> u32 {
        8
    }
    const fn default_line_height() -> u32 {
        16
    }
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    #[serde(default)]
    pub query: QueryConfig,
    #[serde(default)]
    pub redraw: RedrawConfig,
    #[serde(default)]
    pub colors: ColorsConfig,
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub raw: Option<String>,
    pub file: ConfigFile,
    pub path: Option<PathBuf>,
}

/// Validated values ready for the session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Settings {
    pub query_timeout: Duration,
    pub queue_capacity: usize,
    pub grace_flushes: u32,
    pub colors: DefaultColors,
    pub platform: PlatformId,
    pub cell_width: u32,
    pub line_height: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Config::default().settings()
    }
}

/// Working directory first, then the platform config dir.
pub fn discover() -> PathBuf {
    let local = PathBuf::from(FILE_NAME);
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("nvgrid").join(FILE_NAME);
    }
    local
}

pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    let Ok(content) = fs::read_to_string(&path) else {
        return Ok(Config::default());
    };
    match toml::from_str::<ConfigFile>(&content) {
        Ok(file) => {
            info!(target: "config", path = %path.display(), "config_loaded");
            Ok(Config {
                raw: Some(content),
                file,
                path: Some(path),
            })
        }
        Err(e) => {
            warn!(target: "config", path = %path.display(), error = %e, "config_parse_failed_using_defaults");
            Ok(Config::default())
        }
    }
}

impl Config {
    pub fn settings(&self) -> Settings {
        let f = &self.file;
        let defaults = DefaultColors::default();
        Settings {
            query_timeout: Duration::from_millis(clamp_min("query.timeout_ms", f.query.timeout_ms, 1)),
            queue_capacity: clamp_min("redraw.queue_capacity", f.redraw.queue_capacity, 1),
            grace_flushes: f.redraw.colorscheme_grace_flushes,
            colors: DefaultColors {
                foreground: color_or("colors.foreground", &f.colors.foreground, defaults.foreground),
                background: color_or("colors.background", &f.colors.background, defaults.background),
                special: color_or("colors.special", &f.colors.special, defaults.special),
            },
            platform: platform_or_current(&f.input.platform),
            cell_width: clamp_min("metrics.cell_width", f.metrics.cell_width, 1),
            line_height: clamp_min("metrics.line_height", f.metrics.line_height, 1),
        }
    }
}

fn clamp_min<T>(key: &'static str, raw: T, min: T) -> T
where
    T: PartialOrd + Copy + std::fmt::Display,
{
    if raw < min {
        info!(target: "config", key, raw = %raw, clamped = %min, "config_value_clamped");
        min
    } else {
        raw
    }
}

fn color_or(key: &'static str, raw: &str, fallback: Color) -> Color {
    Color::parse_hex(raw).unwrap_or_else(|| {
        info!(target: "config", key, raw, fallback = %fallback.hex(), "config_color_invalid");
        fallback
    })
}

fn platform_or_current(raw: &str) -> PlatformId {
    raw.parse().unwrap_or_else(|e| {
        let current = PlatformId::current();
        info!(target: "config", key = "input.platform", error = %e, fallback = %current, "config_platform_invalid");
        current
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex, MutexGuard};
    use tracing::Level;
    use tracing::subscriber::with_default;
    use tracing_subscriber::fmt::MakeWriter;

    #[derive(Clone)]
    struct BufferWriter {
        inner: Arc<Mutex<Vec<u8>>>,
    }

    impl BufferWriter {
        fn new() -> (Self, Arc<Mutex<Vec<u8>>>) {
            let buf = Arc::new(Mutex::new(Vec::new()));
            (Self { inner: buf.clone() }, buf)
        }
    }

    struct LockedWriter<'a> {
        guard: MutexGuard<'a, Vec<u8>>,
    }

    impl<'a> Write for LockedWriter<'a> {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.guard.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for BufferWriter {
        type Writer = LockedWriter<'a>;

        fn make_writer(&'a self) -> Self::Writer {
            LockedWriter {
                guard: self.inner.lock().expect("log buffer poisoned"),
            }
        }
    }

    fn load_str(content: &str) -> Config {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), content).unwrap();
        load_from(Some(tmp.path().to_path_buf())).unwrap()
    }

    #[test]
    fn default_config_when_missing_file() {
        let cfg = load_from(Some(PathBuf::from("__nonexistent_hopefully__.toml"))).unwrap();
        assert!(cfg.raw.is_none());
        let s = cfg.settings();
        assert_eq!(s.query_timeout, Duration::from_millis(40));
        assert_eq!(s.queue_capacity, 1000);
        assert_eq!(s.grace_flushes, 2);
        assert_eq!(s.colors, DefaultColors::default());
        assert_eq!((s.cell_width, s.line_height), (8, 16));
        assert_eq!(s.platform, PlatformId::current());
    }

    #[test]
    fn parses_all_sections() {
        let cfg = load_str(
            "[query]\ntimeout_ms = 15\n\
             [redraw]\nqueue_capacity = 64\ncolorscheme_grace_flushes = 3\n\
             [colors]\nforeground = \"#102030\"\n\
             [input]\nplatform = \"macos\"\n\
             [metrics]\ncell_width = 9\nline_height = 20\n",
        );
        let s = cfg.settings();
        assert_eq!(s.query_timeout, Duration::from_millis(15));
        assert_eq!(s.queue_capacity, 64);
        assert_eq!(s.grace_flushes, 3);
        assert_eq!(s.colors.foreground, Color::rgb(0x10, 0x20, 0x30));
        assert_eq!(s.colors.background, DefaultColors::default().background);
        assert_eq!(s.platform, PlatformId::MacOs);
        assert_eq!((s.cell_width, s.line_height), (9, 20));
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let cfg = load_str("[query\ntimeout_ms = ");
        assert_eq!(cfg.file, ConfigFile::default());
    }

    #[test]
    fn unknown_fields_ignored() {
        let cfg = load_str("[window]\nopacity = 0.5\n[query]\ntimeout_ms = 5\nretries = 2\n");
        assert_eq!(cfg.file.query.timeout_ms, 5);
    }

    #[test]
    fn invalid_values_fall_back() {
        let cfg = load_str("[colors]\nbackground = \"blue\"\n[input]\nplatform = \"amiga\"\n");
        let s = cfg.settings();
        assert_eq!(s.colors.background, DefaultColors::default().background);
        assert_eq!(s.platform, PlatformId::current());
    }

    #[test]
    fn zero_values_are_clamped_and_logged() {
        let cfg = load_str(
            "[query]\ntimeout_ms = 0\n[redraw]\nqueue_capacity = 0\n[metrics]\ncell_width = 0\n",
        );
        let (writer, buffer) = BufferWriter::new();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(Level::INFO)
            .with_target(true)
            .with_ansi(false)
            .without_time()
            .with_writer(writer)
            .finish();

        let s = with_default(subscriber, || cfg.settings());

        assert_eq!(s.query_timeout, Duration::from_millis(1));
        assert_eq!(s.queue_capacity, 1);
        assert_eq!(s.cell_width, 1);
        let log_output = String::from_utf8(buffer.lock().unwrap().clone()).unwrap();
        assert!(log_output.contains("INFO config:"));
        assert!(log_output.contains("config_value_clamped"));
        assert!(log_output.contains("query.timeout_ms"));
    }
}
