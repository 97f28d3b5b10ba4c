use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

use cross_xdg::BaseDirs;
use tracing::{debug, warn};

use crate::script::DEFAULT_MAX_PROGRAM_SIZE;
use crate::tape::{DEFAULT_TAPE_SIZE, MAX_TAPE_SIZE};

/// Name of the config file inside the XDG config directory.
pub const CONFIG_FILE: &str = "brainfuck.toml";

/// Runtime knobs for a script run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub tape_size: usize,
    pub max_program_size: usize,
    pub max_steps: Option<u64>,
    pub timeout_ms: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tape_size: DEFAULT_TAPE_SIZE,
            max_program_size: DEFAULT_MAX_PROGRAM_SIZE,
            max_steps: None,
            timeout_ms: None,
        }
    }
}

impl Settings {
    /// Defaults, then the config file, then `BF_*` environment variables.
    pub fn load() -> Self {
        let mut settings = Self::default();
        if let Some(content) = read_config_file() {
            settings.apply_toml(&content);
        }
        settings.apply_env(|key| std::env::var(key).ok());
        settings
    }

    /// Apply `key = value` pairs from the `[engine]` section.
    pub fn apply_toml(&mut self, content: &str) {
        let map = engine_section(content);
        let lookup = |key: &str| map.get(key).cloned();
        self.apply(lookup, "config");
    }

    /// Apply overrides from the environment (`BF_TAPE_SIZE`, `BF_MAX_PROGRAM_SIZE`,
    /// `BF_MAX_STEPS`, `BF_TIMEOUT_MS`).
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let env_lookup = |key: &str| lookup(&format!("BF_{}", key.to_ascii_uppercase()));
        self.apply(env_lookup, "env");
    }

    fn apply<F>(&mut self, lookup: F, origin: &str)
    where
        F: Fn(&str) -> Option<String>,
    {
        let cfg = self;

        macro_rules! set {
            ($field:ident, $key:literal) => {
                if let Some(v) = parse_positive(lookup($key), $key, origin, None) {
                    cfg.$field = v;
                }
            };
            ($field:ident, $key:literal, max = $max:expr) => {
                if let Some(v) = parse_positive(lookup($key), $key, origin, Some($max)) {
                    cfg.$field = v;
                }
            };
            ($field:ident, $key:literal, optional) => {
                if let Some(v) = parse_positive(lookup($key), $key, origin, None) {
                    cfg.$field = Some(v);
                }
            };
        }

        set!(tape_size, "tape_size", max = MAX_TAPE_SIZE);
        set!(max_program_size, "max_program_size");
        set!(max_steps, "max_steps", optional);
        set!(timeout_ms, "timeout_ms", optional);
    }
}

fn parse_positive<T>(raw: Option<String>, key: &str, origin: &str, max: Option<T>) -> Option<T>
where
    T: FromStr + PartialOrd + Default,
{
    let raw = raw?;
    match raw.trim().replace('_', "").parse::<T>() {
        Ok(v) if v != T::default() && max.is_none_or(|m| v <= m) => Some(v),
        _ => {
            warn!(key, value = %raw, origin, "ignoring invalid setting");
            None
        }
    }
}

fn config_path() -> Option<PathBuf> {
    let base_dirs = BaseDirs::new().ok()?;

    // On Linux: resolves to /home/<user>/.config
    let mut path = PathBuf::from(base_dirs.config_home());
    path.push(CONFIG_FILE);
    Some(path)
}

fn read_config_file() -> Option<String> {
    let path = config_path()?;
    let content = fs::read_to_string(&path).ok()?;
    debug!(path = %path.display(), "loaded config file");
    Some(content)
}

/// Very small hand-rolled parser: look for the [engine] section and key = value pairs.
fn engine_section(content: &str) -> HashMap<String, String> {
    let mut in_engine = false;
    let mut map: HashMap<String, String> = HashMap::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if line.starts_with('[') && line.ends_with(']') {
            in_engine = line[1..line.len() - 1].trim() == "engine";
            continue;
        }
        if !in_engine {
            continue;
        }
        if let Some(eq) = line.find('=') {
            let key = line[..eq].trim().to_string();
            let val_raw = line[eq + 1..].trim();
            // Accept quoted or unquoted
            let quoted = val_raw.starts_with('"') && val_raw.ends_with('"') && val_raw.len() >= 2;
            let val = if quoted {
                val_raw[1..val_raw.len() - 1].to_string()
            } else {
                val_raw.to_string()
            };
            map.insert(key, val);
        }
    }
    map
}
