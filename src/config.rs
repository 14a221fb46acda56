use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

pub const CONFIG_ENV: &str = "MISH_CONFIG";
pub const RC_FILE: &str = ".mishrc";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub prompt: String,
    pub show_cwd: bool,
    pub banner: bool,
    pub log_level: String,
    pub env_vars: BTreeMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        ConfigLoader::default_config()
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read config file {}: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },
    #[error("Config parse error: {0}")]
    Parse(String),
}

pub struct ConfigLoader;

impl ConfigLoader {
    pub fn default_config() -> Config {
        Config {
            prompt: "mish".to_string(),
            show_cwd: false,
            banner: true,
            log_level: "warn".to_string(),
            env_vars: BTreeMap::new(),
        }
    }

    /// `$MISH_CONFIG` must exist when set; `~/.mishrc` is optional.
    pub fn discover() -> Result<Config, ConfigError> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Self::load_from_file(path);
        }
        match std::env::var_os("HOME").map(|home| Path::new(&home).join(RC_FILE)) {
            Some(rc) if rc.is_file() => Self::load_from_file(rc),
            _ => Ok(Self::default_config()),
        }
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
        let path = path.as_ref();
        debug!(path = %path.display(), "loading config");
        let src = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::load_from_str(&src)
    }

    pub fn load_from_str(src: &str) -> Result<Config, ConfigError> {
        let mut config = Self::default_config();

        for (lineno, line) in src.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                return Err(ConfigError::Parse(format!("Line {}: No '=' found: {}", lineno + 1, line)));
            };
            let (key, value) = (key.trim(), value.trim());

            match key {
                "prompt" => config.prompt = value.to_string(),
                "show_cwd" => config.show_cwd = parse_bool(value, lineno)?,
                "banner" => config.banner = parse_bool(value, lineno)?,
                "log_level" => config.log_level = value.to_string(),
                k if k.starts_with("env.") => {
                    let var = k.trim_start_matches("env.");
                    if var.is_empty() {
                        return Err(ConfigError::Parse(format!("Line {}: Empty variable name", lineno + 1)));
                    }
                    config.env_vars.insert(var.to_string(), value.to_string());
                }
                _ => return Err(ConfigError::Parse(format!("Line {}: Unknown key: {}", lineno + 1, key))),
            }
        }

        Ok(config)
    }
}

fn parse_bool(value: &str, lineno: usize) -> Result<bool, ConfigError> {
    match value {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(ConfigError::Parse(format!("Line {}: Invalid bool: {}", lineno + 1, value))),
    }
}
