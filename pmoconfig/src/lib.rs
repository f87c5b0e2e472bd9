//! # PMOSonos Configuration Module
//!
//! This module provides configuration management for the Sonos bridge, including:
//! - Loading configuration from YAML files
//! - Merging with embedded default configuration
//! - Environment variable overrides (`PMOSONOS_CONFIG__SECTION__KEY=value`)
//! - Type-safe getters and setters for configuration values
//! - Thread-safe singleton access pattern
//!
//! ## Usage
//!
//! ```no_run
//! use pmoconfig::get_config;
//!
//! // Get the global configuration
//! let config = get_config();
//!
//! // Access configuration values
//! let port = config.get_http_port();
//! let endpoint = config.get_sonos_endpoint_path()?;
//!
//! // Update configuration values
//! config.set_http_port(9000)?;
//! # Ok::<(), anyhow::Error>(())
//! ```

use anyhow::{anyhow, Result};
use dirs::home_dir;
use lazy_static::lazy_static;
use pmoutils::guess_local_ip;
use serde_yaml::{Mapping, Number, Value};
use std::{
    env, fs,
    path::Path,
    sync::{Arc, Mutex},
};
use tracing::info;

// Configuration par défaut intégrée
const DEFAULT_CONFIG: &str = include_str!("pmosonos.yaml");

lazy_static! {
    static ref CONFIG: Arc<Config> =
        Arc::new(Config::load_config("").expect("Failed to load PMOSonos configuration"));
}

const ENV_CONFIG_DIR: &str = "PMOSONOS_CONFIG";
const ENV_PREFIX: &str = "PMOSONOS_CONFIG__";
const CONFIG_DIR_NAME: &str = ".pmosonos";

// Default values for configuration
const DEFAULT_HTTP_PORT: u16 = 4040;
const DEFAULT_LOG_BUFFER_CAPACITY: usize = 1000;
const DEFAULT_LOG_MIN_LEVEL: &str = "INFO";
const DEFAULT_LOG_ENABLE_CONSOLE: bool = true;

const DEFAULT_SONOS_SERVICE_ID: u32 = 255;
const DEFAULT_SONOS_SERVICE_NAME: &str = "PMOMusic";
const DEFAULT_SONOS_ENDPOINT_PATH: &str = "/ws/Sonos";
const DEFAULT_SONOS_CONTEXT_PATH: &str = "/";
const DEFAULT_SONOS_POLL_INTERVAL: u32 = 1200;
const DEFAULT_SONOS_AUTH_TYPE: &str = "UserId";
const DEFAULT_SONOS_ARTWORK_SIZE: u32 = 300;
const DEFAULT_SONOS_REGISTER_ON_STARTUP: bool = false;
const DEFAULT_LIBRARY_CATALOG: &str = "library.yaml";

/// Macro to generate getter/setter for usize values with default
macro_rules! impl_usize_config {
    ($getter:ident, $setter:ident, $path:expr, $default:expr) => {
        pub fn $getter(&self) -> Result<usize> {
            match self.get_value($path)? {
                Value::Number(n) => Ok(n.as_u64().map(|v| v as usize).unwrap_or($default)),
                _ => Ok($default),
            }
        }

        pub fn $setter(&self, size: usize) -> Result<()> {
            let n = Number::from(size);
            self.set_value($path, Value::Number(n))
        }
    };
}

/// Macro to generate getter/setter for u32 values with default
macro_rules! impl_u32_config {
    ($getter:ident, $setter:ident, $path:expr, $default:expr) => {
        pub fn $getter(&self) -> Result<u32> {
            match self.get_value($path)? {
                Value::Number(n) => Ok(n
                    .as_u64()
                    .and_then(|v| u32::try_from(v).ok())
                    .unwrap_or($default)),
                Value::String(s) => Ok(s.trim().parse::<u32>().unwrap_or($default)),
                _ => Ok($default),
            }
        }

        pub fn $setter(&self, value: u32) -> Result<()> {
            self.set_value($path, Value::Number(Number::from(value)))
        }
    };
}

/// Macro to generate getter/setter for bool values with default
macro_rules! impl_bool_config {
    ($getter:ident, $setter:ident, $path:expr, $default:expr) => {
        pub fn $getter(&self) -> Result<bool> {
            match self.get_value($path)? {
                Value::Bool(b) => Ok(b),
                _ => Ok($default),
            }
        }

        pub fn $setter(&self, value: bool) -> Result<()> {
            self.set_value($path, Value::Bool(value))
        }
    };
}

/// Macro to generate getter/setter for string values with default
macro_rules! impl_string_config {
    ($getter:ident, $setter:ident, $path:expr, $default:expr) => {
        pub fn $getter(&self) -> Result<String> {
            match self.get_value($path)? {
                Value::String(s) if !s.trim().is_empty() => Ok(s),
                _ => Ok($default.to_string()),
            }
        }

        pub fn $setter(&self, value: String) -> Result<()> {
            self.set_value($path, Value::String(value))
        }
    };
}

/// Configuration manager for PMOSonos
///
/// This structure manages the application configuration, including:
/// - Loading configuration from YAML files
/// - Merging with default configuration
/// - Handling environment variable overrides
/// - Providing typed getters/setters for configuration values
///
/// # Examples
///
/// ```no_run
/// use pmoconfig::get_config;
///
/// let config = get_config();
/// let port = config.get_http_port();
/// println!("HTTP port: {}", port);
/// ```
#[derive(Debug)]
pub struct Config {
    config_dir: String,
    path: String,
    data: Mutex<Value>,
}

// Implémentation manuelle de Clone
impl Clone for Config {
    fn clone(&self) -> Self {
        let data = self.lock_data().clone();
        Self {
            config_dir: self.config_dir.clone(),
            path: self.path.clone(),
            data: Mutex::new(data),
        }
    }
}

impl Config {
    fn lock_data(&self) -> std::sync::MutexGuard<'_, Value> {
        self.data.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Finds a config directory by trying different locations in order
    fn find_config_dir(directory: &str) -> String {
        // 1. Try provided directory
        if !directory.is_empty() {
            return directory.to_string();
        }

        // 2. Try environment variable
        if let Ok(env_path) = env::var(ENV_CONFIG_DIR) {
            info!(env_var=ENV_CONFIG_DIR, path=%env_path, "Trying to load config from env");
            return env_path;
        }

        // 3. Try current directory
        if Path::new(CONFIG_DIR_NAME).exists() {
            return CONFIG_DIR_NAME.to_string();
        }

        // 4. Try home directory
        if let Some(home) = home_dir() {
            let home_config = home.join(CONFIG_DIR_NAME);
            if home_config.exists() {
                return home_config.to_string_lossy().to_string();
            }
        }

        CONFIG_DIR_NAME.to_string()
    }

    /// Validates and prepares a config directory
    fn validate_config_dir(path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path)?;
        }

        if !path.is_dir() {
            return Err(anyhow!("Le chemin spécifié n'est pas un répertoire"));
        }

        // Test write permission
        let test_file = path.join(".write_test");
        fs::write(&test_file, b"test")?;
        fs::remove_file(&test_file)?;

        fs::read_dir(path)?;

        Ok(())
    }

    /// Determines and validates the configuration directory
    ///
    /// The directory is searched in the following order:
    /// 1. The provided `directory` parameter if not empty
    /// 2. The `PMOSONOS_CONFIG` environment variable
    /// 3. `.pmosonos` in the current directory
    /// 4. `.pmosonos` in the user's home directory
    ///
    /// The directory is created if it doesn't exist, and validated for read/write permissions.
    pub fn config_dir(directory: &str) -> Result<String> {
        let dir_path = Self::find_config_dir(directory);
        Self::validate_config_dir(Path::new(&dir_path))?;
        Ok(dir_path)
    }

    /// Loads the configuration from the specified directory
    ///
    /// This method:
    /// 1. Determines the configuration directory
    /// 2. Loads the default embedded configuration
    /// 3. Merges it with the external config.yaml file if present
    /// 4. Applies environment variable overrides
    /// 5. Saves the merged configuration
    pub fn load_config(directory: &str) -> Result<Self> {
        let config_dir = Self::config_dir(directory)?;
        info!(config_dir=%config_dir, "Using config directory");

        let config_file_path = Path::new(&config_dir).join("config.yaml");
        let path = config_file_path.to_string_lossy().to_string();

        let mut default_value: Value = serde_yaml::from_str(DEFAULT_CONFIG)?;

        let yaml_data = if let Ok(data) = fs::read(&path) {
            info!(config_file=%path, "Loaded config file");
            data
        } else {
            info!(config_file=%path, "Config file not found, using default embedded config");
            DEFAULT_CONFIG.as_bytes().to_vec()
        };

        // Un fichier vide se désérialise en Null : on garde alors les défauts
        let external_value: Value = serde_yaml::from_slice(&yaml_data)?;
        merge_yaml(&mut default_value, &external_value);
        let mut config_value = lower_keys_value(default_value);

        apply_env_overrides(&mut config_value, env::vars());

        let config = Config {
            config_dir,
            path,
            data: Mutex::new(config_value),
        };

        config.save()?;
        Ok(config)
    }

    /// Répertoire de configuration effectivement utilisé
    pub fn get_config_dir(&self) -> &str {
        &self.config_dir
    }

    /// Chemin du fichier `config.yaml` lu et réécrit au chargement
    pub fn get_config_file(&self) -> &str {
        &self.path
    }

    /// Saves the current configuration to the config.yaml file
    pub fn save(&self) -> Result<()> {
        let yaml = serde_yaml::to_string(&*self.lock_data())?;
        fs::write(&self.path, yaml)?;
        Ok(())
    }

    /// Sets a configuration value at the specified path and saves it
    ///
    /// # Arguments
    ///
    /// * `path` - Array of keys representing the path (e.g., `&["sonos", "service_id"]`)
    /// * `value` - The YAML value to set
    pub fn set_value(&self, path: &[&str], value: Value) -> Result<()> {
        {
            let mut data = self.lock_data();
            set_value_internal(&mut data, path, value)?;
        }
        self.save()
    }

    /// Gets a configuration value at the specified path
    ///
    /// Returns an error if the path doesn't exist.
    pub fn get_value(&self, path: &[&str]) -> Result<Value> {
        let data = self.lock_data();
        get_value_internal(&data, path)
    }

    /// Résout un chemin de fichier relatif au répertoire de configuration
    fn resolve_file(&self, file_path: &str) -> String {
        let path = Path::new(file_path);
        if path.is_absolute() {
            file_path.to_string()
        } else {
            Path::new(&self.config_dir)
                .join(path)
                .to_string_lossy()
                .to_string()
        }
    }

    /// Gets the host announced to the Sonos controllers
    ///
    /// Returns the configured base URL, or the guessed local IP address if not configured.
    pub fn get_base_url(&self) -> String {
        match self.get_value(&["host", "base_url"]) {
            Ok(Value::String(s)) if !s.trim().is_empty() => s,
            Ok(_) => guess_local_ip(),
            Err(err) => {
                tracing::warn!("Failed to get base URL: {}, guessing local IP", err);
                guess_local_ip()
            }
        }
    }

    /// Gets the HTTP port from configuration
    ///
    /// Returns the configured HTTP port, or the default port (4040) if not configured or invalid.
    pub fn get_http_port(&self) -> u16 {
        match self.get_value(&["host", "http_port"]) {
            Ok(Value::Number(n)) => match n.as_u64().and_then(|p| u16::try_from(p).ok()) {
                Some(port) => port,
                None => {
                    tracing::warn!("Invalid HTTP port {}, using default {}", n, DEFAULT_HTTP_PORT);
                    DEFAULT_HTTP_PORT
                }
            },
            Ok(Value::String(s)) => match s.parse::<u16>() {
                Ok(port) => port,
                Err(_) => {
                    tracing::warn!(
                        "Invalid HTTP port '{}', using default {}",
                        s,
                        DEFAULT_HTTP_PORT
                    );
                    DEFAULT_HTTP_PORT
                }
            },
            Ok(_) => DEFAULT_HTTP_PORT,
            Err(err) => {
                tracing::warn!(
                    "Failed to get HTTP port: {}, using default {}",
                    err,
                    DEFAULT_HTTP_PORT
                );
                DEFAULT_HTTP_PORT
            }
        }
    }

    /// Sets the HTTP port in configuration
    pub fn set_http_port(&self, port: u16) -> Result<()> {
        let n = Number::from(port);
        self.set_value(&["host", "http_port"], Value::Number(n))
    }

    impl_usize_config!(
        get_log_cache_size,
        set_log_cache_size,
        &["host", "logger", "buffer_capacity"],
        DEFAULT_LOG_BUFFER_CAPACITY
    );

    impl_bool_config!(
        get_log_enable_console,
        set_log_enable_console,
        &["host", "logger", "enable_console"],
        DEFAULT_LOG_ENABLE_CONSOLE
    );

    impl_string_config!(
        get_log_min_level,
        set_log_min_level,
        &["host", "logger", "min_level"],
        DEFAULT_LOG_MIN_LEVEL
    );

    impl_u32_config!(
        get_sonos_service_id,
        set_sonos_service_id,
        &["sonos", "service_id"],
        DEFAULT_SONOS_SERVICE_ID
    );

    impl_string_config!(
        get_sonos_service_name,
        set_sonos_service_name,
        &["sonos", "service_name"],
        DEFAULT_SONOS_SERVICE_NAME
    );

    impl_string_config!(
        get_sonos_endpoint_path,
        set_sonos_endpoint_path,
        &["sonos", "endpoint_path"],
        DEFAULT_SONOS_ENDPOINT_PATH
    );

    impl_string_config!(
        get_sonos_context_path,
        set_sonos_context_path,
        &["sonos", "context_path"],
        DEFAULT_SONOS_CONTEXT_PATH
    );

    impl_u32_config!(
        get_sonos_poll_interval,
        set_sonos_poll_interval,
        &["sonos", "poll_interval"],
        DEFAULT_SONOS_POLL_INTERVAL
    );

    impl_string_config!(
        get_sonos_auth_type,
        set_sonos_auth_type,
        &["sonos", "auth_type"],
        DEFAULT_SONOS_AUTH_TYPE
    );

    impl_u32_config!(
        get_sonos_artwork_size,
        set_sonos_artwork_size,
        &["sonos", "artwork_size"],
        DEFAULT_SONOS_ARTWORK_SIZE
    );

    impl_bool_config!(
        get_sonos_register_on_startup,
        set_sonos_register_on_startup,
        &["sonos", "register_on_startup"],
        DEFAULT_SONOS_REGISTER_ON_STARTUP
    );

    /// IP du contrôleur Sonos utilisé pour l'enregistrement `customsd`
    ///
    /// `None` si la valeur est absente ou vide.
    pub fn get_sonos_controller_ip(&self) -> Option<String> {
        match self.get_value(&["sonos", "controller_ip"]) {
            Ok(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
            _ => None,
        }
    }

    pub fn set_sonos_controller_ip(&self, ip: String) -> Result<()> {
        self.set_value(&["sonos", "controller_ip"], Value::String(ip))
    }

    /// Serveur de médias qui répond aux URLs `stream` et `coverArt.view`
    ///
    /// `None` si la valeur est absente ou vide : les URLs pointent alors sur
    /// `host.base_url` et `host.http_port`.
    pub fn get_sonos_media_base_url(&self) -> Option<String> {
        match self.get_value(&["sonos", "media_base_url"]) {
            Ok(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
            _ => None,
        }
    }

    pub fn set_sonos_media_base_url(&self, url: String) -> Result<()> {
        self.set_value(&["sonos", "media_base_url"], Value::String(url))
    }

    /// Capacités SMAPI annoncées au contrôleur (`caps` répétés dans le formulaire)
    pub fn get_sonos_caps(&self) -> Result<Vec<String>> {
        match self.get_value(&["sonos", "caps"]) {
            Ok(Value::Sequence(seq)) => Ok(seq
                .into_iter()
                .filter_map(|v| match v {
                    Value::String(s) => Some(s),
                    _ => None,
                })
                .collect()),
            Ok(Value::String(s)) => Ok(s
                .split(',')
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty())
                .collect()),
            _ => Ok(Vec::new()),
        }
    }

    pub fn set_sonos_caps(&self, caps: Vec<String>) -> Result<()> {
        let seq = caps.into_iter().map(Value::String).collect();
        self.set_value(&["sonos", "caps"], Value::Sequence(seq))
    }

    /// Chemin absolu du catalogue de la bibliothèque
    ///
    /// Un chemin relatif est résolu par rapport au répertoire de configuration.
    pub fn get_library_catalog(&self) -> Result<String> {
        let file = match self.get_value(&["library", "catalog"]) {
            Ok(Value::String(s)) if !s.trim().is_empty() => s,
            _ => DEFAULT_LIBRARY_CATALOG.to_string(),
        };
        Ok(self.resolve_file(&file))
    }

    pub fn set_library_catalog(&self, path: String) -> Result<()> {
        self.set_value(&["library", "catalog"], Value::String(path))
    }
}

/// Returns the global configuration instance
///
/// The singleton is lazily loaded on first access.
pub fn get_config() -> Arc<Config> {
    CONFIG.clone()
}

fn set_value_internal(data: &mut Value, path: &[&str], value: Value) -> Result<()> {
    if path.is_empty() {
        *data = value;
        return Ok(());
    }
    if let Value::Mapping(map) = data {
        let key_value = Value::String(path[0].to_lowercase());
        if path.len() == 1 {
            map.insert(key_value, value);
        } else {
            let entry = map
                .entry(key_value)
                .or_insert(Value::Mapping(Mapping::new()));
            set_value_internal(entry, &path[1..], value)?;
        }
        Ok(())
    } else {
        Err(anyhow!("Current node is not a map"))
    }
}

fn get_value_internal(data: &Value, path: &[&str]) -> Result<Value> {
    let mut current = data;
    for (i, key) in path.iter().enumerate() {
        if let Value::Mapping(map) = current {
            match map.get(&Value::String(key.to_lowercase())) {
                Some(next) => current = next,
                None => return Err(anyhow!("Path {} does not exist", path[..=i].join("."))),
            }
        } else {
            return Err(anyhow!("Path {} is not a Config", path[..i].join(".")));
        }
    }
    Ok(current.clone())
}

/// Applique les variables `PMOSONOS_CONFIG__A__B=valeur` sur l'arbre de configuration
fn apply_env_overrides<I>(config: &mut Value, vars: I)
where
    I: IntoIterator<Item = (String, String)>,
{
    for (key, value) in vars {
        if let Some(stripped) = key.strip_prefix(ENV_PREFIX) {
            let key_path = stripped.split("__").collect::<Vec<_>>();
            let yaml_value = convert_env_value(&value);
            if let Err(e) = set_value_internal(config, &key_path, yaml_value) {
                tracing::warn!(env_var=%key, "Ignoring config override: {}", e);
            }
        }
    }
}

fn convert_env_value(value: &str) -> Value {
    serde_yaml::from_str::<Value>(value).unwrap_or_else(|_| Value::String(value.to_string()))
}

fn lower_keys_value(value: Value) -> Value {
    match value {
        Value::Mapping(map) => {
            let mut new_map = Mapping::new();
            for (k, v) in map {
                let key = match k {
                    Value::String(s) => Value::String(s.to_lowercase()),
                    other => other,
                };
                new_map.insert(key, lower_keys_value(v));
            }
            Value::Mapping(new_map)
        }
        Value::Sequence(seq) => Value::Sequence(seq.into_iter().map(lower_keys_value).collect()),
        _ => value,
    }
}

/// Merges external YAML configuration into default configuration
///
/// - For mappings (objects), it merges keys from external into default
/// - For scalars and sequences, external values replace default values
/// - A null external document keeps the defaults
fn merge_yaml(default: &mut Value, external: &Value) {
    match (default, external) {
        (Value::Mapping(dmap), Value::Mapping(emap)) => {
            for (k, v) in emap {
                match dmap.get_mut(k) {
                    Some(dv) => merge_yaml(dv, v),
                    None => {
                        dmap.insert(k.clone(), v.clone());
                    }
                }
            }
        }
        (_, Value::Null) => {}
        (d, e) => *d = e.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load_in(dir: &tempfile::TempDir) -> Config {
        Config::load_config(dir.path().to_str().unwrap()).unwrap()
    }

    #[test]
    fn test_defaults_are_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_in(&dir);

        assert_eq!(config.get_http_port(), 4040);
        assert_eq!(config.get_sonos_service_id().unwrap(), 255);
        assert_eq!(config.get_sonos_endpoint_path().unwrap(), "/ws/Sonos");
        assert_eq!(config.get_sonos_poll_interval().unwrap(), 1200);
        assert_eq!(config.get_sonos_artwork_size().unwrap(), 300);
        assert_eq!(
            config.get_sonos_caps().unwrap(),
            vec!["search", "trFavorites", "alFavorites"]
        );
        assert!(!config.get_sonos_register_on_startup().unwrap());
        assert!(config.get_sonos_controller_ip().is_none());
        assert!(config.get_sonos_media_base_url().is_none());
        assert!(dir.path().join("config.yaml").exists());
        assert_eq!(
            Path::new(config.get_config_file()),
            dir.path().join("config.yaml").as_path()
        );
    }

    #[test]
    fn test_external_file_is_merged() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("config.yaml"),
            "sonos:\n  service_name: Salon\n  controller_ip: 192.168.1.20\n  media_base_url: http://nas.local:4533\n",
        )
        .unwrap();

        let config = load_in(&dir);
        assert_eq!(config.get_sonos_service_name().unwrap(), "Salon");
        assert_eq!(
            config.get_sonos_controller_ip().as_deref(),
            Some("192.168.1.20")
        );
        assert_eq!(
            config.get_sonos_media_base_url().as_deref(),
            Some("http://nas.local:4533")
        );
        // Les autres clés gardent leur valeur par défaut
        assert_eq!(config.get_sonos_auth_type().unwrap(), "UserId");
    }

    #[test]
    fn test_set_value_is_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_in(&dir);
        config.set_http_port(8081).unwrap();

        let reloaded = load_in(&dir);
        assert_eq!(reloaded.get_http_port(), 8081);
    }

    #[test]
    fn test_library_catalog_is_relative_to_config_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_in(&dir);

        let catalog = config.get_library_catalog().unwrap();
        assert_eq!(
            Path::new(&catalog),
            dir.path().join("library.yaml").as_path()
        );

        config
            .set_library_catalog("/srv/music/catalog.yaml".to_string())
            .unwrap();
        assert_eq!(
            config.get_library_catalog().unwrap(),
            "/srv/music/catalog.yaml"
        );
    }

    #[test]
    fn test_env_overrides() {
        let mut value: Value = serde_yaml::from_str(DEFAULT_CONFIG).unwrap();
        apply_env_overrides(
            &mut value,
            vec![
                ("PMOSONOS_CONFIG__HOST__HTTP_PORT".to_string(), "9999".to_string()),
                ("PMOSONOS_CONFIG__SONOS__SERVICE_NAME".to_string(), "Cuisine".to_string()),
                ("UNRELATED".to_string(), "x".to_string()),
            ],
        );

        assert_eq!(
            get_value_internal(&value, &["host", "http_port"]).unwrap(),
            Value::Number(Number::from(9999))
        );
        assert_eq!(
            get_value_internal(&value, &["sonos", "service_name"]).unwrap(),
            Value::String("Cuisine".to_string())
        );
    }

    #[test]
    fn test_get_missing_path_fails() {
        let value: Value = serde_yaml::from_str(DEFAULT_CONFIG).unwrap();
        assert!(get_value_internal(&value, &["nope", "missing"]).is_err());
    }

    #[test]
    fn test_merge_yaml_replaces_scalars() {
        let mut default: Value = serde_yaml::from_str("a: 1\nb:\n  c: 2\n").unwrap();
        let external: Value = serde_yaml::from_str("b:\n  c: 3\n  d: 4\n").unwrap();
        merge_yaml(&mut default, &external);

        assert_eq!(
            get_value_internal(&default, &["b", "c"]).unwrap(),
            Value::Number(Number::from(3))
        );
        assert_eq!(
            get_value_internal(&default, &["a"]).unwrap(),
            Value::Number(Number::from(1))
        );
    }
}
