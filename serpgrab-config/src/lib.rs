//! Loader for serpgrab configuration with YAML + environment overlays.
//!
//! Sources merge in the order they are attached; `SERPGRAB__`-prefixed
//! environment variables are applied last so they override any file
//! (`SERPGRAB__SEARCH__DEFAULT_PAGES=3` sets `search.default_pages`).
//! String values may reference `${VAR}`; references are expanded recursively
//! after merging. Every field has a default, so an empty configuration is valid.
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Deserializer, de};
use serde_json::Value;
use serpgrab_common::{DEFAULT_PAGES, MAX_PAGES, MIN_PAGES};
use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;
const ENV_PREFIX: &str = "SERPGRAB";

/// Results page queried when no endpoint is configured.
pub const DEFAULT_ENDPOINT: &str = "https://search.naver.com/search.naver";

#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Source(#[from] ConfigError),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SerpgrabConfig {
    pub version: Option<String>,
    pub search: SearchSection,
    pub output: OutputSection,
    pub logging: LoggingSection,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchSection {
    /// Results page URL; `query` and `start` are appended per page.
    pub endpoint: String,
    /// Overrides the built-in desktop browser User-Agent.
    pub user_agent: Option<String>,
    #[serde(deserialize_with = "u32_from_number_or_str")]
    pub default_pages: u32,
    #[serde(deserialize_with = "opt_u64_from_number_or_str")]
    pub timeout_secs: Option<u64>,
}

impl Default for SearchSection {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            user_agent: None,
            default_pages: DEFAULT_PAGES,
            timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputSection {
    /// Directory downloads are written into. `~/` is expanded.
    pub dir: PathBuf,
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    pub dir: Option<PathBuf>,
    /// `text` or `json`.
    pub format: String,
    pub filter: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            dir: None,
            format: "text".to_string(),
            filter: "info".to_string(),
        }
    }
}

impl SerpgrabConfig {
    /// Check values the type system cannot.
    ///
    /// ```
    /// use serpgrab_config::SerpgrabConfig;
    ///
    /// let mut cfg = SerpgrabConfig::default();
    /// assert!(cfg.validate().is_ok());
    ///
    /// cfg.search.default_pages = 0;
    /// assert!(cfg.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<(), LoadError> {
        let endpoint = Url::parse(&self.search.endpoint).map_err(|e| {
            LoadError::Invalid(format!(
                "search.endpoint `{}` is not a URL: {e}",
                self.search.endpoint
            ))
        })?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(LoadError::Invalid(format!(
                "search.endpoint must be http(s), got `{}`",
                endpoint.scheme()
            )));
        }
        if !(MIN_PAGES..=MAX_PAGES).contains(&self.search.default_pages) {
            return Err(LoadError::Invalid(format!(
                "search.default_pages must be within {MIN_PAGES}..={MAX_PAGES}, got {}",
                self.search.default_pages
            )));
        }
        if self.search.timeout_secs == Some(0) {
            return Err(LoadError::Invalid(
                "search.timeout_secs must be positive when set".into(),
            ));
        }
        Ok(())
    }

    /// Output directory with a leading `~` resolved against `$HOME`.
    pub fn output_dir(&self) -> PathBuf {
        match self.output.dir.to_str() {
            Some(raw) => PathBuf::from(shellexpand::tilde(raw).into_owned()),
            None => self.output.dir.clone(),
        }
    }
}

/// Numeric fields arrive as numbers from YAML but as strings from the
/// environment or after `${VAR}` expansion; both are accepted.
#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrStr {
    Number(u64),
    Str(String),
}

impl NumberOrStr {
    fn into_u64<E: de::Error>(self) -> Result<u64, E> {
        match self {
            Self::Number(n) => Ok(n),
            Self::Str(s) => s
                .trim()
                .parse()
                .map_err(|e| E::custom(format!("`{s}` is not a non-negative integer: {e}"))),
        }
    }
}

fn u32_from_number_or_str<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
    let n = NumberOrStr::deserialize(d)?.into_u64()?;
    u32::try_from(n).map_err(de::Error::custom)
}

fn opt_u64_from_number_or_str<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u64>, D::Error> {
    match Option::<NumberOrStr>::deserialize(d)? {
        None => Ok(None),
        Some(NumberOrStr::Str(s)) if s.trim().is_empty() => Ok(None),
        Some(v) => v.into_u64().map(Some),
    }
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder hides the `config` crate wiring (files + env overrides).
pub struct SerpgrabConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for SerpgrabConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl SerpgrabConfigLoader {
    /// Start with no files; environment overrides are always applied by [`Self::load`].
    ///
    /// ```
    /// use serpgrab_config::{DEFAULT_ENDPOINT, SerpgrabConfigLoader};
    ///
    /// let cfg = SerpgrabConfigLoader::new().load().expect("defaults are valid");
    /// assert_eq!(cfg.search.endpoint, DEFAULT_ENDPOINT);
    /// assert_eq!(cfg.search.default_pages, 10);
    /// ```
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
        }
    }

    /// Attach a YAML/TOML/JSON file that must exist; the format is inferred by suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Attach a file that is merged only when present, so env-only setups work.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Allow tests/CLI to merge inline YAML snippets.
    ///
    /// ```
    /// use serpgrab_config::SerpgrabConfigLoader;
    ///
    /// let cfg = SerpgrabConfigLoader::new()
    ///     .with_yaml_str(
    ///         r#"
    /// version: "test"
    /// search:
    ///   endpoint: "https://search.example.com/search"
    ///   default_pages: 3
    /// "#,
    ///     )
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(cfg.version.as_deref(), Some("test"));
    /// assert_eq!(cfg.search.default_pages, 3);
    /// assert_eq!(cfg.logging.filter, "info");
    /// ```
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Merge all sources, expand `${VAR}` placeholders, deserialize, and validate.
    ///
    /// ```
    /// use serpgrab_config::SerpgrabConfigLoader;
    ///
    /// unsafe { std::env::set_var("SERPGRAB_DOC_OUT", "/tmp/serpgrab-doc"); }
    ///
    /// let cfg = SerpgrabConfigLoader::new()
    ///     .with_yaml_str("output:\n  dir: \"${SERPGRAB_DOC_OUT}/downloads\"")
    ///     .load()
    ///     .expect("valid configuration");
    ///
    /// assert_eq!(cfg.output.dir.to_str(), Some("/tmp/serpgrab-doc/downloads"));
    ///
    /// unsafe { std::env::remove_var("SERPGRAB_DOC_OUT"); }
    /// ```
    pub fn load(self) -> Result<SerpgrabConfig, LoadError> {
        let cfg = self
            .builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        let typed: SerpgrabConfig =
            serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))?;
        typed.validate()?;
        Ok(typed)
    }
}
