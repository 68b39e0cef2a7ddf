//! Settings resolved from the environment and command-line overrides.

use std::str::FromStr;

use dreamer_core::config::{
    AnalysisConfig, ImageGenerationConfig, DEFAULT_ANALYSIS_MODEL, DEFAULT_IMAGE_MODEL,
    DEFAULT_IMAGE_RETRIES, DEFAULT_MAX_WAIT_SECS, DEFAULT_MIN_WAIT_SECS, DEFAULT_TEMPERATURE,
};
use dreamer_core::error::CoreError;
use dreamer_genai::api::DEFAULT_BASE_URL;

use crate::cli::GenerationArgs;
use crate::error::CliError;

/// Generation settings for one invocation.
///
/// Values are kept raw here; [`analysis_config`](Self::analysis_config) and
/// [`image_config`](Self::image_config) validate them.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub api_key: Option<String>,
    pub base_url: String,
    pub analysis_model: String,
    pub image_model: String,
    pub temperature: f32,
    pub retries: u32,
    pub min_wait_secs: f64,
    pub max_wait_secs: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            analysis_model: DEFAULT_ANALYSIS_MODEL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            retries: DEFAULT_IMAGE_RETRIES,
            min_wait_secs: DEFAULT_MIN_WAIT_SECS,
            max_wait_secs: DEFAULT_MAX_WAIT_SECS,
        }
    }
}

impl Settings {
    /// Load settings from environment variables with defaults.
    ///
    /// | Env Var                  | Default                                            |
    /// |--------------------------|----------------------------------------------------|
    /// | `GEMINI_API_KEY`         | none                                               |
    /// | `DREAMER_API_BASE_URL`   | `https://generativelanguage.googleapis.com/v1beta` |
    /// | `DREAMER_ANALYSIS_MODEL` | `gemini-2.5-flash`                                 |
    /// | `DREAMER_IMAGE_MODEL`    | `gemini-2.5-flash-image`                           |
    /// | `DREAMER_TEMPERATURE`    | `0.4`                                              |
    /// | `DREAMER_IMAGE_RETRIES`  | `2`                                                |
    /// | `DREAMER_MIN_WAIT_SECS`  | `2`                                                |
    /// | `DREAMER_MAX_WAIT_SECS`  | `10`                                               |
    pub fn from_env() -> Result<Self, CliError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Like [`from_env`](Self::from_env) with a custom variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, CliError> {
        let defaults = Self::default();
        let text = |name: &str, default: String| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or(default)
        };

        Ok(Self {
            api_key: lookup("GEMINI_API_KEY").filter(|k| !k.trim().is_empty()),
            base_url: text("DREAMER_API_BASE_URL", defaults.base_url),
            analysis_model: text("DREAMER_ANALYSIS_MODEL", defaults.analysis_model),
            image_model: text("DREAMER_IMAGE_MODEL", defaults.image_model),
            temperature: parse_var(&lookup, "DREAMER_TEMPERATURE", defaults.temperature)?,
            retries: parse_var(&lookup, "DREAMER_IMAGE_RETRIES", defaults.retries)?,
            min_wait_secs: parse_var(&lookup, "DREAMER_MIN_WAIT_SECS", defaults.min_wait_secs)?,
            max_wait_secs: parse_var(&lookup, "DREAMER_MAX_WAIT_SECS", defaults.max_wait_secs)?,
        })
    }

    /// Apply command-line flags on top of these settings.
    pub fn with_overrides(mut self, args: &GenerationArgs) -> Self {
        if let Some(key) = &args.api_key {
            self.api_key = Some(key.clone());
        }
        if let Some(url) = &args.base_url {
            self.base_url = url.clone();
        }
        if let Some(model) = &args.analysis_model {
            self.analysis_model = model.clone();
        }
        if let Some(model) = &args.image_model {
            self.image_model = model.clone();
        }
        self.temperature = args.temperature.unwrap_or(self.temperature);
        self.retries = args.retries.unwrap_or(self.retries);
        self.min_wait_secs = args.min_wait.unwrap_or(self.min_wait_secs);
        self.max_wait_secs = args.max_wait.unwrap_or(self.max_wait_secs);
        self
    }

    /// The API key, if a non-blank one was supplied.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|k| !k.trim().is_empty())
    }

    pub fn analysis_config(&self) -> Result<AnalysisConfig, CoreError> {
        AnalysisConfig::new(self.analysis_model.clone(), self.temperature)
    }

    pub fn image_config(&self) -> Result<ImageGenerationConfig, CoreError> {
        ImageGenerationConfig::new(
            self.image_model.clone(),
            self.retries,
            self.min_wait_secs,
            self.max_wait_secs,
        )
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, CliError> {
    match lookup(name).map(|v| v.trim().to_string()) {
        None => Ok(default),
        Some(v) if v.is_empty() => Ok(default),
        Some(v) => v
            .parse()
            .map_err(|_| CliError::InvalidSetting { name, value: v }),
    }
}
