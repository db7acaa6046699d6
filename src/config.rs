//! Client configuration and API key discovery
//!
//! The API key is resolved once, when a [`Config`] is built, by probing an
//! ordered list of variable sources. A missing key is not an error here; the
//! clients reject calls made without one.

use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::path::Path;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_TEXT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image";
pub const DEFAULT_SPEECH_MODEL: &str = "gemini-2.5-flash-preview-tts";
pub const DEFAULT_VOICE: &str = "Fenrir";
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 500;

/// Variable names probed in the process environment, highest priority first.
pub const PROCESS_ENV_KEYS: &[&str] = &[
    "REACT_APP_API_KEY",
    "VITE_API_KEY",
    "NEXT_PUBLIC_API_KEY",
    "API_KEY",
];

/// Variable names probed in a build-tool style `.env` file.
pub const DOTENV_KEYS: &[&str] = &["VITE_API_KEY", "REACT_APP_API_KEY", "API_KEY"];

/// A named place configuration values can be read from.
///
/// `lookup` returns `None` both when the variable is unset and when the
/// mechanism itself is unavailable.
pub trait VarSource {
    fn label(&self) -> &str;
    fn lookup(&self, name: &str) -> Option<String>;
}

/// Reads from the current process environment.
pub struct ProcessEnv;

impl VarSource for ProcessEnv {
    fn label(&self) -> &str {
        "process environment"
    }

    fn lookup(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// Values parsed from a `.env` file without touching the process environment.
pub struct DotenvFile {
    vars: Option<HashMap<String, String>>,
}

impl DotenvFile {
    /// Looks for `.env` in the current directory and its parents.
    pub fn discover() -> Self {
        Self {
            vars: Self::collect(dotenvy::dotenv_iter()),
        }
    }

    pub fn from_path(path: impl AsRef<Path>) -> Self {
        Self {
            vars: Self::collect(dotenvy::from_path_iter(path)),
        }
    }

    pub fn is_available(&self) -> bool {
        self.vars.is_some()
    }

    fn collect(iter: dotenvy::Result<dotenvy::Iter<File>>) -> Option<HashMap<String, String>> {
        match iter {
            Ok(iter) => Some(iter.filter_map(|item| item.ok()).collect()),
            Err(e) => {
                tracing::debug!(".env file unavailable: {}", e);
                None
            }
        }
    }
}

impl VarSource for DotenvFile {
    fn label(&self) -> &str {
        ".env file"
    }

    fn lookup(&self, name: &str) -> Option<String> {
        self.vars.as_ref()?.get(name).cloned()
    }
}

/// One source together with the variable names to try in it, in order.
pub struct CredentialProbe<'a> {
    pub source: &'a dyn VarSource,
    pub names: &'a [&'a str],
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCredential {
    pub source: String,
    pub name: String,
    pub value: String,
}

/// Returns the first non-empty value across `probes`, or `None`.
pub fn resolve_credential(probes: &[CredentialProbe<'_>]) -> Option<ResolvedCredential> {
    probes.iter().find_map(|probe| {
        probe.names.iter().find_map(|name| {
            probe
                .source
                .lookup(name)
                .filter(|value| !value.is_empty())
                .map(|value| ResolvedCredential {
                    source: probe.source.label().to_string(),
                    name: name.to_string(),
                    value,
                })
        })
    })
}

#[derive(Clone)]
pub struct Config {
    pub api_key: String,
    pub base_url: String,
    pub text_model: String,
    pub image_model: String,
    pub speech_model: String,
    pub default_voice: String,
    pub max_output_tokens: u32,
    pub dry_run: bool,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &if self.api_key.is_empty() { "" } else { "<redacted>" })
            .field("base_url", &self.base_url)
            .field("text_model", &self.text_model)
            .field("image_model", &self.image_model)
            .field("speech_model", &self.speech_model)
            .field("default_voice", &self.default_voice)
            .field("max_output_tokens", &self.max_output_tokens)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl Config {
    /// Resolve the API key from the process environment, then from a `.env`
    /// file, and read `DRY_RUN`.
    pub fn from_env() -> Self {
        let process = ProcessEnv;
        let dotenv = DotenvFile::discover();

        let mut config = Self::from_sources(&[
            CredentialProbe {
                source: &process,
                names: PROCESS_ENV_KEYS,
            },
            CredentialProbe {
                source: &dotenv,
                names: DOTENV_KEYS,
            },
        ]);

        config.dry_run = process
            .lookup("DRY_RUN")
            .or_else(|| dotenv.lookup("DRY_RUN"))
            .map(|v| parse_flag(&v))
            .unwrap_or(false);

        config
    }

    /// Build a config whose API key is resolved from `probes`.
    ///
    /// Emits one warning when no probe yields a key.
    pub fn from_sources(probes: &[CredentialProbe<'_>]) -> Self {
        let api_key = match resolve_credential(probes) {
            Some(found) => {
                tracing::debug!("Using API key from {} ({})", found.source, found.name);
                found.value
            }
            None => {
                tracing::warn!(
                    "Gemini API key not found in environment. Please ensure VITE_API_KEY or REACT_APP_API_KEY is set."
                );
                String::new()
            }
        };

        Self::with_api_key(api_key)
    }

    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            speech_model: DEFAULT_SPEECH_MODEL.to_string(),
            default_voice: DEFAULT_VOICE.to_string(),
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
            dry_run: false,
        }
    }

    /// Base URL including the API version segment, e.g. `.../v1beta`.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_text_model(mut self, model: impl Into<String>) -> Self {
        self.text_model = model.into();
        self
    }

    pub fn with_image_model(mut self, model: impl Into<String>) -> Self {
        self.image_model = model.into();
        self
    }

    pub fn with_speech_model(mut self, model: impl Into<String>) -> Self {
        self.speech_model = model.into();
        self
    }

    pub fn with_default_voice(mut self, voice: impl Into<String>) -> Self {
        self.default_voice = voice.into();
        self
    }

    pub fn with_max_output_tokens(mut self, max_output_tokens: u32) -> Self {
        self.max_output_tokens = max_output_tokens;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn has_api_key(&self) -> bool {
        !self.api_key.is_empty()
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
