/// Error types shared by every showcase component
use thiserror::Error;

/// A page element the showcase expected is not present; the feature it backs is disabled
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("element `{selector}` not found on the page")]
pub struct MissingElementError {
    pub selector: String,
}

impl MissingElementError {
    pub fn new(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to load asset `{path}`: {reason}")]
pub struct AssetLoadError {
    pub path: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("plugin {plugin} failed to initialise: {reason}")]
pub struct PluginInitError {
    pub plugin: String,
    pub reason: String,
}

/// Rejections raised while validating the render pipeline order
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    #[error("pipeline is empty")]
    Empty,
    #[error("the asset manager must be registered first, found {0}")]
    AssetManagerNotFirst(String),
    #[error("plugin {0} is listed more than once")]
    Duplicate(String),
    #[error("plugin {later} must come after {earlier}")]
    OutOfOrder { earlier: String, later: String },
    #[error("plugin {plugin} requires {requires} earlier in the pipeline")]
    MissingDependency { plugin: String, requires: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid scroll trigger offset `{input}`: {reason}")]
pub struct OffsetParseError {
    pub input: String,
    pub reason: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config value for {field}: {reason}")]
    Invalid { field: String, reason: String },
}

/// Umbrella error for setup and runtime failures
#[derive(Debug, Error)]
pub enum ShowcaseError {
    #[error(transparent)]
    AssetLoad(#[from] AssetLoadError),
    #[error(transparent)]
    PluginInit(#[from] PluginInitError),
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, ShowcaseError>;
