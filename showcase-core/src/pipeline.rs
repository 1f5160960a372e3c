/// Render pipeline plugin list, validated before anything is registered
use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, PluginInitError};
use crate::surface::RenderEngine;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "plugin", rename_all = "snake_case")]
pub enum Plugin {
    AssetManager,
    #[serde(rename = "gbuffer")]
    GBuffer,
    /// Accumulates `frames` samples while the camera is still
    Progressive { frames: u32 },
    Tonemap { enabled: bool },
    Ssr,
    Ssao,
    Bloom,
}

impl Plugin {
    /// Position in the canonical order
    fn rank(self) -> u8 {
        match self {
            Plugin::AssetManager => 0,
            Plugin::GBuffer => 1,
            Plugin::Progressive { .. } => 2,
            Plugin::Tonemap { .. } => 3,
            Plugin::Ssr => 4,
            Plugin::Ssao => 5,
            Plugin::Bloom => 6,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Plugin::AssetManager => "AssetManager",
            Plugin::GBuffer => "GBuffer",
            Plugin::Progressive { .. } => "Progressive",
            Plugin::Tonemap { .. } => "Tonemap",
            Plugin::Ssr => "SSR",
            Plugin::Ssao => "SSAO",
            Plugin::Bloom => "Bloom",
        }
    }

    /// Screen-space passes read the g-buffer
    fn requires_gbuffer(self) -> bool {
        matches!(self, Plugin::Ssr | Plugin::Ssao)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Pipeline {
    plugins: Vec<Plugin>,
}

impl Pipeline {
    pub fn new(plugins: Vec<Plugin>) -> Result<Self, PipelineError> {
        validate(&plugins)?;
        Ok(Self { plugins })
    }

    pub fn plugins(&self) -> &[Plugin] {
        &self.plugins
    }

    /// Register every plugin in order, stopping at the first failure
    pub fn register<E: RenderEngine>(&self, engine: &mut E) -> Result<(), PluginInitError> {
        for plugin in &self.plugins {
            log::debug!("registering plugin {}", plugin.name());
            engine.add_plugin(plugin)?;
        }
        engine.refresh_pipeline();
        log::info!("render pipeline ready with {} plugins", self.plugins.len());
        Ok(())
    }
}


pub fn default_plugins() -> Vec<Plugin> {
    vec![
        Plugin::AssetManager,
        Plugin::GBuffer,
        Plugin::Progressive { frames: 32 },
        Plugin::Tonemap { enabled: true },
        Plugin::Ssr,
        Plugin::Ssao,
        Plugin::Bloom,
    ]
}

fn validate(plugins: &[Plugin]) -> Result<(), PipelineError> {
    let first = plugins.first().ok_or(PipelineError::Empty)?;
    if *first != Plugin::AssetManager {
        return Err(PipelineError::AssetManagerNotFirst(first.name().to_string()));
    }

    let mut seen_gbuffer = false;
    for (i, plugin) in plugins.iter().enumerate() {
        if plugins[..i].iter().any(|p| p.rank() == plugin.rank()) {
            return Err(PipelineError::Duplicate(plugin.name().to_string()));
        }
        if let Some(previous) = i.checked_sub(1).map(|j| plugins[j]) {
            if previous.rank() > plugin.rank() {
                return Err(PipelineError::OutOfOrder {
                    earlier: plugin.name().to_string(),
                    later: previous.name().to_string(),
                });
            }
        }
        if plugin.requires_gbuffer() && !seen_gbuffer {
            return Err(PipelineError::MissingDependency {
                plugin: plugin.name().to_string(),
                requires: Plugin::GBuffer.name().to_string(),
            });
        }
        seen_gbuffer |= *plugin == Plugin::GBuffer;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeEngine;

    #[test]
    fn test_standard_pipeline_is_valid() {
        assert!(Pipeline::new(default_plugins()).is_ok());
    }

    #[test]
    fn test_subset_in_order_is_valid() {
        let plugins = vec![Plugin::AssetManager, Plugin::Tonemap { enabled: false }, Plugin::Bloom];
        assert!(Pipeline::new(plugins).is_ok());
    }

    #[test]
    fn test_rejects_bad_orderings() {
        assert_eq!(Pipeline::new(vec![]), Err(PipelineError::Empty));
        assert_eq!(
            Pipeline::new(vec![Plugin::GBuffer, Plugin::AssetManager]),
            Err(PipelineError::AssetManagerNotFirst("GBuffer".to_string()))
        );
        assert_eq!(
            Pipeline::new(vec![Plugin::AssetManager, Plugin::Bloom, Plugin::Bloom]),
            Err(PipelineError::Duplicate("Bloom".to_string()))
        );
        assert_eq!(
            Pipeline::new(vec![Plugin::AssetManager, Plugin::GBuffer, Plugin::Bloom, Plugin::Ssr]),
            Err(PipelineError::OutOfOrder {
                earlier: "SSR".to_string(),
                later: "Bloom".to_string(),
            })
        );
        assert_eq!(
            Pipeline::new(vec![Plugin::AssetManager, Plugin::Ssao]),
            Err(PipelineError::MissingDependency {
                plugin: "SSAO".to_string(),
                requires: "GBuffer".to_string(),
            })
        );
    }

    #[test]
    fn test_register_in_order_then_refresh() {
        let mut engine = FakeEngine::new();
        Pipeline::new(default_plugins()).unwrap().register(&mut engine).unwrap();
        assert_eq!(engine.plugins, default_plugins());
        assert_eq!(engine.pipeline_refreshes, 1);
    }

    #[test]
    fn test_register_aborts_on_first_failure() {
        let mut engine = FakeEngine::new();
        engine.failing_plugin = Some("SSR");
        let err = Pipeline::new(default_plugins()).unwrap().register(&mut engine).unwrap_err();
        assert_eq!(err.plugin, "SSR");
        assert_eq!(engine.plugins.len(), 4);
        assert_eq!(engine.pipeline_refreshes, 0);
    }

    #[test]
    fn test_plugins_from_json() {
        let plugins: Vec<Plugin> = serde_json::from_str(
            r#"[{"plugin": "asset_manager"}, {"plugin": "gbuffer"}, {"plugin": "progressive", "frames": 8}]"#,
        )
        .unwrap();
        assert_eq!(plugins[2], Plugin::Progressive { frames: 8 });
        assert!(Pipeline::new(plugins).is_ok());
    }
}
