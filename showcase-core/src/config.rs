/// Configurator settings, loadable from JSON
use nalgebra::Point3;
use serde::{Deserialize, Serialize};

use crate::binder::BinderConfig;
use crate::camera::CameraPose;
use crate::device::DeviceValue;
use crate::error::ConfigError;
use crate::loader::RevealConfig;
use crate::pipeline::{default_plugins, Plugin};
use crate::timeline::{KeyframeSpec, KeyframeTarget};
use crate::trigger::{Edge, Scrub, ScrollTriggerSpec, TriggerOffset};

/// Pose the camera takes before any scrolling
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StartPose {
    pub position: [f32; 3],
    pub target: [f32; 3],
    /// Vertical field of view in degrees, `None` keeps the engine's
    #[serde(default)]
    pub fov: Option<f32>,
}

impl StartPose {
    pub fn to_pose(&self) -> CameraPose {
        let [px, py, pz] = self.position;
        let [tx, ty, tz] = self.target;
        let mut pose = CameraPose::new(Point3::new(px, py, pz), Point3::new(tx, ty, tz));
        pose.fov = self.fov;
        pose
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfiguratorConfig {
    pub asset_path: String,
    /// Name of the material the swatches recolor
    pub material: String,
    pub pipeline: Vec<Plugin>,
    pub initial_pose: DeviceValue<StartPose>,
    pub keyframes: Vec<KeyframeSpec>,
    pub binder: BinderConfig,
    pub reveal: RevealConfig,
}

impl Default for ConfiguratorConfig {
    fn default() -> Self {
        Self {
            asset_path: "./assets/drill.glb".to_string(),
            material: "Drill_01".to_string(),
            pipeline: default_plugins(),
            initial_pose: DeviceValue::PerDevice {
                mobile: StartPose {
                    position: [-3.5, -1.1, 5.5],
                    target: [-0.8, 1.55, -0.7],
                    fov: Some(40.0),
                },
                desktop: StartPose {
                    position: [-1.2, 0.6, 6.5],
                    target: [-1.5, 1.6, -0.4],
                    fov: None,
                },
            },
            keyframes: default_keyframes(),
            binder: BinderConfig::default(),
            reveal: RevealConfig::default(),
        }
    }
}

fn scroll(trigger: &str, start: TriggerOffset, end: TriggerOffset, scrub: Scrub) -> ScrollTriggerSpec {
    ScrollTriggerSpec {
        trigger: trigger.to_string(),
        start,
        end,
        scrub,
    }
}

/// The drill page: fly past the first section, then settle over the third
pub fn default_keyframes() -> Vec<KeyframeSpec> {
    let keyframe = |target, trigger| KeyframeSpec {
        target,
        duration: 4.0,
        trigger,
    };
    let top_bottom = TriggerOffset::new(Edge::Top, Edge::Bottom);
    let top_top = TriggerOffset::new(Edge::Top, Edge::Top);
    let top_80 = TriggerOffset::new(Edge::Top, Edge::Percent(80.0));
    vec![
        keyframe(
            KeyframeTarget::Position {
                value: DeviceValue::PerDevice {
                    mobile: [-6.0, 5.5, -3.3],
                    desktop: [1.56, -2.26, -3.85],
                },
            },
            scroll(".second", top_bottom, top_top, Scrub::Exact),
        ),
        keyframe(
            KeyframeTarget::Section {
                selector: ".section--one--container".to_string(),
                x_percent: -150.0,
                opacity: 0.0,
            },
            scroll(".second", top_bottom, top_80, Scrub::Smoothed(1.0)),
        ),
        keyframe(
            KeyframeTarget::Target {
                value: DeviceValue::PerDevice {
                    mobile: [-1.1, 1.0, -0.1],
                    desktop: [-1.37, 1.99, -0.37],
                },
            },
            scroll(".second", top_bottom, top_top, Scrub::Exact),
        ),
        keyframe(
            KeyframeTarget::Position {
                value: DeviceValue::Shared([-3.4, 0.6, 1.71]),
            },
            scroll(".third", top_bottom, top_top, Scrub::Exact),
        ),
        keyframe(
            KeyframeTarget::Target {
                value: DeviceValue::Shared([-1.5, 2.13, -0.4]),
            },
            scroll(".third", top_bottom, top_top, Scrub::Exact),
        ),
    ]
}

impl ConfiguratorConfig {
    /// Parse and validate. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: ConfiguratorConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.asset_path.trim().is_empty() {
            return Err(invalid("asset_path", "must not be empty"));
        }
        if self.material.trim().is_empty() {
            return Err(invalid("material", "must not be empty"));
        }
        non_negative("binder.transition_duration", self.binder.transition_duration)?;
        non_negative("reveal.delay", self.reveal.delay)?;
        non_negative("reveal.duration", self.reveal.duration)?;

        for (index, keyframe) in self.keyframes.iter().enumerate() {
            non_negative(&format!("keyframes[{index}].duration"), keyframe.duration)?;
            if keyframe.trigger.trigger.trim().is_empty() {
                return Err(invalid(
                    &format!("keyframes[{index}].trigger"),
                    "selector must not be empty",
                ));
            }
            if let Scrub::Smoothed(lag) = keyframe.trigger.scrub {
                if !(lag.is_finite() && lag > 0.0) {
                    return Err(invalid(
                        &format!("keyframes[{index}].scrub"),
                        "smoothing lag must be a positive number of seconds",
                    ));
                }
            }
            if let KeyframeTarget::Section { opacity, .. } = keyframe.target {
                if !(0.0..=1.0).contains(&opacity) {
                    return Err(invalid(
                        &format!("keyframes[{index}].opacity"),
                        "must be within 0..=1",
                    ));
                }
            }
        }

        for (index, (swatch, _)) in self.binder.swatches.iter().enumerate() {
            if self.binder.swatches[..index].iter().any(|(s, _)| s == swatch) {
                return Err(invalid("binder.swatches", &format!("{swatch:?} listed twice")));
            }
        }
        Ok(())
    }
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

fn non_negative(field: &str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(field, "must be a finite, non-negative number"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::DeviceProfile;
    use crate::pipeline::Pipeline;

    #[test]
    fn test_default_config_is_valid() {
        let config = ConfiguratorConfig::default();
        assert!(config.validate().is_ok());
        assert!(Pipeline::new(config.pipeline.clone()).is_ok());
        assert_eq!(config.keyframes.len(), 5);
        assert_eq!(
            config.keyframes[1].trigger.end,
            "top 80%".parse::<TriggerOffset>().unwrap()
        );
    }

    #[test]
    fn test_empty_json_gives_defaults() {
        let config = ConfiguratorConfig::from_json_str("{}").unwrap();
        assert_eq!(config, ConfiguratorConfig::default());
    }

    #[test]
    fn test_json_round_trip_keeps_keyframes() {
        let config = ConfiguratorConfig::default();
        let json = config.to_json_pretty().unwrap();
        let parsed = ConfiguratorConfig::from_json_str(&json).unwrap();
        assert_eq!(parsed.keyframes, config.keyframes);
        assert_eq!(parsed.initial_pose, config.initial_pose);
    }

    #[test]
    fn test_partial_json_overrides() {
        let json = r#"{
            "asset_path": "models/other.glb",
            "initial_pose": {"position": [0, 0, 8], "target": [0, 0, 0]},
            "keyframes": [{
                "target": "position",
                "value": {"mobile": [1, 2, 3], "desktop": [4, 5, 6]},
                "trigger": {"trigger": ".second", "start": "top bottom", "end": "top top", "scrub": 0.5}
            }]
        }"#;
        let config = ConfiguratorConfig::from_json_str(json).unwrap();
        assert_eq!(config.asset_path, "models/other.glb");
        assert_eq!(config.material, "Drill_01");

        let start = config.initial_pose.resolve(DeviceProfile::Mobile);
        assert_eq!(start.to_pose().position, Point3::new(0.0, 0.0, 8.0));
        assert_eq!(start.fov, None);

        let keyframe = &config.keyframes[0];
        assert_eq!(keyframe.duration, 4.0);
        assert_eq!(keyframe.trigger.scrub, Scrub::Smoothed(0.5));
    }

    #[test]
    fn test_rejects_bad_values() {
        let err = ConfiguratorConfig::from_json_str(r#"{"asset_path": " "}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref field, .. } if field == "asset_path"));

        let err = ConfiguratorConfig::from_json_str(r#"{"reveal": {"duration": -1}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref field, .. } if field == "reveal.duration"));

        let bad_offset = r#"{"keyframes": [{"target": "target", "value": [0, 0, 0],
            "trigger": {"trigger": ".x", "start": "middle", "end": "top top", "scrub": true}}]}"#;
        assert!(matches!(
            ConfiguratorConfig::from_json_str(bad_offset),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn test_rejects_non_positive_scrub_lag() {
        let zero_lag = r#"{"keyframes": [{"target": "target", "value": [0, 0, 0],
            "trigger": {"trigger": ".x", "start": "top bottom", "end": "top top", "scrub": 0}}]}"#;
        assert!(matches!(
            ConfiguratorConfig::from_json_str(zero_lag),
            Err(ConfigError::Json(_))
        ));

        for lag in [0.0, -1.0, f32::NAN] {
            let mut config = ConfiguratorConfig::default();
            config.keyframes[2].trigger.scrub = Scrub::Smoothed(lag);
            let err = config.validate().unwrap_err();
            assert!(matches!(err, ConfigError::Invalid { ref field, .. } if field == "keyframes[2].scrub"));
        }
    }
}
