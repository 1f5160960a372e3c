/// Scroll-synchronized camera timeline.
///
/// Each keyframe owns a scroll region on the page and moves one target
/// (camera position, camera target, or an overlay section) from the value
/// the previous keyframe on that target left behind to its own value.
/// Regions may overlap; keyframes on different targets then move together.
use nalgebra::Point3;
use serde::{Deserialize, Serialize};

use crate::camera::{CameraPose, PoseProperty};
use crate::device::{DeviceProfile, DeviceValue};
use crate::page::{warn_missing, ElementStyle, Page};
use crate::surface::{RenderEngine, RenderSurfaceAdapter};
use crate::trigger::{ResolvedTrigger, Scrub, ScrollTriggerSpec};
use crate::tween::lerp;

/// Smoothed progress this close to its goal snaps onto it
const SMOOTHING_SNAP: f32 = 1e-4;

/// What a keyframe animates, as written in config
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "target", rename_all = "snake_case")]
pub enum KeyframeTarget {
    Position {
        value: DeviceValue<[f32; 3]>,
    },
    Target {
        value: DeviceValue<[f32; 3]>,
    },
    /// Slide and fade an overlay section
    Section {
        selector: String,
        x_percent: f32,
        opacity: f32,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyframeSpec {
    #[serde(flatten)]
    pub target: KeyframeTarget,
    /// Nominal length in timeline seconds; scroll-bound progress spans the whole region
    #[serde(default = "default_duration")]
    pub duration: f32,
    pub trigger: ScrollTriggerSpec,
}

fn default_duration() -> f32 {
    4.0
}

#[derive(Debug, Clone, PartialEq)]
enum Track {
    Pose {
        property: PoseProperty,
        from: Point3<f32>,
        to: Point3<f32>,
    },
    Section {
        selector: String,
        from: ElementStyle,
        to: ElementStyle,
    },
}

/// A keyframe with device values resolved and start values fixed
#[derive(Debug, Clone)]
pub struct Keyframe {
    track: Track,
    trigger: ScrollTriggerSpec,
    region: Option<ResolvedTrigger>,
    progress: f32,
    written: f32,
    reported_missing: bool,
}

impl Keyframe {
    /// End value for pose keyframes
    pub fn pose_value(&self) -> Option<(PoseProperty, Point3<f32>)> {
        match &self.track {
            Track::Pose { property, to, .. } => Some((*property, *to)),
            Track::Section { .. } => None,
        }
    }

    pub fn region(&self) -> Option<ResolvedTrigger> {
        self.region
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }
}

pub struct ScrollCameraTimeline {
    keyframes: Vec<Keyframe>,
    last_scroll: Option<f32>,
}

impl ScrollCameraTimeline {
    /// Resolve device values and chain start values in declaration order
    pub fn new(specs: &[KeyframeSpec], profile: DeviceProfile, initial: &CameraPose) -> Self {
        let mut position = initial.position;
        let mut target = initial.target;
        let mut sections: Vec<(String, ElementStyle)> = Vec::new();

        let keyframes = specs
            .iter()
            .map(|spec| {
                let track = match &spec.target {
                    KeyframeTarget::Position { value } => {
                        let to = point(value.resolve(profile));
                        let from = std::mem::replace(&mut position, to);
                        Track::Pose {
                            property: PoseProperty::Position,
                            from,
                            to,
                        }
                    }
                    KeyframeTarget::Target { value } => {
                        let to = point(value.resolve(profile));
                        let from = std::mem::replace(&mut target, to);
                        Track::Pose {
                            property: PoseProperty::Target,
                            from,
                            to,
                        }
                    }
                    KeyframeTarget::Section {
                        selector,
                        x_percent,
                        opacity,
                    } => {
                        let to = ElementStyle {
                            x_percent: *x_percent,
                            opacity: *opacity,
                            ..ElementStyle::IDENTITY
                        };
                        let from = match sections.iter_mut().find(|(s, _)| s == selector) {
                            Some((_, last)) => std::mem::replace(last, to),
                            None => {
                                sections.push((selector.clone(), to));
                                ElementStyle::IDENTITY
                            }
                        };
                        Track::Section {
                            selector: selector.clone(),
                            from,
                            to,
                        }
                    }
                };
                Keyframe {
                    track,
                    trigger: spec.trigger.clone(),
                    region: None,
                    progress: 0.0,
                    written: 0.0,
                    reported_missing: false,
                }
            })
            .collect();

        Self {
            keyframes,
            last_scroll: None,
        }
    }

    /// Recompute trigger regions from the current layout. Keyframes whose
    /// trigger element is missing stay inert.
    pub fn refresh<P: Page + ?Sized>(&mut self, page: &P) {
        for keyframe in &mut self.keyframes {
            match keyframe.trigger.resolve(page) {
                Ok(region) => {
                    keyframe.region = Some(region);
                    keyframe.reported_missing = false;
                }
                Err(err) => {
                    if !keyframe.reported_missing {
                        log::warn!("{err}, scroll keyframe disabled");
                        keyframe.reported_missing = true;
                    }
                    keyframe.region = None;
                }
            }
        }
    }

    /// Follow the scroll position. `dt` advances smoothed keyframes; pass 0
    /// for pure scroll events. Returns how many keyframes wrote a value.
    pub fn update<E, P>(
        &mut self,
        scroll_y: f32,
        dt: f32,
        surface: &mut RenderSurfaceAdapter<E>,
        page: &mut P,
    ) -> usize
    where
        E: RenderEngine,
        P: Page + ?Sized,
    {
        let forward = scroll_y >= self.last_scroll.unwrap_or(scroll_y);
        self.last_scroll = Some(scroll_y);

        for keyframe in &mut self.keyframes {
            let Some(region) = keyframe.region else {
                continue;
            };
            let goal = region.progress(scroll_y);
            keyframe.progress = match keyframe.trigger.scrub {
                Scrub::Exact => goal,
                Scrub::Smoothed(lag) => {
                    let step = keyframe.progress + (goal - keyframe.progress) * (dt / lag).min(1.0);
                    if (goal - step).abs() < SMOOTHING_SNAP {
                        goal
                    } else {
                        step
                    }
                }
            };
        }

        // Walking backwards in reverse order lets earlier keyframes have the
        // last word, so a jump lands where scrolling through would have.
        let order: Vec<usize> = if forward {
            (0..self.keyframes.len()).collect()
        } else {
            (0..self.keyframes.len()).rev().collect()
        };

        let mut writes = 0;
        for index in order {
            let keyframe = &mut self.keyframes[index];
            if keyframe.region.is_none() || keyframe.progress == keyframe.written {
                continue;
            }
            keyframe.written = keyframe.progress;
            writes += 1;

            let t = keyframe.progress;
            match &keyframe.track {
                Track::Pose { property, from, to } => {
                    surface.set_property(*property, lerp(*from, *to, t));
                }
                Track::Section { selector, from, to } => {
                    let style = ElementStyle {
                        x_percent: from.x_percent + (to.x_percent - from.x_percent) * t,
                        scale_x: from.scale_x + (to.scale_x - from.scale_x) * t,
                        opacity: from.opacity + (to.opacity - from.opacity) * t,
                    };
                    warn_missing(page.set_style(selector, style));
                }
            }
        }
        writes
    }

    /// Whether smoothed keyframes are still catching up with the scroll position
    pub fn is_settling(&self) -> bool {
        let Some(scroll_y) = self.last_scroll else {
            return false;
        };
        self.keyframes.iter().any(|k| match k.region {
            Some(region) => (region.progress(scroll_y) - k.progress).abs() > 0.0,
            None => false,
        })
    }

    /// Displayed progress of one keyframe
    pub fn progress(&self, index: usize) -> Option<f32> {
        self.keyframes.get(index).map(Keyframe::progress)
    }

    pub fn keyframes(&self) -> &[Keyframe] {
        &self.keyframes
    }

    pub fn len(&self) -> usize {
        self.keyframes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keyframes.is_empty()
    }
}

fn point(v: [f32; 3]) -> Point3<f32> {
    Point3::new(v[0], v[1], v[2])
}
