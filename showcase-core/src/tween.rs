/// Time-driven pose tweens with completion tokens
use nalgebra::Point3;
use std::fmt::Debug;

use crate::camera::PoseProperty;
use crate::easing::Ease;
use crate::surface::{RenderEngine, RenderSurfaceAdapter};

pub(crate) fn lerp(from: Point3<f32>, to: Point3<f32>, t: f32) -> Point3<f32> {
    if t >= 1.0 {
        return to;
    }
    from + (to - from) * t
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TweenSpec {
    pub property: PoseProperty,
    pub to: Point3<f32>,
    /// Seconds
    pub duration: f32,
    pub ease: Ease,
}

#[derive(Debug)]
struct PoseTween<C> {
    spec: TweenSpec,
    from: Point3<f32>,
    elapsed: f32,
    on_complete: Option<C>,
}

/// Runs at most one tween per pose property; starting another supersedes it
#[derive(Debug)]
pub struct TweenEngine<C> {
    active: Vec<PoseTween<C>>,
}

impl<C: Copy + Debug> TweenEngine<C> {
    pub fn new() -> Self {
        Self { active: Vec::new() }
    }

    /// Begin tweening from the property's current value. A running tween on
    /// the same property is dropped together with its completion.
    pub fn start<E: RenderEngine>(
        &mut self,
        surface: &RenderSurfaceAdapter<E>,
        spec: TweenSpec,
        on_complete: Option<C>,
    ) {
        if let Some(index) = self.active.iter().position(|t| t.spec.property == spec.property) {
            let superseded = self.active.remove(index);
            if let Some(completion) = superseded.on_complete {
                log::debug!(
                    "{:?} tween superseded, dropping completion {:?}",
                    spec.property,
                    completion
                );
            }
        }

        self.active.push(PoseTween {
            spec,
            from: surface.pose().get(spec.property),
            elapsed: 0.0,
            on_complete,
        });
    }

    /// Advance every tween by `dt` seconds, writing through the surface.
    /// Returns the completions of tweens that finished this tick.
    pub fn tick<E: RenderEngine>(&mut self, dt: f32, surface: &mut RenderSurfaceAdapter<E>) -> Vec<C> {
        let mut completed = Vec::new();

        self.active.retain_mut(|tween| {
            tween.elapsed += dt.max(0.0);
            let linear = if tween.spec.duration <= 0.0 {
                1.0
            } else {
                (tween.elapsed / tween.spec.duration).min(1.0)
            };
            let value = lerp(tween.from, tween.spec.to, tween.spec.ease.apply(linear));
            surface.set_property(tween.spec.property, value);

            if linear >= 1.0 {
                if let Some(completion) = tween.on_complete {
                    completed.push(completion);
                }
                false
            } else {
                true
            }
        });

        completed
    }

    pub fn is_animating(&self, property: PoseProperty) -> bool {
        self.active.iter().any(|t| t.spec.property == property)
    }

    pub fn is_idle(&self) -> bool {
        self.active.is_empty()
    }
}

impl<C: Copy + Debug> Default for TweenEngine<C> {
    fn default() -> Self {
        Self::new()
    }
}
