/// Render engine boundary and the adapter that owns the camera pose.
///
/// The adapter is the only owner of [`CameraPose`]. Timelines, tweens and UI
/// handlers borrow it mutably for the duration of a call and write through
/// [`RenderSurfaceAdapter::set_property`], which marks the frame gate dirty.
/// The pose reaches the engine once per frame inside [`PreFrame`].
use nalgebra::Point3;

use crate::camera::{CameraPose, PoseProperty};
use crate::color::LinearColor;
use crate::error::{AssetLoadError, PluginInitError};
use crate::events::SubscriptionHandle;
use crate::gate::FrameInvalidationGate;
use crate::geometry::MaterialId;
use crate::pipeline::Plugin;

/// The opaque viewer the showcase drives
pub trait RenderEngine {
    fn add_plugin(&mut self, plugin: &Plugin) -> Result<(), PluginInitError>;

    /// Rebuild passes after the plugin set changed
    fn refresh_pipeline(&mut self);

    /// Start loading a model; progress arrives later as importer events
    fn load_asset(&mut self, path: &str) -> Result<(), AssetLoadError>;

    fn find_material(&self, name: &str) -> Option<MaterialId>;

    fn set_material_color(&mut self, material: MaterialId, color: LinearColor);

    /// Orbit controls on the canvas
    fn set_controls_enabled(&mut self, enabled: bool);

    /// Push position, target and fov, recomputing camera matrices
    fn commit_camera(&mut self, pose: &CameraPose);

    /// Throw away accumulated shadow maps and progressive samples
    fn reset_shadows(&mut self);

    /// Request a re-render for non-camera scene changes
    fn set_scene_dirty(&mut self);

    fn draw(&mut self);
}

/// Handed to pre-frame hooks; the only place a pose can be committed
pub struct PreFrame<'a, E: RenderEngine> {
    engine: &'a mut E,
    pose: &'a CameraPose,
    gate: &'a mut FrameInvalidationGate,
    frame: u64,
}

impl<'a, E: RenderEngine> PreFrame<'a, E> {
    pub fn pose(&self) -> &CameraPose {
        self.pose
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn is_dirty(&self) -> bool {
        self.gate.is_dirty()
    }

    /// Push the pose if anything changed since the last commit. Idempotent.
    pub fn commit_pose(&mut self) -> bool {
        if !self.gate.take_and_clear() {
            return false;
        }
        self.engine.reset_shadows();
        self.engine.commit_camera(self.pose);
        log::trace!(
            "frame {}: committed camera at {:?} -> {:?}",
            self.frame,
            self.pose.position,
            self.pose.target
        );
        true
    }
}

pub type PreFrameHook<E> = Box<dyn FnMut(&mut PreFrame<'_, E>)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameReport {
    pub frame: u64,
    pub committed: bool,
}

pub struct RenderSurfaceAdapter<E: RenderEngine> {
    engine: E,
    pose: CameraPose,
    gate: FrameInvalidationGate,
    hooks: Vec<(SubscriptionHandle, PreFrameHook<E>)>,
    next_hook: u64,
    frame: u64,
    controls_enabled: bool,
}

impl<E: RenderEngine> RenderSurfaceAdapter<E> {
    pub fn new(engine: E, pose: CameraPose) -> Self {
        Self {
            engine,
            pose,
            gate: FrameInvalidationGate::new(),
            hooks: Vec::new(),
            next_hook: 0,
            frame: 0,
            controls_enabled: true,
        }
    }

    /// The live pose; it changes as timelines and tweens write to it
    pub fn pose(&self) -> &CameraPose {
        &self.pose
    }

    pub fn set_property(&mut self, property: PoseProperty, value: Point3<f32>) {
        self.pose.set(property, value);
        self.gate.mark_dirty();
    }

    /// Replace the whole pose, used for the initial device pose
    pub fn set_pose(&mut self, pose: CameraPose) {
        self.pose = pose;
        self.gate.mark_dirty();
    }

    pub fn set_fov(&mut self, fov: Option<f32>) {
        self.pose.fov = fov;
        self.gate.mark_dirty();
    }

    pub fn mark_dirty(&mut self) {
        self.gate.mark_dirty();
    }

    pub fn gate(&self) -> &FrameInvalidationGate {
        &self.gate
    }

    pub fn on_pre_frame<F>(&mut self, hook: F) -> SubscriptionHandle
    where
        F: FnMut(&mut PreFrame<'_, E>) + 'static,
    {
        let handle = SubscriptionHandle::from_raw(self.next_hook);
        self.next_hook += 1;
        self.hooks.push((handle, Box::new(hook)));
        handle
    }

    pub fn remove_pre_frame(&mut self, handle: SubscriptionHandle) -> bool {
        let before = self.hooks.len();
        self.hooks.retain(|(h, _)| *h != handle);
        before != self.hooks.len()
    }

    /// Run pre-frame hooks, commit the pose if it is owed, then draw
    pub fn render_frame(&mut self) -> FrameReport {
        self.frame += 1;

        let mut pre_frame = PreFrame {
            engine: &mut self.engine,
            pose: &self.pose,
            gate: &mut self.gate,
            frame: self.frame,
        };
        let mut committed = false;
        for (_, hook) in self.hooks.iter_mut() {
            let was_dirty = pre_frame.is_dirty();
            hook(&mut pre_frame);
            committed |= was_dirty && !pre_frame.is_dirty();
        }
        committed |= pre_frame.commit_pose();

        self.engine.draw();

        FrameReport {
            frame: self.frame,
            committed,
        }
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn controls_enabled(&self) -> bool {
        self.controls_enabled
    }

    pub fn set_controls_enabled(&mut self, enabled: bool) {
        if self.controls_enabled != enabled {
            log::debug!("camera controls {}", if enabled { "enabled" } else { "disabled" });
        }
        self.controls_enabled = enabled;
        self.engine.set_controls_enabled(enabled);
    }

    /// Recolor a material and ask for a re-render
    pub fn set_material_color(&mut self, material: MaterialId, color: LinearColor) {
        self.engine.set_material_color(material, color);
        self.engine.set_scene_dirty();
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }
}
