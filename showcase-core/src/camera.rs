/// Camera pose and projection utilities
use nalgebra::{Matrix4, Point3, Vector3};
use serde::{Deserialize, Serialize};

/// The animatable half of a camera: where it sits and what it looks at
#[derive(Debug, Clone, PartialEq)]
pub struct CameraPose {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    /// Vertical field of view in degrees, `None` keeps the engine default
    pub fov: Option<f32>,
}

impl CameraPose {
    pub fn new(position: Point3<f32>, target: Point3<f32>) -> Self {
        Self {
            position,
            target,
            fov: None,
        }
    }

    pub fn get(&self, property: PoseProperty) -> Point3<f32> {
        match property {
            PoseProperty::Position => self.position,
            PoseProperty::Target => self.target,
        }
    }

    /// Write one property, returning whether the value actually changed
    pub fn set(&mut self, property: PoseProperty, value: Point3<f32>) -> bool {
        let slot = match property {
            PoseProperty::Position => &mut self.position,
            PoseProperty::Target => &mut self.target,
        };
        let changed = *slot != value;
        *slot = value;
        changed
    }
}

impl Default for CameraPose {
    fn default() -> Self {
        Self::new(Point3::new(0.0, 0.0, 5.0), Point3::origin())
    }
}

/// Pose properties a keyframe or tween can drive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PoseProperty {
    Position,
    Target,
}

/// Camera configuration for 3D rendering
pub struct Camera {
    pub pose: CameraPose,
    pub up: Vector3<f32>,
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pose: CameraPose::default(),
            up: Vector3::new(0.0, 1.0, 0.0),
            fov: std::f32::consts::PI / 4.0, // 45 degrees
            aspect: width as f32 / height.max(1) as f32,
            near: 0.1,
            far: 100.0,
        }
    }

    /// Copy a committed pose into the camera, picking up its field of view
    pub fn apply_pose(&mut self, pose: &CameraPose) {
        self.pose.position = pose.position;
        self.pose.target = pose.target;
        if let Some(fov) = pose.fov {
            self.fov = fov.to_radians();
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height.max(1) as f32;
    }

    /// Create the view matrix (camera transformation)
    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(&self.pose.position, &self.pose.target, &self.up)
    }

    /// Create the perspective projection matrix
    pub fn projection_matrix(&self) -> Matrix4<f32> {
        Matrix4::new_perspective(self.aspect, self.fov, self.near, self.far)
    }

    /// Project a world-space point to screen space, `None` when it falls outside the view
    pub fn project_to_screen(
        &self,
        point: &Point3<f32>,
        width: u32,
        height: u32,
    ) -> Option<(f32, f32, f32)> {
        let view_projection = self.projection_matrix() * self.view_matrix();
        let clip = view_projection * point.to_homogeneous();

        // Behind the camera or degenerate
        if clip.w <= 1e-6 {
            return None;
        }

        let ndc_x = clip.x / clip.w;
        let ndc_y = clip.y / clip.w;
        let depth = clip.z / clip.w;

        if !(-1.0..=1.0).contains(&ndc_x) || !(-1.0..=1.0).contains(&ndc_y) {
            return None;
        }

        let screen_x = (ndc_x + 1.0) * 0.5 * width as f32;
        let screen_y = (1.0 - ndc_y) * 0.5 * height as f32;

        Some((screen_x, screen_y, depth))
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(800, 600)
    }
}
