/// ASCII rasterizer acting as the showcase's render engine
use crossterm::{
    cursor::MoveTo,
    style::{Color, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use nalgebra::{Point3, Unit, UnitQuaternion, Vector3};
use showcase_core::error::{AssetLoadError, PluginInitError};
use showcase_core::{Camera, CameraPose, ImporterEvent, LinearColor, MaterialId, Mesh, Plugin, RenderEngine, SrgbColor, Triangle};
use std::io::Write;

use crate::importer::{DrillImporter, DRILL_MATERIALS};

/// Character luminosity ramp for shading (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Asset formats the importer pretends to understand
const SUPPORTED_EXTENSIONS: &[&str] = &["glb", "gltf"];

#[derive(Debug, Clone)]
struct MaterialSlot {
    name: String,
    color: LinearColor,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Cell {
    character: char,
    material: Option<MaterialId>,
}

const EMPTY: Cell = Cell {
    character: ' ',
    material: None,
};

/// Rasterizes the loaded model into a character grid
pub struct AsciiRenderer {
    width: usize,
    height: usize,
    depth_buffer: Vec<f32>,
    cells: Vec<Cell>,
    camera: Camera,
    scene: Mesh,
    materials: Vec<MaterialSlot>,
    plugins: Vec<Plugin>,
    importer: Option<DrillImporter>,
    controls_enabled: bool,
    /// Progressive samples accumulated since the last shadow reset
    samples: u32,
    needs_redraw: bool,
    frames_drawn: u64,
}

impl AsciiRenderer {
    pub fn new(width: usize, height: usize) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            depth_buffer: vec![f32::INFINITY; size],
            cells: vec![EMPTY; size],
            camera: Camera::new(width as u32, (height * 2) as u32),
            scene: Mesh::new(),
            materials: DRILL_MATERIALS
                .iter()
                .map(|(name, hex)| MaterialSlot {
                    name: name.to_string(),
                    color: SrgbColor(*hex).to_linear(),
                })
                .collect(),
            plugins: Vec::new(),
            importer: None,
            controls_enabled: true,
            samples: 0,
            needs_redraw: true,
            frames_drawn: 0,
        }
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        let size = width * height;
        self.width = width;
        self.height = height;
        self.depth_buffer = vec![f32::INFINITY; size];
        self.cells = vec![EMPTY; size];
        // Terminal cells are about twice as tall as they are wide
        self.camera.resize(width as u32, (height * 2) as u32);
        self.needs_redraw = true;
    }

    /// Advance the running import by one part, returning the event it produced
    pub fn poll_importer(&mut self) -> Option<ImporterEvent> {
        let importer = self.importer.as_mut()?;
        let (part, event) = importer.poll();
        if let Some(part) = part {
            self.scene.append(part);
            self.needs_redraw = true;
        }
        if event == ImporterEvent::Loaded {
            log::info!("imported {} ({} triangles)", importer.path(), self.scene.triangles.len());
            self.importer = None;
        }
        Some(event)
    }

    /// Orbit the camera around its target, like dragging on the canvas
    pub fn orbit(&mut self, yaw: f32, pitch: f32) -> bool {
        if !self.controls_enabled {
            return false;
        }
        let target = self.camera.pose.target;
        let offset = self.camera.pose.position - target;
        let right = offset.cross(&self.camera.up);
        let mut rotation = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), yaw);
        if let Some(axis) = Unit::try_new(right, 1e-6) {
            rotation = rotation * UnitQuaternion::from_axis_angle(&axis, pitch);
        }
        self.camera.pose.position = target + rotation * offset;
        self.reset_shadows();
        self.needs_redraw = true;
        true
    }

    pub fn camera_position(&self) -> Point3<f32> {
        self.camera.pose.position
    }

    pub fn plugins(&self) -> &[Plugin] {
        &self.plugins
    }

    pub fn samples(&self) -> u32 {
        self.samples
    }

    pub fn controls_enabled(&self) -> bool {
        self.controls_enabled
    }

    pub fn is_importing(&self) -> bool {
        self.importer.is_some()
    }

    pub fn frames_drawn(&self) -> u64 {
        self.frames_drawn
    }

    fn progressive_frames(&self) -> u32 {
        self.plugins
            .iter()
            .find_map(|plugin| match plugin {
                Plugin::Progressive { frames } => Some(*frames),
                _ => None,
            })
            .unwrap_or(1)
    }

    fn tonemapped(&self) -> bool {
        self.plugins
            .iter()
            .any(|plugin| matches!(plugin, Plugin::Tonemap { enabled: true }))
    }

    fn material_color(&self, material: MaterialId) -> LinearColor {
        self.materials
            .get(material.0)
            .map(|slot| slot.color)
            .unwrap_or(LinearColor::WHITE)
    }

    fn clear(&mut self) {
        self.depth_buffer.fill(f32::INFINITY);
        self.cells.fill(EMPTY);
    }

    fn rasterize_scene(&mut self) {
        self.clear();
        let triangles = std::mem::take(&mut self.scene.triangles);
        for triangle in &triangles {
            self.render_triangle(triangle);
        }
        self.scene.triangles = triangles;
    }

    fn render_triangle(&mut self, triangle: &Triangle) {
        // Project vertices to screen space, rows at half resolution
        let mut screen_coords = [(0.0, 0.0, 0.0); 3];
        for (slot, vertex) in screen_coords.iter_mut().zip(&triangle.vertices) {
            match self.camera.project_to_screen(
                &vertex.position,
                self.width as u32,
                (self.height * 2) as u32,
            ) {
                Some((x, y, z)) => *slot = (x, y * 0.5, z),
                None => return,
            }
        }

        // Headlight: faces turned towards the camera are brightest
        let normal = triangle.calculate_normal();
        let light_dir = (self.camera.pose.position - self.camera.pose.target).normalize();
        let lambert = normal.dot(&light_dir).max(0.0);

        let mut luminance = self.material_color(triangle.material).luminance();
        if self.tonemapped() {
            luminance = luminance / (1.0 + luminance) * 2.0;
        }
        let shade = (0.25 + 0.75 * lambert) * (0.3 + 0.7 * luminance.sqrt());

        // Covered cells never use the blank character
        let steps = (LUMINOSITY_RAMP.len() - 2) as f32;
        let char_index = 1 + (shade.clamp(0.0, 1.0) * steps).round() as usize;
        let cell = Cell {
            character: LUMINOSITY_RAMP[char_index.min(LUMINOSITY_RAMP.len() - 1)],
            material: Some(triangle.material),
        };

        self.rasterize_triangle(&screen_coords, cell);
    }

    fn rasterize_triangle(&mut self, coords: &[(f32, f32, f32); 3], cell: Cell) {
        let (v0, v1, v2) = (coords[0], coords[1], coords[2]);

        let min_x = (v0.0.min(v1.0).min(v2.0).floor() as i32).max(0);
        let max_x = (v0.0.max(v1.0).max(v2.0).ceil() as i32).min(self.width as i32 - 1);
        let min_y = (v0.1.min(v1.1).min(v2.1).floor() as i32).max(0);
        let max_y = (v0.1.max(v1.1).max(v2.1).ceil() as i32).min(self.height as i32 - 1);

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let p = (x as f32 + 0.5, y as f32 + 0.5);
                let Some((w0, w1, w2)) = barycentric((v0.0, v0.1), (v1.0, v1.1), (v2.0, v2.1), p) else {
                    continue;
                };
                if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                    continue;
                }
                let depth = w0 * v0.2 + w1 * v1.2 + w2 * v2.2;
                let idx = y as usize * self.width + x as usize;
                if depth < self.depth_buffer[idx] {
                    self.depth_buffer[idx] = depth;
                    self.cells[idx] = cell;
                }
            }
        }
    }

    pub fn covered_cells(&self) -> usize {
        self.cells.iter().filter(|cell| cell.material.is_some()).count()
    }

    /// Write the last drawn frame to the terminal
    pub fn present<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        for y in 0..self.height {
            writer.queue(MoveTo(0, y as u16))?;
            let mut current: Option<Color> = None;
            for x in 0..self.width {
                let cell = self.cells[y * self.width + x];
                let color = match cell.material {
                    Some(material) => terminal_color(self.material_color(material)),
                    None => Color::DarkGrey,
                };
                if current != Some(color) {
                    writer.queue(SetForegroundColor(color))?;
                    current = Some(color);
                }
                writer.queue(Print(cell.character))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

impl RenderEngine for AsciiRenderer {
    fn add_plugin(&mut self, plugin: &Plugin) -> Result<(), PluginInitError> {
        if let Plugin::Progressive { frames: 0 } = plugin {
            return Err(PluginInitError {
                plugin: plugin.name().to_string(),
                reason: "needs at least one frame".to_string(),
            });
        }
        log::debug!("plugin {} added", plugin.name());
        self.plugins.push(*plugin);
        Ok(())
    }

    fn refresh_pipeline(&mut self) {
        log::debug!(
            "pipeline: {}",
            self.plugins.iter().map(|p| p.name()).collect::<Vec<_>>().join(" -> ")
        );
        self.needs_redraw = true;
    }

    fn load_asset(&mut self, path: &str) -> Result<(), AssetLoadError> {
        let extension = path.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase());
        match extension {
            Some(ext) if SUPPORTED_EXTENSIONS.contains(&ext.as_str()) => {
                self.scene = Mesh::new();
                self.importer = Some(DrillImporter::new(path));
                Ok(())
            }
            _ => Err(AssetLoadError {
                path: path.to_string(),
                reason: format!("unsupported format, expected one of {:?}", SUPPORTED_EXTENSIONS),
            }),
        }
    }

    fn find_material(&self, name: &str) -> Option<MaterialId> {
        self.materials
            .iter()
            .position(|slot| slot.name == name)
            .map(MaterialId)
    }

    fn set_material_color(&mut self, material: MaterialId, color: LinearColor) {
        match self.materials.get_mut(material.0) {
            Some(slot) => slot.color = color,
            None => log::warn!("no material slot {:?}", material),
        }
    }

    fn set_controls_enabled(&mut self, enabled: bool) {
        self.controls_enabled = enabled;
    }

    fn commit_camera(&mut self, pose: &CameraPose) {
        self.camera.apply_pose(pose);
        self.needs_redraw = true;
    }

    fn reset_shadows(&mut self) {
        self.samples = 0;
    }

    fn set_scene_dirty(&mut self) {
        self.needs_redraw = true;
    }

    fn draw(&mut self) {
        let frames = self.progressive_frames();
        if self.samples < frames {
            self.samples += 1;
        }
        if !self.needs_redraw {
            return;
        }
        self.rasterize_scene();
        self.needs_redraw = false;
        self.frames_drawn += 1;
    }
}

/// Approximate a linear color in the terminal's sRGB palette
fn terminal_color(color: LinearColor) -> Color {
    let encode = |c: f32| (c.clamp(0.0, 1.0).powf(1.0 / 2.2) * 255.0).round() as u8;
    Color::Rgb {
        r: encode(color.r).max(60),
        g: encode(color.g).max(60),
        b: encode(color.b).max(60),
    }
}

/// Calculate barycentric coordinates for a point in a triangle
fn barycentric(v0: (f32, f32), v1: (f32, f32), v2: (f32, f32), p: (f32, f32)) -> Option<(f32, f32, f32)> {
    let denom = (v1.1 - v2.1) * (v0.0 - v2.0) + (v2.0 - v1.0) * (v0.1 - v2.1);

    if denom.abs() < 1e-6 {
        return None;
    }

    let w0 = ((v1.1 - v2.1) * (p.0 - v2.0) + (v2.0 - v1.0) * (p.1 - v2.1)) / denom;
    let w1 = ((v2.1 - v0.1) * (p.0 - v2.0) + (v0.0 - v2.0) * (p.1 - v2.1)) / denom;
    let w2 = 1.0 - w0 - w1;

    Some((w0, w1, w2))
}
