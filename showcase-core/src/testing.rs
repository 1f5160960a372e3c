/// In-memory engine and page doubles shared by the unit tests.
use std::collections::HashMap;

use crate::camera::CameraPose;
use crate::color::{LinearColor, Swatch};
use crate::error::{AssetLoadError, MissingElementError, PluginInitError};
use crate::geometry::MaterialId;
use crate::page::{selectors, Cursor, ElementRect, ElementStyle, Page};
use crate::pipeline::Plugin;
use crate::surface::RenderEngine;

pub const DRILL_MATERIAL: MaterialId = MaterialId(0);
pub const OTHER_MATERIAL: MaterialId = MaterialId(1);

/// Records every call so tests can assert on what reached the engine
#[derive(Debug, Default)]
pub struct FakeEngine {
    pub plugins: Vec<Plugin>,
    pub pipeline_refreshes: u32,
    /// `add_plugin` fails for the plugin with this name
    pub failing_plugin: Option<&'static str>,
    pub loaded_assets: Vec<String>,
    /// `load_asset` fails with this reason
    pub failing_asset: Option<&'static str>,
    pub materials: Vec<(&'static str, MaterialId)>,
    pub material_colors: HashMap<MaterialId, LinearColor>,
    pub controls_history: Vec<bool>,
    pub commits: Vec<CameraPose>,
    pub shadow_resets: u32,
    pub scene_dirty: u32,
    pub draws: u32,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self {
            materials: vec![("Drill_01", DRILL_MATERIAL), ("Chuck", OTHER_MATERIAL)],
            ..Self::default()
        }
    }
}

impl RenderEngine for FakeEngine {
    fn add_plugin(&mut self, plugin: &Plugin) -> Result<(), PluginInitError> {
        if self.failing_plugin == Some(plugin.name()) {
            return Err(PluginInitError {
                plugin: plugin.name().to_string(),
                reason: "rejected by fake engine".to_string(),
            });
        }
        self.plugins.push(*plugin);
        Ok(())
    }

    fn refresh_pipeline(&mut self) {
        self.pipeline_refreshes += 1;
    }

    fn load_asset(&mut self, path: &str) -> Result<(), AssetLoadError> {
        if let Some(reason) = self.failing_asset {
            return Err(AssetLoadError {
                path: path.to_string(),
                reason: reason.to_string(),
            });
        }
        self.loaded_assets.push(path.to_string());
        Ok(())
    }

    fn find_material(&self, name: &str) -> Option<MaterialId> {
        self.materials.iter().find(|(n, _)| *n == name).map(|(_, id)| *id)
    }

    fn set_material_color(&mut self, material: MaterialId, color: LinearColor) {
        self.material_colors.insert(material, color);
    }

    fn set_controls_enabled(&mut self, enabled: bool) {
        self.controls_history.push(enabled);
    }

    fn commit_camera(&mut self, pose: &CameraPose) {
        self.commits.push(pose.clone());
    }

    fn reset_shadows(&mut self) {
        self.shadow_resets += 1;
    }

    fn set_scene_dirty(&mut self) {
        self.scene_dirty += 1;
    }

    fn draw(&mut self) {
        self.draws += 1;
    }
}

#[derive(Debug, Clone)]
struct FakeElement {
    rect: ElementRect,
    visible: bool,
    pointer_events: bool,
    style: ElementStyle,
}

/// A page with fixed element boxes and instant scrolling
#[derive(Debug)]
pub struct FakePage {
    viewport_height: f32,
    elements: HashMap<String, FakeElement>,
    pub scroll_y: f32,
    pub scroll_requests: Vec<(f32, bool)>,
    pub cursor: Cursor,
    pub scroll_locked: bool,
    pub scroll_lock_changes: u32,
}

impl FakePage {
    pub fn new(viewport_height: f32) -> Self {
        Self {
            viewport_height,
            elements: HashMap::new(),
            scroll_y: 0.0,
            scroll_requests: Vec::new(),
            cursor: Cursor::Default,
            scroll_locked: false,
            scroll_lock_changes: 0,
        }
    }

    /// The drill page: hero, two scroll sections and every control
    pub fn showcase() -> Self {
        let mut page = Self::new(800.0);
        page.add_element(selectors::SECTIONS, 0.0, 3000.0);
        page.add_element(selectors::SECTION_ONE, 0.0, 1000.0);
        page.add_element(selectors::SECOND_SECTION, 1000.0, 1000.0);
        page.add_element(selectors::THIRD_SECTION, 2000.0, 1000.0);
        page.add_element(selectors::CANVAS_CONTAINER, 0.0, 800.0);
        page.add_element(selectors::CUSTOMIZER, 700.0, 80.0);
        page.add_element(selectors::PROGRESS, 0.0, 4.0);
        page.add_element(selectors::LOADER, 0.0, 800.0);
        page.add_element(selectors::LOADER_RETRY, 400.0, 40.0);
        for selector in [
            selectors::HERO_BUTTON,
            selectors::FOOTER_BUTTON,
            selectors::CUSTOMIZE_BUTTON,
            selectors::EXIT_BUTTON,
        ] {
            page.add_element(selector, 600.0, 40.0);
        }
        for swatch in Swatch::ALL {
            page.add_element(swatch.selector(), 720.0, 40.0);
        }
        page
    }

    pub fn add_element(&mut self, selector: &str, top: f32, height: f32) {
        self.elements.insert(
            selector.to_string(),
            FakeElement {
                rect: ElementRect { top, height },
                visible: true,
                pointer_events: false,
                style: ElementStyle::IDENTITY,
            },
        );
    }

    pub fn style(&self, selector: &str) -> Option<ElementStyle> {
        self.elements.get(selector).map(|e| e.style)
    }

    pub fn visible(&self, selector: &str) -> Option<bool> {
        self.elements.get(selector).map(|e| e.visible)
    }

    pub fn pointer_events(&self, selector: &str) -> Option<bool> {
        self.elements.get(selector).map(|e| e.pointer_events)
    }

    fn element_mut(&mut self, selector: &str) -> Result<&mut FakeElement, MissingElementError> {
        self.elements
            .get_mut(selector)
            .ok_or_else(|| MissingElementError::new(selector))
    }
}

impl Page for FakePage {
    fn element_rect(&self, selector: &str) -> Option<ElementRect> {
        self.elements.get(selector).map(|e| e.rect)
    }

    fn viewport_height(&self) -> f32 {
        self.viewport_height
    }

    fn scroll_y(&self) -> f32 {
        self.scroll_y
    }

    fn scroll_to(&mut self, y: f32, smooth: bool) {
        self.scroll_requests.push((y, smooth));
        self.scroll_y = y;
    }

    fn set_visible(&mut self, selector: &str, visible: bool) -> Result<(), MissingElementError> {
        self.element_mut(selector)?.visible = visible;
        Ok(())
    }

    fn set_pointer_events(&mut self, selector: &str, enabled: bool) -> Result<(), MissingElementError> {
        self.element_mut(selector)?.pointer_events = enabled;
        Ok(())
    }

    fn set_style(&mut self, selector: &str, style: ElementStyle) -> Result<(), MissingElementError> {
        self.element_mut(selector)?.style = style;
        Ok(())
    }

    fn set_cursor(&mut self, cursor: Cursor) {
        self.cursor = cursor;
    }

    fn set_scroll_locked(&mut self, locked: bool) {
        self.scroll_locked = locked;
        self.scroll_lock_changes += 1;
    }
}
