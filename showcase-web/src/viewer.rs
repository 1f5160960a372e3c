/// The page's JavaScript 3D viewer, driven through a thin imported interface
use showcase_core::error::{AssetLoadError, PluginInitError};
use showcase_core::{CameraPose, LinearColor, MaterialId, Plugin, RenderEngine};
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    /// Viewer object handed over by the page script
    pub type JsViewer;

    #[wasm_bindgen(method, catch, js_name = addPlugin)]
    fn add_plugin(this: &JsViewer, name: &str, options: &JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(method, js_name = refreshPipeline)]
    fn refresh_pipeline(this: &JsViewer);

    /// Starts an import; progress comes back through the importer exports
    #[wasm_bindgen(method, catch, js_name = loadAsset)]
    fn load_asset(this: &JsViewer, path: &str) -> Result<(), JsValue>;

    /// Material index, or a negative number when there is none
    #[wasm_bindgen(method, js_name = findMaterial)]
    fn find_material(this: &JsViewer, name: &str) -> i32;

    #[wasm_bindgen(method, js_name = setMaterialColor)]
    fn set_material_color(this: &JsViewer, material: u32, r: f32, g: f32, b: f32);

    #[wasm_bindgen(method, js_name = setControlsEnabled)]
    fn set_controls_enabled(this: &JsViewer, enabled: bool);

    /// Position and target as `[x, y, z]`, fov in degrees; recomputes camera matrices
    #[wasm_bindgen(method, js_name = setCamera)]
    fn set_camera(this: &JsViewer, position: &[f32], target: &[f32], fov: Option<f32>);

    #[wasm_bindgen(method, js_name = resetShadows)]
    fn reset_shadows(this: &JsViewer);

    #[wasm_bindgen(method, js_name = setDirty)]
    fn set_dirty(this: &JsViewer);

    #[wasm_bindgen(method, js_name = requestRender)]
    fn request_render(this: &JsViewer);
}

/// Best-effort text of a thrown JS value
pub fn js_error_message(value: &JsValue) -> String {
    if let Some(text) = value.as_string() {
        return text;
    }
    if let Ok(message) = js_sys::Reflect::get(value, &JsValue::from_str("message")) {
        if let Some(text) = message.as_string() {
            return text;
        }
    }
    format!("{:?}", value)
}

/// Plugin options as a plain JS object
fn plugin_options(plugin: &Plugin) -> JsValue {
    let options = js_sys::Object::new();
    let entry = match plugin {
        Plugin::Progressive { frames } => Some(("frames", JsValue::from(*frames))),
        Plugin::Tonemap { enabled } => Some(("enabled", JsValue::from_bool(*enabled))),
        _ => None,
    };
    if let Some((key, value)) = entry {
        // Setting a property on a fresh plain object cannot fail
        let _ = js_sys::Reflect::set(&options, &JsValue::from_str(key), &value);
    }
    options.into()
}

pub struct ViewerEngine {
    viewer: JsViewer,
}

impl ViewerEngine {
    pub fn new(viewer: JsViewer) -> Self {
        Self { viewer }
    }
}

impl RenderEngine for ViewerEngine {
    fn add_plugin(&mut self, plugin: &Plugin) -> Result<(), PluginInitError> {
        self.viewer
            .add_plugin(plugin.name(), &plugin_options(plugin))
            .map_err(|err| PluginInitError {
                plugin: plugin.name().to_string(),
                reason: js_error_message(&err),
            })
    }

    fn refresh_pipeline(&mut self) {
        self.viewer.refresh_pipeline();
    }

    fn load_asset(&mut self, path: &str) -> Result<(), AssetLoadError> {
        self.viewer.load_asset(path).map_err(|err| AssetLoadError {
            path: path.to_string(),
            reason: js_error_message(&err),
        })
    }

    fn find_material(&self, name: &str) -> Option<MaterialId> {
        let index = self.viewer.find_material(name);
        (index >= 0).then(|| MaterialId(index as usize))
    }

    fn set_material_color(&mut self, material: MaterialId, color: LinearColor) {
        self.viewer
            .set_material_color(material.0 as u32, color.r, color.g, color.b);
    }

    fn set_controls_enabled(&mut self, enabled: bool) {
        self.viewer.set_controls_enabled(enabled);
    }

    fn commit_camera(&mut self, pose: &CameraPose) {
        let (p, t) = (pose.position, pose.target);
        self.viewer.set_camera(&[p.x, p.y, p.z], &[t.x, t.y, t.z], pose.fov);
    }

    fn reset_shadows(&mut self) {
        self.viewer.reset_shadows();
    }

    fn set_scene_dirty(&mut self) {
        self.viewer.set_dirty();
    }

    fn draw(&mut self) {
        self.viewer.request_render();
    }
}
