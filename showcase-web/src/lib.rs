/// Drill showcase for the browser
///
/// The page script owns the 3D viewer and the animation frame loop; this module
/// owns the scroll timeline, buttons and loader. Typical wiring:
///
/// ```js
/// initShowcase(viewer, null);
/// viewer.onProgress = (loaded, total) => importerProgress(loaded, total);
/// viewer.onLoaded = () => importerLoaded();
/// requestAnimationFrame(function tick() { frame(1 / 60); requestAnimationFrame(tick); });
/// ```
use std::cell::RefCell;

use showcase_core::error::AssetLoadError;
use showcase_core::page::selectors;
use showcase_core::{Configurator, ConfiguratorConfig, DeviceProfile, ImporterEvent, UiAction};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

pub mod dom;
pub mod viewer;

pub use dom::DomPage;
pub use viewer::{JsViewer, ViewerEngine};

type WebConfigurator = Configurator<ViewerEngine, DomPage>;

thread_local! {
    static SHOWCASE: RefCell<Option<WebConfigurator>> = const { RefCell::new(None) };
    // Importer callbacks can fire while the showcase is borrowed; they queue here until the next frame
    static PENDING: RefCell<Vec<ImporterEvent>> = const { RefCell::new(Vec::new()) };
}

/// Run `f` on the live showcase; `None` before init or while already borrowed
fn with_showcase<R>(f: impl FnOnce(&mut WebConfigurator) -> R) -> Option<R> {
    SHOWCASE.try_with(|cell| borrow_live(cell, f)).ok().flatten()
}

/// A callback that fires while the showcase is mid-call is dropped
fn borrow_live<T, R>(cell: &RefCell<Option<T>>, f: impl FnOnce(&mut T) -> R) -> Option<R> {
    match cell.try_borrow_mut() {
        Ok(mut guard) => guard.as_mut().map(f),
        Err(_) => {
            log::debug!("showcase busy, callback dropped");
            None
        }
    }
}

fn queue_importer_event(event: ImporterEvent) {
    let _ = PENDING.try_with(|pending| pending.borrow_mut().push(event));
}

fn take_pending() -> Vec<ImporterEvent> {
    PENDING
        .try_with(|pending| std::mem::take(&mut *pending.borrow_mut()))
        .unwrap_or_default()
}

fn to_js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&JsValue::from_str("logger already initialised"));
    }
}

/// Build the showcase around the page's viewer.
///
/// `config_json` overrides the built-in drill settings.
#[wasm_bindgen(js_name = initShowcase)]
pub fn init(viewer: JsViewer, config_json: Option<String>) -> Result<(), JsValue> {
    let config = match config_json {
        Some(json) => ConfiguratorConfig::from_json_str(&json).map_err(to_js_error)?,
        None => ConfiguratorConfig::default(),
    };

    let page = DomPage::new()?;
    let user_agent = page.window().navigator().user_agent().unwrap_or_default();
    let profile = DeviceProfile::from_user_agent(&user_agent);
    log::info!("initialising showcase for {:?}", profile);

    install_listeners(&page)?;
    let configurator = Configurator::new(ViewerEngine::new(viewer), page, config, profile).map_err(to_js_error)?;
    SHOWCASE.with(|cell| *cell.borrow_mut() = Some(configurator));
    Ok(())
}

/// Advance one animation frame; returns whether the camera moved
#[wasm_bindgen]
pub fn frame(dt: f32) -> bool {
    with_showcase(|showcase| {
        for event in take_pending() {
            showcase.importer_event(event);
        }
        showcase.frame(dt).committed
    })
    .unwrap_or(false)
}

#[wasm_bindgen(js_name = importerProgress)]
pub fn importer_progress(loaded: f64, total: f64) {
    queue_importer_event(ImporterEvent::Progress {
        loaded: loaded.max(0.0) as u64,
        total: total.max(0.0) as u64,
    });
}

#[wasm_bindgen(js_name = importerLoaded)]
pub fn importer_loaded() {
    queue_importer_event(ImporterEvent::Loaded);
}

#[wasm_bindgen(js_name = importerFailed)]
pub fn importer_failed(path: String, reason: String) {
    queue_importer_event(ImporterEvent::Failed(AssetLoadError { path, reason }));
}

/// Reload the asset after a failure; false when nothing failed
#[wasm_bindgen]
pub fn retry() -> bool {
    with_showcase(|showcase| showcase.retry_load()).unwrap_or(false)
}

#[wasm_bindgen(js_name = isAnimating)]
pub fn is_animating() -> bool {
    with_showcase(|showcase| showcase.is_animating()).unwrap_or(false)
}

fn listen(target: &web_sys::EventTarget, event: &str, handler: impl FnMut() + 'static) -> Result<(), JsValue> {
    let closure = Closure::<dyn FnMut()>::new(handler);
    target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
    // Listeners live as long as the page
    closure.forget();
    Ok(())
}

fn install_listeners(page: &DomPage) -> Result<(), JsValue> {
    let window = page.window();
    listen(window, "scroll", || {
        with_showcase(|showcase| showcase.on_scroll());
    })?;
    listen(window, "resize", || {
        with_showcase(|showcase| showcase.refresh_layout());
    })?;

    for action in UiAction::ALL {
        let Some(element) = page.query(action.selector()) else {
            log::warn!("no element for {}, {:?} disabled", action.selector(), action);
            continue;
        };
        listen(&element, "click", move || {
            with_showcase(|showcase| showcase.handle_action(action));
        })?;
    }

    if let Some(element) = page.query(selectors::LOADER_RETRY) {
        listen(&element, "click", || {
            retry();
        })?;
    }
    Ok(())
}
