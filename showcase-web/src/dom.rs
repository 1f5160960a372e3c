/// Browser page backed by web-sys: layout reads, scroll control and inline style writes
use showcase_core::error::MissingElementError;
use showcase_core::{Cursor, ElementRect, ElementStyle, Page};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, HtmlElement, ScrollBehavior, ScrollToOptions, Window};

pub(crate) fn visibility_value(visible: bool) -> &'static str {
    if visible {
        "visible"
    } else {
        "hidden"
    }
}

pub(crate) fn pointer_events_value(enabled: bool) -> &'static str {
    if enabled {
        "all"
    } else {
        "none"
    }
}

/// Body `overflow-y` for a scroll lock state
pub(crate) fn overflow_value(locked: bool) -> &'static str {
    if locked {
        "hidden"
    } else {
        "auto"
    }
}

/// Bounding rect top is viewport relative; shift it into document space
pub(crate) fn document_rect(client_top: f64, height: f64, scroll_y: f64) -> ElementRect {
    ElementRect {
        top: (client_top + scroll_y) as f32,
        height: height as f32,
    }
}

pub struct DomPage {
    window: Window,
    document: Document,
}

impl DomPage {
    pub fn new() -> Result<Self, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no global window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("window has no document"))?;
        Ok(Self { window, document })
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn query(&self, selector: &str) -> Option<HtmlElement> {
        self.document
            .query_selector(selector)
            .ok()
            .flatten()
            .and_then(|element| element.dyn_into::<HtmlElement>().ok())
    }

    fn set_property(&self, selector: &str, property: &str, value: &str) -> Result<(), MissingElementError> {
        let element = self.query(selector).ok_or_else(|| MissingElementError::new(selector))?;
        if let Err(err) = element.style().set_property(property, value) {
            log::warn!("could not set {property} on {selector}: {err:?}");
        }
        Ok(())
    }

    fn set_body_property(&self, property: &str, value: &str) {
        let Some(body) = self.document.body() else {
            log::warn!("document has no body, {property} not applied");
            return;
        };
        if let Err(err) = body.style().set_property(property, value) {
            log::warn!("could not set body {property}: {err:?}");
        }
    }
}

impl Page for DomPage {
    fn element_rect(&self, selector: &str) -> Option<ElementRect> {
        let rect = self.query(selector)?.get_bounding_client_rect();
        Some(document_rect(rect.top(), rect.height(), self.window.scroll_y().unwrap_or(0.0)))
    }

    fn viewport_height(&self) -> f32 {
        self.window
            .inner_height()
            .ok()
            .and_then(|height| height.as_f64())
            .unwrap_or(0.0) as f32
    }

    fn scroll_y(&self) -> f32 {
        self.window.scroll_y().unwrap_or(0.0) as f32
    }

    fn scroll_to(&mut self, y: f32, smooth: bool) {
        let options = ScrollToOptions::new();
        options.set_top(y as f64);
        options.set_behavior(if smooth {
            ScrollBehavior::Smooth
        } else {
            ScrollBehavior::Instant
        });
        self.window.scroll_to_with_scroll_to_options(&options);
    }

    fn set_visible(&mut self, selector: &str, visible: bool) -> Result<(), MissingElementError> {
        self.set_property(selector, "visibility", visibility_value(visible))
    }

    fn set_pointer_events(&mut self, selector: &str, enabled: bool) -> Result<(), MissingElementError> {
        self.set_property(selector, "pointer-events", pointer_events_value(enabled))
    }

    fn set_style(&mut self, selector: &str, style: ElementStyle) -> Result<(), MissingElementError> {
        self.set_property(selector, "transform", &style.css_transform())?;
        self.set_property(selector, "opacity", &style.opacity.to_string())
    }

    fn set_cursor(&mut self, cursor: Cursor) {
        self.set_body_property("cursor", cursor.css());
    }

    fn set_scroll_locked(&mut self, locked: bool) {
        self.set_body_property("overflow-y", overflow_value(locked));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_css_values() {
        assert_eq!(visibility_value(false), "hidden");
        assert_eq!(pointer_events_value(true), "all");
        assert_eq!(pointer_events_value(false), "none");
        assert_eq!(overflow_value(true), "hidden");
        assert_eq!(overflow_value(false), "auto");
    }

    #[test]
    fn test_rect_is_scroll_independent() {
        // The same element seen before and after scrolling 400px
        let before = document_rect(1000.0, 800.0, 0.0);
        let after = document_rect(600.0, 800.0, 400.0);
        assert_eq!(before, after);
        assert_eq!(before.top, 1000.0);
    }
}
