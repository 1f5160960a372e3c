/// The page the showcase is embedded in: layout queries and style writes
use crate::error::MissingElementError;

/// Selectors for the elements the showcase touches
pub mod selectors {
    pub const HERO_BUTTON: &str = ".button--hero";
    pub const FOOTER_BUTTON: &str = ".button--footer";
    pub const CUSTOMIZE_BUTTON: &str = ".button--customize";
    pub const EXIT_BUTTON: &str = ".button--exit";
    pub const SECTIONS: &str = ".container";
    pub const CANVAS_CONTAINER: &str = "#webgi-canvas-container";
    pub const CUSTOMIZER: &str = ".customizer--container";
    pub const PROGRESS: &str = ".progress";
    pub const LOADER: &str = ".loader";
    pub const LOADER_RETRY: &str = ".loader--retry";
    pub const SECTION_ONE: &str = ".section--one--container";
    pub const SECOND_SECTION: &str = ".second";
    pub const THIRD_SECTION: &str = ".third";
}

/// An element's box in document coordinates (scroll independent)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementRect {
    pub top: f32,
    pub height: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cursor {
    Default,
    Grab,
}

impl Cursor {
    pub fn css(self) -> &'static str {
        match self {
            Cursor::Default => "default",
            Cursor::Grab => "grab",
        }
    }
}

/// Visual state written to an element: horizontal offset, scale and opacity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementStyle {
    /// Horizontal offset in percent of the element's own width
    pub x_percent: f32,
    pub scale_x: f32,
    pub opacity: f32,
}

impl ElementStyle {
    pub const IDENTITY: ElementStyle = ElementStyle {
        x_percent: 0.0,
        scale_x: 1.0,
        opacity: 1.0,
    };

    pub fn css_transform(&self) -> String {
        format!("translateX({}%) scaleX({})", self.x_percent, self.scale_x)
    }
}

impl Default for ElementStyle {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Everything the showcase needs from its host page.
///
/// Style writes on missing elements return [`MissingElementError`]; callers
/// log and carry on.
pub trait Page {
    fn element_rect(&self, selector: &str) -> Option<ElementRect>;

    fn viewport_height(&self) -> f32;

    fn scroll_y(&self) -> f32;

    fn scroll_to(&mut self, y: f32, smooth: bool);

    fn set_visible(&mut self, selector: &str, visible: bool) -> Result<(), MissingElementError>;

    fn set_pointer_events(&mut self, selector: &str, enabled: bool) -> Result<(), MissingElementError>;

    fn set_style(&mut self, selector: &str, style: ElementStyle) -> Result<(), MissingElementError>;

    fn set_cursor(&mut self, cursor: Cursor);

    /// Locks or unlocks page scrolling (the loader keeps it locked)
    fn set_scroll_locked(&mut self, locked: bool);
}

/// Apply a page write, downgrading a missing element to a warning
pub(crate) fn warn_missing(result: Result<(), MissingElementError>) {
    if let Err(err) = result {
        log::warn!("{err}, skipping");
    }
}
