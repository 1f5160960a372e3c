/// A virtual scrolling page drawn over the rendered frame
use crossterm::{
    cursor::MoveTo,
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor},
    QueueableCommand,
};
use showcase_core::error::MissingElementError;
use showcase_core::page::selectors;
use showcase_core::{Cursor, ElementRect, ElementStyle, Page, Swatch};
use std::io::Write;

/// Rows per second covered by smooth scrolling, at minimum
const SMOOTH_SCROLL_SPEED: f32 = 60.0;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Anchor {
    /// Positioned in the document, moves with scrolling
    Document,
    /// Pinned to the viewport
    Fixed,
}

#[derive(Debug, Clone)]
struct PageElement {
    selector: &'static str,
    anchor: Anchor,
    rect: ElementRect,
    column: u16,
    lines: Vec<String>,
    visible: bool,
    pointer_events: bool,
    style: ElementStyle,
}

/// Three viewport-tall sections plus the fixed loader and customizer
pub struct TerminalPage {
    width: u16,
    height: u16,
    elements: Vec<PageElement>,
    scroll_y: f32,
    smooth_target: Option<f32>,
    scroll_locked: bool,
    cursor: Cursor,
}

impl TerminalPage {
    pub fn new(width: u16, height: u16) -> Self {
        let mut page = Self {
            width,
            height,
            elements: Vec::new(),
            scroll_y: 0.0,
            smooth_target: None,
            scroll_locked: false,
            cursor: Cursor::Default,
        };
        page.elements = page.layout();
        page
    }

    fn layout(&self) -> Vec<PageElement> {
        let vh = self.height as f32;
        let right = self.width.saturating_sub(34);
        let element = |selector, anchor, top: f32, height: f32, column, lines: &[&str]| PageElement {
            selector,
            anchor,
            rect: ElementRect { top, height },
            column,
            lines: lines.iter().map(|l| l.to_string()).collect(),
            visible: true,
            pointer_events: false,
            style: ElementStyle::IDENTITY,
        };

        let mut elements = vec![
            element(selectors::SECTIONS, Anchor::Document, 0.0, vh * 3.0, 0, &[]),
            element(
                selectors::SECTION_ONE,
                Anchor::Document,
                2.0,
                vh - 2.0,
                2,
                &["CORDLESS DRILL", "", "Power in the palm of your hand.", "Scroll down (j / Down)"],
            ),
            element(selectors::HERO_BUTTON, Anchor::Document, 8.0, 1.0, 2, &["[h] Discover"]),
            element(
                selectors::SECOND_SECTION,
                Anchor::Document,
                vh,
                vh,
                right,
                &["BRUSHLESS MOTOR", "", "Two speeds, twenty clutch", "settings, zero fuss."],
            ),
            element(
                selectors::THIRD_SECTION,
                Anchor::Document,
                vh * 2.0,
                vh,
                2,
                &["MAKE IT YOURS", "", "Pick a finish that matches", "your workshop."],
            ),
            element(selectors::CUSTOMIZE_BUTTON, Anchor::Document, vh * 2.0 + 6.0, 1.0, 2, &["[c] Customize"]),
            element(selectors::FOOTER_BUTTON, Anchor::Document, vh * 3.0 - 2.0, 1.0, 2, &["[f] Back to top"]),
            element(selectors::CANVAS_CONTAINER, Anchor::Fixed, 0.0, vh, 0, &[]),
            element(selectors::EXIT_BUTTON, Anchor::Fixed, 1.0, 1.0, right, &["[x] Exit customizer"]),
            element(
                selectors::CUSTOMIZER,
                Anchor::Fixed,
                vh - 3.0,
                2.0,
                2,
                &["Finish:", "WASD to orbit"],
            ),
            element(selectors::LOADER, Anchor::Fixed, 0.0, vh, 0, &["Loading drill..."]),
            element(selectors::PROGRESS, Anchor::Fixed, vh * 0.5, 1.0, 4, &[]),
            element(selectors::LOADER_RETRY, Anchor::Fixed, vh * 0.5 + 2.0, 1.0, 4, &["Load failed. [r] Retry"]),
        ];
        for (index, swatch) in Swatch::ALL.iter().enumerate() {
            let label = format!("[{}] {:?}", index + 1, swatch);
            elements.push(PageElement {
                lines: vec![label],
                column: 12 + 12 * index as u16,
                ..element(swatch.selector(), Anchor::Fixed, vh - 3.0, 1.0, 0, &[])
            });
        }

        // Hidden until the page shows them
        for element in &mut elements {
            if matches!(
                element.selector,
                selectors::EXIT_BUTTON | selectors::CUSTOMIZER | selectors::LOADER_RETRY
            ) {
                element.visible = false;
            }
        }
        elements
    }

    /// Re-layout for a new terminal size, keeping element state
    pub fn resize(&mut self, width: u16, height: u16) {
        let old: Vec<PageElement> = std::mem::take(&mut self.elements);
        self.width = width;
        self.height = height;
        let mut fresh = self.layout();
        for element in &mut fresh {
            if let Some(previous) = old.iter().find(|e| e.selector == element.selector) {
                element.visible = previous.visible;
                element.pointer_events = previous.pointer_events;
                element.style = previous.style;
            }
        }
        self.elements = fresh;
        self.scroll_y = self.scroll_y.min(self.max_scroll());
    }

    pub fn max_scroll(&self) -> f32 {
        let document = self
            .find(selectors::SECTIONS)
            .map(|e| e.rect.top + e.rect.height)
            .unwrap_or(0.0);
        (document - self.height as f32).max(0.0)
    }

    /// User scrolling; ignored while the loader holds the page
    pub fn scroll_by(&mut self, rows: f32) -> bool {
        if self.scroll_locked {
            return false;
        }
        self.smooth_target = None;
        let next = (self.scroll_y + rows).clamp(0.0, self.max_scroll());
        let moved = next != self.scroll_y;
        self.scroll_y = next;
        moved
    }

    /// Advance smooth scrolling, returns whether the page moved
    pub fn tick(&mut self, dt: f32) -> bool {
        let Some(target) = self.smooth_target else {
            return false;
        };
        let remaining = target - self.scroll_y;
        let step = (remaining.abs() * 8.0 * dt).max(SMOOTH_SCROLL_SPEED * dt);
        if remaining.abs() <= step {
            self.scroll_y = target;
            self.smooth_target = None;
        } else {
            self.scroll_y += step * remaining.signum();
        }
        true
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn is_visible(&self, selector: &str) -> bool {
        self.find(selector).map(|e| e.visible).unwrap_or(false)
    }

    pub fn pointer_events(&self, selector: &str) -> bool {
        self.find(selector).map(|e| e.pointer_events).unwrap_or(false)
    }

    pub fn style(&self, selector: &str) -> Option<ElementStyle> {
        self.find(selector).map(|e| e.style)
    }

    pub fn is_scroll_locked(&self) -> bool {
        self.scroll_locked
    }

    fn find(&self, selector: &str) -> Option<&PageElement> {
        self.elements.iter().find(|e| e.selector == selector)
    }

    fn find_mut(&mut self, selector: &str) -> Result<&mut PageElement, MissingElementError> {
        self.elements
            .iter_mut()
            .find(|e| e.selector == selector)
            .ok_or_else(|| MissingElementError::new(selector))
    }

    /// Whether an element and all its containers are shown
    fn shown(&self, element: &PageElement) -> bool {
        if !element.visible {
            return false;
        }
        match element.anchor {
            Anchor::Document => element.selector == selectors::SECTIONS || self.is_visible(selectors::SECTIONS),
            Anchor::Fixed => true,
        }
    }

    /// Viewport row of an element, `None` when scrolled out of view
    fn row_of(&self, element: &PageElement, line: usize) -> Option<u16> {
        let top = match element.anchor {
            Anchor::Document => element.rect.top - self.scroll_y,
            Anchor::Fixed => element.rect.top,
        };
        let row = (top + line as f32).round();
        (row >= 0.0 && row < self.height as f32).then_some(row as u16)
    }

    /// Text overlay: sections, buttons, customizer and loader
    pub fn draw<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        let loader = self.find(selectors::LOADER);
        let loader_offset = loader
            .map(|l| (l.style.x_percent / 100.0 * self.width as f32).round() as i32)
            .unwrap_or(0);
        let loader_covers = loader_offset < self.width as i32;

        for element in self.elements.iter().filter(|e| self.shown(e)) {
            if matches!(element.selector, selectors::LOADER | selectors::PROGRESS | selectors::LOADER_RETRY) {
                continue;
            }
            if element.style.opacity < 0.15 {
                continue;
            }
            let shift = (element.style.x_percent / 100.0 * self.width as f32).round() as i32;
            let color = if element.style.opacity < 0.6 { Color::DarkGrey } else { Color::White };
            for (line_index, line) in element.lines.iter().enumerate() {
                let Some(row) = self.row_of(element, line_index) else {
                    continue;
                };
                let column = element.column as i32 + shift;
                self.print_clipped(writer, column, row, line, color, line_index == 0)?;
            }
        }

        if loader_covers {
            self.draw_loader(writer, loader_offset)?;
        }
        writer.queue(ResetColor)?;
        Ok(())
    }

    fn draw_loader<W: Write>(&self, writer: &mut W, offset: i32) -> std::io::Result<()> {
        let blank = " ".repeat(self.width as usize);
        for row in 0..self.height {
            self.print_clipped(writer, offset, row, &blank, Color::Reset, false)?;
        }
        if let Some(title) = self.find(selectors::LOADER) {
            let row = (self.height / 2).saturating_sub(2);
            self.print_clipped(writer, offset + 4, row, &title.lines[0], Color::Yellow, true)?;
        }
        if let Some(progress) = self.find(selectors::PROGRESS) {
            let bar_width = self.width.saturating_sub(8) as f32;
            let filled = (bar_width * progress.style.scale_x.clamp(0.0, 1.0)).round() as usize;
            let bar = format!("{}{}", "█".repeat(filled), "░".repeat(bar_width as usize - filled));
            self.print_clipped(writer, offset + 4, self.height / 2, &bar, Color::Yellow, false)?;
        }
        if let Some(retry) = self.find(selectors::LOADER_RETRY).filter(|r| r.visible) {
            self.print_clipped(writer, offset + 4, self.height / 2 + 2, &retry.lines[0], Color::Red, true)?;
        }
        Ok(())
    }

    fn print_clipped<W: Write>(
        &self,
        writer: &mut W,
        column: i32,
        row: u16,
        text: &str,
        color: Color,
        bold: bool,
    ) -> std::io::Result<()> {
        let skip = (-column).max(0) as usize;
        let start = column.max(0);
        if start >= self.width as i32 {
            return Ok(());
        }
        let room = self.width as usize - start as usize;
        let visible: String = text.chars().skip(skip).take(room).collect();
        if visible.is_empty() {
            return Ok(());
        }
        writer.queue(MoveTo(start as u16, row))?;
        writer.queue(SetForegroundColor(color))?;
        if bold {
            writer.queue(SetAttribute(Attribute::Bold))?;
        }
        writer.queue(Print(visible))?;
        if bold {
            writer.queue(SetAttribute(Attribute::NormalIntensity))?;
        }
        Ok(())
    }
}

impl Page for TerminalPage {
    fn element_rect(&self, selector: &str) -> Option<ElementRect> {
        self.find(selector).map(|e| e.rect)
    }

    fn viewport_height(&self) -> f32 {
        self.height as f32
    }

    fn scroll_y(&self) -> f32 {
        self.scroll_y
    }

    fn scroll_to(&mut self, y: f32, smooth: bool) {
        let y = y.clamp(0.0, self.max_scroll());
        if smooth {
            self.smooth_target = Some(y);
        } else {
            self.smooth_target = None;
            self.scroll_y = y;
        }
    }

    fn set_visible(&mut self, selector: &str, visible: bool) -> Result<(), MissingElementError> {
        self.find_mut(selector)?.visible = visible;
        Ok(())
    }

    fn set_pointer_events(&mut self, selector: &str, enabled: bool) -> Result<(), MissingElementError> {
        self.find_mut(selector)?.pointer_events = enabled;
        Ok(())
    }

    fn set_style(&mut self, selector: &str, style: ElementStyle) -> Result<(), MissingElementError> {
        self.find_mut(selector)?.style = style;
        Ok(())
    }

    fn set_cursor(&mut self, cursor: Cursor) {
        self.cursor = cursor;
    }

    fn set_scroll_locked(&mut self, locked: bool) {
        self.scroll_locked = locked;
        if locked {
            self.smooth_target = None;
        }
    }
}
