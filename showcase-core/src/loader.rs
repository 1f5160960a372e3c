/// Asset loading progress and the one-shot loader reveal
use serde::{Deserialize, Serialize};

use crate::easing::Ease;
use crate::error::AssetLoadError;
use crate::events::Event;
use crate::page::{selectors, warn_missing, ElementStyle, Page};

/// Events emitted by an engine's asset importer
#[derive(Debug, Clone, PartialEq)]
pub enum ImporterEvent {
    Progress { loaded: u64, total: u64 },
    Loaded,
    Failed(AssetLoadError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImporterEventKind {
    Progress,
    Loaded,
    Failed,
}

impl Event for ImporterEvent {
    type Kind = ImporterEventKind;

    fn kind(&self) -> ImporterEventKind {
        match self {
            ImporterEvent::Progress { .. } => ImporterEventKind::Progress,
            ImporterEvent::Loaded => ImporterEventKind::Loaded,
            ImporterEvent::Failed(_) => ImporterEventKind::Failed,
        }
    }
}

/// Timing of the panel that slides away once loading finishes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevealConfig {
    pub delay: f32,
    pub duration: f32,
    pub ease: Ease,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            delay: 1.0,
            duration: 0.8,
            ease: Ease::Power4InOut,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoadPhase {
    Loading,
    Revealing { elapsed: f32 },
    Revealed,
    Failed(AssetLoadError),
}

pub struct AssetLoadTracker {
    reveal: RevealConfig,
    phase: LoadPhase,
    ratio: f32,
}

impl AssetLoadTracker {
    pub fn new(reveal: RevealConfig) -> Self {
        Self {
            reveal,
            phase: LoadPhase::Loading,
            ratio: 0.0,
        }
    }

    /// Lock scrolling and show an empty progress bar
    pub fn begin<P: Page + ?Sized>(&mut self, page: &mut P) {
        page.set_scroll_locked(true);
        self.show_ratio(page, 0.0);
    }

    pub fn on_progress<P: Page + ?Sized>(&mut self, loaded: u64, total: u64, page: &mut P) {
        if self.phase != LoadPhase::Loading {
            log::debug!("progress {loaded}/{total} after loading finished, ignored");
            return;
        }
        if total == 0 {
            log::debug!("progress event without a total, ignored");
            return;
        }
        let ratio = (loaded as f64 / total as f64).clamp(0.0, 1.0) as f32;
        if ratio < self.ratio {
            return;
        }
        log::debug!("asset progress {:.0}%", ratio * 100.0);
        self.show_ratio(page, ratio);
    }

    /// Starts the reveal the first time it is called
    pub fn on_complete<P: Page + ?Sized>(&mut self, page: &mut P) -> bool {
        match self.phase {
            LoadPhase::Loading => {
                log::info!("asset loaded, revealing");
                self.show_ratio(page, 1.0);
                self.phase = LoadPhase::Revealing { elapsed: 0.0 };
                true
            }
            _ => {
                log::warn!("duplicate load completion ignored");
                false
            }
        }
    }

    /// Only a load still in flight can fail
    pub fn on_error<P: Page + ?Sized>(&mut self, error: AssetLoadError, page: &mut P) {
        if self.phase != LoadPhase::Loading {
            log::warn!("{error} after loading finished, ignored");
            return;
        }
        log::error!("{error}");
        warn_missing(page.set_visible(selectors::LOADER_RETRY, true));
        self.phase = LoadPhase::Failed(error);
    }

    /// Back to loading after a failure; the caller restarts the import
    pub fn retry<P: Page + ?Sized>(&mut self, page: &mut P) -> bool {
        if !matches!(self.phase, LoadPhase::Failed(_)) {
            return false;
        }
        warn_missing(page.set_visible(selectors::LOADER_RETRY, false));
        self.phase = LoadPhase::Loading;
        self.ratio = 0.0;
        self.show_ratio(page, 0.0);
        true
    }

    /// Advance the reveal; unlocks scrolling when it finishes
    pub fn tick<P: Page + ?Sized>(&mut self, dt: f32, page: &mut P) {
        let LoadPhase::Revealing { elapsed } = self.phase else {
            return;
        };
        let elapsed = elapsed + dt.max(0.0);
        let moving = (elapsed - self.reveal.delay).max(0.0);
        let t = if self.reveal.duration <= 0.0 {
            1.0
        } else {
            (moving / self.reveal.duration).min(1.0)
        };

        if moving > 0.0 || t >= 1.0 {
            let style = ElementStyle {
                x_percent: 100.0 * self.reveal.ease.apply(t),
                ..ElementStyle::IDENTITY
            };
            warn_missing(page.set_style(selectors::LOADER, style));
        }

        if t >= 1.0 {
            page.set_scroll_locked(false);
            self.phase = LoadPhase::Revealed;
            log::info!("loader revealed, scrolling enabled");
        } else {
            self.phase = LoadPhase::Revealing { elapsed };
        }
    }

    pub fn phase(&self) -> &LoadPhase {
        &self.phase
    }

    pub fn ratio(&self) -> f32 {
        self.ratio
    }

    fn show_ratio<P: Page + ?Sized>(&mut self, page: &mut P, ratio: f32) {
        self.ratio = ratio;
        let style = ElementStyle {
            scale_x: ratio,
            ..ElementStyle::IDENTITY
        };
        warn_missing(page.set_style(selectors::PROGRESS, style));
    }
}
