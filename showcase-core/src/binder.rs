/// UI buttons: scroll shortcuts, customize mode and color swatches
use nalgebra::Point3;
use serde::{Deserialize, Serialize};

use crate::camera::PoseProperty;
use crate::color::{SrgbColor, Swatch};
use crate::easing::Ease;
use crate::error::MissingElementError;
use crate::events::Event;
use crate::geometry::MaterialId;
use crate::page::{selectors, warn_missing, Cursor, Page};
use crate::surface::{RenderEngine, RenderSurfaceAdapter};
use crate::tween::{TweenEngine, TweenSpec};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UiAction {
    Hero,
    Footer,
    Customize,
    Exit,
    Swatch(Swatch),
}

impl UiAction {
    pub const ALL: [UiAction; 7] = [
        UiAction::Hero,
        UiAction::Footer,
        UiAction::Customize,
        UiAction::Exit,
        UiAction::Swatch(Swatch::Black),
        UiAction::Swatch(Swatch::Red),
        UiAction::Swatch(Swatch::Yellow),
    ];

    /// The button that triggers this action
    pub fn selector(self) -> &'static str {
        match self {
            UiAction::Hero => selectors::HERO_BUTTON,
            UiAction::Footer => selectors::FOOTER_BUTTON,
            UiAction::Customize => selectors::CUSTOMIZE_BUTTON,
            UiAction::Exit => selectors::EXIT_BUTTON,
            UiAction::Swatch(swatch) => swatch.selector(),
        }
    }
}

impl Event for UiAction {
    type Kind = UiAction;

    fn kind(&self) -> UiAction {
        *self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Overview,
    Customizing,
}

/// Tokens attached to binder tweens, handed back when they finish
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinderCompletion {
    ExitSettled,
}

/// A camera resting pose used by the customize/exit transitions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraStop {
    pub position: [f32; 3],
    pub target: [f32; 3],
}

impl CameraStop {
    fn point(v: [f32; 3]) -> Point3<f32> {
        Point3::new(v[0], v[1], v[2])
    }

    pub fn position(&self) -> Point3<f32> {
        Self::point(self.position)
    }

    pub fn target(&self) -> Point3<f32> {
        Self::point(self.target)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BinderConfig {
    pub customize: CameraStop,
    pub overview: CameraStop,
    pub transition_duration: f32,
    pub transition_ease: Ease,
    pub swatches: Vec<(Swatch, SrgbColor)>,
}

impl Default for BinderConfig {
    fn default() -> Self {
        Self {
            customize: CameraStop {
                position: [-2.6, 0.2, -9.6],
                target: [-1.5, 2.13, -0.4],
            },
            overview: CameraStop {
                position: [-3.4, 9.6, 1.71],
                target: [-1.5, 2.13, -0.4],
            },
            transition_duration: 1.0,
            transition_ease: Ease::Power3InOut,
            swatches: Swatch::ALL.iter().map(|s| (*s, s.default_color())).collect(),
        }
    }
}

pub struct UiActionBinder {
    config: BinderConfig,
    mode: Mode,
    material: Option<MaterialId>,
    active_swatch: Option<Swatch>,
}

impl UiActionBinder {
    /// `material` is the recolorable material, `None` disables the swatches
    pub fn new(config: BinderConfig, material: Option<MaterialId>) -> Self {
        Self {
            config,
            mode: Mode::Overview,
            material,
            active_swatch: None,
        }
    }

    /// Set once the asset has loaded and the material could be looked up
    pub fn set_material(&mut self, material: Option<MaterialId>) {
        self.material = material;
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn active_swatch(&self) -> Option<Swatch> {
        self.active_swatch
    }

    pub fn handle<E, P>(
        &mut self,
        action: UiAction,
        surface: &mut RenderSurfaceAdapter<E>,
        tweens: &mut TweenEngine<BinderCompletion>,
        page: &mut P,
    ) where
        E: RenderEngine,
        P: Page + ?Sized,
    {
        log::debug!("ui action {:?} in {:?} mode", action, self.mode);
        match action {
            UiAction::Hero => match page.element_rect(selectors::SECOND_SECTION) {
                Some(rect) => page.scroll_to(rect.top, true),
                None => log::warn!("{}", MissingElementError::new(selectors::SECOND_SECTION)),
            },
            UiAction::Footer => page.scroll_to(0.0, true),
            UiAction::Customize => self.customize(surface, tweens, page),
            UiAction::Exit => self.exit(surface, tweens, page),
            UiAction::Swatch(swatch) => self.apply_swatch(swatch, surface),
        }
    }

    /// Called for every completion token the tween engine hands back
    pub fn on_completion<E: RenderEngine>(
        &mut self,
        completion: BinderCompletion,
        surface: &mut RenderSurfaceAdapter<E>,
    ) {
        match completion {
            BinderCompletion::ExitSettled => surface.set_controls_enabled(true),
        }
    }

    fn customize<E, P>(
        &mut self,
        surface: &mut RenderSurfaceAdapter<E>,
        tweens: &mut TweenEngine<BinderCompletion>,
        page: &mut P,
    ) where
        E: RenderEngine,
        P: Page + ?Sized,
    {
        if self.mode == Mode::Customizing {
            log::debug!("already customizing");
            return;
        }
        self.mode = Mode::Customizing;

        warn_missing(page.set_visible(selectors::SECTIONS, false));
        warn_missing(page.set_pointer_events(selectors::CANVAS_CONTAINER, true));
        page.set_cursor(Cursor::Grab);
        warn_missing(page.set_visible(selectors::EXIT_BUTTON, true));
        warn_missing(page.set_visible(selectors::CUSTOMIZER, true));

        let stop = self.config.customize;
        self.tween_to(stop, None, surface, tweens);
    }

    fn exit<E, P>(
        &mut self,
        surface: &mut RenderSurfaceAdapter<E>,
        tweens: &mut TweenEngine<BinderCompletion>,
        page: &mut P,
    ) where
        E: RenderEngine,
        P: Page + ?Sized,
    {
        if self.mode == Mode::Overview {
            log::debug!("exit outside customize mode ignored");
            return;
        }
        self.mode = Mode::Overview;

        let stop = self.config.overview;
        self.tween_to(stop, Some(BinderCompletion::ExitSettled), surface, tweens);

        surface.set_controls_enabled(false);
        warn_missing(page.set_visible(selectors::SECTIONS, true));
        warn_missing(page.set_pointer_events(selectors::CANVAS_CONTAINER, false));
        page.set_cursor(Cursor::Default);
        warn_missing(page.set_visible(selectors::EXIT_BUTTON, false));
        warn_missing(page.set_visible(selectors::CUSTOMIZER, false));
    }

    fn tween_to<E: RenderEngine>(
        &self,
        stop: CameraStop,
        on_target_done: Option<BinderCompletion>,
        surface: &RenderSurfaceAdapter<E>,
        tweens: &mut TweenEngine<BinderCompletion>,
    ) {
        let duration = self.config.transition_duration;
        let ease = self.config.transition_ease;
        tweens.start(
            surface,
            TweenSpec {
                property: PoseProperty::Position,
                to: stop.position(),
                duration,
                ease,
            },
            None,
        );
        tweens.start(
            surface,
            TweenSpec {
                property: PoseProperty::Target,
                to: stop.target(),
                duration,
                ease,
            },
            on_target_done,
        );
    }

    fn apply_swatch<E: RenderEngine>(&mut self, swatch: Swatch, surface: &mut RenderSurfaceAdapter<E>) {
        let Some(material) = self.material else {
            log::warn!("no recolorable material, swatch {:?} ignored", swatch);
            return;
        };
        let Some((_, color)) = self.config.swatches.iter().find(|(s, _)| *s == swatch) else {
            log::warn!("swatch {:?} has no color configured", swatch);
            return;
        };
        surface.set_material_color(material, color.to_linear());
        self.active_swatch = Some(swatch);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::CameraPose;
    use crate::testing::{FakeEngine, FakePage, DRILL_MATERIAL, OTHER_MATERIAL};

    struct Rig {
        surface: RenderSurfaceAdapter<FakeEngine>,
        tweens: TweenEngine<BinderCompletion>,
        page: FakePage,
        binder: UiActionBinder,
    }

    impl Rig {
        fn new() -> Self {
            Self {
                surface: RenderSurfaceAdapter::new(FakeEngine::new(), CameraPose::default()),
                tweens: TweenEngine::new(),
                page: FakePage::showcase(),
                binder: UiActionBinder::new(BinderConfig::default(), Some(DRILL_MATERIAL)),
            }
        }

        fn act(&mut self, action: UiAction) {
            self.binder
                .handle(action, &mut self.surface, &mut self.tweens, &mut self.page);
        }

        fn tick(&mut self, dt: f32) {
            for completion in self.tweens.tick(dt, &mut self.surface) {
                self.binder.on_completion(completion, &mut self.surface);
            }
        }
    }

    #[test]
    fn test_customize_exit_round_trip() {
        let mut rig = Rig::new();
        let before = (
            rig.page.visible(selectors::SECTIONS),
            rig.page.pointer_events(selectors::CANVAS_CONTAINER),
            rig.page.cursor,
        );

        rig.act(UiAction::Customize);
        assert_eq!(rig.binder.mode(), Mode::Customizing);
        assert_eq!(rig.page.visible(selectors::SECTIONS), Some(false));
        assert_eq!(rig.page.pointer_events(selectors::CANVAS_CONTAINER), Some(true));
        assert_eq!(rig.page.cursor, Cursor::Grab);
        rig.tick(1.0);
        assert_eq!(rig.surface.pose().position, Point3::new(-2.6, 0.2, -9.6));

        rig.act(UiAction::Exit);
        assert_eq!(rig.binder.mode(), Mode::Overview);
        let after = (
            rig.page.visible(selectors::SECTIONS),
            rig.page.pointer_events(selectors::CANVAS_CONTAINER),
            rig.page.cursor,
        );
        assert_eq!(before, after);

        // Controls come back only once the exit tween has landed
        assert!(!rig.surface.controls_enabled());
        rig.tick(0.5);
        assert!(!rig.surface.controls_enabled());
        rig.tick(0.6);
        assert!(rig.surface.controls_enabled());
        assert_eq!(rig.surface.pose().position, Point3::new(-3.4, 9.6, 1.71));
        assert_eq!(rig.surface.engine().controls_history, vec![false, true]);
    }

    #[test]
    fn test_customize_during_exit_keeps_controls_off() {
        let mut rig = Rig::new();
        rig.act(UiAction::Customize);
        rig.tick(1.0);
        rig.act(UiAction::Exit);
        rig.tick(0.3);
        rig.act(UiAction::Customize);
        rig.tick(2.0);
        assert!(!rig.surface.controls_enabled());
        assert_eq!(rig.binder.mode(), Mode::Customizing);
    }

    #[test]
    fn test_repeated_actions_are_ignored() {
        let mut rig = Rig::new();
        rig.act(UiAction::Exit);
        assert!(rig.tweens.is_idle());
        rig.act(UiAction::Customize);
        rig.tick(0.5);
        let midway = rig.surface.pose().clone();
        rig.act(UiAction::Customize);
        assert_eq!(rig.surface.pose(), &midway);
    }

    #[test]
    fn test_swatch_changes_only_drill_material() {
        let mut rig = Rig::new();
        for swatch in Swatch::ALL {
            let dirty = rig.surface.engine().scene_dirty;
            rig.act(UiAction::Swatch(swatch));
            let engine = rig.surface.engine();
            assert_eq!(
                engine.material_colors.get(&DRILL_MATERIAL),
                Some(&swatch.default_color().to_linear())
            );
            assert!(!engine.material_colors.contains_key(&OTHER_MATERIAL));
            assert_eq!(engine.scene_dirty, dirty + 1);
            assert_eq!(rig.binder.active_swatch(), Some(swatch));
        }
    }

    #[test]
    fn test_swatch_without_material_is_ignored() {
        let mut rig = Rig::new();
        rig.binder = UiActionBinder::new(BinderConfig::default(), None);
        rig.act(UiAction::Swatch(Swatch::Red));
        assert!(rig.surface.engine().material_colors.is_empty());
        assert_eq!(rig.surface.engine().scene_dirty, 0);
    }

    #[test]
    fn test_scroll_shortcuts() {
        let mut rig = Rig::new();
        rig.act(UiAction::Hero);
        let second = rig.page.element_rect(selectors::SECOND_SECTION).unwrap();
        assert_eq!(rig.page.scroll_requests.last(), Some(&(second.top, true)));
        rig.act(UiAction::Footer);
        assert_eq!(rig.page.scroll_requests.last(), Some(&(0.0, true)));
    }
}
