/// Wires the timeline, tweens, loader and UI bindings to one engine and one page.
///
/// Hosts drive a [`Configurator`] with three kinds of input: scroll and click
/// notifications from the page, importer events from the engine, and a
/// per-frame `frame(dt)` call. Every pose write made while handling them is
/// committed once, in the next frame.
use crate::binder::{BinderCompletion, Mode, UiAction, UiActionBinder};
use crate::config::ConfiguratorConfig;
use crate::device::DeviceProfile;
use crate::error::{MissingElementError, Result};
use crate::events::EventHub;
use crate::loader::{AssetLoadTracker, ImporterEvent, ImporterEventKind, LoadPhase};
use crate::page::Page;
use crate::pipeline::Pipeline;
use crate::surface::{FrameReport, RenderEngine, RenderSurfaceAdapter};
use crate::timeline::ScrollCameraTimeline;
use crate::tween::TweenEngine;

/// Everything event handlers may touch
struct Showcase<E: RenderEngine, P: Page> {
    surface: RenderSurfaceAdapter<E>,
    page: P,
    timeline: ScrollCameraTimeline,
    tweens: TweenEngine<BinderCompletion>,
    binder: UiActionBinder,
    tracker: AssetLoadTracker,
    asset_path: String,
    material_name: String,
}

impl<E: RenderEngine, P: Page> Showcase<E, P> {
    fn start_load(&mut self) {
        log::info!("loading {}", self.asset_path);
        if let Err(err) = self.surface.engine_mut().load_asset(&self.asset_path) {
            self.tracker.on_error(err, &mut self.page);
        }
    }

    fn on_loaded(&mut self) {
        if !self.tracker.on_complete(&mut self.page) {
            return;
        }
        let material = self.surface.engine().find_material(&self.material_name);
        if material.is_none() {
            log::warn!(
                "{}, swatches disabled",
                MissingElementError::new(format!("material {}", self.material_name))
            );
        }
        self.binder.set_material(material);
    }

    fn sync_scroll(&mut self, dt: f32) {
        let scroll_y = self.page.scroll_y();
        self.timeline
            .update(scroll_y, dt, &mut self.surface, &mut self.page);
    }
}

pub struct Configurator<E: RenderEngine, P: Page> {
    showcase: Showcase<E, P>,
    importer: EventHub<ImporterEvent, Showcase<E, P>>,
    ui: EventHub<UiAction, Showcase<E, P>>,
    profile: DeviceProfile,
}

impl<E, P> Configurator<E, P>
where
    E: RenderEngine + 'static,
    P: Page + 'static,
{
    /// Register the pipeline, place the camera and start loading the asset.
    ///
    /// Fails on invalid config or a plugin that cannot be initialised. A
    /// failing asset load is not an error here; the loader shows a retry.
    pub fn new(mut engine: E, mut page: P, config: ConfiguratorConfig, profile: DeviceProfile) -> Result<Self> {
        config.validate()?;
        let pipeline = Pipeline::new(config.pipeline.clone())?;
        pipeline.register(&mut engine)?;
        log::info!(
            "pipeline ready with {} plugins, {:?} profile",
            pipeline.plugins().len(),
            profile
        );

        let initial = config.initial_pose.resolve(profile).to_pose();
        let timeline = ScrollCameraTimeline::new(&config.keyframes, profile, &initial);
        let surface = RenderSurfaceAdapter::new(engine, initial);

        page.scroll_to(0.0, false);
        let mut tracker = AssetLoadTracker::new(config.reveal);
        tracker.begin(&mut page);

        let mut showcase = Showcase {
            surface,
            page,
            timeline,
            tweens: TweenEngine::new(),
            binder: UiActionBinder::new(config.binder, None),
            tracker,
            asset_path: config.asset_path,
            material_name: config.material,
        };
        showcase.timeline.refresh(&showcase.page);
        showcase.start_load();

        let mut importer = EventHub::new();
        importer.subscribe(ImporterEventKind::Progress, |event, showcase: &mut Showcase<E, P>| {
            if let ImporterEvent::Progress { loaded, total } = event {
                showcase.tracker.on_progress(*loaded, *total, &mut showcase.page);
            }
        });
        importer.subscribe(ImporterEventKind::Loaded, |_, showcase: &mut Showcase<E, P>| {
            showcase.on_loaded();
        });
        importer.subscribe(ImporterEventKind::Failed, |event, showcase: &mut Showcase<E, P>| {
            if let ImporterEvent::Failed(err) = event {
                showcase.tracker.on_error(err.clone(), &mut showcase.page);
            }
        });

        let mut ui = EventHub::new();
        for action in UiAction::ALL {
            ui.subscribe(action, |action: &UiAction, showcase: &mut Showcase<E, P>| {
                showcase.binder.handle(
                    *action,
                    &mut showcase.surface,
                    &mut showcase.tweens,
                    &mut showcase.page,
                );
            });
        }

        Ok(Self {
            showcase,
            importer,
            ui,
            profile,
        })
    }
}

impl<E: RenderEngine, P: Page> Configurator<E, P> {
    /// The page scrolled; scrubbed keyframes follow immediately
    pub fn on_scroll(&mut self) {
        self.showcase.sync_scroll(0.0);
    }

    pub fn handle_action(&mut self, action: UiAction) {
        self.ui.dispatch(&action, &mut self.showcase);
    }

    pub fn importer_event(&mut self, event: ImporterEvent) {
        self.importer.dispatch(&event, &mut self.showcase);
    }

    /// Reload the asset after a failure
    pub fn retry_load(&mut self) -> bool {
        if !self.showcase.tracker.retry(&mut self.showcase.page) {
            return false;
        }
        self.showcase.start_load();
        true
    }

    /// The layout changed: recompute trigger regions and re-apply the scroll position
    pub fn refresh_layout(&mut self) {
        self.showcase.timeline.refresh(&self.showcase.page);
        self.showcase.sync_scroll(0.0);
    }

    /// Advance time by `dt` seconds and render one frame
    pub fn frame(&mut self, dt: f32) -> FrameReport {
        let showcase = &mut self.showcase;
        for completion in showcase.tweens.tick(dt, &mut showcase.surface) {
            showcase.binder.on_completion(completion, &mut showcase.surface);
        }
        showcase.tracker.tick(dt, &mut showcase.page);
        if showcase.timeline.is_settling() {
            showcase.sync_scroll(dt);
        }
        showcase.surface.render_frame()
    }

    pub fn surface(&self) -> &RenderSurfaceAdapter<E> {
        &self.showcase.surface
    }

    pub fn engine_mut(&mut self) -> &mut E {
        self.showcase.surface.engine_mut()
    }

    pub fn page(&self) -> &P {
        &self.showcase.page
    }

    /// Hosts move the page (scrolling, resizing) through this
    pub fn page_mut(&mut self) -> &mut P {
        &mut self.showcase.page
    }

    pub fn timeline(&self) -> &ScrollCameraTimeline {
        &self.showcase.timeline
    }

    pub fn mode(&self) -> Mode {
        self.showcase.binder.mode()
    }

    pub fn load_phase(&self) -> &LoadPhase {
        self.showcase.tracker.phase()
    }

    pub fn load_ratio(&self) -> f32 {
        self.showcase.tracker.ratio()
    }

    pub fn profile(&self) -> DeviceProfile {
        self.profile
    }

    /// Whether anything is still moving on its own
    pub fn is_animating(&self) -> bool {
        !self.showcase.tweens.is_idle()
            || self.showcase.timeline.is_settling()
            || matches!(self.showcase.tracker.phase(), LoadPhase::Revealing { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Swatch;
    use crate::error::{AssetLoadError, ShowcaseError};
    use crate::page::{selectors, Cursor};
    use crate::pipeline::{default_plugins, Plugin};
    use crate::testing::{FakeEngine, FakePage, DRILL_MATERIAL};
    use nalgebra::Point3;

    fn configurator(profile: DeviceProfile) -> Configurator<FakeEngine, FakePage> {
        Configurator::new(
            FakeEngine::new(),
            FakePage::showcase(),
            ConfiguratorConfig::default(),
            profile,
        )
        .unwrap()
    }

    fn load(configurator: &mut Configurator<FakeEngine, FakePage>) {
        configurator.importer_event(ImporterEvent::Progress { loaded: 1, total: 2 });
        configurator.importer_event(ImporterEvent::Loaded);
        for _ in 0..20 {
            configurator.frame(0.1);
        }
    }

    #[test]
    fn test_setup_registers_pipeline_and_loads() {
        let configurator = configurator(DeviceProfile::Desktop);
        let engine = configurator.surface().engine();
        assert_eq!(engine.plugins, default_plugins());
        assert_eq!(engine.pipeline_refreshes, 1);
        assert_eq!(engine.loaded_assets, vec!["./assets/drill.glb".to_string()]);
        assert!(configurator.page().scroll_locked);
        assert_eq!(configurator.page().scroll_requests, vec![(0.0, false)]);
        assert_eq!(configurator.load_phase(), &LoadPhase::Loading);
    }

    #[test]
    fn test_mobile_profile_sets_pose_and_fov() {
        let mut configurator = configurator(DeviceProfile::Mobile);
        configurator.frame(0.016);
        let committed = configurator.surface().engine().commits.last().unwrap();
        assert_eq!(committed.position, Point3::new(-3.5, -1.1, 5.5));
        assert_eq!(committed.fov, Some(40.0));
    }

    #[test]
    fn test_invalid_pipeline_aborts_setup() {
        let mut config = ConfiguratorConfig::default();
        config.pipeline = vec![Plugin::AssetManager, Plugin::Ssr];
        let result = Configurator::new(FakeEngine::new(), FakePage::showcase(), config, DeviceProfile::Desktop);
        assert!(matches!(result, Err(ShowcaseError::Pipeline(_))));

        let mut engine = FakeEngine::new();
        engine.failing_plugin = Some("Bloom");
        let result = Configurator::new(
            engine,
            FakePage::showcase(),
            ConfiguratorConfig::default(),
            DeviceProfile::Desktop,
        );
        assert!(matches!(result, Err(ShowcaseError::PluginInit(_))));
    }

    #[test]
    fn test_end_to_end_flow() {
        let mut configurator = configurator(DeviceProfile::Desktop);
        configurator.frame(0.016);

        // Swatches do nothing before the material is known
        configurator.handle_action(UiAction::Swatch(Swatch::Red));
        assert!(configurator.surface().engine().material_colors.is_empty());

        load(&mut configurator);
        assert_eq!(configurator.load_phase(), &LoadPhase::Revealed);
        assert!(!configurator.page().scroll_locked);
        assert_eq!(configurator.page().style(selectors::PROGRESS).unwrap().scale_x, 1.0);

        // Halfway through the .second region (200..1000)
        configurator.page_mut().scroll_y = 600.0;
        configurator.on_scroll();
        let commits = configurator.surface().engine().commits.len();
        let report = configurator.frame(0.016);
        assert!(report.committed);
        assert_eq!(configurator.surface().engine().commits.len(), commits + 1);
        let position = configurator.surface().pose().position;
        assert!((position.x - (-1.2 + (1.56 + 1.2) * 0.5)).abs() < 1e-4);

        // The fade of the first section is smoothed and catches up over frames
        while configurator.is_animating() {
            configurator.frame(0.1);
        }
        let fade = configurator.page().style(selectors::SECTION_ONE).unwrap();
        assert_eq!(fade.opacity, 0.0);

        configurator.handle_action(UiAction::Customize);
        assert_eq!(configurator.mode(), Mode::Customizing);
        assert_eq!(configurator.page().cursor, Cursor::Grab);
        for _ in 0..12 {
            configurator.frame(0.1);
        }
        assert_eq!(configurator.surface().pose().position, Point3::new(-2.6, 0.2, -9.6));

        configurator.handle_action(UiAction::Swatch(Swatch::Black));
        let engine = configurator.surface().engine();
        assert_eq!(
            engine.material_colors.get(&DRILL_MATERIAL),
            Some(&Swatch::Black.default_color().to_linear())
        );

        configurator.handle_action(UiAction::Exit);
        assert!(!configurator.surface().controls_enabled());
        for _ in 0..12 {
            configurator.frame(0.1);
        }
        assert!(configurator.surface().controls_enabled());
        assert_eq!(configurator.page().visible(selectors::SECTIONS), Some(true));
        assert_eq!(configurator.page().cursor, Cursor::Default);
    }

    #[test]
    fn test_failed_load_can_be_retried() {
        let mut engine = FakeEngine::new();
        engine.failing_asset = Some("not found");
        let mut configurator = Configurator::new(
            engine,
            FakePage::showcase(),
            ConfiguratorConfig::default(),
            DeviceProfile::Desktop,
        )
        .unwrap();
        assert!(matches!(configurator.load_phase(), LoadPhase::Failed(_)));
        assert_eq!(configurator.page().visible(selectors::LOADER_RETRY), Some(true));

        configurator.engine_mut().failing_asset = None;
        assert!(configurator.retry_load());
        assert_eq!(configurator.load_phase(), &LoadPhase::Loading);
        assert_eq!(configurator.surface().engine().loaded_assets.len(), 1);

        configurator.importer_event(ImporterEvent::Failed(AssetLoadError {
            path: "./assets/drill.glb".to_string(),
            reason: "connection reset".to_string(),
        }));
        assert!(matches!(configurator.load_phase(), LoadPhase::Failed(_)));
    }

    #[test]
    fn test_late_failure_keeps_revealed_showcase() {
        let mut configurator = configurator(DeviceProfile::Desktop);
        load(&mut configurator);
        assert_eq!(configurator.load_phase(), &LoadPhase::Revealed);

        configurator.importer_event(ImporterEvent::Failed(AssetLoadError {
            path: "./assets/drill.glb".to_string(),
            reason: "texture decode failed".to_string(),
        }));
        assert_eq!(configurator.load_phase(), &LoadPhase::Revealed);
        assert!(!configurator.page().scroll_locked);
        assert!(!configurator.retry_load());
        assert_eq!(configurator.surface().engine().loaded_assets.len(), 1);
    }

    #[test]
    fn test_hero_button_scrolls_to_second_section() {
        let mut configurator = configurator(DeviceProfile::Desktop);
        load(&mut configurator);
        configurator.handle_action(UiAction::Hero);
        assert_eq!(configurator.page().scroll_requests.last(), Some(&(1000.0, true)));
        configurator.handle_action(UiAction::Footer);
        assert_eq!(configurator.page().scroll_y, 0.0);
    }
}
