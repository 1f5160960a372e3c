/// Terminal host for the drill showcase: ASCII rendering, keyboard scrolling and buttons
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal,
};
use showcase_core::{
    Configurator, ConfiguratorConfig, DeviceProfile, LoadPhase, Mode, Page, ShowcaseError, Swatch, UiAction,
};
use std::io::{self, stdout, Write};
use std::time::{Duration, Instant};

pub mod importer;
pub mod page;
pub mod renderer;

pub use page::TerminalPage;
pub use renderer::AsciiRenderer;

/// Rows moved per scroll key press
const SCROLL_STEP: f32 = 2.0;

/// Radians per orbit key press
const ORBIT_STEP: f32 = 0.1;

pub fn to_io_error(err: ShowcaseError) -> io::Error {
    io::Error::other(err)
}

/// Keys the host understands besides scrolling
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    Action(UiAction),
    Scroll(f32),
    Orbit { yaw: f32, pitch: f32 },
    Retry,
    Quit,
}

impl Command {
    pub fn from_key(code: KeyCode, mode: Mode) -> Option<Self> {
        let command = match (code, mode) {
            (KeyCode::Char('q') | KeyCode::Esc, _) => Command::Quit,
            (KeyCode::Char('w'), Mode::Customizing) => Command::Orbit { yaw: 0.0, pitch: ORBIT_STEP },
            (KeyCode::Char('s'), Mode::Customizing) => Command::Orbit { yaw: 0.0, pitch: -ORBIT_STEP },
            (KeyCode::Char('a'), Mode::Customizing) => Command::Orbit { yaw: -ORBIT_STEP, pitch: 0.0 },
            (KeyCode::Char('d'), Mode::Customizing) => Command::Orbit { yaw: ORBIT_STEP, pitch: 0.0 },
            (KeyCode::Char('j') | KeyCode::Down, _) => Command::Scroll(SCROLL_STEP),
            (KeyCode::Char('k') | KeyCode::Up, _) => Command::Scroll(-SCROLL_STEP),
            (KeyCode::PageDown | KeyCode::Char(' '), _) => Command::Scroll(SCROLL_STEP * 8.0),
            (KeyCode::PageUp, _) => Command::Scroll(-SCROLL_STEP * 8.0),
            (KeyCode::Char('h'), _) => Command::Action(UiAction::Hero),
            (KeyCode::Char('f'), _) => Command::Action(UiAction::Footer),
            (KeyCode::Char('c'), _) => Command::Action(UiAction::Customize),
            (KeyCode::Char('x'), _) => Command::Action(UiAction::Exit),
            (KeyCode::Char('1'), _) => Command::Action(UiAction::Swatch(Swatch::Black)),
            (KeyCode::Char('2'), _) => Command::Action(UiAction::Swatch(Swatch::Red)),
            (KeyCode::Char('3'), _) => Command::Action(UiAction::Swatch(Swatch::Yellow)),
            (KeyCode::Char('r'), _) => Command::Retry,
            _ => return None,
        };
        Some(command)
    }
}

/// Main application struct for the terminal showcase
pub struct TerminalApp {
    configurator: Configurator<AsciiRenderer, TerminalPage>,
    running: bool,
    last_frame: Instant,
    frame_count: u32,
    fps: f32,
}

impl TerminalApp {
    pub fn new(config: ConfiguratorConfig, profile: DeviceProfile) -> io::Result<Self> {
        let (width, height) = terminal::size()?;
        Self::with_size(config, profile, width, height)
    }

    /// Build without touching the terminal
    pub fn with_size(config: ConfiguratorConfig, profile: DeviceProfile, width: u16, height: u16) -> io::Result<Self> {
        // Bottom row is the status line
        let rows = height.saturating_sub(1).max(1);
        let renderer = AsciiRenderer::new(width as usize, rows as usize);
        let page = TerminalPage::new(width, rows);
        let configurator = Configurator::new(renderer, page, config, profile).map_err(to_io_error)?;

        Ok(Self {
            configurator,
            running: true,
            last_frame: Instant::now(),
            frame_count: 0,
            fps: 0.0,
        })
    }

    pub fn configurator(&self) -> &Configurator<AsciiRenderer, TerminalPage> {
        &self.configurator
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn run(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(stdout(), terminal::EnterAlternateScreen, cursor::Hide)?;

        let result = self.main_loop();

        // Cleanup
        terminal::disable_raw_mode()?;
        execute!(stdout(), terminal::LeaveAlternateScreen, cursor::Show)?;

        result
    }

    fn main_loop(&mut self) -> io::Result<()> {
        let target_frame_time = Duration::from_millis(1000 / 30); // 30 FPS target
        let mut previous = Instant::now();

        while self.running {
            let frame_start = Instant::now();

            while event::poll(Duration::from_millis(0))? {
                self.handle_event(event::read()?);
            }

            let dt = frame_start.duration_since(previous).as_secs_f32();
            previous = frame_start;
            self.step(dt);
            self.render()?;

            self.frame_count += 1;
            let elapsed = frame_start.elapsed();
            if elapsed < target_frame_time {
                std::thread::sleep(target_frame_time - elapsed);
            }

            // Update FPS counter
            let now = Instant::now();
            if (now - self.last_frame).as_secs() >= 1 {
                self.fps = self.frame_count as f32 / (now - self.last_frame).as_secs_f32();
                self.frame_count = 0;
                self.last_frame = now;
            }
        }

        Ok(())
    }

    fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(KeyEvent { code, kind, .. }) if kind != KeyEventKind::Release => {
                if let Some(command) = Command::from_key(code, self.configurator.mode()) {
                    self.apply(command);
                }
            }
            Event::Resize(width, height) => self.resize(width, height),
            _ => {}
        }
    }

    pub fn apply(&mut self, command: Command) {
        match command {
            Command::Quit => self.running = false,
            Command::Scroll(rows) => {
                if self.configurator.page_mut().scroll_by(rows) {
                    self.configurator.on_scroll();
                }
            }
            Command::Action(action) => self.configurator.handle_action(action),
            Command::Orbit { yaw, pitch } => {
                self.configurator.engine_mut().orbit(yaw, pitch);
            }
            Command::Retry => {
                if !self.configurator.retry_load() {
                    log::debug!("nothing to retry");
                }
            }
        }
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        let rows = height.saturating_sub(1).max(1);
        self.configurator.engine_mut().resize(width as usize, rows as usize);
        self.configurator.page_mut().resize(width, rows);
        self.configurator.refresh_layout();
    }

    /// Feed importer events and page motion to the configurator, then render
    pub fn step(&mut self, dt: f32) {
        if let Some(event) = self.configurator.engine_mut().poll_importer() {
            self.configurator.importer_event(event);
        }
        if self.configurator.page_mut().tick(dt) {
            self.configurator.on_scroll();
        }
        self.configurator.frame(dt);
    }

    fn render(&mut self) -> io::Result<()> {
        let mut stdout = stdout();

        self.configurator.surface().engine().present(&mut stdout)?;
        self.configurator.page().draw(&mut stdout)?;

        let (width, height) = terminal::size()?;
        let status = self.status_line();
        let status: String = status.chars().take(width as usize).collect();
        queue!(
            stdout,
            cursor::MoveTo(0, height.saturating_sub(1)),
            SetForegroundColor(Color::Yellow),
            Print(status),
            ResetColor
        )?;

        stdout.flush()?;
        Ok(())
    }

    pub fn status_line(&self) -> String {
        let engine = self.configurator.surface().engine();
        let load = match self.configurator.load_phase() {
            LoadPhase::Loading => format!("loading {:.0}%", self.configurator.load_ratio() * 100.0),
            LoadPhase::Revealing { .. } | LoadPhase::Revealed => "ready".to_string(),
            LoadPhase::Failed(_) => "load failed".to_string(),
        };
        format!(
            "Drill Showcase | FPS: {:.1} | {} | scroll {:.0}/{:.0} | {:?} | samples {} | j/k=Scroll h/f/c/x=Buttons 1-3=Finish Q=Quit",
            self.fps,
            load,
            self.configurator.page().scroll_y(),
            self.configurator.page().max_scroll(),
            self.configurator.mode(),
            engine.samples(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use showcase_core::page::selectors;
    use showcase_core::Cursor;

    fn app() -> TerminalApp {
        TerminalApp::with_size(ConfiguratorConfig::default(), DeviceProfile::Desktop, 80, 31).unwrap()
    }

    fn run_frames(app: &mut TerminalApp, frames: usize) {
        for _ in 0..frames {
            app.step(1.0 / 30.0);
        }
    }

    #[test]
    fn test_keys_map_to_commands() {
        assert_eq!(Command::from_key(KeyCode::Char('c'), Mode::Overview), Some(Command::Action(UiAction::Customize)));
        assert_eq!(
            Command::from_key(KeyCode::Char('2'), Mode::Customizing),
            Some(Command::Action(UiAction::Swatch(Swatch::Red)))
        );
        // WASD orbits only while customizing
        assert_eq!(Command::from_key(KeyCode::Char('a'), Mode::Overview), None);
        assert!(matches!(
            Command::from_key(KeyCode::Char('a'), Mode::Customizing),
            Some(Command::Orbit { .. })
        ));
        assert_eq!(Command::from_key(KeyCode::Esc, Mode::Overview), Some(Command::Quit));
    }

    #[test]
    fn test_scrolling_waits_for_the_loader() {
        let mut app = app();
        app.apply(Command::Scroll(10.0));
        assert_eq!(app.configurator().page().scroll_y(), 0.0);

        // Import one part per frame, then the reveal
        run_frames(&mut app, 90);
        assert_eq!(app.configurator().load_phase(), &LoadPhase::Revealed);
        assert!(!app.configurator().page().is_scroll_locked());

        app.apply(Command::Scroll(10.0));
        assert_eq!(app.configurator().page().scroll_y(), 10.0);
    }

    #[test]
    fn test_customize_round_trip() {
        let mut app = app();
        run_frames(&mut app, 90);

        app.apply(Command::Action(UiAction::Customize));
        assert_eq!(app.configurator().page().cursor(), Cursor::Grab);
        assert!(app.configurator().page().is_visible(selectors::CUSTOMIZER));
        run_frames(&mut app, 40);

        app.apply(Command::Action(UiAction::Swatch(Swatch::Black)));
        app.apply(Command::Action(UiAction::Exit));
        assert!(!app.configurator().surface().engine().controls_enabled());
        run_frames(&mut app, 40);
        assert!(app.configurator().surface().engine().controls_enabled());
        assert!(app.configurator().page().is_visible(selectors::SECTIONS));
        assert_eq!(app.configurator().page().cursor(), Cursor::Default);
    }

    #[test]
    fn test_hero_button_scrolls_smoothly() {
        let mut app = app();
        run_frames(&mut app, 90);
        app.apply(Command::Action(UiAction::Hero));
        run_frames(&mut app, 60);
        assert_eq!(app.configurator().page().scroll_y(), 30.0);
        assert!(app.configurator().timeline().progress(0).unwrap() > 0.99);
    }

    #[test]
    fn test_quit() {
        let mut app = app();
        app.apply(Command::Quit);
        assert!(!app.is_running());
    }
}
