//! Double pendulum TUI application state and logic.
//!
//! Terminal I/O is handled by the `pendulum-tui` binary; everything that
//! decides what happens on a key press or a frame tick lives here.

use crossterm::event::KeyCode;

use crate::config::SimConfig;
use crate::engine::{State, TrajectoryIntegrator};
use crate::input::{InputField, UserInput};
use crate::replay::{FramePacer, Playback};
use crate::scenarios::pendulum::PendulumParameters;
use crate::visualization::{render_frame, Projector, RenderCommand, Trace};

/// Which screen the app is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Prompting for one field.
    Entry(InputField),
    /// Initial pose shown, waiting for Enter.
    Preview,
    /// Trajectory playing in a loop.
    Running,
}

/// Application state for the pendulum TUI.
pub struct PendulumApp {
    /// Configuration used for every run.
    pub config: SimConfig,
    /// Values entered so far, in user units.
    pub input: UserInput,
    /// Current screen.
    pub phase: Phase,
    /// Text being edited for the current field.
    pub buffer: String,
    /// Last validation or integration error, shown until the next edit.
    pub error: Option<String>,
    /// Validated physical parameters, set when entry completes.
    params: PendulumParameters,
    /// Validated initial state, set when entry completes.
    initial: State,
    /// Active playback, set when running.
    playback: Option<Playback>,
    /// Recent bob-2 positions.
    pub trace: Trace,
    /// Angles drawn in the current frame.
    pub angles: (f64, f64),
    /// Screen mapping, pivot at the origin.
    pub projector: Projector,
    /// Frame pacing.
    pub pacer: FramePacer,
    /// Whether the app should quit.
    pub should_quit: bool,
}

impl PendulumApp {
    /// Create the app with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(SimConfig::default())
    }

    /// Create the app with the given configuration.
    ///
    /// An invalid frame rate falls back to the default pacer.
    #[must_use]
    pub fn with_config(config: SimConfig) -> Self {
        let input = UserInput::default();
        let pacer = FramePacer::new(config.playback.frame_rate).unwrap_or_default();
        Self {
            projector: Projector::from_config(&config, (0, 0)),
            trace: Trace::new(config.playback.trace_length),
            buffer: format_value(input.get(InputField::Theta1)),
            phase: Phase::Entry(InputField::Theta1),
            error: None,
            params: PendulumParameters::default(),
            initial: State::rest(),
            playback: None,
            angles: (0.0, 0.0),
            pacer,
            should_quit: false,
            config,
            input,
        }
    }

    /// Handle a key press.
    pub fn handle_key(&mut self, key: KeyCode) {
        if matches!(key, KeyCode::Char('q') | KeyCode::Esc) {
            self.should_quit = true;
            return;
        }
        match self.phase {
            Phase::Entry(field) => self.handle_entry_key(field, key),
            Phase::Preview => {
                if key == KeyCode::Enter {
                    self.start();
                }
            }
            Phase::Running => match key {
                KeyCode::Char('r') => self.restart(),
                KeyCode::Char('n') => self.edit_again(),
                _ => {}
            },
        }
    }

    fn handle_entry_key(&mut self, field: InputField, key: KeyCode) {
        match key {
            KeyCode::Enter => self.accept_field(field),
            KeyCode::Backspace => {
                self.buffer.pop();
                self.error = None;
            }
            KeyCode::Char(c) if is_numeric_char(c) => {
                self.buffer.push(c);
                self.error = None;
            }
            _ => {}
        }
    }

    fn accept_field(&mut self, field: InputField) {
        if let Err(e) = self.input.parse(field, &self.buffer) {
            self.error = Some(e.to_string());
            return;
        }
        self.error = None;

        if let Some(next) = field.next() {
            self.enter_field(next);
            return;
        }

        match self.input.into_initial_conditions() {
            Ok(ic) => {
                self.initial = ic.state;
                self.params = ic.params;
                self.angles = ic.state.angles();
                self.phase = Phase::Preview;
                self.buffer.clear();
            }
            Err(e) => self.error = Some(e.to_string()),
        }
    }

    fn enter_field(&mut self, field: InputField) {
        self.phase = Phase::Entry(field);
        self.buffer = format_value(self.input.get(field));
    }

    /// Integrate the entered run and start playback.
    ///
    /// On failure the error is shown and entry restarts at the first field.
    pub fn start(&mut self) {
        let result = TrajectoryIntegrator::from_config(&self.config)
            .and_then(|integrator| integrator.run(self.initial, &self.params));
        match result {
            Ok(trajectory) => {
                tracing::debug!(samples = trajectory.len(), "playback started");
                self.playback = Some(Playback::new(trajectory));
                self.trace.clear();
                self.pacer = FramePacer::new(self.config.playback.frame_rate).unwrap_or_default();
                self.phase = Phase::Running;
            }
            Err(e) => {
                tracing::warn!(error = %e, "integration failed");
                self.error = Some(e.to_string());
                self.enter_field(InputField::Theta1);
            }
        }
    }

    fn restart(&mut self) {
        if let Some(playback) = self.playback.as_mut() {
            playback.reset();
        }
        self.trace.clear();
        self.angles = self.initial.angles();
    }

    fn edit_again(&mut self) {
        self.playback = None;
        self.trace.clear();
        self.enter_field(InputField::Theta1);
    }

    /// Advance one frame. Only does work while running.
    pub fn update(&mut self) {
        if self.phase != Phase::Running {
            return;
        }
        let Some(playback) = self.playback.as_mut() else {
            return;
        };
        let state = playback.advance();
        self.angles = state.angles();
        let bobs = self.projector.project(&self.params, state.theta1, state.theta2);
        self.trace.push(bobs.bob2);
        self.pacer.tick();
    }

    /// Draw commands for the current frame, empty during entry.
    #[must_use]
    pub fn frame_commands(&self) -> Vec<RenderCommand> {
        match self.phase {
            Phase::Entry(_) => Vec::new(),
            Phase::Preview | Phase::Running => {
                render_frame(&self.projector, &self.params, self.angles, &self.trace)
            }
        }
    }

    /// Half-width of the drawing area in pixels, with a small margin.
    #[must_use]
    pub fn view_extent(&self) -> f64 {
        self.projector.reach_pixels(&self.params) * 1.1
    }

    /// Active playback, if running.
    #[must_use]
    pub const fn playback(&self) -> Option<&Playback> {
        self.playback.as_ref()
    }

    /// Validated parameters of the current run.
    #[must_use]
    pub const fn params(&self) -> &PendulumParameters {
        &self.params
    }
}

impl Default for PendulumApp {
    fn default() -> Self {
        Self::new()
    }
}

fn is_numeric_char(c: char) -> bool {
    c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E')
}

fn format_value(value: f64) -> String {
    format!("{value}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn short_app() -> PendulumApp {
        let config = SimConfig::builder().t_max(1.0).dt(0.05).build();
        PendulumApp::with_config(config)
    }

    fn accept_defaults(app: &mut PendulumApp) {
        for _ in InputField::ALL {
            app.handle_key(KeyCode::Enter);
        }
    }

    #[test]
    fn test_starts_at_first_field_with_default() {
        let app = short_app();
        assert_eq!(app.phase, Phase::Entry(InputField::Theta1));
        assert_eq!(app.buffer, "30");
        assert!(!app.should_quit);
        assert!(app.frame_commands().is_empty());
    }

    #[test]
    fn test_enter_walks_fields_in_order() {
        let mut app = short_app();
        app.handle_key(KeyCode::Enter);
        assert_eq!(app.phase, Phase::Entry(InputField::Theta2));
        assert_eq!(app.buffer, "0");
        for _ in 0..3 {
            app.handle_key(KeyCode::Enter);
        }
        assert_eq!(app.phase, Phase::Entry(InputField::L1));
        assert_eq!(app.buffer, "1");
    }

    #[test]
    fn test_editing_buffer() {
        let mut app = short_app();
        app.handle_key(KeyCode::Backspace);
        app.handle_key(KeyCode::Backspace);
        app.handle_key(KeyCode::Char('9'));
        app.handle_key(KeyCode::Char('x'));
        app.handle_key(KeyCode::Char('0'));
        assert_eq!(app.buffer, "90");
        app.handle_key(KeyCode::Enter);
        assert!((app.input.theta1_deg - 90.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_invalid_value_keeps_field() {
        let mut app = short_app();
        for _ in 0..4 {
            app.handle_key(KeyCode::Enter);
        }
        assert_eq!(app.phase, Phase::Entry(InputField::L1));
        app.handle_key(KeyCode::Backspace);
        app.handle_key(KeyCode::Char('0'));
        app.handle_key(KeyCode::Enter);
        assert_eq!(app.phase, Phase::Entry(InputField::L1));
        assert!(app.error.as_deref().unwrap_or_default().contains("l1"));

        app.handle_key(KeyCode::Backspace);
        assert!(app.error.is_none());
    }

    #[test]
    fn test_empty_buffer_is_an_error() {
        let mut app = short_app();
        app.handle_key(KeyCode::Backspace);
        app.handle_key(KeyCode::Backspace);
        app.handle_key(KeyCode::Enter);
        assert_eq!(app.phase, Phase::Entry(InputField::Theta1));
        assert!(app.error.is_some());
    }

    #[test]
    fn test_preview_then_run() {
        let mut app = short_app();
        accept_defaults(&mut app);
        assert_eq!(app.phase, Phase::Preview);
        assert!((app.angles.0 - 30f64.to_radians()).abs() < 1e-12);
        assert_eq!(app.frame_commands().len(), 4);

        // Updates do nothing before playback starts.
        app.update();
        assert!(app.trace.is_empty());

        app.handle_key(KeyCode::Enter);
        assert_eq!(app.phase, Phase::Running);
        assert_eq!(app.playback().map(Playback::len), Some(20));

        for _ in 0..5 {
            app.update();
        }
        assert_eq!(app.trace.len(), 5);
        assert_eq!(app.pacer.frame_count(), 5);
        assert_eq!(app.playback().map(Playback::index), Some(5));
        assert_eq!(app.frame_commands().len(), 5);
    }

    #[test]
    fn test_playback_loops() {
        let mut app = short_app();
        accept_defaults(&mut app);
        app.handle_key(KeyCode::Enter);
        for _ in 0..20 {
            app.update();
        }
        assert_eq!(app.playback().map(Playback::index), Some(0));
    }

    #[test]
    fn test_restart_and_new_parameters() {
        let mut app = short_app();
        accept_defaults(&mut app);
        app.handle_key(KeyCode::Enter);
        app.update();
        app.update();

        app.handle_key(KeyCode::Char('r'));
        assert_eq!(app.playback().map(Playback::index), Some(0));
        assert!(app.trace.is_empty());

        app.handle_key(KeyCode::Char('n'));
        assert_eq!(app.phase, Phase::Entry(InputField::Theta1));
        assert!(app.playback().is_none());
    }

    #[test]
    fn test_quit_from_any_phase() {
        let mut app = short_app();
        app.handle_key(KeyCode::Char('q'));
        assert!(app.should_quit);

        let mut app = short_app();
        accept_defaults(&mut app);
        app.handle_key(KeyCode::Esc);
        assert!(app.should_quit);
    }

    #[test]
    fn test_integration_failure_returns_to_entry() {
        let mut config = SimConfig::builder().t_max(1.0).dt(0.05).build();
        config.integration.max_steps = 1;
        let mut app = PendulumApp::with_config(config);
        accept_defaults(&mut app);
        app.handle_key(KeyCode::Enter);
        assert_eq!(app.phase, Phase::Entry(InputField::Theta1));
        assert!(app.error.is_some());
    }

    #[test]
    fn test_view_extent_covers_reach() {
        let app = short_app();
        assert!(app.view_extent() > 200.0);
    }
}
