//! pendular - Double pendulum terminal front-end
//!
//! Prompts for the initial conditions, integrates the run once, then plays
//! the trajectory in a loop on a ratatui canvas.
//! App logic lives in `pendular::tui::pendulum_app`.
//!
//! Usage: `pendulum-tui [config.yaml]`

#![forbid(unsafe_code)]

#[cfg(feature = "tui")]
fn main() -> std::io::Result<()> {
    use pendular::config::SimConfig;
    use pendular::tui::PendulumApp;

    let config = match std::env::args().nth(1) {
        Some(path) => match SimConfig::load(&path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error loading {path}: {e}");
                std::process::exit(1);
            }
        },
        None => SimConfig::default(),
    };
    tui::run(PendulumApp::with_config(config))
}

#[cfg(not(feature = "tui"))]
fn main() {
    eprintln!("TUI feature not enabled. Run with --features tui");
    std::process::exit(1);
}

#[cfg(feature = "tui")]
mod tui {
    use crossterm::{
        event::{self, Event, KeyEventKind},
        execute,
        terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    };
    use pendular::input::InputField;
    use pendular::tui::{PendulumApp, Phase};
    use pendular::visualization::{Layer, Pixel, RenderCommand};
    use ratatui::{
        backend::CrosstermBackend,
        layout::{Constraint, Direction, Layout, Rect},
        style::{Color, Modifier, Style},
        text::{Line, Span},
        widgets::{
            canvas::{Canvas, Circle, Line as CanvasLine, Points},
            Block, Borders, Paragraph,
        },
        Frame, Terminal,
    };
    use std::io;
    use std::time::Instant;

    /// Run the TUI application.
    pub fn run(mut app: PendulumApp) -> io::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        loop {
            let start = Instant::now();
            terminal.draw(|f| ui(f, &app))?;

            let timeout = app.pacer.remaining(start.elapsed());
            if event::poll(timeout)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        app.handle_key(key.code);
                    }
                }
            }

            if app.should_quit {
                break;
            }

            app.update();
        }

        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        Ok(())
    }

    fn ui(f: &mut Frame, app: &PendulumApp) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(10),
                Constraint::Length(3),
            ])
            .split(f.area());

        render_title(f, chunks[0], app);
        match app.phase {
            Phase::Entry(field) => render_entry(f, chunks[1], app, field),
            Phase::Preview | Phase::Running => render_canvas(f, chunks[1], app),
        }
        render_status(f, chunks[2], app);
    }

    fn render_title(f: &mut Frame, area: Rect, app: &PendulumApp) {
        let (label, color, controls) = match app.phase {
            Phase::Entry(_) => (
                "[INPUT]",
                Color::Yellow,
                "Controls: [Enter] Accept  [Backspace] Edit  [Q/Esc] Quit",
            ),
            Phase::Preview => (
                "[READY]",
                Color::Cyan,
                "Controls: [Enter] Simulate  [Q/Esc] Quit",
            ),
            Phase::Running => (
                "[RUNNING]",
                Color::Green,
                "Controls: [R] Restart  [N] New parameters  [Q/Esc] Quit",
            ),
        };
        let title = Paragraph::new(vec![Line::from(vec![
            Span::styled(
                " DOUBLE PENDULUM ",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(" | "),
            Span::styled(label, Style::default().fg(color)),
        ])])
        .block(Block::default().borders(Borders::ALL).title(controls));
        f.render_widget(title, area);
    }

    fn render_entry(f: &mut Frame, area: Rect, app: &PendulumApp, current: InputField) {
        let mut lines = Vec::with_capacity(InputField::ALL.len() + 2);
        for field in InputField::ALL {
            let line = if field == current {
                Line::from(vec![
                    Span::styled(
                        format!("> {:<42}", field.label()),
                        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(format!("{}_", app.buffer), Style::default().fg(Color::White)),
                ])
            } else {
                Line::from(vec![
                    Span::styled(format!("  {:<42}", field.label()), Style::default().fg(Color::Gray)),
                    Span::raw(format!("{}", app.input.get(field))),
                ])
            };
            lines.push(line);
        }
        if let Some(error) = &app.error {
            lines.push(Line::raw(""));
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        }

        let form = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title("Initial conditions"));
        f.render_widget(form, area);
    }

    /// Canvas y grows upward; pixel y grows downward.
    fn to_canvas(p: Pixel) -> (f64, f64) {
        (f64::from(p.0), -f64::from(p.1))
    }

    const fn layer_color(layer: Layer) -> Color {
        match layer {
            Layer::Arm => Color::White,
            Layer::Bob1 => Color::Red,
            Layer::Bob2 => Color::Green,
            Layer::Trace => Color::Blue,
        }
    }

    fn render_canvas(f: &mut Frame, area: Rect, app: &PendulumApp) {
        let extent = app.view_extent();
        let commands = app.frame_commands();

        let canvas = Canvas::default()
            .block(Block::default().borders(Borders::ALL).title("Pendulum"))
            .x_bounds([-extent, extent])
            .y_bounds([-extent, extent])
            .paint(|ctx| {
                for command in &commands {
                    match command {
                        RenderCommand::Path { points, layer } => {
                            let coords: Vec<(f64, f64)> =
                                points.iter().copied().map(to_canvas).collect();
                            ctx.draw(&Points {
                                coords: &coords,
                                color: layer_color(*layer),
                            });
                        }
                        RenderCommand::Line { from, to, layer } => {
                            let (x1, y1) = to_canvas(*from);
                            let (x2, y2) = to_canvas(*to);
                            ctx.draw(&CanvasLine {
                                x1,
                                y1,
                                x2,
                                y2,
                                color: layer_color(*layer),
                            });
                        }
                        RenderCommand::Circle {
                            center,
                            radius,
                            layer,
                        } => {
                            let (x, y) = to_canvas(*center);
                            ctx.draw(&Circle {
                                x,
                                y,
                                radius: *radius,
                                color: layer_color(*layer),
                            });
                        }
                    }
                }
            });

        f.render_widget(canvas, area);
    }

    fn render_status(f: &mut Frame, area: Rect, app: &PendulumApp) {
        let mut spans = vec![
            Span::styled("theta1: ", Style::default().fg(Color::Gray)),
            Span::styled(
                format!("{:8.2}°", app.angles.0.to_degrees()),
                Style::default().fg(Color::White),
            ),
            Span::raw(" | "),
            Span::styled("theta2: ", Style::default().fg(Color::Gray)),
            Span::styled(
                format!("{:8.2}°", app.angles.1.to_degrees()),
                Style::default().fg(Color::White),
            ),
        ];
        if let Some(playback) = app.playback() {
            spans.push(Span::raw(" | "));
            spans.push(Span::styled("t: ", Style::default().fg(Color::Gray)));
            spans.push(Span::styled(
                format!("{:6.2} s", playback.current().time),
                Style::default().fg(Color::Cyan),
            ));
            spans.push(Span::raw(" | "));
            spans.push(Span::styled("Frame: ", Style::default().fg(Color::Gray)));
            spans.push(Span::styled(
                format!("{}", app.pacer.frame_count()),
                Style::default().fg(Color::White),
            ));
            spans.push(Span::raw(" | "));
            spans.push(Span::styled("Max ΔE: ", Style::default().fg(Color::Gray)));
            spans.push(Span::styled(
                format!("{:.2e}", playback.trajectory().guard_report().max_energy_drift),
                Style::default().fg(Color::White),
            ));
        }

        let status = Paragraph::new(vec![Line::from(spans)]).block(Block::default().borders(Borders::ALL));
        f.render_widget(status, area);
    }
}
