use gm_core::config::RenderConfig;
use gm_core::frame::GlyphGrid;
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::canvas;
use crate::fps::FpsCounter;

/// Sidebar width.
pub const SIDEBAR_WIDTH: u16 = 22;

/// Loop state, mirrored for display decisions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderState {
    Running,
    Paused,
    Help,
    Quitting,
}

/// What is on screen: mesh or image.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SceneKind {
    Mesh,
    Image,
}

/// Status information supplied by the application.
#[derive(Clone, Debug)]
pub struct StatusInfo<'a> {
    pub name: &'a str,
    pub kind: SceneKind,
    /// Label of the running decode, if any.
    pub loading: Option<&'a str>,
    /// Last load error.
    pub error: Option<&'a str>,
    /// Faces drawn in the last frame (mesh only).
    pub faces_drawn: Option<usize>,
    /// Auto-rotation or playback is active.
    pub animating: bool,
}

/// Splits the screen into [canvas | sidebar]. The canvas sets the grid size.
#[must_use]
pub fn split(area: Rect) -> (Rect, Rect) {
    let chunks = Layout::horizontal([Constraint::Min(20), Constraint::Length(SIDEBAR_WIDTH)]).split(area);
    (chunks[0], chunks[1])
}

/// Draw the full UI: canvas + sidebar (+ help overlay).
pub fn draw(
    frame: &mut Frame,
    grid: &GlyphGrid,
    config: &RenderConfig,
    status: &StatusInfo<'_>,
    fps_counter: &FpsCounter,
    state: RenderState,
) {
    let area = frame.area();
    let (canvas_area, sidebar_area) = split(area);

    canvas::render_grid(frame.buffer_mut(), canvas_area, grid, config.fg_color, config.bg_color);
    draw_sidebar(frame, sidebar_area, config, status, fps_counter, state);

    if state == RenderState::Help {
        draw_help_overlay(frame, area);
    }
}

fn on_off(flag: bool) -> &'static str {
    if flag { "ON" } else { "OFF" }
}

fn section(title: &str) -> Line<'static> {
    Line::from(Span::styled(
        format!("─ {title} ─────"),
        Style::default().fg(Color::Yellow),
    ))
}

fn draw_sidebar(
    frame: &mut Frame,
    area: Rect,
    config: &RenderConfig,
    status: &StatusInfo<'_>,
    fps_counter: &FpsCounter,
    state: RenderState,
) {
    let state_str = match state {
        RenderState::Running => "▶ RUN",
        RenderState::Paused => "⏸ PAUSE",
        RenderState::Help => "? HELP",
        RenderState::Quitting => "⏹ QUIT",
    };

    let mut lines = vec![
        Line::from(Span::styled(state_str, Style::default().fg(Color::Green))),
        Line::from(format!(" {}", status.name)),
        Line::from(""),
    ];

    match status.kind {
        SceneKind::Mesh => {
            lines.push(section("Mesh"));
            lines.push(Line::from(format!(" Rot X: {:.2}", config.rotation_x)));
            lines.push(Line::from(format!(" Rot Y: {:.2}", config.rotation_y)));
            lines.push(Line::from(format!(" Zoom: {:.2}", config.zoom)));
            lines.push(Line::from(format!(" Resol: {:.2}", config.resolution)));
            lines.push(Line::from(format!(" Light: {:.1}", config.light_intensity)));
            lines.push(Line::from(format!(" Spin: {}", on_off(status.animating))));
            if let Some(faces) = status.faces_drawn {
                lines.push(Line::from(format!(" Faces: {faces}")));
            }
        }
        SceneKind::Image => {
            lines.push(section("Image"));
            lines.push(Line::from(format!(" Zoom: {:.2}", config.image_zoom)));
            lines.push(Line::from(format!(
                " Pan: {:+.2} {:+.2}",
                config.image_pan_x, config.image_pan_y
            )));
            lines.push(Line::from(format!(" Rot: {:.2}", config.image_rotation)));
            lines.push(Line::from(format!(" Invert: {}", on_off(config.invert))));
            lines.push(Line::from(format!(" Play: {}", on_off(status.animating))));
        }
    }
    lines.push(Line::from(format!(" Ramp: {}", config.ramp.name())));

    lines.push(Line::from(""));
    lines.push(section("Info"));
    lines.push(Line::from(format!(" {:.0} FPS", fps_counter.fps())));
    lines.push(Line::from(format!(" {:.1}ms", fps_counter.frame_time_ms)));
    if let Some(label) = status.loading {
        lines.push(Line::from(Span::styled(
            format!(" ⟳ {label}"),
            Style::default().fg(Color::Cyan),
        )));
    }
    if let Some(err) = status.error {
        lines.push(Line::from(Span::styled(
            format!(" ✗ {err}"),
            Style::default().fg(Color::Red),
        )));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        " ? = help",
        Style::default().fg(Color::DarkGray),
    )));

    let sidebar = Paragraph::new(lines).block(Block::default().borders(Borders::LEFT).title(" Params "));
    frame.render_widget(sidebar, area);
}

fn draw_help_overlay(frame: &mut Frame, area: Rect) {
    let help_text = vec![
        Line::from(Span::styled(
            " glyphmesh - Controls ",
            Style::default().fg(Color::Yellow),
        )),
        Line::from(""),
        Line::from(" q/Esc    Quit"),
        Line::from(" Space    Pause"),
        Line::from(" ←/→ ↑/↓  Rotate (mesh) / Pan (image)"),
        Line::from(" +/-      Zoom"),
        Line::from(" r        Toggle auto-rotate / playback"),
        Line::from(" c        Cycle ramp"),
        Line::from(" [/]      Resolution ±"),
        Line::from(" l/L      Light intensity ±"),
        Line::from(" i        Toggle invert"),
        Line::from(" ,/.      Image rotation ±"),
        Line::from(" ?        Toggle help"),
        Line::from(""),
        Line::from(Span::styled(
            " Press ? or Esc to close ",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let help_width = 42u16.min(area.width);
    let help_height = (help_text.len() as u16 + 2).min(area.height);
    let x = area.x + area.width.saturating_sub(help_width) / 2;
    let y = area.y + area.height.saturating_sub(help_height) / 2;
    let help_area = Rect::new(x, y, help_width, help_height);

    let help = Paragraph::new(help_text).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Help ")
            .style(Style::default().bg(Color::Black).fg(Color::White)),
    );
    frame.render_widget(help, help_area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn status(kind: SceneKind) -> StatusInfo<'static> {
        StatusInfo {
            name: "cube",
            kind,
            loading: Some("teapot.glb"),
            error: None,
            faces_drawn: Some(3),
            animating: true,
        }
    }

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(ratatui::buffer::Cell::symbol)
            .collect()
    }

    #[test]
    fn draws_grid_and_sidebar() {
        let mut terminal = Terminal::new(TestBackend::new(60, 20)).unwrap();
        let (canvas, _) = split(Rect::new(0, 0, 60, 20));
        let mut grid = GlyphGrid::new(canvas.width, canvas.height);
        grid.set(0, 0, '@');
        let config = RenderConfig::default();
        let fps = FpsCounter::new(10);
        terminal
            .draw(|f| draw(f, &grid, &config, &status(SceneKind::Mesh), &fps, RenderState::Running))
            .unwrap();
        assert_eq!(terminal.backend().buffer()[(0, 0)].symbol(), "@");
        let text = buffer_text(&terminal);
        assert!(text.contains("cube"));
        assert!(text.contains("Faces: 3"));
        assert!(text.contains("teapot.glb"));
    }

    #[test]
    fn image_sidebar_and_help() {
        let mut terminal = Terminal::new(TestBackend::new(70, 24)).unwrap();
        let grid = GlyphGrid::new(48, 24);
        let config = RenderConfig::default();
        let fps = FpsCounter::new(10);
        terminal
            .draw(|f| draw(f, &grid, &config, &status(SceneKind::Image), &fps, RenderState::Running))
            .unwrap();
        assert!(buffer_text(&terminal).contains("Invert: OFF"));

        terminal
            .draw(|f| draw(f, &grid, &config, &status(SceneKind::Image), &fps, RenderState::Help))
            .unwrap();
        assert!(buffer_text(&terminal).contains("Controls"));
    }

    #[test]
    fn canvas_leaves_room_for_sidebar() {
        let (canvas, sidebar) = split(Rect::new(0, 0, 100, 30));
        assert_eq!(sidebar.width, SIDEBAR_WIDTH);
        assert_eq!(canvas.width + sidebar.width, 100);
    }
}
