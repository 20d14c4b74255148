// SPDX-License-Identifier: GPL-3.0-only

//! Terminal preview surface
//!
//! Renders the camera feed to the terminal using Unicode half-block
//! characters, two vertical pixels per cell. The alternate screen is the
//! preview surface: entering it creates the surface, resizes change it and
//! leaving it destroys it.

use crate::app::{PreviewController, PreviewOptions, SurfaceEvent};
use crate::backends::camera::{CameraFrame, get_backend};
use crate::config::Config;
use crate::constants::terminal::{PIXELS_PER_CELL_Y, STATUS_BAR_ROWS};
use crate::errors::{AppError, AppResult, PreviewError};
use crate::preview::{DisplayDimensions, TransformMatrix};

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal, backend::CrosstermBackend, buffer::Buffer, layout::Rect, style::Color,
    widgets::Widget,
};
use std::io::{self, stdout};
use std::time::Duration;
use tracing::{info, warn};

/// Preview area of a terminal of `columns` × `rows` cells, in half-block pixels
pub fn display_dimensions(columns: u16, rows: u16) -> DisplayDimensions {
    DisplayDimensions::new(
        columns as u32,
        rows.saturating_sub(STATUS_BAR_ROWS) as u32 * PIXELS_PER_CELL_Y,
    )
}

/// Run the terminal preview
pub fn run(config: &Config) -> AppResult<()> {
    let options = PreviewOptions::from_config(config)?;

    let (columns, rows) = crossterm::terminal::size()?;
    let dims = display_dimensions(columns, rows);
    if dims.width == 0 || dims.height == 0 {
        return Err(AppError::Preview(PreviewError::InvalidArgument(format!(
            "terminal too small ({}x{} cells)",
            columns, rows
        ))));
    }
    info!(display = %dims, "Display size");

    // Camera errors are reported before the screen is taken over
    let mut controller = PreviewController::new(get_backend(), dims, options);
    controller.initialize()?;

    // Set up terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut controller, config);

    if let Err(e) = controller.handle_surface_event(SurfaceEvent::Destroyed) {
        warn!(error = %e, "Surface teardown failed");
    }

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    controller: &mut PreviewController,
    config: &Config,
) -> AppResult<()> {
    let mut frame_widget = FrameWidget::new(
        controller.display_transform(),
        controller.display(),
        config.mirror_preview,
    );
    let mut status_message = build_status_message(controller);

    if let Err(e) = controller.handle_surface_event(SurfaceEvent::Created) {
        status_message = format!("Preview unavailable: {} | 'q' quit", e);
    }

    let poll_interval = Duration::from_millis(config.frame_poll_interval_ms);

    loop {
        if let Some(frame) = controller.latest_frame() {
            frame_widget.update_frame(frame);
        }

        terminal.draw(|f| {
            let area = f.area();

            let camera_area = Rect {
                height: area.height.saturating_sub(STATUS_BAR_ROWS),
                ..area
            };
            f.render_widget(&frame_widget, camera_area);

            let status_area = Rect {
                x: area.x,
                y: area.y + camera_area.height,
                width: area.width,
                height: STATUS_BAR_ROWS.min(area.height),
            };
            f.render_widget(
                StatusBar {
                    message: &status_message,
                },
                status_area,
            );
        })?;

        if !event::poll(poll_interval)? {
            continue;
        }

        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                let ctrl_c = key.code == KeyCode::Char('c')
                    && key.modifiers.contains(KeyModifiers::CONTROL);
                if ctrl_c || key.code == KeyCode::Char('q') || key.code == KeyCode::Esc {
                    break;
                }
            }
            Event::Resize(columns, rows) => {
                let resized = display_dimensions(columns, rows);
                // Geometry stays fixed; the renderer stretches to the new area
                if let Err(e) = controller.handle_surface_event(SurfaceEvent::Changed {
                    width: resized.width,
                    height: resized.height,
                }) {
                    warn!(error = %e, "Surface change not handled");
                }
            }
            _ => {}
        }
    }

    Ok(())
}

fn build_status_message(controller: &PreviewController) -> String {
    match controller.plan() {
        Some(plan) => format!(
            "{} | {} @ {}° | 'q' quit",
            plan.device.name,
            plan.preview_size,
            controller.options().orientation.degrees()
        ),
        None => "'q' quit".to_string(),
    }
}

/// Map a surface pixel to the frame pixel shown there
///
/// The frame is laid out stretched over the display and the cover transform
/// is applied on top, so a surface pixel is first brought back to display
/// space, then through the inverse transform, then into frame space.
/// `surface` is the pixel size of the area being drawn, which may differ from
/// `display` after a resize.
pub fn surface_to_frame(
    transform: &TransformMatrix,
    display: DisplayDimensions,
    surface: (u32, u32),
    frame: (u32, u32),
    pixel: (u32, u32),
    mirror: bool,
) -> (u32, u32) {
    let (frame_width, frame_height) = frame;
    if frame_width == 0 || frame_height == 0 || surface.0 == 0 || surface.1 == 0 {
        return (0, 0);
    }

    let display_w = display.width as f32;
    let display_h = display.height as f32;

    // Sample pixel centers
    let u = (pixel.0 as f32 + 0.5) * display_w / surface.0 as f32;
    let v = (pixel.1 as f32 + 0.5) * display_h / surface.1 as f32;

    let (lx, ly) = transform.invert_point(u, v);

    // Float to int casts saturate, so anything left of the frame lands on 0
    let fx = ((lx * frame_width as f32 / display_w) as u32).min(frame_width - 1);
    let fy = ((ly * frame_height as f32 / display_h) as u32).min(frame_height - 1);

    if mirror {
        (frame_width - 1 - fx, fy)
    } else {
        (fx, fy)
    }
}

/// Widget that renders a camera frame using half-block characters
struct FrameWidget {
    frame: Option<CameraFrame>,
    transform: TransformMatrix,
    display: DisplayDimensions,
    mirror: bool,
}

impl FrameWidget {
    fn new(transform: TransformMatrix, display: DisplayDimensions, mirror: bool) -> Self {
        Self {
            frame: None,
            transform,
            display,
            mirror,
        }
    }

    fn update_frame(&mut self, frame: CameraFrame) {
        self.frame = Some(frame);
    }

    fn sample(&self, frame: &CameraFrame, surface: (u32, u32), pixel: (u32, u32)) -> Color {
        let (x, y) = surface_to_frame(
            &self.transform,
            self.display,
            surface,
            (frame.width, frame.height),
            pixel,
            self.mirror,
        );
        let (r, g, b) = frame.rgb_at(x, y);
        Color::Rgb(r, g, b)
    }
}

impl Widget for &FrameWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let Some(frame) = &self.frame else {
            // No frame yet - show placeholder
            let msg = "Waiting for camera...";
            let x = area.x + (area.width.saturating_sub(msg.len() as u16)) / 2;
            let y = area.y + area.height / 2;
            if y < area.y + area.height && x < area.x + area.width {
                buf.set_string(x, y, msg, ratatui::style::Style::default());
            }
            return;
        };

        let surface = (
            area.width as u32,
            area.height as u32 * PIXELS_PER_CELL_Y,
        );

        // Upper half (▀) colored with fg, lower half with bg
        for ty in 0..area.height {
            for tx in 0..area.width {
                let px = tx as u32;
                let py = ty as u32 * PIXELS_PER_CELL_Y;

                let top_color = self.sample(frame, surface, (px, py));
                let bottom_color = self.sample(frame, surface, (px, py + 1));

                if let Some(cell) = buf.cell_mut((area.x + tx, area.y + ty)) {
                    cell.set_char('▀');
                    cell.set_fg(top_color);
                    cell.set_bg(bottom_color);
                }
            }
        }
    }
}

/// Status bar widget
struct StatusBar<'a> {
    message: &'a str,
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 {
            return;
        }

        // Fill background
        for x in area.x..area.x + area.width {
            if let Some(cell) = buf.cell_mut((x, area.y)) {
                cell.set_char(' ');
                cell.set_bg(Color::DarkGray);
            }
        }

        let text: String = self.message.chars().take(area.width as usize).collect();

        buf.set_string(
            area.x,
            area.y,
            text,
            ratatui::style::Style::default()
                .fg(Color::White)
                .bg(Color::DarkGray),
        );
    }
}
