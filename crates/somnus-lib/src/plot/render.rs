//! PNG output of a [`HypnogramFigure`] through plotters.

use super::{HypnogramFigure, REM_BAR};
use crate::error::{HypnoError, Result};
use log::debug;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::path::Path;

/// Canvas size and resolution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderOptions {
    pub width_in: f64,
    pub height_in: f64,
    pub dpi: u32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width_in: 10.0,
            height_in: 4.0,
            dpi: 600,
        }
    }
}

impl RenderOptions {
    pub fn pixel_size(&self) -> (u32, u32) {
        (
            (self.width_in * self.dpi as f64).round() as u32,
            (self.height_in * self.dpi as f64).round() as u32,
        )
    }

    /// Typographic points to pixels.
    fn px(&self, points: f64) -> u32 {
        ((points * self.dpi as f64 / 72.0).round() as u32).max(1)
    }
}

fn render_err(err: impl std::fmt::Display) -> HypnoError {
    HypnoError::Render(err.to_string())
}

/// Draw `fig` into a PNG file at `path`.
pub fn save_png(path: &Path, fig: &HypnogramFigure, opts: &RenderOptions) -> Result<()> {
    let (width, height) = opts.pixel_size();
    if width == 0 || height == 0 {
        return Err(HypnoError::invalid("canvas has no pixels"));
    }
    debug!("rendering hypnogram to {} ({}x{})", path.display(), width, height);

    let backend = BitMapBackend::new(path, (width, height));
    let root = backend.into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;

    let (r, g, b) = fig.style.color.rgb();
    let ink = RGBColor(r, g, b);
    let line_px = opts.px(fig.style.width as f64);
    let font_px = opts.px(10.0);
    let tick_len = opts.px(3.5) as i32;
    let (y_top, y_bottom) = fig.y_limits();
    let x_max = fig.duration().max(1.0);

    let mut chart = ChartBuilder::on(&root)
        .margin(opts.px(8.0))
        .x_label_area_size(opts.px(32.0))
        .y_label_area_size(opts.px(44.0))
        .build_cartesian_2d(0f64..x_max, y_bottom..y_top)
        .map_err(render_err)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .x_labels(2)
        .y_labels(2)
        .x_label_formatter(&|_| String::new())
        .y_label_formatter(&|_| String::new())
        .set_all_tick_mark_size(0)
        .axis_style(ink.stroke_width(opts.px(0.8)))
        .x_desc(fig.x_label.as_str())
        .y_desc(fig.y_label.as_str())
        .axis_desc_style(("sans-serif", font_px))
        .draw()
        .map_err(render_err)?;

    if fig.grid {
        let grid_style = ink.mix(0.3).stroke_width(opts.px(0.2));
        for tick in &fig.x_ticks {
            chart
                .draw_series(std::iter::once(PathElement::new(
                    vec![(tick.value, y_top), (tick.value, y_bottom)],
                    grid_style,
                )))
                .map_err(render_err)?;
        }
        for tick in &fig.y_ticks {
            chart
                .draw_series(std::iter::once(PathElement::new(
                    vec![(0.0, tick.value), (x_max, tick.value)],
                    grid_style,
                )))
                .map_err(render_err)?;
        }
    }

    chart
        .draw_series(LineSeries::new(
            fig.points.iter().map(|p| (p[0], p[1])),
            ink.stroke_width(line_px),
        ))
        .map_err(render_err)?;
    chart
        .draw_series(
            fig.rem_bars
                .iter()
                .map(|bar| Rectangle::new([(bar[0], REM_BAR.0), (bar[1], REM_BAR.1)], ink.filled())),
        )
        .map_err(render_err)?;

    let tick_style = ink.stroke_width(opts.px(0.8));
    let below = TextStyle::from(("sans-serif", font_px).into_font())
        .color(&ink)
        .pos(Pos::new(HPos::Center, VPos::Top));
    for tick in &fig.x_ticks {
        let (x, y) = chart.backend_coord(&(tick.value, y_bottom));
        root.draw(&PathElement::new(vec![(x, y), (x, y + tick_len)], tick_style))
            .map_err(render_err)?;
        root.draw(&Text::new(tick.label.clone(), (x, y + 2 * tick_len), below.clone()))
            .map_err(render_err)?;
    }
    let left = TextStyle::from(("sans-serif", font_px).into_font())
        .color(&ink)
        .pos(Pos::new(HPos::Right, VPos::Center));
    for tick in fig.y_ticks.iter().filter(|t| !t.label.is_empty()) {
        let (x, y) = chart.backend_coord(&(0.0, tick.value));
        root.draw(&PathElement::new(vec![(x - tick_len, y), (x, y)], tick_style))
            .map_err(render_err)?;
        root.draw(&Text::new(tick.label.clone(), (x - 2 * tick_len, y), left.clone()))
            .map_err(render_err)?;
    }

    root.present().map_err(render_err)?;
    Ok(())
}
