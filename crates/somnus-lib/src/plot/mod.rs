pub mod render;

use crate::{
    detectors::transient::transients,
    error::{HypnoError, Result},
    signal::SleepStage,
};
use serde::{Deserialize, Serialize};

pub use render::{save_png, RenderOptions};

/// Row of REM once the stages are re-ordered for display.
pub const REM_ROW: i32 = 1;
/// Vertical extent of the REM bar.
pub const REM_BAR: (f64, f64) = (0.6, 1.0);

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color(pub u32);

impl Color {
    pub const BLACK: Color = Color(0x000000);

    pub fn rgb(self) -> (u8, u8, u8) {
        (
            ((self.0 >> 16) & 0xFF) as u8,
            ((self.0 >> 8) & 0xFF) as u8,
            (self.0 & 0xFF) as u8,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Style {
    /// Line width in points (1/72 inch).
    pub width: f32,
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tick {
    pub value: f64,
    pub label: String,
}

/// Everything needed to draw a hypnogram, in display coordinates.
///
/// The x axis is in seconds from the start of the record, the y axis in
/// display rows (Art -1, Wake 0, REM 1, N1 2, N2 3, N3 4), drawn inverted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HypnogramFigure {
    /// Display row for every second of the record.
    pub rows: Vec<i32>,
    /// Step-line vertices.
    pub points: Vec<[f64; 2]>,
    /// `[start, end)` in seconds of each REM run.
    pub rem_bars: Vec<[f64; 2]>,
    pub x_ticks: Vec<Tick>,
    pub y_ticks: Vec<Tick>,
    pub has_artefact: bool,
    pub grid: bool,
    pub style: Style,
    pub x_label: String,
    pub y_label: String,
}

impl HypnogramFigure {
    /// Record length in seconds.
    pub fn duration(&self) -> f64 {
        self.rows.len() as f64
    }

    /// Y axis limits as (top, bottom) row values.
    pub fn y_limits(&self) -> (f64, f64) {
        let top = self.y_ticks.first().map(|t| t.value).unwrap_or(-0.5);
        let bottom = self.y_ticks.last().map(|t| t.value).unwrap_or(4.5);
        (top, bottom)
    }
}

/// Display row of a stage code: REM moves between Wake and N1.
pub fn display_row(code: i32) -> i32 {
    if code == SleepStage::Rem.code() {
        REM_ROW
    } else if code >= 1 {
        code + 1
    } else {
        code
    }
}

/// Tick spacing (seconds) and line width for a record of `seconds`.
pub fn tick_spacing(seconds: usize) -> (usize, f32) {
    let minutes = seconds as f64 / 60.0;
    if minutes < 60.0 {
        (10 * 60, 2.0)
    } else if minutes < 180.0 {
        (30 * 60, 1.5)
    } else {
        (60 * 60, 1.25)
    }
}

/// `H:MM` clock label, wrapped at 24 hours.
pub fn clock_label(seconds: i64) -> String {
    let secs = seconds.rem_euclid(24 * 3600);
    format!("{}:{:02}", secs / 3600, (secs % 3600) / 60)
}

fn x_ticks(seconds: usize, tstart_sec: f64) -> (Vec<Tick>, f32) {
    let (spacing, width) = tick_spacing(seconds);
    let offset = tstart_sec.trunc() as i64;
    let mut positions: Vec<usize> = (0..seconds).step_by(spacing).collect();
    positions.push(seconds);
    let ticks = positions
        .into_iter()
        .map(|pos| Tick {
            value: pos as f64,
            label: clock_label(pos as i64 + offset),
        })
        .collect();
    (ticks, width)
}

fn y_ticks(has_artefact: bool) -> Vec<Tick> {
    let (values, labels): ([f64; 7], [&str; 7]) = if has_artefact {
        (
            [-1.0, 0.0, 1.0, 2.0, 3.0, 4.0, 5.0],
            ["Art", "Wake", "REM", "N1", "N2", "N3", ""],
        )
    } else {
        (
            [-0.5, 0.0, 1.0, 2.0, 3.0, 4.0, 4.5],
            ["", "Wake", "REM", "N1", "N2", "N3", ""],
        )
    };
    values
        .iter()
        .zip(labels)
        .map(|(&value, label)| Tick {
            value,
            label: label.to_string(),
        })
        .collect()
}

/// Lay out a hypnogram chart.
///
/// `labels` are sampled at `sf` Hz and reduced to one value per second.
/// `tstart_sec` is the clock time of the first sample, in seconds after
/// midnight. The caller's labels are left untouched.
pub fn hypnogram_figure(
    labels: &[i32],
    sf: f64,
    tstart_sec: f64,
    grid: bool,
) -> Result<HypnogramFigure> {
    if labels.is_empty() {
        return Err(HypnoError::EmptyHypnogram);
    }
    if !sf.is_finite() {
        return Err(HypnoError::invalid(format!("sampling frequency {sf}")));
    }
    let stride = (sf.trunc() as usize).max(1);
    let rows: Vec<i32> = labels
        .iter()
        .step_by(stride)
        .map(|&code| display_row(code))
        .collect();
    let has_artefact = rows.contains(&SleepStage::Artefact.code());

    let segments = transients(&rows, None)?.segments();
    let mut points = Vec::with_capacity(segments.len() * 2);
    let mut rem_bars = Vec::new();
    for seg in &segments {
        let start = seg.start as f64;
        let end = (seg.end + 1) as f64;
        points.push([start, seg.stage as f64]);
        points.push([end, seg.stage as f64]);
        if seg.stage == REM_ROW {
            rem_bars.push([start, end]);
        }
    }

    let (x_ticks, width) = x_ticks(rows.len(), tstart_sec);
    Ok(HypnogramFigure {
        rows,
        points,
        rem_bars,
        x_ticks,
        y_ticks: y_ticks(has_artefact),
        has_artefact,
        grid,
        style: Style {
            width,
            color: Color::BLACK,
        },
        x_label: "Time".into(),
        y_label: "Sleep Stage".into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rem_is_drawn_between_wake_and_n1() {
        assert_eq!(display_row(-1), -1);
        assert_eq!(display_row(0), 0);
        assert_eq!(display_row(1), 2);
        assert_eq!(display_row(2), 3);
        assert_eq!(display_row(3), 4);
        assert_eq!(display_row(4), REM_ROW);
    }

    #[test]
    fn tick_spacing_follows_record_length() {
        assert_eq!(tick_spacing(59 * 60), (600, 2.0));
        assert_eq!(tick_spacing(60 * 60), (1800, 1.5));
        assert_eq!(tick_spacing(179 * 60), (1800, 1.5));
        assert_eq!(tick_spacing(8 * 3600), (3600, 1.25));
    }

    #[test]
    fn clock_labels_wrap_at_midnight() {
        assert_eq!(clock_label(0), "0:00");
        assert_eq!(clock_label(23 * 3600 + 30 * 60), "23:30");
        assert_eq!(clock_label(24 * 3600 + 600), "0:10");
    }

    #[test]
    fn figure_resamples_to_seconds_and_keeps_input() {
        // 2 Hz: 40 minutes of N2 then 5 minutes of REM
        let mut labels = vec![2; 2 * 40 * 60];
        labels.extend(vec![4; 2 * 5 * 60]);
        let before = labels.clone();
        let fig = hypnogram_figure(&labels, 2.0, 22.0 * 3600.0, false).unwrap();
        assert_eq!(labels, before);
        assert_eq!(fig.rows.len(), 45 * 60);
        assert_eq!(fig.rem_bars, vec![[2400.0, 2700.0]]);
        let tick_values: Vec<f64> = fig.x_ticks.iter().map(|t| t.value).collect();
        assert_eq!(
            tick_values,
            vec![0.0, 600.0, 1200.0, 1800.0, 2400.0, 2700.0]
        );
        assert_eq!(fig.x_ticks[0].label, "22:00");
        assert_eq!(fig.x_ticks[5].label, "22:45");
        assert_eq!(fig.style.width, 2.0);
        assert_eq!(
            fig.points,
            vec![[0.0, 3.0], [2400.0, 3.0], [2400.0, 1.0], [2700.0, 1.0]]
        );
    }

    #[test]
    fn artefacts_extend_the_y_axis() {
        let fig = hypnogram_figure(&[0, -1, 1, 3], 1.0, 0.0, true).unwrap();
        assert!(fig.has_artefact);
        assert_eq!(fig.y_ticks[0].label, "Art");
        assert_eq!(fig.y_limits(), (-1.0, 5.0));

        let clean = hypnogram_figure(&[0, 1, 3], 1.0, 0.0, false).unwrap();
        assert!(!clean.has_artefact);
        assert_eq!(clean.y_ticks[0].label, "");
        assert_eq!(clean.y_limits(), (-0.5, 4.5));
    }

    #[test]
    fn empty_labels_are_rejected() {
        assert!(matches!(
            hypnogram_figure(&[], 100.0, 0.0, false),
            Err(HypnoError::EmptyHypnogram)
        ));
    }
}
