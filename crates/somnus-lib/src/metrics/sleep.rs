//! Sleep statistics computed from a hypnogram.
//!
//! All durations are reported in minutes except Sleep Efficiency (%).
//!
//! - Time in Bed (TIB): total duration of the recording.
//! - Total Dark Time (TDT): from the start of the record to the last
//!   non-wake epoch.
//! - Sleep Period Time (SPT): from the first N1 epoch to TDT.
//! - Wake After Sleep Onset (WASO): wake epochs within SPT.
//! - Total Sleep Time (TST): SPT - WASO.
//! - Sleep Efficiency (SE): TST / TDT * 100.
//! - Stage durations and latencies from the beginning of the record.
//!
//! A metric whose inputs are missing (stage never reached, all-wake
//! record, zero TDT) is `None`.

use crate::{
    config::StatsConfig,
    error::{HypnoError, Result},
    signal::SleepStage,
};
use log::debug;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Identifier of one row of the statistics table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatKey {
    Filename,
    SamplingFrequency,
    DownSampling,
    Units,
    TimeInBed,
    TotalDarkTime,
    Artefact,
    Wake,
    N1,
    N2,
    N3,
    Rem,
    LatencyN1,
    LatencyN2,
    LatencyN3,
    LatencyRem,
    SleepPeriodTime,
    WakeAfterSleepOnset,
    TotalSleepTime,
    SleepEfficiency,
}

impl StatKey {
    /// Every key, in display order.
    pub const ALL: [StatKey; 20] = [
        StatKey::Filename,
        StatKey::SamplingFrequency,
        StatKey::DownSampling,
        StatKey::Units,
        StatKey::TimeInBed,
        StatKey::TotalDarkTime,
        StatKey::Artefact,
        StatKey::Wake,
        StatKey::N1,
        StatKey::N2,
        StatKey::N3,
        StatKey::Rem,
        StatKey::LatencyN1,
        StatKey::LatencyN2,
        StatKey::LatencyN3,
        StatKey::LatencyRem,
        StatKey::SleepPeriodTime,
        StatKey::WakeAfterSleepOnset,
        StatKey::TotalSleepTime,
        StatKey::SleepEfficiency,
    ];

    /// Position of the row when the table is displayed.
    pub fn order(self) -> u8 {
        match self {
            StatKey::Filename => 0,
            StatKey::SamplingFrequency => 1,
            StatKey::DownSampling => 2,
            StatKey::Units => 3,
            StatKey::TimeInBed => 4,
            StatKey::TotalDarkTime => 5,
            StatKey::Artefact => 6,
            StatKey::Wake => 7,
            StatKey::N1 => 8,
            StatKey::N2 => 9,
            StatKey::N3 => 10,
            StatKey::Rem => 11,
            StatKey::LatencyN1 => 12,
            StatKey::LatencyN2 => 13,
            StatKey::LatencyN3 => 14,
            StatKey::LatencyRem => 15,
            StatKey::SleepPeriodTime => 16,
            StatKey::WakeAfterSleepOnset => 17,
            StatKey::TotalSleepTime => 18,
            StatKey::SleepEfficiency => 19,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StatKey::Filename => "Filename",
            StatKey::SamplingFrequency => "Sampling frequency",
            StatKey::DownSampling => "Down-sampling",
            StatKey::Units => "Units",
            StatKey::TimeInBed => "Duration (TIB)",
            StatKey::TotalDarkTime => "TDT",
            StatKey::Artefact => "Art",
            StatKey::Wake => "W",
            StatKey::N1 => "N1",
            StatKey::N2 => "N2",
            StatKey::N3 => "N3",
            StatKey::Rem => "REM",
            StatKey::LatencyN1 => "LatN1",
            StatKey::LatencyN2 => "LatN2",
            StatKey::LatencyN3 => "LatN3",
            StatKey::LatencyRem => "LatREM",
            StatKey::SleepPeriodTime => "SPT",
            StatKey::WakeAfterSleepOnset => "WASO",
            StatKey::TotalSleepTime => "TST",
            StatKey::SleepEfficiency => "SE (%)",
        }
    }
}

/// Value of a statistics row. `Number(None)` is the not-available marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StatValue {
    Text(String),
    Number(Option<f64>),
}

impl StatValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            StatValue::Number(value) => *value,
            StatValue::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            StatValue::Text(text) => Some(text),
            StatValue::Number(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatEntry {
    pub key: StatKey,
    pub label: String,
    pub order: u8,
    pub value: StatValue,
}

/// Number of epochs spent in each stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageCounts {
    pub artefact: usize,
    pub wake: usize,
    pub n1: usize,
    pub n2: usize,
    pub n3: usize,
    pub rem: usize,
}

impl StageCounts {
    pub fn tally(labels: &[i32]) -> Self {
        let mut counts = Self::default();
        for stage in labels.iter().filter_map(|&l| SleepStage::from_code(l)) {
            *counts.get_mut(stage) += 1;
        }
        counts
    }

    pub fn get(&self, stage: SleepStage) -> usize {
        match stage {
            SleepStage::Artefact => self.artefact,
            SleepStage::Wake => self.wake,
            SleepStage::N1 => self.n1,
            SleepStage::N2 => self.n2,
            SleepStage::N3 => self.n3,
            SleepStage::Rem => self.rem,
        }
    }

    fn get_mut(&mut self, stage: SleepStage) -> &mut usize {
        match stage {
            SleepStage::Artefact => &mut self.artefact,
            SleepStage::Wake => &mut self.wake,
            SleepStage::N1 => &mut self.n1,
            SleepStage::N2 => &mut self.n2,
            SleepStage::N3 => &mut self.n3,
            SleepStage::Rem => &mut self.rem,
        }
    }

    pub fn total(&self) -> usize {
        self.artefact + self.wake + self.n1 + self.n2 + self.n3 + self.rem
    }
}

/// First epoch of each sleep stage, in minutes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Latencies {
    pub n1: Option<f64>,
    pub n2: Option<f64>,
    pub n3: Option<f64>,
    pub rem: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SleepStats {
    pub filename: String,
    pub sfori: f64,
    pub sf: f64,
    /// Stride used to bring the labels down to one per epoch.
    pub step: usize,
    /// Length of the epoch-resampled hypnogram.
    pub epochs: usize,
    pub counts: StageCounts,
    pub epochs_per_minute: f64,
    pub time_in_bed: f64,
    pub total_dark_time: Option<f64>,
    pub latencies: Latencies,
    pub sleep_period_time: Option<f64>,
    pub wake_after_sleep_onset: Option<f64>,
    pub total_sleep_time: Option<f64>,
    pub sleep_efficiency: Option<f64>,
}

impl SleepStats {
    /// Minutes spent in `stage`.
    pub fn stage_minutes(&self, stage: SleepStage) -> f64 {
        self.counts.get(stage) as f64 / self.epochs_per_minute
    }

    pub fn get(&self, key: StatKey) -> StatValue {
        let minutes = |stage| StatValue::Number(Some(self.stage_minutes(stage)));
        match key {
            StatKey::Filename => StatValue::Text(self.filename.clone()),
            StatKey::SamplingFrequency => StatValue::Text(hz_label(self.sfori)),
            StatKey::DownSampling => StatValue::Text(hz_label(self.sf)),
            StatKey::Units => StatValue::Text("minutes".into()),
            StatKey::TimeInBed => StatValue::Number(Some(self.time_in_bed)),
            StatKey::TotalDarkTime => StatValue::Number(self.total_dark_time),
            StatKey::Artefact => minutes(SleepStage::Artefact),
            StatKey::Wake => minutes(SleepStage::Wake),
            StatKey::N1 => minutes(SleepStage::N1),
            StatKey::N2 => minutes(SleepStage::N2),
            StatKey::N3 => minutes(SleepStage::N3),
            StatKey::Rem => minutes(SleepStage::Rem),
            StatKey::LatencyN1 => StatValue::Number(self.latencies.n1),
            StatKey::LatencyN2 => StatValue::Number(self.latencies.n2),
            StatKey::LatencyN3 => StatValue::Number(self.latencies.n3),
            StatKey::LatencyRem => StatValue::Number(self.latencies.rem),
            StatKey::SleepPeriodTime => StatValue::Number(self.sleep_period_time),
            StatKey::WakeAfterSleepOnset => StatValue::Number(self.wake_after_sleep_onset),
            StatKey::TotalSleepTime => StatValue::Number(self.total_sleep_time),
            StatKey::SleepEfficiency => StatValue::Number(self.sleep_efficiency),
        }
    }

    /// All rows sorted by display order.
    pub fn entries(&self) -> Vec<StatEntry> {
        let mut entries: Vec<StatEntry> = StatKey::ALL
            .iter()
            .map(|&key| StatEntry {
                key,
                label: key.label().to_string(),
                order: key.order(),
                value: self.get(key),
            })
            .collect();
        entries.sort_by_key(|entry| entry.order);
        entries
    }
}

fn hz_label(fs: f64) -> String {
    format!("{} Hz", fs.trunc() as i64)
}

fn round_decimals(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round_ties_even() / scale
}

/// Stride that brings `len` labels down to one label per epoch.
pub fn epoch_step(len: usize, n: usize, cfg: &StatsConfig) -> Result<usize> {
    cfg.validate()?;
    let epochs = (n as f64 / (cfg.sfori * cfg.time_window)).round_ties_even();
    if epochs < 1.0 {
        return Err(HypnoError::invalid(format!(
            "{n} samples at {} Hz do not cover a single {} s epoch",
            cfg.sfori, cfg.time_window
        )));
    }
    let step = (len as f64 / epochs).floor() as usize;
    if step == 0 {
        return Err(HypnoError::invalid(format!(
            "{len} labels cannot be resampled to {epochs} epochs"
        )));
    }
    Ok(step)
}

/// Compute sleep statistics for `labels`.
///
/// `n` is the sample count of the recording before any down-sampling; it
/// fixes the number of epochs the labels are resampled to. `file` only
/// provides the filename shown in the table.
pub fn sleep_stats(
    file: Option<&Path>,
    labels: &[i32],
    n: usize,
    cfg: &StatsConfig,
) -> Result<SleepStats> {
    if labels.is_empty() {
        return Err(HypnoError::EmptyHypnogram);
    }
    let step = epoch_step(labels.len(), n, cfg)?;
    let hypno: Vec<i32> = labels.iter().step_by(step).copied().collect();
    debug!(
        "resampled {} labels to {} epochs (step {})",
        labels.len(),
        hypno.len(),
        step
    );

    let per_minute = cfg.epochs_per_minute();
    let to_minutes = |epochs: usize| epochs as f64 / per_minute;

    let tdt = hypno.iter().rposition(|&l| l != 0);
    let counts = StageCounts::tally(&hypno);
    let first = |stage: SleepStage| hypno.iter().position(|&l| l == stage.code());
    let lat_n1 = first(SleepStage::N1);

    let (spt, waso, tst) = match (lat_n1, tdt) {
        (Some(onset), Some(last)) => {
            let period = &hypno[onset..=last];
            let spt = period.len();
            let waso = period.iter().filter(|&&l| l == 0).count();
            (
                Some(to_minutes(spt)),
                Some(to_minutes(waso)),
                Some(to_minutes(spt - waso)),
            )
        }
        _ => (None, None, None),
    };

    let total_dark_time = tdt.map(to_minutes);
    let sleep_efficiency = match (tst, total_dark_time) {
        (Some(tst), Some(tdt)) if tdt > 0.0 => Some(round_decimals(tst / tdt * 100.0, 2)),
        _ => None,
    };

    let filename = file
        .and_then(|f| f.file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    Ok(SleepStats {
        filename,
        sfori: cfg.sfori,
        sf: cfg.sf,
        step,
        epochs: hypno.len(),
        counts,
        epochs_per_minute: per_minute,
        time_in_bed: (n as f64 / (cfg.sfori * 60.0)).round_ties_even(),
        total_dark_time,
        latencies: Latencies {
            n1: lat_n1.map(to_minutes),
            n2: first(SleepStage::N2).map(to_minutes),
            n3: first(SleepStage::N3).map(to_minutes),
            rem: first(SleepStage::Rem).map(to_minutes),
        },
        sleep_period_time: spt,
        wake_after_sleep_onset: waso,
        total_sleep_time: tst,
        sleep_efficiency,
    })
}
