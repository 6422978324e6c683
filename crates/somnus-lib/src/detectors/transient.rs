use crate::{
    error::{HypnoError, Result},
    signal::Segment,
};
use log::debug;
use serde::{Deserialize, Serialize};

/// Segment bounds, either as raw sample indices or mapped onto a time vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Spans {
    Indices(Vec<[usize; 2]>),
    Coordinates(Vec<[f64; 2]>),
}

impl Spans {
    pub fn len(&self) -> usize {
        match self {
            Spans::Indices(spans) => spans.len(),
            Spans::Coordinates(spans) => spans.len(),
        }
    }
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Stage changes found in a hypnogram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transients {
    /// Indices `i` where `labels[i] != labels[i + 1]`.
    pub changes: Vec<usize>,
    /// Inclusive (start, end) bounds of each segment.
    pub spans: Spans,
    /// Stage at the start of each segment.
    pub stages: Vec<i32>,
    /// Length of the analysed label sequence.
    pub sample_count: usize,
}

impl Transients {
    /// Segments with raw index bounds, whatever representation `spans` uses.
    pub fn segments(&self) -> Vec<Segment> {
        let mut out = Vec::with_capacity(self.stages.len());
        let mut start = 0;
        for (&change, &stage) in self.changes.iter().zip(&self.stages) {
            out.push(Segment {
                start,
                end: change,
                stage,
            });
            start = change + 1;
        }
        if let Some(&stage) = self.stages.last() {
            out.push(Segment {
                start,
                end: self.sample_count - 1,
                stage,
            });
        }
        out
    }
}

/// Detect stage transitions in `labels`.
///
/// When `coords` has exactly one entry per label the segment bounds are
/// expressed in those coordinates, otherwise raw indices are returned.
pub fn transients(labels: &[i32], coords: Option<&[f64]>) -> Result<Transients> {
    if labels.is_empty() {
        return Err(HypnoError::EmptyHypnogram);
    }
    let changes: Vec<usize> = labels
        .windows(2)
        .enumerate()
        .filter(|(_, w)| w[0] != w[1])
        .map(|(i, _)| i)
        .collect();

    let mut bounds = Vec::with_capacity(changes.len() + 1);
    let mut start = 0;
    for &change in &changes {
        bounds.push([start, change]);
        start = change + 1;
    }
    bounds.push([start, labels.len() - 1]);

    let stages = bounds.iter().map(|b| labels[b[0]]).collect();

    let spans = match coords {
        Some(xvec) if xvec.len() == labels.len() => Spans::Coordinates(
            bounds
                .iter()
                .map(|b| [xvec[b[0]], xvec[b[1]]])
                .collect(),
        ),
        Some(xvec) => {
            debug!(
                "time vector has {} points for {} labels; using sample indices",
                xvec.len(),
                labels.len()
            );
            Spans::Indices(bounds)
        }
        None => Spans::Indices(bounds),
    };

    Ok(Transients {
        changes,
        spans,
        stages,
        sample_count: labels.len(),
    })
}
