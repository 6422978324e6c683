use serde::{Deserialize, Serialize};

/// Sleep stage codes as they appear in a hypnogram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SleepStage {
    Artefact,
    Wake,
    N1,
    N2,
    N3,
    Rem,
}

impl SleepStage {
    pub const ALL: [SleepStage; 6] = [
        SleepStage::Artefact,
        SleepStage::Wake,
        SleepStage::N1,
        SleepStage::N2,
        SleepStage::N3,
        SleepStage::Rem,
    ];

    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            -1 => Some(SleepStage::Artefact),
            0 => Some(SleepStage::Wake),
            1 => Some(SleepStage::N1),
            2 => Some(SleepStage::N2),
            3 => Some(SleepStage::N3),
            4 => Some(SleepStage::Rem),
            _ => None,
        }
    }

    pub fn code(self) -> i32 {
        match self {
            SleepStage::Artefact => -1,
            SleepStage::Wake => 0,
            SleepStage::N1 => 1,
            SleepStage::N2 => 2,
            SleepStage::N3 => 3,
            SleepStage::Rem => 4,
        }
    }

    pub fn short_name(self) -> &'static str {
        match self {
            SleepStage::Artefact => "Art",
            SleepStage::Wake => "Wake",
            SleepStage::N1 => "N1",
            SleepStage::N2 => "N2",
            SleepStage::N3 => "N3",
            SleepStage::Rem => "REM",
        }
    }
}

/// Stage labels sampled at a uniform rate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hypnogram {
    /// Sampling frequency of `labels` in Hz
    pub fs: f64,
    pub labels: Vec<i32>,
}

impl Hypnogram {
    pub fn new(fs: f64, labels: Vec<i32>) -> Self {
        Self { fs, labels }
    }
    pub fn len(&self) -> usize {
        self.labels.len()
    }
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
    /// Length of the record in seconds.
    pub fn duration(&self) -> f64 {
        self.labels.len() as f64 / self.fs
    }
    pub fn stage_at(&self, index: usize) -> Option<SleepStage> {
        self.labels.get(index).copied().and_then(SleepStage::from_code)
    }
}

/// Maximal run of identical labels. `end` is inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub start: usize,
    pub end: usize,
    pub stage: i32,
}

impl Segment {
    /// Number of samples covered.
    pub fn span(&self) -> usize {
        self.end - self.start + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_codes_round_trip() {
        for stage in SleepStage::ALL {
            assert_eq!(SleepStage::from_code(stage.code()), Some(stage));
        }
        assert_eq!(SleepStage::from_code(7), None);
    }

    #[test]
    fn hypnogram_duration_uses_fs() {
        let hyp = Hypnogram::new(2.0, vec![0; 10]);
        assert_eq!(hyp.duration(), 5.0);
        assert_eq!(hyp.stage_at(3), Some(SleepStage::Wake));
        assert_eq!(hyp.stage_at(10), None);
    }
}
