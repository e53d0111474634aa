use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;

/// Severity tier derived from a questionnaire total, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Band {
    Minimal,
    Mild,
    Moderate,
    Severe,
}

impl Band {
    pub fn label(self) -> &'static str {
        match self {
            Band::Minimal => "Minimal",
            Band::Mild => "Mild",
            Band::Moderate => "Moderate",
            Band::Severe => "Severe",
        }
    }

    /// Moderate and above are referred to a professional.
    pub fn recommends_help(self) -> bool {
        self >= Band::Moderate
    }

    pub fn interpretation(self) -> Interpretation {
        let description = match self {
            Band::Minimal => "Minimal depression symptoms",
            Band::Mild => "Mild depression symptoms",
            Band::Moderate => "Moderate depression symptoms",
            Band::Severe => "Severe depression symptoms - please seek professional help",
        };
        Interpretation {
            band: self,
            label: self.label(),
            description,
        }
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Human-readable reading of a band for result screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Interpretation {
    pub band: Band,
    pub label: &'static str,
    pub description: &'static str,
}

/// Lower bound (inclusive) at which a band begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BandThreshold {
    pub band: Band,
    pub min_total: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BandTableError {
    #[error("band table has no thresholds")]
    Empty,
    #[error("first band must start at 0, found {0}")]
    FirstNotZero(u32),
    #[error("threshold for {band} ({min_total}) does not exceed the previous threshold")]
    NonIncreasingThreshold { band: Band, min_total: u32 },
    #[error("{band} is listed out of severity order")]
    BandOutOfOrder { band: Band },
}

/// Closed integer intervals over the total, one per band, with no gaps or overlaps.
///
/// Each band covers `[min_total, next.min_total - 1]`; the last band is open-ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<BandThreshold>", into = "Vec<BandThreshold>")]
pub struct BandTable {
    thresholds: Vec<BandThreshold>,
}

impl BandTable {
    pub fn new(thresholds: Vec<BandThreshold>) -> Result<Self, BandTableError> {
        let first = thresholds.first().ok_or(BandTableError::Empty)?;
        if first.min_total != 0 {
            return Err(BandTableError::FirstNotZero(first.min_total));
        }

        for pair in thresholds.windows(2) {
            let (previous, next) = (pair[0], pair[1]);
            if next.band <= previous.band {
                return Err(BandTableError::BandOutOfOrder { band: next.band });
            }
            if next.min_total <= previous.min_total {
                return Err(BandTableError::NonIncreasingThreshold {
                    band: next.band,
                    min_total: next.min_total,
                });
            }
        }

        Ok(Self { thresholds })
    }

    /// `0–4 Minimal`, `5–9 Mild`, `10–14 Moderate`, `15+ Severe`.
    pub fn standard() -> Self {
        Self {
            thresholds: vec![
                BandThreshold {
                    band: Band::Minimal,
                    min_total: 0,
                },
                BandThreshold {
                    band: Band::Mild,
                    min_total: 5,
                },
                BandThreshold {
                    band: Band::Moderate,
                    min_total: 10,
                },
                BandThreshold {
                    band: Band::Severe,
                    min_total: 15,
                },
            ],
        }
    }

    pub fn thresholds(&self) -> &[BandThreshold] {
        &self.thresholds
    }

    pub fn band_for(&self, total: u32) -> Band {
        self.thresholds
            .iter()
            .rev()
            .find(|threshold| threshold.min_total <= total)
            .map(|threshold| threshold.band)
            // first threshold is 0, so every total has a band
            .unwrap_or(self.thresholds[0].band)
    }

    /// The partition of `[0, max_total]`; bands that start above `max_total` are omitted.
    pub fn ranges(&self, max_total: u32) -> Vec<(Band, RangeInclusive<u32>)> {
        let mut ranges = Vec::with_capacity(self.thresholds.len());
        for (index, threshold) in self.thresholds.iter().enumerate() {
            if threshold.min_total > max_total {
                break;
            }
            let end = match self.thresholds.get(index + 1) {
                Some(next) => (next.min_total - 1).min(max_total),
                None => max_total,
            };
            ranges.push((threshold.band, threshold.min_total..=end));
        }
        ranges
    }
}

impl Default for BandTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl TryFrom<Vec<BandThreshold>> for BandTable {
    type Error = BandTableError;

    fn try_from(value: Vec<BandThreshold>) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<BandTable> for Vec<BandThreshold> {
    fn from(value: BandTable) -> Self {
        value.thresholds
    }
}
