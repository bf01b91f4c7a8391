//! Magnitude-frequency (Gutenberg-Richter) analysis.
//!
//! Magnitudes are binned on a fixed grid, each bin gets a log-frequency of
//! `log10(count + 1)`, and a straight line is fitted through the non-empty
//! bins. The negated slope is the b-value.
//!
//! Every bin is returned for plotting, including empty ones at
//! `log10(1) = 0`. Only bins with events enter the fit.

use thiserror::Error;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Preconditions the analyzer refuses to paper over with NaN.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("no magnitudes to analyze")]
    EmptyInput,

    #[error("magnitude at position {index} is not finite ({value})")]
    NonFiniteMagnitude { index: usize, value: f64 },

    #[error("magnitude {value} lies below the first bin edge {origin}")]
    BelowOrigin { value: f64, origin: f64 },

    #[error("bin width must be positive and finite, got {0}")]
    InvalidBinWidth(f64),

    #[error("need at least 2 non-empty bins for a fit, found {found}")]
    InsufficientBins { found: usize },

    #[error("magnitude {max} would need more than {limit} bins")]
    TooManyBins { max: f64, limit: usize },
}

// ---------------------------------------------------------------------------
// Binning
// ---------------------------------------------------------------------------

/// Placement of the magnitude grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinSpec {
    /// Lower edge of the first bin.
    pub origin: f64,
    pub width: f64,
}

impl Default for BinSpec {
    fn default() -> Self {
        BinSpec {
            origin: 4.0,
            width: 0.5,
        }
    }
}

/// Upper bound on the number of bins one grid may hold.
pub const MAX_BINS: usize = 10_000;

impl BinSpec {
    fn edge(&self, k: usize) -> f64 {
        self.origin + k as f64 * self.width
    }

    /// Edges from `origin` up to the first edge strictly above `max`.
    pub fn edges(&self, max: f64) -> Result<Vec<f64>, AnalysisError> {
        let too_many = AnalysisError::TooManyBins {
            max,
            limit: MAX_BINS,
        };
        let span = ((max - self.origin) / self.width).floor().max(0.0);
        if span >= MAX_BINS as f64 {
            return Err(too_many);
        }
        let n_bins = span as usize + 1;
        let mut edges: Vec<f64> = (0..=n_bins).map(|k| self.edge(k)).collect();
        // Rounding in the division can leave the last edge on top of max.
        while edges.last().is_some_and(|&last| last <= max) {
            if edges.len() > MAX_BINS {
                return Err(too_many);
            }
            edges.push(self.edge(edges.len()));
        }
        Ok(edges)
    }
}

/// One half-open magnitude interval `[lower, upper)` and its tally.
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyBin {
    pub lower: f64,
    pub upper: f64,
    pub midpoint: f64,
    pub count: usize,
    /// `log10(count + 1)`, zero for an empty bin.
    pub log_frequency: f64,
}

impl FrequencyBin {
    fn new(lower: f64, upper: f64, count: usize) -> Self {
        FrequencyBin {
            lower,
            upper,
            midpoint: (lower + upper) / 2.0,
            count,
            log_frequency: ((count + 1) as f64).log10(),
        }
    }
}

/// Tally `magnitudes` into contiguous bins covering `[origin, max]`.
pub fn histogram(magnitudes: &[f64], spec: BinSpec) -> Result<Vec<FrequencyBin>, AnalysisError> {
    if !(spec.width.is_finite() && spec.width > 0.0) {
        return Err(AnalysisError::InvalidBinWidth(spec.width));
    }
    if magnitudes.is_empty() {
        return Err(AnalysisError::EmptyInput);
    }

    let mut max = f64::NEG_INFINITY;
    for (index, &value) in magnitudes.iter().enumerate() {
        if !value.is_finite() {
            return Err(AnalysisError::NonFiniteMagnitude { index, value });
        }
        if value < spec.origin {
            return Err(AnalysisError::BelowOrigin {
                value,
                origin: spec.origin,
            });
        }
        max = max.max(value);
    }

    let edges = spec.edges(max)?;
    let n_bins = edges.len() - 1;
    let mut counts = vec![0usize; n_bins];

    for &m in magnitudes {
        let mut i = (((m - spec.origin) / spec.width).floor() as usize).min(n_bins - 1);
        // Settle float noise against the actual edges.
        while i > 0 && m < edges[i] {
            i -= 1;
        }
        while i + 1 < n_bins && m >= edges[i + 1] {
            i += 1;
        }
        counts[i] += 1;
    }

    Ok(edges
        .windows(2)
        .zip(counts)
        .map(|(pair, count)| FrequencyBin::new(pair[0], pair[1], count))
        .collect())
}

// ---------------------------------------------------------------------------
// Fit
// ---------------------------------------------------------------------------

/// Straight line `log_frequency = intercept + slope * magnitude`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitResult {
    pub slope: f64,
    pub intercept: f64,
    /// How many bins the line was fitted through.
    pub bins_used: usize,
}

impl FitResult {
    /// Gutenberg-Richter b-value: larger means frequency falls off faster.
    pub fn b_value(&self) -> f64 {
        -self.slope
    }

    pub fn predict(&self, magnitude: f64) -> f64 {
        self.intercept + self.slope * magnitude
    }
}

/// Ordinary least squares through `(x, y)` points. Returns `(slope, intercept)`,
/// or `None` when fewer than two points or all `x` coincide.
pub fn least_squares(points: &[(f64, f64)]) -> Option<(f64, f64)> {
    if points.len() < 2 {
        return None;
    }
    let n = points.len() as f64;
    let mean_x = points.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = points.iter().map(|p| p.1).sum::<f64>() / n;

    let (sxx, sxy) = points.iter().fold((0.0, 0.0), |(sxx, sxy), &(x, y)| {
        let dx = x - mean_x;
        (sxx + dx * dx, sxy + dx * (y - mean_y))
    });
    if sxx == 0.0 {
        return None;
    }
    let slope = sxy / sxx;
    Some((slope, mean_y - slope * mean_x))
}

/// Fit log-frequency against midpoint over the non-empty bins only.
pub fn fit(bins: &[FrequencyBin]) -> Result<FitResult, AnalysisError> {
    let sample: Vec<(f64, f64)> = bins
        .iter()
        .filter(|b| b.count > 0)
        .map(|b| (b.midpoint, b.log_frequency))
        .collect();

    let (slope, intercept) = least_squares(&sample).ok_or(AnalysisError::InsufficientBins {
        found: sample.len(),
    })?;
    Ok(FitResult {
        slope,
        intercept,
        bins_used: sample.len(),
    })
}

// ---------------------------------------------------------------------------
// Combined
// ---------------------------------------------------------------------------

/// Bins for plotting plus the fitted line.
#[derive(Debug, Clone, PartialEq)]
pub struct MagnitudeFrequency {
    pub bins: Vec<FrequencyBin>,
    pub fit: FitResult,
}

/// Histogram then fit. Fails fast on any precondition violation.
pub fn analyze(magnitudes: &[f64], spec: BinSpec) -> Result<MagnitudeFrequency, AnalysisError> {
    let bins = histogram(magnitudes, spec)?;
    let fit = fit(&bins)?;
    Ok(MagnitudeFrequency { bins, fit })
}
