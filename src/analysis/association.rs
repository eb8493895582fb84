//! Chi-Square test of independence and Cramér's V.
//!
//! The analyzer is a pure function of its input table. Classification
//! boundaries live in [`Thresholds`] so callers can pick another
//! significance level or strength scale.

use crate::error::AnalysisError;
use crate::models::{
    AssociationResult, ContingencyTable, Independence, ResultParts, Strength,
};
use statrs::distribution::{ChiSquared, ContinuousCDF};
use tracing::{debug, error, warn};

/// p-value at or below which the association is called significant.
pub const DEFAULT_SIGNIFICANCE_LEVEL: f64 = 0.05;

/// Cramér's V at which an association stops being negligible.
pub const DEFAULT_WEAK_THRESHOLD: f64 = 0.1;

/// Cramér's V at which a weak association becomes moderate.
pub const DEFAULT_MODERATE_THRESHOLD: f64 = 0.3;

/// Cramér's V at which a moderate association becomes strong.
pub const DEFAULT_STRONG_THRESHOLD: f64 = 0.5;

/// Expected cell frequency below which the χ² approximation gets shaky.
pub const MIN_EXPECTED_FREQUENCY: f64 = 5.0;

/// Classification boundaries for the two conclusions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub significance_level: f64,
    pub weak: f64,
    pub moderate: f64,
    pub strong: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            significance_level: DEFAULT_SIGNIFICANCE_LEVEL,
            weak: DEFAULT_WEAK_THRESHOLD,
            moderate: DEFAULT_MODERATE_THRESHOLD,
            strong: DEFAULT_STRONG_THRESHOLD,
        }
    }
}

impl Thresholds {
    /// Check that α is in (0, 1) and the strength bounds are ordered in [0, 1].
    pub fn validate(&self) -> Result<(), String> {
        if !(self.significance_level > 0.0 && self.significance_level < 1.0) {
            return Err(format!(
                "Significance level must be between 0 and 1 (exclusive), got {}",
                self.significance_level
            ));
        }

        let ordered = 0.0 <= self.weak
            && self.weak <= self.moderate
            && self.moderate <= self.strong
            && self.strong <= 1.0;
        if !ordered {
            return Err(format!(
                "Strength thresholds must satisfy 0 <= weak <= moderate <= strong <= 1, got {} / {} / {}",
                self.weak, self.moderate, self.strong
            ));
        }

        Ok(())
    }

    /// Independence conclusion for a p-value.
    pub fn classify_p_value(&self, p_value: f64) -> Independence {
        if p_value <= self.significance_level {
            Independence::Significant
        } else {
            Independence::NotSignificant
        }
    }

    /// Strength conclusion for a Cramér's V value.
    pub fn classify_strength(&self, cramers_v: f64) -> Strength {
        if cramers_v < self.weak {
            Strength::None
        } else if cramers_v < self.moderate {
            Strength::Weak
        } else if cramers_v < self.strong {
            Strength::Moderate
        } else {
            Strength::Strong
        }
    }
}

/// Computes the association between the two variables of a table.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssociationAnalyzer {
    thresholds: Thresholds,
    yates_correction: bool,
}

impl AssociationAnalyzer {
    pub fn new(thresholds: Thresholds) -> Self {
        Self {
            thresholds,
            yates_correction: false,
        }
    }

    /// Apply the Yates continuity correction to tables with one degree of
    /// freedom.
    pub fn with_yates_correction(mut self, enabled: bool) -> Self {
        self.yates_correction = enabled;
        self
    }

    #[allow(dead_code)]
    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    /// Run the Chi-Square test and compute Cramér's V.
    pub fn analyze(&self, table: &ContingencyTable) -> Result<AssociationResult, AnalysisError> {
        let rows = table.rows();
        let columns = table.columns();
        let total = table.total();

        if total == 0 || rows < 2 || columns < 2 {
            return Err(AnalysisError::DegenerateTable {
                rows,
                columns,
                total,
            });
        }

        let degrees_of_freedom = (rows - 1) * (columns - 1);
        let yates = self.yates_correction && degrees_of_freedom == 1;
        let expected = table.expected_frequencies();

        let mut statistic = 0.0;
        let mut low_expected_cells = 0usize;

        for (i, expected_row) in expected.iter().enumerate() {
            for (j, &e) in expected_row.iter().enumerate() {
                let observed = table.count(i, j) as f64;

                if e < MIN_EXPECTED_FREQUENCY {
                    low_expected_cells += 1;
                }

                if e == 0.0 {
                    if observed != 0.0 {
                        return Err(fault(format!(
                            "cell ({}, {}) has expected frequency 0 but observed count {}",
                            table.row_labels()[i],
                            table.column_labels()[j],
                            observed
                        )));
                    }
                    continue;
                }

                let mut deviation = (observed - e).abs();
                if yates {
                    deviation -= deviation.min(0.5);
                }
                statistic += deviation * deviation / e;
            }
        }

        if !statistic.is_finite() || statistic < 0.0 {
            return Err(fault(format!(
                "chi-square statistic is not a finite non-negative number ({})",
                statistic
            )));
        }

        if low_expected_cells > 0 {
            warn!(
                "{} of {} cells have an expected frequency below {}; the chi-square approximation may be unreliable",
                low_expected_cells,
                rows * columns,
                MIN_EXPECTED_FREQUENCY
            );
        }

        let p_value = chi_square_survival(statistic, degrees_of_freedom)?;
        let cramers_v = cramers_v(statistic, total, rows, columns);

        debug!(
            "chi2={:.6} dof={} p={:e} V={:.6} (n={}, yates={})",
            statistic, degrees_of_freedom, p_value, cramers_v, total, yates
        );

        Ok(AssociationResult::new(ResultParts {
            chi_square_statistic: statistic,
            p_value,
            degrees_of_freedom,
            cramers_v,
            independence: self.thresholds.classify_p_value(p_value),
            strength: self.thresholds.classify_strength(cramers_v),
            observations: total,
            significance_level: self.thresholds.significance_level,
            yates_corrected: yates,
            low_expected_cells,
        }))
    }
}

/// Upper-tail probability of a χ² statistic with `dof` degrees of freedom.
pub fn chi_square_survival(statistic: f64, dof: usize) -> Result<f64, AnalysisError> {
    if statistic == 0.0 {
        return Ok(1.0);
    }

    let dist = ChiSquared::new(dof as f64)
        .map_err(|e| fault(format!("invalid chi-square distribution (dof={}): {}", dof, e)))?;
    let p = dist.sf(statistic);

    if !p.is_finite() || !(-1e-12..=1.0 + 1e-12).contains(&p) {
        return Err(fault(format!(
            "survival function returned {} for statistic {} with {} degrees of freedom",
            p, statistic, dof
        )));
    }

    Ok(p.clamp(0.0, 1.0))
}

/// Cramér's V, clamped to 1.0 against rounding.
fn cramers_v(statistic: f64, total: u64, rows: usize, columns: usize) -> f64 {
    let k = (rows.min(columns) - 1) as f64;
    ((statistic / total as f64) / k).sqrt().min(1.0)
}

fn fault(detail: String) -> AnalysisError {
    error!("Numeric instability: {}", detail);
    AnalysisError::NumericInstability { detail }
}
