//! Synthetic missing-value injection.

use crate::config::{MissingSampling, PipelineConfig};
use crate::error::{AnalysisError, Result};
use crate::utils::{is_numeric_dtype, numeric_values};
use polars::prelude::*;
use rand::prelude::*;
use rand::seq::index;
use tracing::{debug, warn};

/// Sets randomly chosen cells of one numeric column to null.
#[derive(Debug, Clone)]
pub struct MissingValueInjector {
    column: String,
    count: usize,
    sampling: MissingSampling,
    seed: Option<u64>,
}

impl MissingValueInjector {
    pub fn new(column: impl Into<String>, count: usize) -> Self {
        Self {
            column: column.into(),
            count,
            sampling: MissingSampling::default(),
            seed: None,
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            column: config.missing_column.clone(),
            count: config.missing_count,
            sampling: config.sampling,
            seed: config.seed,
        }
    }

    pub fn with_sampling(mut self, sampling: MissingSampling) -> Self {
        self.sampling = sampling;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    /// Draw row positions for the configured sampling mode.
    ///
    /// Positions are returned sorted and deduplicated, so with replacement the
    /// result may hold fewer than `count` rows.
    pub fn sample_rows(&self, height: usize) -> Result<Vec<usize>> {
        if self.count == 0 {
            return Ok(Vec::new());
        }
        if height == 0 {
            warn!("Table is empty, skipping missing value injection");
            return Ok(Vec::new());
        }

        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut rows: Vec<usize> = match self.sampling {
            MissingSampling::WithoutReplacement => {
                if self.count > height {
                    return Err(AnalysisError::InvalidConfig(format!(
                        "cannot inject {} distinct missing values into {} rows",
                        self.count, height
                    )));
                }
                index::sample(&mut rng, height, self.count).into_vec()
            }
            MissingSampling::WithReplacement => {
                (0..self.count).map(|_| rng.gen_range(0..height)).collect()
            }
        };

        rows.sort_unstable();
        rows.dedup();
        Ok(rows)
    }

    /// Return a copy of `df` with missing cells injected, plus the affected rows.
    pub fn inject(&self, df: &DataFrame) -> Result<(DataFrame, Vec<usize>)> {
        let column = df
            .column(&self.column)
            .map_err(|_| AnalysisError::ColumnNotFound(self.column.clone()))?;

        if !is_numeric_dtype(column.dtype()) {
            return Err(AnalysisError::InvalidConfig(format!(
                "missing values can only be injected into numeric columns, '{}' is {}",
                self.column,
                column.dtype()
            )));
        }

        let rows = self.sample_rows(df.height())?;
        if rows.is_empty() {
            return Ok((df.clone(), rows));
        }

        let mut values = numeric_values(column.as_materialized_series())?;
        for &row in &rows {
            values[row] = None;
        }

        let mut injected = df.clone();
        injected.replace(&self.column, Series::new(self.column.as_str().into(), values))?;

        debug!(
            "Injected {} missing values into '{}' at rows {:?}",
            rows.len(),
            self.column,
            rows
        );

        Ok((injected, rows))
    }
}
