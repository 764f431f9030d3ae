//! Imputation module for handling missing values.
//!
//! Only mean imputation of numeric columns is provided.

mod statistical;

pub use statistical::StatisticalImputer;
