//! Model module - classifier, cross-validation and evaluation metrics

pub mod cross_validation;
pub mod metrics;
pub mod naive_bayes;

pub use cross_validation::*;
pub use metrics::*;
pub use naive_bayes::*;
