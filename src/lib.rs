//! Ordercast: Order Cancellation Prediction
//!
//! A library for predicting whether a delivery order will be canceled,
//! built from relational CSV extracts via joining, cleaning, feature
//! engineering, minority oversampling and a Gaussian naive Bayes classifier.

pub mod cli;
pub mod model;
pub mod pipeline;
pub mod report;
pub mod utils;
