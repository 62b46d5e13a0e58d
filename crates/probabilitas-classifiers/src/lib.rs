//! Probabilitas Classifiers
//!
//! Naive Bayes classifier engine for expert-system projects.
//!
//! Given the classes of a project, its attributes, the training
//! associations between them, and a selection of attributes, the engine:
//! - resolves each class prior (stored value or uniform fallback)
//! - multiplies in a fixed likelihood per selected attribute
//! - normalizes the raw scores into percentages and ranks the classes
//! - records a step-by-step trace and a frequency table for reporting

pub mod classifier;
pub mod frequency;
pub mod likelihood;
pub mod result;

pub use classifier::{evaluate, EvaluationInput, NaiveBayesEngine};
pub use frequency::{ClassFrequency, FrequencyCell, FrequencyRow};
pub use likelihood::{likelihood, ASSOCIATED_LIKELIHOOD, UNASSOCIATED_LIKELIHOOD};
pub use result::{CalculationStep, ClassResult, EvaluationResult, LikelihoodStep};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::classifier::{evaluate, EvaluationInput, NaiveBayesEngine};
    pub use crate::result::{CalculationStep, ClassResult, EvaluationResult};
}
