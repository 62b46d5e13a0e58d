//! Evaluation output types
//!
//! Field names here are the JSON contract of the analysis endpoint and are
//! also what the report template binds to. Renaming a field is a breaking
//! change for clients.

use probabilitas_core::{AttributeId, ClassId};
use serde::{Deserialize, Serialize};

use crate::frequency::{ClassFrequency, FrequencyRow};

/// Ranked score of one class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassResult {
    pub class_id: ClassId,
    pub class_name: String,
    pub class_code: String,

    /// Unnormalized product of prior and selected likelihoods
    pub score: f64,

    /// Score normalized across all classes (0-100)
    pub percentage: f64,
}

/// One likelihood factor in a class' calculation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LikelihoodStep {
    pub attribute_id: AttributeId,
    pub attribute_name: String,
    pub attribute_code: String,
    pub is_associated: bool,

    /// Likelihood term multiplied into the score
    pub value: f64,

    /// Human-readable form, e.g. `P(X1|Y1) = 0.9`
    pub formula: String,

    /// Associated attributes for the class across the whole project (display only)
    pub associated_count: usize,
}

/// Full calculation trace for one class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationStep {
    pub class_id: ClassId,
    pub class_name: String,
    pub class_code: String,

    /// Resolved prior (stored value or uniform fallback)
    pub prior: f64,
    pub prior_formula: String,

    /// Likelihood terms in selection order
    pub likelihoods: Vec<LikelihoodStep>,

    /// Product of the likelihood terms alone
    pub likelihood_product: f64,

    /// Prior times the likelihood terms
    pub raw_score: f64,
    pub percentage: f64,

    /// Sum of raw scores across all classes
    pub total_score: f64,

    /// Associated attributes for the class across the whole project (display only)
    pub associated_count: usize,
}

/// Complete output of one evaluation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    /// Classes ranked by percentage, highest first
    pub results: Vec<ClassResult>,

    /// Per-class traces in the same order as `results`
    pub calculation_steps: Vec<CalculationStep>,

    /// Number of selected attributes as supplied by the caller
    pub selected_count: usize,

    /// Association matrix over every attribute of the project
    pub frequency_table: Vec<FrequencyRow>,

    /// Per-class association totals and resolved priors
    pub class_frequencies: Vec<ClassFrequency>,

    pub total_score: f64,
}

impl EvaluationResult {
    /// Highest-ranked class, if any
    pub fn top(&self) -> Option<&ClassResult> {
        self.results.first()
    }

    /// Whether every class scored zero and percentages fell back to 0
    pub fn is_degenerate(&self) -> bool {
        self.total_score <= 0.0
    }

    /// Sum of all percentages; 100 for a non-degenerate result
    pub fn percentage_sum(&self) -> f64 {
        self.results.iter().map(|r| r.percentage).sum()
    }
}
