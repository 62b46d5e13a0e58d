//! Naive Bayes scoring engine
//!
//! Scores every class of a project against a chosen subset of attributes:
//!
//! ```text
//! score(c)      = prior(c) * Π likelihood(c, a)   for a in selection
//! percentage(c) = 100 * score(c) / Σ score
//! ```
//!
//! The engine is a pure function over a snapshot supplied by the caller.
//! It performs no I/O and keeps no state between calls.

use probabilitas_core::{
    AssociationMap, Attribute, AttributeId, ClassRecord, Error, Result,
};
use std::collections::HashMap;
use tracing::debug;

use crate::frequency::{class_frequencies, frequency_table};
use crate::likelihood::likelihood;
use crate::result::{CalculationStep, ClassResult, EvaluationResult, LikelihoodStep};

/// Immutable snapshot of one project's data
#[derive(Debug, Clone, Copy)]
pub struct EvaluationInput<'a> {
    /// Classes in display order; ties in the ranking keep this order
    pub classes: &'a [ClassRecord],

    /// Every attribute of the project
    pub attributes: &'a [Attribute],

    /// Training associations, missing pairs read as not associated
    pub associations: &'a AssociationMap,

    /// Attributes to score against, in caller order
    pub selected: &'a [AttributeId],
}

impl<'a> EvaluationInput<'a> {
    pub fn new(
        classes: &'a [ClassRecord],
        attributes: &'a [Attribute],
        associations: &'a AssociationMap,
        selected: &'a [AttributeId],
    ) -> Self {
        Self {
            classes,
            attributes,
            associations,
            selected,
        }
    }
}

/// Classifier engine with fixed 0.9/0.1 likelihoods
#[derive(Debug, Clone, Copy, Default)]
pub struct NaiveBayesEngine;

impl NaiveBayesEngine {
    pub fn new() -> Self {
        Self
    }

    /// Score, normalize, and rank every class
    pub fn evaluate(&self, input: &EvaluationInput<'_>) -> Result<EvaluationResult> {
        let selected = resolve_selection(input.attributes, input.selected)?;
        if input.classes.is_empty() {
            return Err(Error::validation("project has no classes to evaluate"));
        }

        let class_count = input.classes.len();
        let all_attribute_ids: Vec<AttributeId> = input.attributes.iter().map(|a| a.id).collect();

        debug!(
            classes = class_count,
            selected = selected.len(),
            "evaluating naive bayes scores"
        );

        let mut steps: Vec<CalculationStep> = input
            .classes
            .iter()
            .map(|class| {
                let associated_count = input
                    .associations
                    .associated_count(class.id, &all_attribute_ids);
                score_class(class, class_count, &selected, input.associations, associated_count)
            })
            .collect();

        let total_score: f64 = steps.iter().map(|s| s.raw_score).sum();
        for step in &mut steps {
            step.total_score = total_score;
            step.percentage = normalize(step.raw_score, total_score);
        }

        // Vec::sort_by is stable, so equal percentages keep input class order.
        steps.sort_by(|a, b| b.percentage.total_cmp(&a.percentage));

        let results = steps
            .iter()
            .map(|step| ClassResult {
                class_id: step.class_id,
                class_name: step.class_name.clone(),
                class_code: step.class_code.clone(),
                score: step.raw_score,
                percentage: step.percentage,
            })
            .collect();

        Ok(EvaluationResult {
            results,
            calculation_steps: steps,
            selected_count: input.selected.len(),
            frequency_table: frequency_table(input.classes, input.attributes, input.associations),
            class_frequencies: class_frequencies(
                input.classes,
                input.attributes,
                input.associations,
            ),
            total_score,
        })
    }
}

/// Convenience wrapper around [`NaiveBayesEngine::evaluate`]
pub fn evaluate(
    classes: &[ClassRecord],
    attributes: &[Attribute],
    associations: &AssociationMap,
    selected: &[AttributeId],
) -> Result<EvaluationResult> {
    NaiveBayesEngine::new().evaluate(&EvaluationInput::new(
        classes,
        attributes,
        associations,
        selected,
    ))
}

/// Map selected ids to attributes, rejecting empty or foreign selections
fn resolve_selection<'a>(
    attributes: &'a [Attribute],
    selected: &[AttributeId],
) -> Result<Vec<&'a Attribute>> {
    if selected.is_empty() {
        return Err(Error::validation("at least one attribute must be selected"));
    }

    let by_id: HashMap<AttributeId, &Attribute> = attributes.iter().map(|a| (a.id, a)).collect();

    selected
        .iter()
        .map(|id| {
            by_id.get(id).copied().ok_or_else(|| {
                Error::validation(format!("attribute {} does not belong to this project", id))
            })
        })
        .collect()
}

fn score_class(
    class: &ClassRecord,
    class_count: usize,
    selected: &[&Attribute],
    associations: &AssociationMap,
    associated_count: usize,
) -> CalculationStep {
    let prior = class.resolved_prior(class_count);
    let prior_formula = if class.has_explicit_prior() {
        format!("P({}) = {:.4}", class.code, prior)
    } else {
        format!("P({}) = 1/{} = {:.4}", class.code, class_count, prior)
    };

    let mut raw_score = prior;
    let mut likelihood_product = 1.0;
    let mut likelihoods = Vec::with_capacity(selected.len());

    for attribute in selected {
        let is_associated = associations.is_associated(class.id, attribute.id);
        let value = likelihood(is_associated);
        raw_score *= value;
        likelihood_product *= value;

        likelihoods.push(LikelihoodStep {
            attribute_id: attribute.id,
            attribute_name: attribute.name.clone(),
            attribute_code: attribute.code.clone(),
            is_associated,
            value,
            formula: format!("P({}|{}) = {}", attribute.code, class.code, value),
            associated_count,
        });
    }

    CalculationStep {
        class_id: class.id,
        class_name: class.name.clone(),
        class_code: class.code.clone(),
        prior,
        prior_formula,
        likelihoods,
        likelihood_product,
        raw_score,
        percentage: 0.0,
        total_score: 0.0,
        associated_count,
    }
}

/// Percentage of the total, or 0 when every class scored zero
fn normalize(score: f64, total: f64) -> f64 {
    if total > 0.0 {
        100.0 * score / total
    } else {
        0.0
    }
}
