//! Printable analysis report
//!
//! Renders the same [`EvaluationResult`] the JSON endpoint returns into a
//! standalone HTML document. No numbers are recomputed here.

use chrono::Utc;
use handlebars::{handlebars_helper, Handlebars};
use probabilitas_classifiers::EvaluationResult;
use probabilitas_core::{Attribute, Error, Project, Result};
use serde_json::{json, Value};

use crate::config::ReportConfig;

const REPORT_TEMPLATE: &str = include_str!("../templates/report.html.hbs");
const REPORT_NAME: &str = "report";

/// Handlebars-backed report renderer
pub struct ReportRenderer {
    handlebars: Handlebars<'static>,
    config: ReportConfig,
}

impl ReportRenderer {
    /// Compile the report template
    pub fn new(config: ReportConfig) -> Result<Self> {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(false);
        handlebars.register_escape_fn(escape_text);

        handlebars_helper!(fixed: |v: f64, places: u64| format!("{:.*}", places as usize, v));
        handlebars.register_helper("fixed", Box::new(fixed));

        handlebars_helper!(inc: |v: u64| v + 1);
        handlebars.register_helper("inc", Box::new(inc));

        handlebars
            .register_template_string(REPORT_NAME, REPORT_TEMPLATE)
            .map_err(|e| Error::config(format!("invalid report template: {}", e)))?;

        Ok(Self { handlebars, config })
    }

    /// Render the report for one evaluation
    pub fn render(
        &self,
        project: &Project,
        attributes: &[Attribute],
        selected: &[&Attribute],
        result: &EvaluationResult,
    ) -> Result<String> {
        let context = self.context(project, attributes, selected, result);
        self.handlebars
            .render(REPORT_NAME, &context)
            .map_err(|e| Error::internal(format!("failed to render report: {}", e)))
    }

    fn context(
        &self,
        project: &Project,
        attributes: &[Attribute],
        selected: &[&Attribute],
        result: &EvaluationResult,
    ) -> Value {
        let frequency_rows: Vec<Value> = result
            .frequency_table
            .iter()
            .zip(&result.class_frequencies)
            .map(|(row, totals)| {
                json!({
                    "class_code": row.class_code,
                    "class_name": row.class_name,
                    "cells": row.cells,
                    "associated_count": totals.associated_count,
                    "prior": totals.prior,
                })
            })
            .collect();

        let conclusion = if result.is_degenerate() {
            Value::Null
        } else {
            json!(result.top())
        };

        json!({
            "title_prefix": self.config.title_prefix,
            "decimal_places": self.config.decimal_places,
            "generated_at": Utc::now().format("%Y-%m-%d %H:%M UTC").to_string(),
            "project": project,
            "attributes": attributes,
            "selected": selected,
            "frequency_rows": frequency_rows,
            "result": result,
            "conclusion": conclusion,
        })
    }
}

/// HTML text escaping that leaves `=` readable in formulas
fn escape_text(data: &str) -> String {
    let mut escaped = String::with_capacity(data.len());
    for c in data.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use probabilitas_classifiers::evaluate;
    use probabilitas_core::{AssociationMap, AttributeId, ClassId, ClassRecord, ProjectId};

    fn fixture() -> (Project, Vec<Attribute>, Vec<ClassRecord>, AssociationMap) {
        let p = ProjectId(1);
        let project = Project {
            id: p,
            title: "Fever triage".to_string(),
            description: Some("Clinic <intake>".to_string()),
            x_label: "Symptom".to_string(),
            y_label: "Disease".to_string(),
            created_at: Utc::now(),
        };
        let attributes = vec![
            Attribute::new(AttributeId(1), p, "X1", "Fever"),
            Attribute::new(AttributeId(2), p, "X2", "Rash"),
        ];
        let classes = vec![
            ClassRecord::new(ClassId(1), p, "Y1", "Dengue"),
            ClassRecord::new(ClassId(2), p, "Y2", "Typhoid"),
        ];
        let mut map = AssociationMap::new();
        map.set(ClassId(1), AttributeId(1), true);
        (project, attributes, classes, map)
    }

    #[test]
    fn test_render_contains_numbers_and_formulas() {
        let (project, attributes, classes, map) = fixture();
        let selected_ids = [AttributeId(1), AttributeId(2)];
        let result = evaluate(&classes, &attributes, &map, &selected_ids).unwrap();
        let selected: Vec<&Attribute> = attributes.iter().collect();

        let renderer = ReportRenderer::new(ReportConfig::default()).unwrap();
        let html = renderer
            .render(&project, &attributes, &selected, &result)
            .unwrap();

        assert!(html.contains("Naive Bayes Analysis: Fever triage"));
        assert!(html.contains("P(Y1) = 1/2 = 0.5000"));
        assert!(html.contains("P(X1|Y1) = 0.9"));
        assert!(html.contains("90.00%"));
        assert!(html.contains("10.00%"));
        assert!(html.contains("0.045000"));
        assert!(html.contains("<strong>Y1: Dengue</strong>"));
        // user text is escaped
        assert!(html.contains("Clinic &lt;intake&gt;"));
    }

    #[test]
    fn test_decimal_places_config() {
        let (project, attributes, classes, map) = fixture();
        let result = evaluate(&classes, &attributes, &map, &[AttributeId(1)]).unwrap();
        let selected = vec![&attributes[0]];

        let renderer = ReportRenderer::new(ReportConfig {
            title_prefix: "Diagnosis".to_string(),
            decimal_places: 1,
        })
        .unwrap();
        let html = renderer
            .render(&project, &attributes, &selected, &result)
            .unwrap();

        assert!(html.contains("Diagnosis: Fever triage"));
        assert!(html.contains("90.0%"));
        assert!(!html.contains("90.00%"));
    }

    #[test]
    fn test_zero_total_has_no_conclusion() {
        let (project, attributes, classes, map) = fixture();
        // every score underflows to zero
        let selected_ids = vec![AttributeId(2); 400];
        let result = evaluate(&classes, &attributes, &map, &selected_ids).unwrap();
        assert!(result.is_degenerate());
        let selected = vec![&attributes[1]];

        let renderer = ReportRenderer::new(ReportConfig::default()).unwrap();
        let html = renderer
            .render(&project, &attributes, &selected, &result)
            .unwrap();

        assert!(html.contains("No Disease received a non-zero score."));
        assert!(!html.contains("Most probable"));
        assert!(html.contains("0.00%"));
    }

    #[test]
    fn test_formulas_are_escaped() {
        let (project, mut attributes, classes, mut map) = fixture();
        attributes[0].code = "<b>X1</b>".to_string();
        map.set(ClassId(2), AttributeId(1), false);
        let result = evaluate(&classes, &attributes, &map, &[AttributeId(1)]).unwrap();
        let selected = vec![&attributes[0]];

        let renderer = ReportRenderer::new(ReportConfig::default()).unwrap();
        let html = renderer
            .render(&project, &attributes, &selected, &result)
            .unwrap();

        assert!(html.contains("P(&lt;b&gt;X1&lt;/b&gt;|Y1) = 0.9"));
        assert!(!html.contains("<b>X1</b>"));
    }
}
