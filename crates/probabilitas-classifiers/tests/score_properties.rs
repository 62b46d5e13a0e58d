//! Property tests for scoring, normalization, and ranking

use probabilitas_classifiers::{evaluate, likelihood};
use probabilitas_core::{AssociationMap, Attribute, AttributeId, ClassId, ClassRecord, ProjectId};
use proptest::prelude::*;

/// Random project: per-class optional prior, an association matrix, and a selection
#[derive(Debug, Clone)]
struct Scenario {
    priors: Vec<Option<f64>>,
    matrix: Vec<Vec<bool>>,
    selection: Vec<usize>,
}

impl Scenario {
    fn build(&self) -> (Vec<ClassRecord>, Vec<Attribute>, AssociationMap, Vec<AttributeId>) {
        let p = ProjectId(1);
        let attribute_count = self.matrix.first().map_or(0, |row| row.len());

        let classes: Vec<ClassRecord> = self
            .priors
            .iter()
            .enumerate()
            .map(|(i, prior)| ClassRecord {
                prior_probability: *prior,
                ..ClassRecord::new(ClassId(i as u64 + 1), p, format!("Y{}", i + 1), format!("C{i}"))
            })
            .collect();
        let attributes: Vec<Attribute> = (0..attribute_count)
            .map(|j| {
                Attribute::new(
                    AttributeId(j as u64 + 100),
                    p,
                    format!("X{}", j + 1),
                    format!("A{j}"),
                )
            })
            .collect();

        let mut map = AssociationMap::new();
        for (i, row) in self.matrix.iter().enumerate() {
            for (j, &flag) in row.iter().enumerate() {
                // leave some pairs implicit
                if flag || (i + j) % 2 == 0 {
                    map.set(classes[i].id, attributes[j].id, flag);
                }
            }
        }

        let selected = self.selection.iter().map(|&j| attributes[j].id).collect();
        (classes, attributes, map, selected)
    }
}

fn scenario() -> impl Strategy<Value = Scenario> {
    (1usize..6, 1usize..6).prop_flat_map(|(classes, attributes)| {
        (
            prop::collection::vec(prop::option::of(prop_oneof![Just(0.0), 0.01f64..=1.0]), classes),
            prop::collection::vec(prop::collection::vec(any::<bool>(), attributes), classes),
            prop::collection::vec(0..attributes, 1..8),
        )
            .prop_map(|(priors, matrix, selection)| Scenario {
                priors,
                matrix,
                selection,
            })
    })
}

proptest! {
    #[test]
    fn percentages_sum_to_hundred(s in scenario()) {
        let (classes, attributes, map, selected) = s.build();
        let result = evaluate(&classes, &attributes, &map, &selected).unwrap();

        prop_assert!(result.total_score > 0.0);
        prop_assert!((result.percentage_sum() - 100.0).abs() < 1e-6);
    }

    #[test]
    fn raw_score_is_prior_times_likelihoods(s in scenario()) {
        let (classes, attributes, map, selected) = s.build();
        let result = evaluate(&classes, &attributes, &map, &selected).unwrap();
        let n = classes.len() as f64;

        for step in &result.calculation_steps {
            let class = classes.iter().find(|c| c.id == step.class_id).unwrap();
            let expected_prior = match class.prior_probability {
                Some(p) if p > 0.0 => p,
                _ => 1.0 / n,
            };
            prop_assert_eq!(step.prior, expected_prior);

            let product: f64 = selected
                .iter()
                .map(|a| likelihood(map.is_associated(class.id, *a)))
                .product();
            let expected = expected_prior * product;
            prop_assert!((step.raw_score - expected).abs() <= expected * 1e-12);
        }
    }

    #[test]
    fn ranking_is_descending(s in scenario()) {
        let (classes, attributes, map, selected) = s.build();
        let result = evaluate(&classes, &attributes, &map, &selected).unwrap();

        for pair in result.results.windows(2) {
            prop_assert!(pair[0].percentage >= pair[1].percentage);
        }
        let result_ids: Vec<ClassId> = result.results.iter().map(|r| r.class_id).collect();
        let step_ids: Vec<ClassId> = result.calculation_steps.iter().map(|s| s.class_id).collect();
        prop_assert_eq!(result_ids, step_ids);
    }

    #[test]
    fn evaluation_is_idempotent(s in scenario()) {
        let (classes, attributes, map, selected) = s.build();
        let first = evaluate(&classes, &attributes, &map, &selected).unwrap();
        let second = evaluate(&classes, &attributes, &map, &selected).unwrap();
        prop_assert_eq!(first, second);
    }
}
