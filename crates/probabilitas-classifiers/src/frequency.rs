//! Frequency table for reporting
//!
//! Built over every attribute of the project, not just the selection.
//! Nothing here feeds the score.

use probabilitas_core::{AssociationMap, Attribute, AttributeId, ClassId, ClassRecord};
use serde::{Deserialize, Serialize};

/// One cell of the class x attribute matrix
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrequencyCell {
    pub attribute_id: AttributeId,
    pub attribute_code: String,
    pub is_associated: bool,

    /// 1 when associated, 0 otherwise
    pub count: u32,
}

/// All cells for one class, in attribute order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrequencyRow {
    pub class_id: ClassId,
    pub class_code: String,
    pub class_name: String,
    pub cells: Vec<FrequencyCell>,
}

/// Association total and resolved prior for one class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassFrequency {
    pub class_id: ClassId,
    pub class_code: String,
    pub class_name: String,
    pub associated_count: usize,

    /// Prior after the uniform fallback has been applied
    pub prior: f64,
}

/// Build the frequency matrix in input class order
pub fn frequency_table(
    classes: &[ClassRecord],
    attributes: &[Attribute],
    associations: &AssociationMap,
) -> Vec<FrequencyRow> {
    classes
        .iter()
        .map(|class| FrequencyRow {
            class_id: class.id,
            class_code: class.code.clone(),
            class_name: class.name.clone(),
            cells: attributes
                .iter()
                .map(|attribute| {
                    let is_associated = associations.is_associated(class.id, attribute.id);
                    FrequencyCell {
                        attribute_id: attribute.id,
                        attribute_code: attribute.code.clone(),
                        is_associated,
                        count: u32::from(is_associated),
                    }
                })
                .collect(),
        })
        .collect()
}

/// Per-class totals in input class order
pub fn class_frequencies(
    classes: &[ClassRecord],
    attributes: &[Attribute],
    associations: &AssociationMap,
) -> Vec<ClassFrequency> {
    let attribute_ids: Vec<AttributeId> = attributes.iter().map(|a| a.id).collect();

    classes
        .iter()
        .map(|class| ClassFrequency {
            class_id: class.id,
            class_code: class.code.clone(),
            class_name: class.name.clone(),
            associated_count: associations.associated_count(class.id, &attribute_ids),
            prior: class.resolved_prior(classes.len()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use probabilitas_core::ProjectId;

    fn fixture() -> (Vec<ClassRecord>, Vec<Attribute>, AssociationMap) {
        let p = ProjectId(1);
        let classes = vec![
            ClassRecord::new(ClassId(1), p, "Y1", "Flu"),
            ClassRecord::new(ClassId(2), p, "Y2", "Cold").with_prior(0.3),
        ];
        let attributes = vec![
            Attribute::new(AttributeId(10), p, "X1", "Fever"),
            Attribute::new(AttributeId(11), p, "X2", "Cough"),
            Attribute::new(AttributeId(12), p, "X3", "Sneeze"),
        ];
        let mut map = AssociationMap::new();
        map.set(ClassId(1), AttributeId(10), true);
        map.set(ClassId(1), AttributeId(11), true);
        map.set(ClassId(2), AttributeId(12), true);
        map.set(ClassId(2), AttributeId(10), false);
        (classes, attributes, map)
    }

    #[test]
    fn test_table_covers_every_attribute() {
        let (classes, attributes, map) = fixture();
        let table = frequency_table(&classes, &attributes, &map);

        assert_eq!(table.len(), 2);
        assert!(table.iter().all(|row| row.cells.len() == 3));

        let counts: Vec<u32> = table[0].cells.iter().map(|c| c.count).collect();
        assert_eq!(counts, vec![1, 1, 0]);
        let counts: Vec<u32> = table[1].cells.iter().map(|c| c.count).collect();
        assert_eq!(counts, vec![0, 0, 1]);
    }

    #[test]
    fn test_class_frequencies_resolve_prior() {
        let (classes, attributes, map) = fixture();
        let freqs = class_frequencies(&classes, &attributes, &map);

        assert_eq!(freqs[0].associated_count, 2);
        assert_eq!(freqs[0].prior, 0.5);
        assert_eq!(freqs[1].associated_count, 1);
        assert_eq!(freqs[1].prior, 0.3);
    }
}
