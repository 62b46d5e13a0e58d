//! Default-false lookup over training associations

use crate::types::{AttributeId, ClassId, TrainingAssociation};
use std::collections::HashMap;

/// Sparse association matrix keyed by `(class, attribute)`.
///
/// A missing entry reads as `false`, so callers never need a dense matrix.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssociationMap {
    entries: HashMap<(ClassId, AttributeId), bool>,
}

impl AssociationMap {
    /// Create an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a flag; a later call for the same pair overwrites the earlier one
    pub fn set(&mut self, class_id: ClassId, attribute_id: AttributeId, is_associated: bool) {
        self.entries.insert((class_id, attribute_id), is_associated);
    }

    /// Flag for the pair, `false` when no record exists
    pub fn is_associated(&self, class_id: ClassId, attribute_id: AttributeId) -> bool {
        self.entries
            .get(&(class_id, attribute_id))
            .copied()
            .unwrap_or(false)
    }

    /// Whether an explicit record exists for the pair
    pub fn contains(&self, class_id: ClassId, attribute_id: AttributeId) -> bool {
        self.entries.contains_key(&(class_id, attribute_id))
    }

    /// Number of associated attributes among `attributes` for the class
    pub fn associated_count<'a, I>(&self, class_id: ClassId, attributes: I) -> usize
    where
        I: IntoIterator<Item = &'a AttributeId>,
    {
        attributes
            .into_iter()
            .filter(|attribute_id| self.is_associated(class_id, **attribute_id))
            .count()
    }

    /// Number of explicit records
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate explicit records in arbitrary order
    pub fn iter(&self) -> impl Iterator<Item = (ClassId, AttributeId, bool)> + '_ {
        self.entries.iter().map(|(&(c, a), &v)| (c, a, v))
    }
}

impl FromIterator<TrainingAssociation> for AssociationMap {
    fn from_iter<T: IntoIterator<Item = TrainingAssociation>>(iter: T) -> Self {
        let mut map = Self::new();
        for record in iter {
            map.set(record.class_id, record.attribute_id, record.is_associated);
        }
        map
    }
}

impl<'a> FromIterator<&'a TrainingAssociation> for AssociationMap {
    fn from_iter<T: IntoIterator<Item = &'a TrainingAssociation>>(iter: T) -> Self {
        iter.into_iter().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ProjectId;

    #[test]
    fn test_missing_pair_is_false() {
        let map = AssociationMap::new();
        assert!(!map.is_associated(ClassId(1), AttributeId(1)));
        assert!(!map.contains(ClassId(1), AttributeId(1)));
    }

    #[test]
    fn test_explicit_false_matches_missing() {
        let mut map = AssociationMap::new();
        map.set(ClassId(2), AttributeId(1), false);
        assert!(map.contains(ClassId(2), AttributeId(1)));
        assert_eq!(
            map.is_associated(ClassId(2), AttributeId(1)),
            map.is_associated(ClassId(3), AttributeId(1))
        );
    }

    #[test]
    fn test_later_record_wins() {
        let p = ProjectId(1);
        let map: AssociationMap = vec![
            TrainingAssociation::new(p, ClassId(1), AttributeId(1), true),
            TrainingAssociation::new(p, ClassId(1), AttributeId(1), false),
            TrainingAssociation::new(p, ClassId(1), AttributeId(2), true),
        ]
        .into_iter()
        .collect();

        assert_eq!(map.len(), 2);
        assert!(!map.is_associated(ClassId(1), AttributeId(1)));
        assert!(map.is_associated(ClassId(1), AttributeId(2)));
    }

    #[test]
    fn test_associated_count() {
        let mut map = AssociationMap::new();
        map.set(ClassId(1), AttributeId(1), true);
        map.set(ClassId(1), AttributeId(2), false);
        map.set(ClassId(1), AttributeId(3), true);

        let attributes = [AttributeId(1), AttributeId(2), AttributeId(3), AttributeId(4)];
        assert_eq!(map.associated_count(ClassId(1), &attributes), 2);
        assert_eq!(map.associated_count(ClassId(2), &attributes), 0);
    }
}
