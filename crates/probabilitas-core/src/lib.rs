//! Probabilitas Core
//!
//! Core types and utilities shared across Probabilitas components.
//!
//! This crate provides:
//! - Domain records for projects, attributes, classes, and training associations
//! - The default-false association lookup read by the classifier engine
//! - Error types and result handling

pub mod association;
pub mod error;
pub mod types;

pub use association::AssociationMap;
pub use error::{Error, RecordKind, Result};
pub use types::{
    attribute_code, class_code, Attribute, AttributeId, ClassId, ClassRecord, Project, ProjectId,
    TrainingAssociation,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::association::AssociationMap;
    pub use crate::error::{Error, Result};
    pub use crate::types::{
        Attribute, AttributeId, ClassId, ClassRecord, Project, ProjectId, TrainingAssociation,
    };
}
