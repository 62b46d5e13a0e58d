//! Core types for Probabilitas

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl From<$name> for u64 {
            fn from(id: $name) -> u64 {
                id.0
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self(id)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

record_id!(
    /// Stable identity of a project
    ProjectId
);
record_id!(
    /// Stable identity of an attribute; never reused after deletion
    AttributeId
);
record_id!(
    /// Stable identity of a class; never reused after deletion
    ClassId
);

/// Display tag for the n-th attribute of a project (1-based)
pub fn attribute_code(n: usize) -> String {
    format!("X{}", n)
}

/// Display tag for the n-th class of a project (1-based)
pub fn class_code(n: usize) -> String {
    format!("Y{}", n)
}

/// A classification project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,

    /// Project title
    pub title: String,

    /// Free-text description
    #[serde(default)]
    pub description: Option<String>,

    /// Display label for the attribute axis
    pub x_label: String,

    /// Display label for the class axis
    pub y_label: String,

    /// Creation timestamp, used for listing order
    pub created_at: DateTime<Utc>,
}

/// A predictor variable belonging to one project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    pub id: AttributeId,
    pub project_id: ProjectId,

    /// Short display tag such as `X1`, assigned once at creation
    pub code: String,

    pub name: String,
}

impl Attribute {
    pub fn new(
        id: AttributeId,
        project_id: ProjectId,
        code: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            id,
            project_id,
            code: code.into(),
            name: name.into(),
        }
    }
}

/// An outcome category belonging to one project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassRecord {
    pub id: ClassId,
    pub project_id: ProjectId,

    /// Short display tag such as `Y1`, assigned once at creation
    pub code: String,

    pub name: String,

    /// Stored prior; `None` or `0` means "uniform over the project's classes"
    #[serde(default)]
    pub prior_probability: Option<f64>,
}

impl ClassRecord {
    pub fn new(
        id: ClassId,
        project_id: ProjectId,
        code: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            id,
            project_id,
            code: code.into(),
            name: name.into(),
            prior_probability: None,
        }
    }

    /// Set the stored prior
    pub fn with_prior(mut self, prior: f64) -> Self {
        self.prior_probability = Some(prior);
        self
    }

    /// Whether the stored prior is usable as-is (strictly positive)
    pub fn has_explicit_prior(&self) -> bool {
        matches!(self.prior_probability, Some(p) if p > 0.0)
    }

    /// Prior used at evaluation time.
    ///
    /// Returns the stored value when it is strictly positive, otherwise the
    /// uniform prior `1 / class_count`. The fallback is never written back,
    /// so it always tracks the current number of classes.
    pub fn resolved_prior(&self, class_count: usize) -> f64 {
        match self.prior_probability {
            Some(p) if p > 0.0 => p,
            _ => 1.0 / class_count as f64,
        }
    }
}

/// The stored fact "attribute A is associated with class C"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingAssociation {
    pub project_id: ProjectId,
    pub class_id: ClassId,
    pub attribute_id: AttributeId,

    #[serde(default)]
    pub is_associated: bool,
}

impl TrainingAssociation {
    pub fn new(
        project_id: ProjectId,
        class_id: ClassId,
        attribute_id: AttributeId,
        is_associated: bool,
    ) -> Self {
        Self {
            project_id,
            class_id,
            attribute_id,
            is_associated,
        }
    }
}
