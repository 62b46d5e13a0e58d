//! Fixed likelihood table
//!
//! The likelihood of an attribute given a class is not estimated from
//! counts: an associated pair always contributes 0.9 and an unassociated
//! (or unrecorded) pair always contributes 0.1.

/// P(attribute | class) when the pair is marked as associated
pub const ASSOCIATED_LIKELIHOOD: f64 = 0.9;

/// P(attribute | class) when the pair is not associated or has no record
pub const UNASSOCIATED_LIKELIHOOD: f64 = 0.1;

/// Map an association flag to its likelihood term
#[inline]
pub fn likelihood(is_associated: bool) -> f64 {
    if is_associated {
        ASSOCIATED_LIKELIHOOD
    } else {
        UNASSOCIATED_LIKELIHOOD
    }
}
