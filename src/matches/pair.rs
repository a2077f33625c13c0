//! Canonical pair ordering.
//!
//! Every unordered identity pair maps to exactly one `(lo, hi)` key with
//! `lo < hi` by uuid byte order. Which slot a caller landed in comes back
//! as an explicit tag instead of being re-derived at each use site.

use uuid::Uuid;

use crate::error::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairSlot {
    Lo,
    Hi,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanonicalPair {
    pub lo: Uuid,
    pub hi: Uuid,
}

impl CanonicalPair {
    /// Canonicalize `(a, b)`; the returned slot is where `a` ended up.
    pub fn new(a: Uuid, b: Uuid) -> Result<(CanonicalPair, PairSlot), CoreError> {
        if a.is_nil() || b.is_nil() {
            return Err(CoreError::InvalidIdentifier("nil uuid".to_string()));
        }
        if a == b {
            return Err(CoreError::InvalidIdentifier(format!(
                "cannot pair {a} with itself"
            )));
        }

        if a < b {
            Ok((CanonicalPair { lo: a, hi: b }, PairSlot::Lo))
        } else {
            Ok((CanonicalPair { lo: b, hi: a }, PairSlot::Hi))
        }
    }

    pub fn other(&self, id: Uuid) -> Uuid {
        if id == self.lo { self.hi } else { self.lo }
    }
}
