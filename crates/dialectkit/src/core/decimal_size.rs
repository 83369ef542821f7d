//! Fixed-point precision/scale descriptor and its widening algebra.
//!
//! A `DecimalSize` records how many digits a value needs before and after the
//! decimal point. Fields that are `None` have not been constrained yet and adopt
//! whatever the first widening supplies. Negative inputs clamp to zero.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Digits before/after the decimal point for fixed-point numeric types.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct DecimalSize {
    before_decimal: Option<u32>,
    after_decimal: Option<u32>,
}

fn clamp(v: i64) -> u32 {
    v.clamp(0, u32::MAX as i64) as u32
}

impl DecimalSize {
    /// Create a size with both fields set. Negative values clamp to zero.
    pub fn new(before: i64, after: i64) -> Self {
        Self {
            before_decimal: Some(clamp(before)),
            after_decimal: Some(clamp(after)),
        }
    }

    /// Create a size where either side may still be unconstrained.
    pub fn from_parts(before: Option<i64>, after: Option<i64>) -> Self {
        Self {
            before_decimal: before.map(clamp),
            after_decimal: after.map(clamp),
        }
    }

    /// Build from a proprietary `(precision, scale)` pair.
    pub fn from_precision_scale(precision: i64, scale: i64) -> Self {
        Self::new(precision - scale, scale)
    }

    pub fn before_decimal(&self) -> Option<u32> {
        self.before_decimal
    }

    pub fn after_decimal(&self) -> Option<u32> {
        self.after_decimal
    }

    /// Total number of digits (`before + after`).
    pub fn precision(&self) -> u32 {
        self.before_decimal.unwrap_or(0) + self.after_decimal.unwrap_or(0)
    }

    /// Digits after the decimal point.
    pub fn scale(&self) -> u32 {
        self.after_decimal.unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.precision() == 0
    }

    /// Width needed to render the number as text, including the decimal point.
    pub fn to_string_length(&self) -> u32 {
        let len = self.precision();
        if self.scale() != 0 {
            len + 1
        } else {
            len
        }
    }

    /// Widen the digits before the decimal point. Never shrinks.
    pub fn increase_to_before(&mut self, before: i64) {
        let before = clamp(before);
        self.before_decimal = Some(self.before_decimal.map_or(before, |b| b.max(before)));
    }

    /// Widen both sides. Never shrinks.
    pub fn increase_to(&mut self, before: i64, after: i64) {
        self.increase_to_before(before);
        let after = clamp(after);
        self.after_decimal = Some(self.after_decimal.map_or(after, |a| a.max(after)));
    }

    /// Widen this size so it also admits everything `other` admits.
    pub fn increase_to_size(&mut self, other: &DecimalSize) {
        if let Some(b) = other.before_decimal {
            self.increase_to_before(b as i64);
        }
        if let Some(a) = other.after_decimal {
            let a = a.max(self.after_decimal.unwrap_or(0));
            self.after_decimal = Some(a);
        }
    }

    /// Pairwise maximum of two optional sizes.
    ///
    /// `combine(a, None) == a`, and the operation is commutative and associative.
    pub fn combine(a: Option<&DecimalSize>, b: Option<&DecimalSize>) -> Option<DecimalSize> {
        match (a, b) {
            (None, None) => None,
            (Some(x), None) | (None, Some(x)) => Some(*x),
            (Some(x), Some(y)) => Some(DecimalSize {
                before_decimal: max_opt(x.before_decimal, y.before_decimal),
                after_decimal: max_opt(x.after_decimal, y.after_decimal),
            }),
        }
    }
}

fn max_opt(a: Option<u32>, b: Option<u32>) -> Option<u32> {
    match (a, b) {
        (Some(x), Some(y)) => Some(x.max(y)),
        (x, None) => x,
        (None, y) => y,
    }
}

impl PartialEq for DecimalSize {
    fn eq(&self, other: &Self) -> bool {
        self.before_decimal.unwrap_or(0) == other.before_decimal.unwrap_or(0)
            && self.after_decimal.unwrap_or(0) == other.after_decimal.unwrap_or(0)
    }
}

impl Eq for DecimalSize {}

impl Hash for DecimalSize {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.before_decimal.unwrap_or(0).hash(state);
        self.after_decimal.unwrap_or(0).hash(state);
    }
}

impl fmt::Display for DecimalSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.precision(), self.scale())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_combine_mixed_int_and_fraction() {
        let a = DecimalSize::new(3, 0);
        let b = DecimalSize::new(1, 4);
        let c = DecimalSize::combine(Some(&a), Some(&b)).unwrap();

        assert_eq!(c.before_decimal(), Some(3));
        assert_eq!(c.after_decimal(), Some(4));
        assert_eq!(c.precision(), 7);
        assert_eq!(c.scale(), 4);
    }

    #[test]
    fn test_combine_commutative_and_identity() {
        let a = DecimalSize::new(5, 2);
        let b = DecimalSize::from_parts(Some(2), None);
        let c = DecimalSize::new(1, 6);

        assert_eq!(
            DecimalSize::combine(Some(&a), Some(&b)),
            DecimalSize::combine(Some(&b), Some(&a))
        );
        assert_eq!(DecimalSize::combine(Some(&a), None), Some(a));
        assert_eq!(DecimalSize::combine(None, None), None);

        let left = DecimalSize::combine(DecimalSize::combine(Some(&a), Some(&b)).as_ref(), Some(&c));
        let right = DecimalSize::combine(Some(&a), DecimalSize::combine(Some(&b), Some(&c)).as_ref());
        assert_eq!(left, right);
    }

    #[test]
    fn test_null_and_zero_are_equal() {
        let a = DecimalSize::from_parts(None, None);
        let b = DecimalSize::new(0, 0);
        assert_eq!(a, b);
        assert!(a.is_empty());

        let mut set = HashSet::new();
        set.insert(a);
        assert!(set.contains(&b));
    }

    #[test]
    fn test_negative_inputs_clamp() {
        let d = DecimalSize::new(-3, -1);
        assert_eq!(d.before_decimal(), Some(0));
        assert_eq!(d.after_decimal(), Some(0));
    }

    #[test]
    fn test_increase_to_never_shrinks() {
        let mut d = DecimalSize::new(4, 2);
        d.increase_to(2, 1);
        assert_eq!(d, DecimalSize::new(4, 2));

        d.increase_to(6, 3);
        assert_eq!(d, DecimalSize::new(6, 3));

        let mut open = DecimalSize::default();
        open.increase_to_before(3);
        assert_eq!(open.before_decimal(), Some(3));
        assert_eq!(open.after_decimal(), None);
    }

    #[test]
    fn test_string_length_counts_point() {
        assert_eq!(DecimalSize::new(3, 1).to_string_length(), 5);
        assert_eq!(DecimalSize::new(3, 0).to_string_length(), 3);
    }

    #[test]
    fn test_from_precision_scale() {
        let d = DecimalSize::from_precision_scale(4, 1);
        assert_eq!(d.before_decimal(), Some(3));
        assert_eq!(d.after_decimal(), Some(1));
        assert_eq!(d.to_string(), "(4,1)");
    }
}
