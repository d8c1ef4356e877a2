//! Glide-path interpolation: age → target asset-class allocation.
//!
//! A glide path is a sparse schedule of `(age, allocation)` rows. Ages before
//! the first row or after the last clamp to that row; ages in between are
//! linearly interpolated per asset class and rounded to two decimals.
//!
//! ```
//! use glidepath::{AssetClass, GlidePathEntry, interpolate};
//!
//! let glide_path = vec![
//!     GlidePathEntry::new(30, [("stock", 100.0), ("bond", 0.0)]),
//!     GlidePathEntry::new(60, [("stock", 0.0), ("bond", 100.0)]),
//! ];
//!
//! let target = interpolate(45, &glide_path);
//! assert_eq!(target[&AssetClass::new("stock")], 50.0);
//! assert_eq!(target[&AssetClass::new("bond")], 50.0);
//! ```

use std::collections::BTreeSet;
use std::ops::RangeInclusive;

use crate::types::{Allocation, AssetClass, round2};

/// One row of the glide path: the target allocation at a given age.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GlidePathEntry {
    pub age: i32,
    pub allocations: Allocation,
}

impl GlidePathEntry {
    pub fn new<K, I>(age: i32, allocations: I) -> Self
    where
        K: Into<AssetClass>,
        I: IntoIterator<Item = (K, f64)>,
    {
        Self {
            age,
            allocations: allocations
                .into_iter()
                .map(|(k, v)| (k.into(), v))
                .collect(),
        }
    }

    /// Sum of all percentages in this row.
    pub fn total(&self) -> f64 {
        self.allocations.values().sum()
    }
}

/// Age-indexed allocation schedule. Stored in any order; sorted before use.
pub type GlidePath = Vec<GlidePathEntry>;

/// Target allocation for `age`.
///
/// Returns an empty allocation for an empty glide path; callers must treat
/// that as "no target defined", not as a valid all-zero target.
pub fn interpolate(age: i32, glide_path: &[GlidePathEntry]) -> Allocation {
    let mut sorted: Vec<&GlidePathEntry> = glide_path.iter().collect();
    sorted.sort_by_key(|e| e.age);

    let (first, last) = match (sorted.first(), sorted.last()) {
        (Some(first), Some(last)) => (*first, *last),
        _ => return Allocation::new(),
    };

    if age <= first.age {
        return first.allocations.clone();
    }
    if age >= last.age {
        return last.allocations.clone();
    }

    for pair in sorted.windows(2) {
        let (lo, hi) = (pair[0], pair[1]);
        if lo.age <= age && age <= hi.age {
            return blend(lo, hi, age);
        }
    }

    // Unreachable for a sorted path with first.age < age < last.age.
    Allocation::new()
}

/// Linear blend of two bracketing rows. A class missing from one row is 0% there.
fn blend(lo: &GlidePathEntry, hi: &GlidePathEntry, age: i32) -> Allocation {
    if age == lo.age {
        return lo.allocations.clone();
    }
    if age == hi.age {
        return hi.allocations.clone();
    }

    let span = f64::from(hi.age) - f64::from(lo.age);
    let ratio = (f64::from(age) - f64::from(lo.age)) / span;
    let classes: BTreeSet<&AssetClass> =
        lo.allocations.keys().chain(hi.allocations.keys()).collect();

    classes
        .into_iter()
        .map(|class| {
            let p1 = lo.allocations.get(class).copied().unwrap_or(0.0);
            let p2 = hi.allocations.get(class).copied().unwrap_or(0.0);
            (class.clone(), round2(p1 + ratio * (p2 - p1)))
        })
        .collect()
}

/// Every asset class named anywhere in the glide path.
pub fn asset_classes(glide_path: &[GlidePathEntry]) -> Vec<AssetClass> {
    let classes: BTreeSet<&AssetClass> = glide_path
        .iter()
        .flat_map(|e| e.allocations.keys())
        .collect();
    classes.into_iter().cloned().collect()
}

/// Evaluate the glide path over an inclusive age range.
///
/// Each row carries every asset class present in the glide path (missing → 0),
/// so the rows can be stacked or tabulated directly.
pub fn schedule(glide_path: &[GlidePathEntry], ages: RangeInclusive<i32>) -> Vec<(i32, Allocation)> {
    let classes = asset_classes(glide_path);
    if classes.is_empty() {
        return Vec::new();
    }

    ages.map(|age| {
        let target = interpolate(age, glide_path);
        let row = classes
            .iter()
            .map(|class| (class.clone(), target.get(class).copied().unwrap_or(0.0)))
            .collect();
        (age, row)
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_point() -> GlidePath {
        vec![
            GlidePathEntry::new(60, [("stock", 0.0), ("bond", 100.0)]),
            GlidePathEntry::new(30, [("stock", 100.0), ("bond", 0.0)]),
        ]
    }

    fn pct(alloc: &Allocation, key: &str) -> f64 {
        alloc[&AssetClass::new(key)]
    }

    #[test]
    fn empty_glide_path_has_no_target() {
        assert!(interpolate(40, &[]).is_empty());
    }

    #[test]
    fn midpoint_interpolation() {
        let target = interpolate(45, &two_point());
        assert_eq!(pct(&target, "stock"), 50.0);
        assert_eq!(pct(&target, "bond"), 50.0);
    }

    #[test]
    fn full_i32_span_blends_without_overflow() {
        let gp = vec![
            GlidePathEntry::new(i32::MIN, [("stock", 100.0), ("bond", 0.0)]),
            GlidePathEntry::new(i32::MAX, [("stock", 0.0), ("bond", 100.0)]),
        ];
        let target = interpolate(0, &gp);
        assert_eq!(pct(&target, "stock"), 50.0);
        assert_eq!(pct(&target, "bond"), 50.0);
    }

    #[test]
    fn clamps_below_and_above() {
        let gp = two_point();
        assert_eq!(interpolate(18, &gp), gp[1].allocations);
        assert_eq!(interpolate(30, &gp), gp[1].allocations);
        assert_eq!(interpolate(60, &gp), gp[0].allocations);
        assert_eq!(interpolate(95, &gp), gp[0].allocations);
    }

    #[test]
    fn interior_entry_returned_exactly() {
        let gp = vec![
            GlidePathEntry::new(25, [("stock", 90.0), ("bond", 10.0)]),
            GlidePathEntry::new(40, [("stock", 73.33), ("bond", 26.67)]),
            GlidePathEntry::new(65, [("stock", 40.0), ("bond", 60.0)]),
        ];
        assert_eq!(interpolate(40, &gp), gp[1].allocations);
    }

    #[test]
    fn rounds_each_class_independently() {
        let gp = vec![
            GlidePathEntry::new(0, [("a", 0.0), ("b", 100.0)]),
            GlidePathEntry::new(3, [("a", 100.0), ("b", 0.0)]),
        ];
        let target = interpolate(1, &gp);
        assert_eq!(pct(&target, "a"), 33.33);
        assert_eq!(pct(&target, "b"), 66.67);
    }

    #[test]
    fn missing_class_treated_as_zero() {
        let gp = vec![
            GlidePathEntry::new(20, [("stock", 100.0)]),
            GlidePathEntry::new(40, [("stock", 50.0), ("tips", 50.0)]),
        ];
        let target = interpolate(30, &gp);
        assert_eq!(pct(&target, "stock"), 75.0);
        assert_eq!(pct(&target, "tips"), 25.0);
    }

    #[test]
    fn schedule_fills_every_class() {
        let gp = vec![
            GlidePathEntry::new(20, [("stock", 100.0)]),
            GlidePathEntry::new(40, [("bond", 100.0)]),
        ];
        let rows = schedule(&gp, 15..=45);
        assert_eq!(rows.len(), 31);
        assert_eq!(rows[0].0, 15);
        assert_eq!(pct(&rows[0].1, "bond"), 0.0);
        assert_eq!(pct(&rows[0].1, "stock"), 100.0);
        let (age, last) = rows.last().unwrap();
        assert_eq!(*age, 45);
        assert_eq!(pct(last, "stock"), 0.0);
    }

    #[test]
    fn schedule_of_empty_path_is_empty() {
        assert!(schedule(&[], 15..=95).is_empty());
    }
}
