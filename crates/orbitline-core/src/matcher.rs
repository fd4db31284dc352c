//! Comparison of produced resources against a demand set.
//!
//! Two modes exist:
//!
//! - **Multiset**: order-agnostic. Every demand pairs with exactly one
//!   distinct produced resource and nothing is left over.
//! - **Positional**: order-sensitive. Resources are compared slot-by-slot
//!   against the demands, and every slot must hold a classified resource.

use crate::resource::{ColorKind, Demand, ShapeKind};
use serde::{Deserialize, Serialize};

/// Slot count of the classic three-resource sequence puzzle.
pub const SEQUENCE_SLOTS: usize = 3;

/// How an event's demands are compared against the production line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MatchMode {
    #[default]
    Multiset,
    Positional,
}

/// Dispatch on `mode`.
pub fn matches(mode: MatchMode, produced: &[(ShapeKind, ColorKind)], demands: &[Demand]) -> bool {
    match mode {
        MatchMode::Multiset => multiset_match(produced, demands),
        MatchMode::Positional => positional_match(produced, demands),
    }
}

/// Order-agnostic match with exact counts.
///
/// For each demand, the first remaining produced resource with an equal
/// (shape, color) is taken out of a working copy. Duplicate demands thus
/// need duplicate resources.
pub fn multiset_match(produced: &[(ShapeKind, ColorKind)], demands: &[Demand]) -> bool {
    if produced.len() != demands.len() {
        return false;
    }
    let mut remaining = produced.to_vec();
    for demand in demands {
        match remaining
            .iter()
            .position(|&(shape, color)| demand.accepts(shape, color))
        {
            Some(i) => {
                remaining.swap_remove(i);
            }
            None => return false,
        }
    }
    remaining.is_empty()
}

/// Slot-by-slot match. Lengths must agree and every slot must be classified.
pub fn positional_match(produced: &[(ShapeKind, ColorKind)], demands: &[Demand]) -> bool {
    if produced.len() != demands.len() {
        return false;
    }
    produced
        .iter()
        .zip(demands)
        .all(|(&(shape, color), demand)| {
            !shape.is_none() && !color.is_none() && demand.accepts(shape, color)
        })
}

/// Demands not yet covered by the produced resources, in demand order.
/// Extra produced resources are ignored.
pub fn missing_demands(produced: &[(ShapeKind, ColorKind)], demands: &[Demand]) -> Vec<Demand> {
    let mut remaining = produced.to_vec();
    let mut missing = Vec::new();
    for demand in demands {
        match remaining
            .iter()
            .position(|&(shape, color)| demand.accepts(shape, color))
        {
            Some(i) => {
                remaining.swap_remove(i);
            }
            None => missing.push(*demand),
        }
    }
    missing
}

#[cfg(test)]
mod tests {
    use super::*;
    use ColorKind::*;
    use ShapeKind::*;

    fn d(shape: ShapeKind, color: ColorKind) -> Demand {
        Demand::new(shape, color)
    }

    #[test]
    fn empty_demands_are_trivially_satisfied() {
        assert!(multiset_match(&[], &[]));
        assert!(positional_match(&[], &[]));
    }

    #[test]
    fn extra_resources_fail_multiset() {
        let produced = [(Circle, Red), (Square, Blue)];
        assert!(!multiset_match(&produced, &[d(Circle, Red)]));
    }

    #[test]
    fn multiset_ignores_order() {
        let produced = [(Square, Blue), (Circle, Red)];
        assert!(multiset_match(&produced, &[d(Circle, Red), d(Square, Blue)]));
    }

    #[test]
    fn duplicate_demands_need_distinct_resources() {
        let demands = [d(Circle, Red), d(Circle, Red)];
        assert!(!multiset_match(&[(Circle, Red), (Square, Red)], &demands));
        assert!(multiset_match(&[(Circle, Red), (Circle, Red)], &demands));
    }

    #[test]
    fn positional_rejects_wrong_order() {
        let demands = [d(Triangle, Red), d(Circle, Blue), d(Square, Green)];
        let produced = [(Circle, Blue), (Triangle, Red), (Square, Green)];
        assert_eq!(demands.len(), SEQUENCE_SLOTS);
        assert!(!positional_match(&produced, &demands));
        assert!(multiset_match(&produced, &demands));
    }

    #[test]
    fn positional_accepts_exact_order() {
        let demands = [d(Triangle, Red), d(Circle, Blue), d(Square, Green)];
        let produced = [(Triangle, Red), (Circle, Blue), (Square, Green)];
        assert!(positional_match(&produced, &demands));
        assert!(matches(MatchMode::Positional, &produced, &demands));
    }

    #[test]
    fn positional_fails_on_missing_slot() {
        let demands = [d(Triangle, Red), d(Circle, Blue), d(Square, Green)];
        assert!(!positional_match(&[(Triangle, Red), (Circle, Blue)], &demands));
    }

    #[test]
    fn positional_fails_on_unclassified_slot() {
        let demands = [d(ShapeKind::None, Red)];
        assert!(!positional_match(&[(ShapeKind::None, Red)], &demands));
        // Multiset compares exactly and does not special-case None.
        assert!(multiset_match(&[(ShapeKind::None, Red)], &demands));
    }

    #[test]
    fn missing_demands_lists_uncovered_in_order() {
        let demands = [d(Circle, Red), d(Square, Blue), d(Circle, Red)];
        let missing = missing_demands(&[(Circle, Red), (Triangle, Green)], &demands);
        assert_eq!(missing, vec![d(Square, Blue), d(Circle, Red)]);
    }
}
