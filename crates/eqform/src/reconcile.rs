//! Visibility reconciliation
//!
//! Splits the elements involved in a transition into the ones to fade out,
//! fade in, move, or leave alone.

use eqform_core::{ElementId, TransformMap};
use rustc_hash::FxHashSet;

/// Partition of `shown ∪ target` for one transition
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ElementDiff {
    /// In the target, not currently shown
    pub to_show: Vec<ElementId>,
    /// Currently shown, not in the target
    pub to_hide: Vec<ElementId>,
    /// In both, with a different transform
    pub to_move: Vec<ElementId>,
    /// In both, already at the target transform
    pub unchanged: Vec<ElementId>,
}

impl ElementDiff {
    pub fn is_empty(&self) -> bool {
        self.to_show.is_empty() && self.to_hide.is_empty() && self.to_move.is_empty()
    }
}

/// Diff the target element set against what is currently shown.
///
/// Transforms are compared exactly; layout is deterministic, so an element
/// that did not move has a bit-identical transform. An element missing from
/// either transform map counts as unchanged.
pub fn diff(
    target: &[ElementId],
    target_transforms: &TransformMap,
    shown: &[ElementId],
    current_transforms: &TransformMap,
) -> ElementDiff {
    let target_set: FxHashSet<ElementId> = target.iter().copied().collect();
    let shown_set: FxHashSet<ElementId> = shown.iter().copied().collect();
    let mut out = ElementDiff::default();
    let mut seen = FxHashSet::default();

    for &id in shown {
        if !target_set.contains(&id) && seen.insert(id) {
            out.to_hide.push(id);
        }
    }

    for &id in target {
        if !seen.insert(id) {
            continue;
        }
        if !shown_set.contains(&id) {
            out.to_show.push(id);
            continue;
        }
        match (current_transforms.get(&id), target_transforms.get(&id)) {
            (Some(current), Some(target)) if current != target => out.to_move.push(id),
            _ => out.unchanged.push(id),
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use eqform_core::{Element, Point, Scene, Transform};

    fn ids(n: usize) -> Vec<ElementId> {
        let mut scene = Scene::new();
        (0..n)
            .map(|i| scene.insert(Element::text(format!("e{}", i), "x")))
            .collect()
    }

    fn at(x: f32) -> Transform {
        Transform::from_translation(Point::new(x, 0.0))
    }

    #[test]
    fn test_partition() {
        let e = ids(5);
        let shown = vec![e[0], e[1], e[2]];
        let target = vec![e[1], e[2], e[3]];

        let mut current = TransformMap::new();
        let mut wanted = TransformMap::new();
        for (i, id) in e.iter().enumerate() {
            current.insert(*id, at(i as f32));
            wanted.insert(*id, at(i as f32));
        }
        wanted.insert(e[2], at(10.0));

        let d = diff(&target, &wanted, &shown, &current);
        assert_eq!(d.to_hide, vec![e[0]]);
        assert_eq!(d.to_show, vec![e[3]]);
        assert_eq!(d.to_move, vec![e[2]]);
        assert_eq!(d.unchanged, vec![e[1]]);
    }

    #[test]
    fn test_totality_and_disjointness() {
        let e = ids(6);
        let cases: Vec<(Vec<ElementId>, Vec<ElementId>)> = vec![
            (vec![], vec![]),
            (vec![e[0], e[1]], vec![]),
            (vec![], vec![e[2], e[3]]),
            (vec![e[0], e[1], e[2]], vec![e[2], e[3], e[4]]),
            (vec![e[0], e[1]], vec![e[0], e[1]]),
            (vec![e[5], e[0]], vec![e[0], e[5], e[5]]),
        ];
        let current: TransformMap = e.iter().map(|id| (*id, at(0.0))).collect();
        let wanted: TransformMap = e
            .iter()
            .enumerate()
            .map(|(i, id)| (*id, at((i % 2) as f32)))
            .collect();

        for (shown, target) in cases {
            let d = diff(&target, &wanted, &shown, &current);

            let show: FxHashSet<_> = d.to_show.iter().copied().collect();
            let hide: FxHashSet<_> = d.to_hide.iter().copied().collect();
            let mv: FxHashSet<_> = d.to_move.iter().copied().collect();
            let same: FxHashSet<_> = d.unchanged.iter().copied().collect();
            assert!(show.is_disjoint(&hide));
            assert!(show.is_disjoint(&mv));
            assert!(hide.is_disjoint(&mv));
            assert!(same.is_disjoint(&show) && same.is_disjoint(&hide) && same.is_disjoint(&mv));

            let all: FxHashSet<_> = show.iter().chain(&hide).chain(&mv).chain(&same).copied().collect();
            let expected: FxHashSet<_> = shown.iter().chain(target.iter()).copied().collect();
            assert_eq!(all, expected);
            assert_eq!(
                d.to_show.len() + d.to_hide.len() + d.to_move.len() + d.unchanged.len(),
                expected.len()
            );
        }
    }
}
