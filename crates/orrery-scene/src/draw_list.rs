//! Per-frame far-to-near ordering of bodies for painter's-algorithm blending.

use glam::DVec3;
use orrery_orbit::{BodyHierarchy, BodyId};

/// One body's distance from the camera for the current frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepthSortKey {
    pub distance: f64,
    pub id: BodyId,
}

impl DepthSortKey {
    /// Farthest first; equal distances by ascending id. Total even for NaN.
    fn order(&self, other: &Self) -> std::cmp::Ordering {
        other
            .distance
            .total_cmp(&self.distance)
            .then(self.id.cmp(&other.id))
    }
}

/// Body ids sorted by descending camera distance, rebuilt every frame.
///
/// The key storage is reused between frames. Iterate forwards for
/// far-to-near and backwards for near-to-far without sorting again.
#[derive(Debug, Clone, Default)]
pub struct DepthSortedDrawList {
    keys: Vec<DepthSortKey>,
}

impl DepthSortedDrawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            keys: Vec::with_capacity(capacity),
        }
    }

    /// Re-sort from `(id, world position)` pairs. A body exactly at the camera
    /// has distance zero and sorts last.
    pub fn build<I>(&mut self, camera_position: DVec3, bodies: I)
    where
        I: IntoIterator<Item = (BodyId, DVec3)>,
    {
        self.keys.clear();
        self.keys
            .extend(bodies.into_iter().map(|(id, position)| DepthSortKey {
                distance: camera_position.distance(position),
                id,
            }));
        self.keys.sort_unstable_by(DepthSortKey::order);
    }

    /// Re-sort every body in `hierarchy` by its current world position.
    pub fn build_from_hierarchy(&mut self, camera_position: DVec3, hierarchy: &BodyHierarchy) {
        let bodies = (0..hierarchy.len() as u32).map(|i| {
            let id = BodyId(i);
            (id, hierarchy.world_position(id))
        });
        self.build(camera_position, bodies);
    }

    /// Ids farthest first. Reverse the iterator for nearest first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = BodyId> + ExactSizeIterator + '_ {
        self.keys.iter().map(|key| key.id)
    }

    pub fn far_to_near(&self) -> impl Iterator<Item = BodyId> + '_ {
        self.iter()
    }

    pub fn near_to_far(&self) -> impl Iterator<Item = BodyId> + '_ {
        self.iter().rev()
    }

    pub fn keys(&self) -> &[DepthSortKey] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Sort `bodies` farthest-first from `camera_position` into a new vector.
pub fn build_order(camera_position: DVec3, bodies: &[(BodyId, DVec3)]) -> Vec<BodyId> {
    let mut list = DepthSortedDrawList::with_capacity(bodies.len());
    list.build(camera_position, bodies.iter().copied());
    list.iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_farthest_first() {
        let bodies = [
            (BodyId(0), DVec3::new(5.0, 0.0, 0.0)),
            (BodyId(1), DVec3::new(0.0, 10.0, 0.0)),
            (BodyId(2), DVec3::new(0.0, 0.0, -2.0)),
        ];
        assert_eq!(
            build_order(DVec3::ZERO, &bodies),
            vec![BodyId(1), BodyId(0), BodyId(2)]
        );
    }

    #[test]
    fn test_ties_break_by_id() {
        let bodies = [
            (BodyId(3), DVec3::new(1.0, 0.0, 0.0)),
            (BodyId(1), DVec3::new(-1.0, 0.0, 0.0)),
            (BodyId(2), DVec3::new(0.0, 1.0, 0.0)),
        ];
        assert_eq!(
            build_order(DVec3::ZERO, &bodies),
            vec![BodyId(1), BodyId(2), BodyId(3)]
        );
    }

    #[test]
    fn test_camera_on_body_is_nearest() {
        let bodies = [
            (BodyId(0), DVec3::new(4.0, 4.0, 4.0)),
            (BodyId(1), DVec3::new(1.0, 1.0, 1.0)),
        ];
        let order = build_order(DVec3::new(4.0, 4.0, 4.0), &bodies);
        assert_eq!(order, vec![BodyId(1), BodyId(0)]);
    }

    #[test]
    fn test_nan_positions_do_not_break_sort() {
        let bodies = [
            (BodyId(0), DVec3::new(f64::NAN, 0.0, 0.0)),
            (BodyId(1), DVec3::new(1.0, 0.0, 0.0)),
            (BodyId(2), DVec3::new(2.0, 0.0, 0.0)),
        ];
        let order = build_order(DVec3::ZERO, &bodies);
        assert_eq!(order.len(), 3);
        assert_eq!(order, build_order(DVec3::ZERO, &bodies));
    }

    #[test]
    fn test_reverse_is_near_to_far() {
        let mut list = DepthSortedDrawList::new();
        list.build(
            DVec3::ZERO,
            [
                (BodyId(0), DVec3::X * 3.0),
                (BodyId(1), DVec3::X * 1.0),
                (BodyId(2), DVec3::X * 2.0),
            ],
        );
        let far: Vec<_> = list.far_to_near().collect();
        let near: Vec<_> = list.near_to_far().collect();
        assert_eq!(far, vec![BodyId(0), BodyId(2), BodyId(1)]);
        assert_eq!(near, vec![BodyId(1), BodyId(2), BodyId(0)]);
        assert_eq!(list.iter().len(), 3);
    }

    #[test]
    fn test_rebuild_replaces_previous_frame() {
        let mut list = DepthSortedDrawList::new();
        list.build(DVec3::ZERO, [(BodyId(0), DVec3::X), (BodyId(1), DVec3::Y * 2.0)]);
        list.build(DVec3::ZERO, [(BodyId(4), DVec3::Z)]);
        assert_eq!(list.iter().collect::<Vec<_>>(), vec![BodyId(4)]);
    }
}
