//! Level-ordered propagation over the interpolated grid.

use super::immersion::Immersion;
use crate::{image::Connectivity, value::Level};

const UNSEEN: usize = usize::MAX;

/// One LIFO stack of faces per level.
#[derive(Debug)]
pub(crate) struct HierarchicalQueue {
    stacks: Vec<Vec<usize>>,
    len: usize,
}

impl HierarchicalQueue {
    pub(crate) fn new(levels: usize) -> Self {
        Self {
            stacks: vec![Vec::new(); levels],
            len: 0,
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub(crate) fn push(&mut self, level: usize, face: usize) {
        self.stacks[level].push(face);
        self.len += 1;
    }

    /// Pops from the nearest non-empty level, looking at `level` and above
    /// before looking below it.
    pub(crate) fn pop_nearest(&mut self, level: usize) -> Option<(usize, usize)> {
        let found = (level..self.stacks.len())
            .chain((0..level).rev())
            .find(|&candidate| !self.stacks[candidate].is_empty())?;
        let face = self.stacks[found].pop()?;
        self.len -= 1;
        Some((found, face))
    }
}

/// Result of propagating from one face.
#[derive(Debug)]
pub(crate) struct Propagation<V> {
    /// Propagation depth of every face.
    pub(crate) ord: Vec<usize>,
    /// Level reached at each depth.
    pub(crate) depth_to_level: Vec<V>,
    /// Faces in visit order.
    pub(crate) order: Vec<usize>,
}

/// Floods the interpolated grid from `start`.
///
/// A face entering the queue is clamped to the current level when its
/// interval contains it, and to the nearest interval bound otherwise. The
/// first face found at the current level is visited immediately.
pub(crate) fn propagate<V: Level>(immersion: &Immersion<V>, start: usize) -> Propagation<V> {
    let domain = immersion.domain();
    let mut ord = vec![UNSEEN; domain.len()];
    let mut queue = HierarchicalQueue::new(V::LEVELS);
    let mut order = Vec::with_capacity(domain.len());

    let mut previous = immersion.inf[start].index();
    queue.push(previous, start);
    ord[start] = 0;
    let mut depth = 0;
    let mut depth_to_level = vec![V::from_index(previous)];

    while let Some((current, mut face)) = queue.pop_nearest(previous) {
        if current != previous {
            depth += 1;
            depth_to_level.push(V::from_index(current));
        }
        loop {
            ord[face] = depth;
            order.push(face);
            let mut next = None;
            for neighbor in Connectivity::C4.neighbors(domain, face) {
                if ord[neighbor] != UNSEEN {
                    continue;
                }
                let low = immersion.inf[neighbor].index();
                let high = immersion.sup[neighbor].index();
                if high < current {
                    queue.push(high, neighbor);
                } else if current < low {
                    queue.push(low, neighbor);
                } else if next.is_some() {
                    queue.push(current, neighbor);
                } else {
                    next = Some(neighbor);
                }
                ord[neighbor] = 0;
            }
            match next {
                Some(face_at_level) => face = face_at_level,
                None => break,
            }
        }
        previous = current;
    }
    debug_assert!(queue.is_empty());

    Propagation {
        ord,
        depth_to_level,
        order,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{image::Image2d, tos::immersion::immerse};

    #[test]
    fn queue_prefers_upper_levels_then_falls_back_below() {
        let mut queue = HierarchicalQueue::new(8);
        queue.push(2, 10);
        queue.push(5, 11);
        queue.push(5, 12);
        assert_eq!(queue.pop_nearest(3), Some((5, 12)));
        assert_eq!(queue.pop_nearest(3), Some((5, 11)));
        assert_eq!(queue.pop_nearest(3), Some((2, 10)));
        assert!(queue.is_empty());
        assert_eq!(queue.pop_nearest(0), None);
    }

    #[test]
    fn propagation_visits_every_face_once() {
        let image = Image2d::from_rows(vec![vec![0_u8, 3, 0], vec![3, 1, 3]]).expect("rows");
        let immersion = immerse(&image);
        let propagation = propagate(&immersion, 0);
        let mut visited = propagation.order.clone();
        visited.sort_unstable();
        assert_eq!(visited, (0..immersion.domain().len()).collect::<Vec<_>>());
        assert!(propagation.ord.iter().all(|&depth| depth < propagation.depth_to_level.len()));
        assert_eq!(propagation.depth_to_level[0], 0);
    }

    #[test]
    fn depth_increments_on_every_level_change() {
        let image = Image2d::from_rows(vec![vec![0_u8, 2, 0]]).expect("rows");
        let propagation = propagate(&immerse(&image), 0);
        // Faces: 0 [0,2] 2 [0,2] 0
        assert_eq!(propagation.order, [0, 1, 2, 3, 4]);
        assert_eq!(propagation.ord, [0, 0, 1, 1, 2]);
        assert_eq!(propagation.depth_to_level, [0, 2, 0]);
    }
}
