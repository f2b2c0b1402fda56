//! Feature-preserving curve downsampling
//!
//! Long sessions produce hundreds of thousands of samples; the renderer
//! wants a bounded number. Plain stride skipping would do, except that the
//! interesting features of a cracking curve are exactly the points a
//! stride is most likely to drop: the jump when a wordlist starts paying
//! off, and the phase boundaries where one attack hands over to the next.
//!
//! Selection rules, in priority order:
//!
//! 1. The first point, the last point, and every phase-start marker are
//!    always kept. Markers outrank the cap: a degenerate series with more
//!    markers than budget keeps them all.
//! 2. The remaining budget is split into equal index buckets and each
//!    bucket contributes its maximum-y point (earliest on ties), so jumps
//!    survive.
//! 3. Budget left over after dedup is spread uniformly so sparse regions
//!    keep some coverage.
//!
//! Selection is by index, so output order is input order and repeated runs
//! over the same input pick the same points. Input at or under the cap is
//! returned unchanged, which also makes the pass idempotent.

use crate::types::PlotPoint;
use std::collections::BTreeSet;

/// Reduce `points` to at most `max` points, preserving endpoints, phase
/// boundaries, and local maxima.
pub fn downsample(points: &[PlotPoint], max: usize) -> Vec<PlotPoint> {
    let max = max.max(2);
    if points.len() <= max {
        return points.to_vec();
    }

    let mut keep: BTreeSet<usize> = BTreeSet::new();
    keep.insert(0);
    keep.insert(points.len() - 1);
    for (index, point) in points.iter().enumerate() {
        if point.phase_start {
            keep.insert(index);
        }
    }

    // Bucket maxima fill most of the remaining budget.
    if keep.len() < max {
        let buckets = max - keep.len();
        for bucket in 0..buckets {
            let lo = bucket * points.len() / buckets;
            let hi = (((bucket + 1) * points.len() / buckets).max(lo + 1)).min(points.len());
            let mut best = lo;
            for index in lo..hi {
                if points[index].y > points[best].y {
                    best = index;
                }
            }
            keep.insert(best);
        }
    }

    // Bucket picks that land on already-kept indexes leave budget unused;
    // spread it uniformly over whatever is not yet kept.
    if keep.len() < max {
        let need = max - keep.len();
        let rest: Vec<usize> = (0..points.len()).filter(|i| !keep.contains(i)).collect();
        for slot in 0..need {
            keep.insert(rest[slot * rest.len() / need]);
        }
    }

    keep.into_iter().map(|index| points[index]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat(len: usize) -> Vec<PlotPoint> {
        (0..len)
            .map(|i| PlotPoint {
                x: i as f64,
                y: (i / 10) as f64,
                phase_start: i == 0,
                potfile: false,
            })
            .collect()
    }

    #[test]
    fn test_short_input_returned_unchanged() {
        let points = flat(50);
        assert_eq!(downsample(&points, 100), points);
        assert_eq!(downsample(&points, 50), points);
    }

    #[test]
    fn test_cap_and_endpoints() {
        let points = flat(5000);
        let sampled = downsample(&points, 1000);

        assert_eq!(sampled.len(), 1000);
        assert_eq!(sampled.first().unwrap().x, points.first().unwrap().x);
        assert_eq!(sampled.last().unwrap().x, points.last().unwrap().x);
    }

    #[test]
    fn test_order_preserved() {
        let points = flat(5000);
        let sampled = downsample(&points, 300);
        for pair in sampled.windows(2) {
            assert!(pair[0].x < pair[1].x);
        }
    }

    #[test]
    fn test_phase_boundaries_survive() {
        let mut points = flat(10_000);
        for index in [1234, 4567, 8901] {
            points[index].phase_start = true;
        }

        let sampled = downsample(&points, 100);
        let boundaries: Vec<f64> = sampled
            .iter()
            .filter(|p| p.phase_start)
            .map(|p| p.x)
            .collect();
        assert_eq!(boundaries, vec![0.0, 1234.0, 4567.0, 8901.0]);
    }

    #[test]
    fn test_markers_outrank_cap() {
        let mut points = flat(100);
        for point in points.iter_mut() {
            point.phase_start = true;
        }

        let sampled = downsample(&points, 10);
        assert_eq!(sampled.len(), 100);
    }

    #[test]
    fn test_spike_survives() {
        let mut points = flat(5000);
        for point in points.iter_mut() {
            point.y = 0.0;
        }
        points[3777].y = 42.0;

        let sampled = downsample(&points, 50);
        assert!(sampled.iter().any(|p| p.y == 42.0));
    }

    #[test]
    fn test_deterministic_and_idempotent() {
        let points = flat(9999);
        let once = downsample(&points, 500);
        let again = downsample(&points, 500);
        assert_eq!(once, again);

        let twice = downsample(&once, 500);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_two_point_floor() {
        let points = flat(10);
        let sampled = downsample(&points, 0);
        assert_eq!(sampled.len(), 2);
        assert_eq!(sampled[0].x, 0.0);
        assert_eq!(sampled[1].x, 9.0);
    }
}
