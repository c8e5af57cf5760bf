//! SDF Operations - hard and smooth boolean combinations carrying color
//!
//! Each operator takes the [`Sample`]s of its two children at the same point
//! and returns the combined sample. Smooth variants use the polynomial
//! smooth minimum with `k` as the blend radius and mix the children's colors
//! with the same weight, so blended seams show a color gradient.

use sdfmarch_sdf::OperationKind;

use super::Sample;

/// Apply operation `kind` to two child samples.
///
/// With `blend` disabled every smooth kind falls back to its hard
/// counterpart. `Leaf` is not a binary operation and returns `a`.
pub fn combine(kind: OperationKind, a: Sample, b: Sample, k: f32, blend: bool) -> Sample {
    let kind = if blend { kind } else { kind.hard() };
    match kind {
        OperationKind::Union => union(a, b),
        OperationKind::Subtract => subtract(a, b),
        OperationKind::Intersect => intersect(a, b),
        OperationKind::SmoothUnion => smooth_union(a, b, k),
        OperationKind::SmoothSubtract => smooth_subtract(a, b, k),
        OperationKind::SmoothIntersect => smooth_intersect(a, b, k),
        OperationKind::Leaf => a,
    }
}

// ============================================================================
// Boolean Operations
// ============================================================================

/// `min(d1, d2)`, colored by whichever child is nearer (ties keep `a`)
pub fn union(a: Sample, b: Sample) -> Sample {
    if b.distance < a.distance { b } else { a }
}

/// `max(d1, -d2)`, keeping the color of the retained volume `a`
pub fn subtract(a: Sample, b: Sample) -> Sample {
    Sample::new(a.distance.max(-b.distance), a.color)
}

/// `max(d1, d2)`, colored by `a`
pub fn intersect(a: Sample, b: Sample) -> Sample {
    Sample::new(a.distance.max(b.distance), a.color)
}

// ============================================================================
// Smooth Boolean Operations
// ============================================================================

/// Polynomial smooth union. Never greater than [`union`].
pub fn smooth_union(a: Sample, b: Sample, k: f32) -> Sample {
    if k <= 0.0 {
        return union(a, b);
    }
    let h = (0.5 + 0.5 * (b.distance - a.distance) / k).clamp(0.0, 1.0);
    Sample::new(
        lerp(b.distance, a.distance, h) - k * h * (1.0 - h),
        b.color.lerp(a.color, h),
    )
}

/// Smooth carve of `b` out of `a`
pub fn smooth_subtract(a: Sample, b: Sample, k: f32) -> Sample {
    if k <= 0.0 {
        return subtract(a, b);
    }
    let h = (0.5 - 0.5 * (b.distance + a.distance) / k).clamp(0.0, 1.0);
    Sample::new(
        lerp(a.distance, -b.distance, h) + k * h * (1.0 - h),
        a.color.lerp(b.color, h),
    )
}

/// Smooth intersection. Never less than [`intersect`].
pub fn smooth_intersect(a: Sample, b: Sample, k: f32) -> Sample {
    if k <= 0.0 {
        return intersect(a, b);
    }
    let h = (0.5 - 0.5 * (b.distance - a.distance) / k).clamp(0.0, 1.0);
    Sample::new(
        lerp(b.distance, a.distance, h) + k * h * (1.0 - h),
        b.color.lerp(a.color, h),
    )
}

// ============================================================================
// Helpers
// ============================================================================

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Largest gap a smooth operator can open against its hard counterpart
pub fn smooth_envelope(k: f32) -> f32 {
    k.max(0.0) * 0.25
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use glam::Vec3;

    const RED: Vec3 = Vec3::new(1.0, 0.0, 0.0);
    const BLUE: Vec3 = Vec3::new(0.0, 0.0, 1.0);

    fn pairs() -> Vec<(Sample, Sample)> {
        let ds = [-2.0, -0.7, -0.1, 0.0, 0.05, 0.3, 1.0, 4.0];
        ds.iter()
            .flat_map(|&d1| ds.iter().map(move |&d2| (Sample::new(d1, RED), Sample::new(d2, BLUE))))
            .collect()
    }

    // ------------------------------------------------------------------------
    // Boolean Operations
    // ------------------------------------------------------------------------

    #[test]
    fn hard_operations_are_exact_identities() {
        for (a, b) in pairs() {
            assert_eq!(union(a, b).distance, a.distance.min(b.distance));
            assert_eq!(subtract(a, b).distance, a.distance.max(-b.distance));
            assert_eq!(intersect(a, b).distance, a.distance.max(b.distance));
        }
    }

    #[test]
    fn union_takes_color_of_nearer_child() {
        let a = Sample::new(0.5, RED);
        let b = Sample::new(0.2, BLUE);
        assert_eq!(union(a, b).color, BLUE);
        assert_eq!(union(b, a).color, BLUE);
    }

    #[test]
    fn subtract_and_intersect_keep_first_color() {
        let a = Sample::new(0.5, RED);
        let b = Sample::new(-2.0, BLUE);
        assert_eq!(subtract(a, b).color, RED);
        assert_eq!(intersect(a, b).color, RED);
    }

    // ------------------------------------------------------------------------
    // Smooth Boolean Operations
    // ------------------------------------------------------------------------

    #[test]
    fn smooth_union_never_exceeds_union() {
        for (a, b) in pairs() {
            for k in [0.01, 0.2, 1.0, 3.0] {
                let smooth = smooth_union(a, b, k).distance;
                let hard = union(a, b).distance;
                assert!(smooth <= hard + 1e-6);
                assert!(hard - smooth <= smooth_envelope(k) + 1e-6);
            }
        }
    }

    #[test]
    fn smooth_intersect_and_subtract_stay_in_envelope() {
        for (a, b) in pairs() {
            for k in [0.01, 0.2, 1.0, 3.0] {
                let si = smooth_intersect(a, b, k).distance;
                let hi = intersect(a, b).distance;
                assert!(si >= hi - 1e-6);
                assert!(si - hi <= smooth_envelope(k) + 1e-6);

                let ss = smooth_subtract(a, b, k).distance;
                let hs = subtract(a, b).distance;
                assert!(ss >= hs - 1e-6);
                assert!(ss - hs <= smooth_envelope(k) + 1e-6);
            }
        }
    }

    #[test]
    fn smooth_operations_converge_to_hard() {
        for (a, b) in pairs() {
            let k = 1e-4;
            assert_relative_eq!(
                smooth_union(a, b, k).distance,
                union(a, b).distance,
                epsilon = 1e-4
            );
            assert_relative_eq!(
                smooth_subtract(a, b, k).distance,
                subtract(a, b).distance,
                epsilon = 1e-4
            );
            assert_relative_eq!(
                smooth_intersect(a, b, k).distance,
                intersect(a, b).distance,
                epsilon = 1e-4
            );
        }
    }

    #[test]
    fn zero_strength_is_exactly_hard() {
        for (a, b) in pairs() {
            assert_eq!(smooth_union(a, b, 0.0), union(a, b));
            assert_eq!(smooth_subtract(a, b, 0.0), subtract(a, b));
            assert_eq!(smooth_intersect(a, b, 0.0), intersect(a, b));
        }
    }

    #[test]
    fn smooth_union_blends_color_at_seam() {
        // Equidistant children: halfway mix
        let s = smooth_union(Sample::new(0.1, RED), Sample::new(0.1, BLUE), 0.5);
        assert_relative_eq!(s.color.x, 0.5, epsilon = 1e-6);
        assert_relative_eq!(s.color.z, 0.5, epsilon = 1e-6);
        // Far from the seam the nearer color wins outright
        let s = smooth_union(Sample::new(0.1, RED), Sample::new(3.0, BLUE), 0.5);
        assert_eq!(s.color, RED);
    }

    #[test]
    fn disabled_blend_degrades_to_hard() {
        for (a, b) in pairs() {
            assert_eq!(
                combine(OperationKind::SmoothUnion, a, b, 2.0, false),
                union(a, b)
            );
            assert_eq!(
                combine(OperationKind::SmoothSubtract, a, b, 2.0, false),
                subtract(a, b)
            );
            assert_eq!(
                combine(OperationKind::SmoothIntersect, a, b, 2.0, false),
                intersect(a, b)
            );
        }
    }

    #[test]
    fn enabled_blend_uses_smooth_kind() {
        let a = Sample::new(0.1, RED);
        let b = Sample::new(0.1, BLUE);
        let blended = combine(OperationKind::SmoothUnion, a, b, 0.5, true);
        assert!(blended.distance < union(a, b).distance);
    }
}
