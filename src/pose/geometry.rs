//! Joint angle geometry on normalized 2D landmarks.

use super::landmark::Landmark;

/// Interior angle at `b` between rays b→a and b→c, in degrees (0..=180).
///
/// Uses the difference of the two `atan2` headings, folded into [0, 180] so the
/// result does not depend on rotation direction or the order of `a` and `c`.
/// Coincident points give a finite but meaningless value.
pub fn angle_at(a: &Landmark, b: &Landmark, c: &Landmark) -> f32 {
    let rad = f32::atan2(c.y - b.y, c.x - b.x) - f32::atan2(a.y - b.y, a.x - b.x);
    let deg = rad.to_degrees().abs();
    if deg > 180.0 {
        360.0 - deg
    } else {
        deg
    }
}

/// Angle as a fill percentage of a 0..180° gauge, capped at 100
pub fn gauge_percent(angle: f32) -> f32 {
    (angle / 180.0 * 100.0).clamp(0.0, 100.0)
}

/// Coarse depth of the tracked joint, used for the ring drawn at the vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepthZone {
    /// below 90°
    Deep,
    /// 90° up to 130°
    Partial,
    Shallow,
}

impl DepthZone {
    pub fn from_angle(angle: f32) -> Self {
        if angle < 90.0 {
            Self::Deep
        } else if angle < 130.0 {
            Self::Partial
        } else {
            Self::Shallow
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lm(x: f32, y: f32) -> Landmark {
        Landmark::new(x, y)
    }

    #[test]
    fn test_right_angle() {
        let angle = angle_at(&lm(0.0, 1.0), &lm(0.0, 0.0), &lm(1.0, 0.0));
        assert!((angle - 90.0).abs() < 1e-3);
    }

    #[test]
    fn test_straight_line() {
        let angle = angle_at(&lm(0.1, 0.5), &lm(0.4, 0.5), &lm(0.9, 0.5));
        assert!((angle - 180.0).abs() < 1e-3);

        // diagonal, b between a and c
        let angle = angle_at(&lm(0.1, 0.1), &lm(0.5, 0.5), &lm(0.8, 0.8));
        assert!((angle - 180.0).abs() < 1e-2);
    }

    #[test]
    fn test_symmetry_and_range() {
        let points = [
            lm(0.0, 0.0),
            lm(1.0, 0.0),
            lm(0.3, 0.9),
            lm(0.7, 0.2),
            lm(0.5, 0.5),
            lm(0.95, 0.05),
            lm(0.1, 0.6),
        ];
        for a in &points {
            for b in &points {
                for c in &points {
                    let abc = angle_at(a, b, c);
                    let cba = angle_at(c, b, a);
                    assert!((0.0..=180.0).contains(&abc), "angle {} out of range", abc);
                    assert!((abc - cba).abs() < 1e-3, "{} != {}", abc, cba);
                }
            }
        }
    }

    #[test]
    fn test_fold_past_180() {
        // headings of 170° and -170° differ by 340° before folding
        let b = lm(0.5, 0.5);
        let a = lm(0.5 + (170f32).to_radians().cos(), 0.5 + (170f32).to_radians().sin());
        let c = lm(0.5 + (-170f32).to_radians().cos(), 0.5 + (-170f32).to_radians().sin());
        let angle = angle_at(&a, &b, &c);
        assert!((angle - 20.0).abs() < 1e-2);
    }

    #[test]
    fn test_degenerate_is_finite() {
        let p = lm(0.5, 0.5);
        let angle = angle_at(&p, &p, &p);
        assert!(angle.is_finite());
        assert!((0.0..=180.0).contains(&angle));
    }

    #[test]
    fn test_gauge_percent() {
        assert_eq!(gauge_percent(0.0), 0.0);
        assert!((gauge_percent(90.0) - 50.0).abs() < 1e-4);
        assert_eq!(gauge_percent(180.0), 100.0);
        assert_eq!(gauge_percent(200.0), 100.0);
    }

    #[test]
    fn test_depth_zone() {
        assert_eq!(DepthZone::from_angle(45.0), DepthZone::Deep);
        assert_eq!(DepthZone::from_angle(90.0), DepthZone::Partial);
        assert_eq!(DepthZone::from_angle(129.9), DepthZone::Partial);
        assert_eq!(DepthZone::from_angle(170.0), DepthZone::Shallow);
    }
}
