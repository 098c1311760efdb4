//! Collision detection and resolution policy
//!
//! Everything is approximated with circles (actors, obstacles, ducks, falling
//! items) or axis-aligned boxes (maze walls and zones). Hitboxes are shrunk
//! from their nominal size so near misses read as misses.

use glam::Vec2;
use serde::Serialize;

/// Circular hitbox
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HitCircle {
    pub center: Vec2,
    pub radius: f32,
}

impl HitCircle {
    pub fn new(center: Vec2, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Hitbox scaled down from the nominal radius by `ratio`
    pub fn forgiving(center: Vec2, nominal_radius: f32, ratio: f32) -> Self {
        Self {
            center,
            radius: nominal_radius * ratio,
        }
    }

    /// Hitbox for a box-shaped entity given by its top-left corner and size.
    /// The radius comes from half the width.
    pub fn from_box(top_left: Vec2, size: Vec2, ratio: f32) -> Self {
        Self::forgiving(top_left + size / 2.0, size.x / 2.0, ratio)
    }

    #[inline]
    pub fn overlaps(&self, other: &HitCircle) -> bool {
        circles_overlap(self, other)
    }
}

/// Strict overlap: touching circles do not collide
#[inline]
pub fn circles_overlap(a: &HitCircle, b: &HitCircle) -> bool {
    a.center.distance(b.center) < a.radius + b.radius
}

/// Index of the first circle (in iteration order) that overlaps `player`
pub fn first_overlap<I>(player: &HitCircle, others: I) -> Option<usize>
where
    I: IntoIterator<Item = HitCircle>,
{
    others
        .into_iter()
        .position(|other| circles_overlap(player, &other))
}

/// Axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            min: Vec2::new(x, y),
            max: Vec2::new(x + width, y + height),
        }
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) / 2.0
    }

    /// Edges count as inside
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
    }

    /// Edges count as outside
    pub fn contains_strict(&self, point: Vec2) -> bool {
        point.x > self.min.x && point.x < self.max.x && point.y > self.min.y && point.y < self.max.y
    }

    /// A square of half-size `pad` around `point` overlaps this rect
    pub fn overlaps_padded(&self, point: Vec2, pad: f32) -> bool {
        point.x + pad > self.min.x
            && point.x - pad < self.max.x
            && point.y + pad > self.min.y
            && point.y - pad < self.max.y
    }
}

/// What touching an entity does to the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Resolution {
    /// Ends the session
    Hazard,
    /// Adds points and removes the entity
    Collect { points: u32 },
    /// Adds points, removes the entity and raises the session's special flag
    Special { points: u32 },
    /// Removes points (clamped at zero) and removes the entity
    Penalty { points: u32 },
}

impl Resolution {
    /// Apply the score side of this resolution. Score never drops below zero.
    pub fn apply_to_score(self, score: u64) -> u64 {
        match self {
            Resolution::Hazard => score,
            Resolution::Collect { points } | Resolution::Special { points } => {
                score.saturating_add(points as u64)
            }
            Resolution::Penalty { points } => score.saturating_sub(points as u64),
        }
    }

    /// Whether the entity is removed from play
    pub fn consumes(self) -> bool {
        !matches!(self, Resolution::Hazard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_forgiving_radii() {
        let player = HitCircle::forgiving(Vec2::new(80.0, 200.0), 40.0, 0.7);
        assert!((player.radius - 28.0).abs() < 1e-5);

        let rock = HitCircle::from_box(Vec2::new(100.0, 400.0), Vec2::splat(50.0), 0.85);
        assert_eq!(rock.center, Vec2::new(125.0, 425.0));
        assert!((rock.radius - 21.25).abs() < 1e-5);
    }

    #[test]
    fn test_touching_is_not_a_hit() {
        let a = HitCircle::new(Vec2::ZERO, 10.0);
        let b = HitCircle::new(Vec2::new(20.0, 0.0), 10.0);
        assert!(!a.overlaps(&b));
        let c = HitCircle::new(Vec2::new(19.9, 0.0), 10.0);
        assert!(a.overlaps(&c));
    }

    #[test]
    fn test_first_overlap_keeps_iteration_order() {
        let player = HitCircle::new(Vec2::ZERO, 10.0);
        let others = [
            HitCircle::new(Vec2::new(100.0, 0.0), 5.0),
            HitCircle::new(Vec2::new(5.0, 0.0), 5.0),
            HitCircle::new(Vec2::new(1.0, 0.0), 5.0),
        ];
        assert_eq!(first_overlap(&player, others), Some(1));
        assert_eq!(first_overlap(&player, []), None);
    }

    #[test]
    fn test_rect_checks() {
        let rect = Rect::new(0.0, 0.0, 80.0, 80.0);
        assert!(rect.contains(Vec2::new(0.0, 80.0)));
        assert!(!rect.contains_strict(Vec2::new(0.0, 40.0)));
        assert!(rect.contains_strict(Vec2::new(1.0, 40.0)));
        assert_eq!(rect.center(), Vec2::new(40.0, 40.0));

        // Pointer 9 px left of the wall with a 10 px hitbox touches it
        assert!(rect.overlaps_padded(Vec2::new(-9.0, 40.0), 10.0));
        assert!(!rect.overlaps_padded(Vec2::new(-10.0, 40.0), 10.0));
    }

    #[test]
    fn test_resolution_score_is_clamped() {
        assert_eq!(Resolution::Penalty { points: 20 }.apply_to_score(5), 0);
        assert_eq!(Resolution::Collect { points: 10 }.apply_to_score(5), 15);
        assert_eq!(Resolution::Special { points: 100 }.apply_to_score(0), 100);
        assert_eq!(Resolution::Hazard.apply_to_score(42), 42);
        assert!(!Resolution::Hazard.consumes());
        assert!(Resolution::Penalty { points: 1 }.consumes());
    }

    proptest! {
        #[test]
        fn prop_hit_test_is_symmetric(
            ax in -500.0f32..500.0, ay in -500.0f32..500.0, ar in 0.0f32..100.0,
            bx in -500.0f32..500.0, by in -500.0f32..500.0, br in 0.0f32..100.0,
        ) {
            let a = HitCircle::new(Vec2::new(ax, ay), ar);
            let b = HitCircle::new(Vec2::new(bx, by), br);
            prop_assert_eq!(circles_overlap(&a, &b), circles_overlap(&b, &a));
        }

        #[test]
        fn prop_score_never_negative(penalties in proptest::collection::vec(0u32..500, 0..50), start in 0u64..1000) {
            let mut score = start;
            for points in penalties {
                score = Resolution::Penalty { points }.apply_to_score(score);
                prop_assert!(score <= start);
            }
        }
    }
}
