use crate::domain::{Arena, Axis, Point, Puck};
use tracing::debug;

/// Result of the wall phase for one puck.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WallContact {
    pub x: bool,
    pub y: bool,
    pub corner: bool,
}

/// Reflects one coordinate off the `[min, max]` interval.
///
/// When `pos` lies outside the interval the velocity component is negated and the
/// position clamped to the violated bound. Returns whether a bounce happened. Server
/// physics and client-side dead reckoning both go through this rule.
pub fn bounce_axis(pos: &mut f64, vel: &mut f64, min: f64, max: f64) -> bool {
    if *pos < min {
        *pos = min;
    } else if *pos > max {
        *pos = max;
    } else {
        return false;
    }
    *vel = -*vel;
    true
}

/// Phase 1: position += velocity * dt.
pub fn integrate(puck: &mut Puck, dt: f64) {
    puck.advance(dt);
}

/// Phase 2: wall bounce per axis, plus corner scoring.
pub fn bounce_off_walls(puck: &mut Puck, arena: &Arena) -> WallContact {
    let half = puck.half_extents();
    let mut contact = WallContact::default();

    for axis in Axis::BOTH {
        let (min, max) = arena.center_range(axis, half);
        let mut pos = puck.pos().get(axis);
        let mut vel = puck.velocity().get(axis);
        if !bounce_axis(&mut pos, &mut vel, min, max) {
            continue;
        }
        puck.set_axis_motion(axis, pos, vel);

        match axis {
            Axis::X => {
                contact.x = true;
                // Scoring is tied to X-axis bounces only: hitting a side wall while close to
                // the top or bottom edge is what counts as a corner. Y-axis bounces never
                // score, even when the puck is near a side wall.
                if near_horizontal_edge(puck.pos().y, half, arena) {
                    puck.record_corner_hit();
                    contact.corner = true;
                    debug!(
                        puck_id = %puck.id(),
                        nickname = puck.nickname(),
                        corner_hits = puck.corner_hits(),
                        "corner hit"
                    );
                }
            }
            Axis::Y => contact.y = true,
        }
    }

    contact
}

fn near_horizontal_edge(y: f64, half: Point, arena: &Arena) -> bool {
    let (top, bottom) = arena.center_range(Axis::Y, half);
    y <= top + arena.corner_tolerance || y >= bottom - arena.corner_tolerance
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PuckSpawn, tuning::PuckTuning};
    use uuid::Uuid;

    fn puck_at(x: f64, y: f64, angle: f64, speed: f64) -> Puck {
        Puck::new(
            Uuid::new_v4(),
            PuckSpawn {
                nickname: "Bolt".to_string(),
                color: "#4ecdc4".to_string(),
                pos: Point::new(x, y),
                angle,
                speed,
            },
            &PuckTuning::default(),
            0.1,
        )
    }

    #[test]
    fn bounce_axis_reflects_and_clamps() {
        let (mut pos, mut vel) = (-3.0, -5.0);
        assert!(bounce_axis(&mut pos, &mut vel, 0.0, 10.0));
        assert_eq!((pos, vel), (0.0, 5.0));

        let (mut pos, mut vel) = (12.0, 5.0);
        assert!(bounce_axis(&mut pos, &mut vel, 0.0, 10.0));
        assert_eq!((pos, vel), (10.0, -5.0));

        let (mut pos, mut vel) = (10.0, 5.0);
        assert!(!bounce_axis(&mut pos, &mut vel, 0.0, 10.0));
        assert_eq!((pos, vel), (10.0, 5.0));
    }

    #[test]
    fn integrate_moves_by_velocity() {
        let mut puck = puck_at(100.0, 100.0, 0.0, 200.0);
        integrate(&mut puck, 0.5);
        assert!((puck.pos().x - 200.0).abs() < 1e-9);
        assert!((puck.pos().y - 100.0).abs() < 1e-9);
    }

    #[test]
    fn side_wall_far_from_corners_bounces_without_scoring() {
        let arena = Arena::default();
        // half extents at scale 0.1: 15 x 10
        let mut puck = puck_at(1300.0, 360.0, 0.0, 100.0);
        let contact = bounce_off_walls(&mut puck, &arena);

        assert!(contact.x && !contact.y && !contact.corner);
        assert_eq!(puck.pos().x, 1265.0);
        assert!(puck.velocity().x < 0.0);
        assert_eq!(puck.corner_hits(), 0);
    }

    #[test]
    fn side_wall_near_bottom_edge_scores() {
        let arena = Arena::default();
        let mut puck = puck_at(-5.0, 705.0, 180.0, 100.0);
        let contact = bounce_off_walls(&mut puck, &arena);

        assert!(contact.x && contact.corner);
        assert_eq!(puck.pos().x, 15.0);
        assert!(puck.velocity().x > 0.0);
        assert_eq!(puck.corner_hits(), 1);
        assert!(puck.changed().corner_hits);
    }

    #[test]
    fn side_wall_near_top_edge_scores() {
        let arena = Arena::default();
        // top bound is y = 10; tolerance 10 → y <= 20 counts
        let mut puck = puck_at(1290.0, 19.0, 0.0, 100.0);
        assert!(bounce_off_walls(&mut puck, &arena).corner);
    }

    #[test]
    fn floor_bounce_alone_never_scores() {
        let arena = Arena::default();
        let mut puck = puck_at(16.0, 730.0, 90.0, 100.0);
        let contact = bounce_off_walls(&mut puck, &arena);

        assert!(contact.y && !contact.x && !contact.corner);
        assert_eq!(puck.pos().y, 710.0);
        assert!(puck.velocity().y < 0.0);
        assert_eq!(puck.corner_hits(), 0);
    }

    #[test]
    fn corner_overshoot_bounces_both_axes_and_scores() {
        let arena = Arena::default();
        let mut puck = puck_at(1300.0, 740.0, 45.0, 100.0);
        let contact = bounce_off_walls(&mut puck, &arena);

        assert_eq!(
            contact,
            WallContact {
                x: true,
                y: true,
                corner: true
            }
        );
        assert_eq!(puck.pos(), Point::new(1265.0, 710.0));
        assert!(puck.velocity().x < 0.0 && puck.velocity().y < 0.0);
    }

    #[test]
    fn wall_bounce_matches_shared_rule_and_keeps_speed() {
        let arena = Arena::default();
        let mut puck = puck_at(-20.0, 360.0, 150.0, 300.0);
        let before = puck.velocity();

        let (mut x, mut vx) = (puck.pos().x, before.x);
        bounce_axis(&mut x, &mut vx, 15.0, 1265.0);
        bounce_off_walls(&mut puck, &arena);

        assert_eq!(puck.pos().x, x);
        assert_eq!(puck.velocity(), Point::new(vx, before.y));
        assert!((puck.velocity().length() - 300.0).abs() < 1e-9);
    }
}
