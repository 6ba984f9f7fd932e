use crate::domain::{Arena, Axis, Point, Puck};

/// How a single overlapping pair was resolved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    pub axis: Axis,
    /// Penetration depth on `axis` before the push.
    pub overlap: f64,
    /// Whether velocities were reflected (the pair was closing on `axis`).
    pub bounced: bool,
}

/// Penetration depth per axis: half-extent sums minus the center distance.
///
/// Both components positive means the boxes interpenetrate.
pub fn overlap(a: &Puck, b: &Puck) -> Point {
    let reach = a.half_extents() + b.half_extents();
    let delta = b.pos() - a.pos();
    Point::new(reach.x - delta.x.abs(), reach.y - delta.y.abs())
}

/// Separates one pair along its axis of least penetration.
///
/// Each puck moves half the overlap away from the other. A puck that would be pushed
/// through a wall stops at it and its partner takes the rest of the push, so the pair
/// ends up separated and both stay on the board. Only a pair wedged between two walls
/// keeps some overlap.
///
/// If the pair is closing on that axis, both pucks have their own component on that axis
/// negated. Components are inverted per puck rather than swapped between the two: a fast
/// puck hitting a slow one keeps its speed and only reverses direction.
pub fn resolve_pair(a: &mut Puck, b: &mut Puck, arena: &Arena) -> Option<Contact> {
    let depth = overlap(a, b);
    if depth.x <= 0.0 || depth.y <= 0.0 {
        return None;
    }

    // Minimum translation: correct along the shallower axis. Ties go to Y.
    let axis = if depth.x < depth.y { Axis::X } else { Axis::Y };
    let overlap = depth.get(axis);
    let delta = b.pos().get(axis) - a.pos().get(axis);

    // `a` moves along -dir, `b` along +dir.
    let dir = if delta > 0.0 { 1.0 } else { -1.0 };
    let room_a = room(a, arena, axis, -dir);
    let room_b = room(b, arena, axis, dir);

    let push_b = (overlap - (overlap / 2.0).min(room_a)).min(room_b);
    let push_a = (overlap - push_b).min(room_a);
    nudge(a, arena, axis, -dir * push_a);
    nudge(b, arena, axis, dir * push_b);

    let relative = b.velocity().get(axis) - a.velocity().get(axis);
    let closing = (delta > 0.0 && relative < 0.0) || (delta < 0.0 && relative > 0.0);
    if closing {
        a.invert_velocity(axis);
        b.invert_velocity(axis);
    }

    Some(Contact {
        axis,
        overlap,
        bounced: closing,
    })
}

/// Phase 3: resolves every unordered pair once, in board order.
///
/// Single pass, no sub-stepping: fast pucks at low tick rates can tunnel through each
/// other between ticks.
pub fn resolve_all(pucks: &mut [Puck], arena: &Arena) -> usize {
    let mut contacts = 0;
    for i in 0..pucks.len() {
        let (head, tail) = pucks.split_at_mut(i + 1);
        let a = &mut head[i];
        for b in tail.iter_mut() {
            if resolve_pair(a, b, arena).is_some() {
                contacts += 1;
            }
        }
    }
    contacts
}

/// Distance a puck can travel along `axis` in direction `dir` before touching a wall.
fn room(puck: &Puck, arena: &Arena, axis: Axis, dir: f64) -> f64 {
    let (min, max) = arena.center_range(axis, puck.half_extents());
    let pos = puck.pos().get(axis);
    let room = if dir > 0.0 { max - pos } else { pos - min };
    room.max(0.0)
}

// Clamped so rounding in `room` never leaves a puck past its bound.
fn nudge(puck: &mut Puck, arena: &Arena, axis: Axis, delta: f64) {
    let (min, max) = arena.center_range(axis, puck.half_extents());
    let pos = puck.pos().get(axis) + delta;
    puck.set_axis_position(axis, pos.clamp(min, max));
}

/// Clamps a puck's center into the arena without touching its velocity.
pub fn contain(puck: &mut Puck, arena: &Arena) {
    let half = puck.half_extents();
    for axis in Axis::BOTH {
        let (min, max) = arena.center_range(axis, half);
        let v = puck.pos().get(axis);
        if v < min || v > max {
            puck.set_axis_position(axis, v.clamp(min, max));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PuckSpawn, tuning::PuckTuning};
    use uuid::Uuid;

    // Scale 0.1 gives 30 x 20 boxes (half extents 15 x 10).
    fn puck_at(x: f64, y: f64, angle: f64, speed: f64) -> Puck {
        Puck::new(
            Uuid::new_v4(),
            PuckSpawn {
                nickname: "Orb".to_string(),
                color: "#54a0ff".to_string(),
                pos: Point::new(x, y),
                angle,
                speed,
            },
            &PuckTuning::default(),
            0.1,
        )
    }

    #[test]
    fn separated_pucks_are_untouched() {
        let mut a = puck_at(100.0, 100.0, 0.0, 100.0);
        let mut b = puck_at(131.0, 100.0, 180.0, 100.0);
        assert!(resolve_pair(&mut a, &mut b, &Arena::default()).is_none());
        assert_eq!(a.pos(), Point::new(100.0, 100.0));
        assert_eq!(b.pos(), Point::new(131.0, 100.0));
    }

    #[test]
    fn touching_edges_do_not_count_as_overlap() {
        let mut a = puck_at(100.0, 100.0, 0.0, 100.0);
        let mut b = puck_at(130.0, 100.0, 180.0, 100.0);
        assert!(resolve_pair(&mut a, &mut b, &Arena::default()).is_none());
    }

    #[test]
    fn closing_pair_is_pushed_apart_on_shallow_axis_and_reflected() {
        // overlap x = 30 - 26 = 4, overlap y = 20 - 2 = 18 -> resolve on X
        let mut a = puck_at(100.0, 100.0, 0.0, 100.0);
        let mut b = puck_at(126.0, 102.0, 180.0, 50.0);
        let va = a.velocity();
        let vb = b.velocity();

        let contact = resolve_pair(&mut a, &mut b, &Arena::default()).expect("pair overlaps");
        assert_eq!(contact.axis, Axis::X);
        assert!((contact.overlap - 4.0).abs() < 1e-9);
        assert!(contact.bounced);

        assert!((a.pos().x - 98.0).abs() < 1e-9);
        assert!((b.pos().x - 128.0).abs() < 1e-9);
        assert!(overlap(&a, &b).x <= 1e-9);

        // Own components are inverted, not exchanged.
        assert!((a.velocity().x + va.x).abs() < 1e-9);
        assert!((b.velocity().x + vb.x).abs() < 1e-9);
        assert_eq!(a.velocity().y, va.y);
        assert_eq!(b.velocity().y, vb.y);
    }

    #[test]
    fn separating_pair_is_pushed_but_keeps_velocity() {
        // a moves left, b moves right: already separating on X.
        let mut a = puck_at(100.0, 100.0, 180.0, 100.0);
        let mut b = puck_at(126.0, 100.0, 0.0, 100.0);
        let va = a.velocity();
        let vb = b.velocity();

        let contact = resolve_pair(&mut a, &mut b, &Arena::default()).expect("pair overlaps");
        assert!(!contact.bounced);
        assert_eq!(a.velocity(), va);
        assert_eq!(b.velocity(), vb);
        assert!(overlap(&a, &b).x <= 1e-9);
    }

    #[test]
    fn vertical_stack_resolves_on_y() {
        // overlap x = 30 - 1 = 29, overlap y = 20 - 15 = 5 -> resolve on Y
        let mut a = puck_at(200.0, 200.0, 90.0, 100.0);
        let mut b = puck_at(201.0, 215.0, 270.0, 100.0);

        let contact = resolve_pair(&mut a, &mut b, &Arena::default()).expect("pair overlaps");
        assert_eq!(contact.axis, Axis::Y);
        assert!(contact.bounced);
        assert!((a.pos().y - 197.5).abs() < 1e-9);
        assert!((b.pos().y - 217.5).abs() < 1e-9);
        assert!(a.velocity().y < 0.0);
        assert!(b.velocity().y > 0.0);
    }

    #[test]
    fn coincident_centers_still_separate() {
        let mut a = puck_at(300.0, 300.0, 0.0, 100.0);
        let mut b = puck_at(300.0, 300.0, 0.0, 100.0);
        let contact = resolve_pair(&mut a, &mut b, &Arena::default()).expect("pair overlaps");
        assert_eq!(contact.axis, Axis::Y);
        assert!(overlap(&a, &b).y <= 1e-9);
    }

    #[test]
    fn resolve_all_visits_each_pair_once() {
        let mut pucks = vec![
            puck_at(100.0, 100.0, 0.0, 100.0),
            puck_at(126.0, 100.0, 180.0, 100.0),
            puck_at(600.0, 600.0, 0.0, 100.0),
        ];
        assert_eq!(resolve_all(&mut pucks, &Arena::default()), 1);
        // A second visit of the same pair would have re-inverted the velocities.
        assert!(pucks[0].velocity().x < 0.0);
        assert!(pucks[1].velocity().x > 0.0);
    }

    #[test]
    fn puck_flush_against_a_wall_passes_the_push_to_its_partner() {
        // a rests on the left bound (x = 15); overlap x = 30 - 26 = 4.
        let mut a = puck_at(15.0, 360.0, 180.0, 100.0);
        let mut b = puck_at(41.0, 360.0, 180.0, 300.0);

        let contact = resolve_pair(&mut a, &mut b, &Arena::default()).expect("pair overlaps");
        assert_eq!(contact.axis, Axis::X);
        assert!(contact.bounced);
        assert_eq!(a.pos().x, 15.0);
        assert!((b.pos().x - 45.0).abs() < 1e-9);
        assert!(overlap(&a, &b).x <= 1e-9);
    }

    #[test]
    fn puck_near_a_wall_takes_only_the_room_it_has() {
        // b sits 1 px short of the right bound (1265); overlap x = 30 - 24 = 6.
        let mut a = puck_at(1240.0, 360.0, 0.0, 300.0);
        let mut b = puck_at(1264.0, 360.0, 0.0, 100.0);

        resolve_pair(&mut a, &mut b, &Arena::default()).expect("pair overlaps");
        assert!((b.pos().x - 1265.0).abs() < 1e-9);
        assert!((a.pos().x - 1235.0).abs() < 1e-9);
        assert!(overlap(&a, &b).x <= 1e-9);
    }

    #[test]
    fn contain_clamps_position_only() {
        let arena = Arena::default();
        let mut puck = puck_at(-40.0, 900.0, 45.0, 100.0);
        let velocity = puck.velocity();
        contain(&mut puck, &arena);
        assert_eq!(puck.pos(), Point::new(15.0, 710.0));
        assert_eq!(puck.velocity(), velocity);
    }
}
