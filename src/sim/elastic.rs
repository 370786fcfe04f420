//! Bouncing-squares demo: equal-mass elastic collisions
//!
//! The tricky part of the demo: two squares that overlap exchange the parts
//! of their velocities along the line joining their centers. In the frame
//! aligned with that line, an elastic collision between equal masses is just
//! a swap of the x components.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::body::Body;
use super::collision::resolve_canvas;
use super::state::RngState;
use crate::consts::*;
use crate::rotate;

/// Upper bound on half-step nudges used to pull a pair apart
pub const MAX_SEPARATION_STEPS: usize = 1000;

/// Fraction of a velocity applied per separation nudge
const SEPARATION_STEP: f64 = 0.5;

/// Swap the normal components of two velocities
///
/// `normal_angle` is the direction from the first body to the second.
/// Tangential components are left as they are.
pub fn exchange_normal_components(v1: DVec2, v2: DVec2, normal_angle: f64) -> (DVec2, DVec2) {
    let mut a = rotate(v1, -normal_angle);
    let mut b = rotate(v2, -normal_angle);
    std::mem::swap(&mut a.x, &mut b.x);
    (rotate(a, normal_angle), rotate(b, normal_angle))
}

/// Resolve one overlapping pair
///
/// Both bodies keep their own speed. Returns false if the pair was still
/// overlapping after [`MAX_SEPARATION_STEPS`] nudges.
pub fn resolve_elastic_pair(a: &mut Body, b: &mut Body) -> bool {
    let delta = b.center() - a.center();
    let normal_angle = delta.y.atan2(delta.x);

    let (va, vb) = exchange_normal_components(a.vel, b.vel, normal_angle);
    a.vel = va;
    b.vel = vb;

    // A body that handed over all of its motion gets sent straight back
    let normal = DVec2::new(normal_angle.cos(), normal_angle.sin());
    if a.vel.length() < EPSILON {
        a.vel = -normal;
    }
    if b.vel.length() < EPSILON {
        b.vel = normal;
    }
    a.renormalize();
    b.renormalize();

    let mut steps = 0;
    while a.bounds().overlaps(&b.bounds()) {
        if steps == MAX_SEPARATION_STEPS {
            log::warn!("Pair still overlapping after {} separation steps", steps);
            return false;
        }
        a.pos += a.vel * SEPARATION_STEP;
        b.pos += b.vel * SEPARATION_STEP;
        steps += 1;
    }
    log::debug!("Separated pair in {} steps", steps);
    true
}

/// Resolve every overlapping pair in index order; returns the number of pairs hit
pub fn check_collisions(squares: &mut [Body]) -> usize {
    let mut hits = 0;
    for j in 1..squares.len() {
        let (left, right) = squares.split_at_mut(j);
        let b = &mut right[0];
        for a in left.iter_mut() {
            if a.bounds().overlaps(&b.bounds()) {
                resolve_elastic_pair(a, b);
                hits += 1;
            }
        }
    }
    hits
}

/// The standalone bouncing-squares world
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BounceDemo {
    pub canvas: DVec2,
    pub squares: Vec<Body>,
    pub rng_state: RngState,
}

impl BounceDemo {
    /// Four squares with random headings
    pub fn new(seed: u64) -> Self {
        let mut rng_state = RngState::new(seed);
        let starts = [
            (DVec2::new(100.0, 100.0), "red"),
            (DVec2::new(300.0, 200.0), "green"),
            (DVec2::new(500.0, 400.0), "blue"),
            (DVec2::new(700.0, 500.0), "yellow"),
        ];
        let squares = starts
            .into_iter()
            .map(|(pos, color)| {
                let angle = rng_state.next_angle();
                Body::new(pos, DEMO_SQUARE_SIZE, angle, DEMO_SPEED, color)
            })
            .collect();

        Self {
            canvas: DVec2::new(DEMO_WIDTH, DEMO_HEIGHT),
            squares,
            rng_state,
        }
    }

    /// Collide pairs first, then move every square and bounce it off the edges
    pub fn tick(&mut self, dt: f64) {
        check_collisions(&mut self.squares);
        for square in &mut self.squares {
            square.integrate(dt);
            resolve_canvas(square, self.canvas);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x: f64, y: f64, vel: DVec2) -> Body {
        let mut body = Body::new(DVec2::new(x, y), 100.0, 0.0, DEMO_SPEED, "red");
        body.vel = vel;
        body
    }

    #[test]
    fn test_head_on_pair_swaps_and_separates() {
        let mut a = square(200.0, 300.0, DVec2::new(DEMO_SPEED, 0.0));
        let mut b = square(250.0, 300.0, DVec2::new(-DEMO_SPEED, 0.0));

        assert!(resolve_elastic_pair(&mut a, &mut b));
        assert!(!a.bounds().overlaps(&b.bounds()));
        assert!((a.vel.x + DEMO_SPEED).abs() < EPSILON);
        assert!((b.vel.x - DEMO_SPEED).abs() < EPSILON);
        assert!(a.vel.y.abs() < EPSILON);
        assert!(b.vel.y.abs() < EPSILON);
    }

    #[test]
    fn test_exchange_preserves_tangent_components() {
        let angle: f64 = 0.7;
        let normal = DVec2::new(angle.cos(), angle.sin());
        let tangent = DVec2::new(-normal.y, normal.x);
        let v1 = DVec2::new(3.0, -1.0);
        let v2 = DVec2::new(-2.0, 2.5);

        let (r1, r2) = exchange_normal_components(v1, v2, angle);
        assert!((r1.dot(normal) - v2.dot(normal)).abs() < 1e-12);
        assert!((r2.dot(normal) - v1.dot(normal)).abs() < 1e-12);
        assert!((r1.dot(tangent) - v1.dot(tangent)).abs() < 1e-12);
        assert!((r2.dot(tangent) - v2.dot(tangent)).abs() < 1e-12);
    }

    #[test]
    fn test_degenerate_exchange_sends_bodies_apart() {
        // All of a's motion is along the normal, b moves purely tangentially
        let mut a = square(0.0, 0.0, DVec2::new(DEMO_SPEED, 0.0));
        let mut b = square(60.0, 0.0, DVec2::new(0.0, DEMO_SPEED));

        assert!(resolve_elastic_pair(&mut a, &mut b));
        assert!((a.vel.length() - DEMO_SPEED).abs() < EPSILON);
        assert!((b.vel.length() - DEMO_SPEED).abs() < EPSILON);
        assert!(a.vel.x < 0.0);
        assert!(!a.bounds().overlaps(&b.bounds()));
    }

    #[test]
    fn test_check_collisions_only_touches_overlapping_pairs() {
        let mut squares = vec![
            square(0.0, 0.0, DVec2::new(DEMO_SPEED, 0.0)),
            square(50.0, 0.0, DVec2::new(-DEMO_SPEED, 0.0)),
            square(600.0, 600.0, DVec2::new(0.0, DEMO_SPEED)),
        ];
        assert_eq!(check_collisions(&mut squares), 1);
        assert_eq!(squares[2].pos, DVec2::new(600.0, 600.0));
        assert_eq!(squares[2].vel, DVec2::new(0.0, DEMO_SPEED));
    }

    #[test]
    fn test_demo_keeps_speed() {
        let mut demo = BounceDemo::new(2024);
        assert_eq!(demo.squares.len(), 4);
        for _ in 0..2000 {
            demo.tick(1.0);
            for square in &demo.squares {
                assert!((square.vel.length() - DEMO_SPEED).abs() < EPSILON);
            }
        }
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn pair_resolution_keeps_each_speed(
                offset_x in -90.0f64..90.0,
                offset_y in -90.0f64..90.0,
                angle_a in 0.0f64..std::f64::consts::TAU,
                angle_b in 0.0f64..std::f64::consts::TAU,
            ) {
                let mut a = Body::new(DVec2::new(500.0, 500.0), 100.0, angle_a, DEMO_SPEED, "red");
                let mut b = Body::new(
                    DVec2::new(500.0 + offset_x, 500.0 + offset_y),
                    100.0,
                    angle_b,
                    DEMO_SPEED,
                    "blue",
                );
                resolve_elastic_pair(&mut a, &mut b);
                prop_assert!((a.vel.length() - DEMO_SPEED).abs() < EPSILON);
                prop_assert!((b.vel.length() - DEMO_SPEED).abs() < EPSILON);
            }
        }
    }
}
