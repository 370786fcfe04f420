//! Collision detection and response for player squares
//!
//! Each tick a body moves first and is then checked, in a fixed order,
//! against the canvas edges, walls, pushers, the other players, shrinkers and
//! finish tiles. Every check sees the corrections of the checks before it and
//! none is re-run afterwards, so a body squeezed between several obstacles in
//! one tick can be left slightly overlapping one of them.
//!
//! Walls send the body back to its pre-move coordinate on the penetrated
//! axis, while pushers and peers place it flush against their edge. The two
//! rules are deliberately kept apart.

use glam::DVec2;

use super::body::Body;
use super::geometry::Rect;
use super::state::{Obstacle, ObstacleKind};

/// Everything a body can collide with during its update
#[derive(Debug, Clone, Copy)]
pub struct Arena<'a> {
    /// Canvas extent in pixels
    pub canvas: DVec2,
    pub cell_size: f64,
    pub obstacles: &'a [Obstacle],
    /// Other player slots (the moving body's own slot is empty)
    pub peers: &'a [Option<Body>],
}

/// What happened to a body during one update
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Contacts {
    /// Velocity changed by an edge, wall, pusher or peer
    pub bounced: bool,
    /// The body shrank this update
    pub shrunk: bool,
    /// The body overlaps a finish tile
    pub finished: bool,
}

/// Side of an obstacle a body was pushed out through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Left,
    Right,
    Top,
    Bottom,
}

/// Move a body one step and resolve all of its collisions
pub fn update_body(body: &mut Body, dt: f64, arena: &Arena<'_>) -> Contacts {
    let prev = body.integrate(dt);
    let mut contacts = Contacts::default();

    contacts.bounced |= resolve_canvas(body, arena.canvas);

    for obstacle in arena.obstacles {
        if matches!(obstacle.kind, ObstacleKind::Wall) {
            contacts.bounced |= resolve_wall(body, prev, &obstacle.bounds(arena.cell_size));
        }
    }

    for obstacle in arena.obstacles {
        if let ObstacleKind::Pusher(pusher) = &obstacle.kind {
            contacts.bounced |= resolve_pusher(body, &pusher.bounds());
        }
    }

    for peer in arena.peers.iter().flatten() {
        contacts.bounced |= resolve_peer(body, &peer.bounds());
    }

    for obstacle in arena.obstacles {
        if matches!(obstacle.kind, ObstacleKind::Shrinker)
            && !body.shrunk
            && body.bounds().overlaps(&obstacle.bounds(arena.cell_size))
        {
            contacts.shrunk |= body.shrink();
        }
    }

    for obstacle in arena.obstacles {
        if matches!(obstacle.kind, ObstacleKind::Finish)
            && body.bounds().overlaps(&obstacle.bounds(arena.cell_size))
        {
            contacts.finished = true;
        }
    }

    contacts
}

/// Bounce off the canvas edges, clamping back inside on each axis hit
pub fn resolve_canvas(body: &mut Body, canvas: DVec2) -> bool {
    let mut hit = false;

    if body.pos.x <= 0.0 || body.pos.x + body.size >= canvas.x {
        body.vel.x = -body.vel.x;
        body.pos.x = body.pos.x.min(canvas.x - body.size).max(0.0);
        body.renormalize();
        hit = true;
    }
    if body.pos.y <= 0.0 || body.pos.y + body.size >= canvas.y {
        body.vel.y = -body.vel.y;
        body.pos.y = body.pos.y.min(canvas.y - body.size).max(0.0);
        body.renormalize();
        hit = true;
    }

    hit
}

/// Bounce off a static wall cell
///
/// The axis with the smaller overlap is the one the body just crossed; its
/// velocity flips and its coordinate returns to `prev`.
pub fn resolve_wall(body: &mut Body, prev: DVec2, wall: &Rect) -> bool {
    let bounds = body.bounds();
    if !bounds.overlaps(wall) {
        return false;
    }

    if bounds.overlap_x(wall) < bounds.overlap_y(wall) {
        body.vel.x = -body.vel.x;
        body.pos.x = prev.x;
    } else {
        body.vel.y = -body.vel.y;
        body.pos.y = prev.y;
    }
    body.renormalize();
    true
}

/// Edge of `obstacle` closest to the overlapping `body`
///
/// Ties resolve left, right, top, bottom in that order.
pub fn nearest_edge(body: &Rect, obstacle: &Rect) -> Edge {
    let left = (body.right() - obstacle.left()).abs();
    let right = (obstacle.right() - body.left()).abs();
    let top = (body.bottom() - obstacle.top()).abs();
    let bottom = (obstacle.bottom() - body.top()).abs();

    let min = left.min(right).min(top).min(bottom);
    if min == left {
        Edge::Left
    } else if min == right {
        Edge::Right
    } else if min == top {
        Edge::Top
    } else {
        Edge::Bottom
    }
}

/// Push a body out of a pusher's current bounds
///
/// The body lands flush on the nearest edge and the matching velocity
/// component is forced to point away from the pusher.
pub fn resolve_pusher(body: &mut Body, pusher: &Rect) -> bool {
    let bounds = body.bounds();
    if !bounds.overlaps(pusher) {
        return false;
    }

    match nearest_edge(&bounds, pusher) {
        Edge::Left => {
            body.pos.x = pusher.left() - body.size;
            body.vel.x = -body.vel.x.abs();
        }
        Edge::Right => {
            body.pos.x = pusher.right();
            body.vel.x = body.vel.x.abs();
        }
        Edge::Top => {
            body.pos.y = pusher.top() - body.size;
            body.vel.y = -body.vel.y.abs();
        }
        Edge::Bottom => {
            body.pos.y = pusher.bottom();
            body.vel.y = body.vel.y.abs();
        }
    }
    body.renormalize();
    true
}

/// Bounce off another player square
///
/// The side is picked by comparing centers, since a shrunk square is smaller
/// than its peer. Only the moving body is corrected; the peer keeps its
/// position and velocity until its own update.
pub fn resolve_peer(body: &mut Body, other: &Rect) -> bool {
    let bounds = body.bounds();
    if !bounds.overlaps(other) {
        return false;
    }

    if bounds.overlap_x(other) < bounds.overlap_y(other) {
        body.pos.x = if bounds.center().x < other.center().x {
            other.left() - body.size
        } else {
            other.right()
        };
        body.vel.x = -body.vel.x;
    } else {
        body.pos.y = if bounds.center().y < other.center().y {
            other.top() - body.size
        } else {
            other.bottom()
        };
        body.vel.y = -body.vel.y;
    }
    body.renormalize();
    true
}
