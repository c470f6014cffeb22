//! Factory functions for creating test data.
//!
//! Provides convenient helpers to construct `Wall`, `FloorPlan` and `Project`
//! values used in tests and by the agent interface.

use chrono::{DateTime, TimeZone, Utc};
use shared::*;

// ── Wall factories ──────────────────────────────────────────────

/// Default-sized wall standing on the floor at (x, z).
pub fn wall_at(x: f64, z: f64) -> Wall {
    Wall::at([x, DEFAULT_SIZE[1] / 2.0, z])
}

/// Wall running from `start` to `end` on the floor plane.
pub fn segment_wall(start: [f64; 2], end: [f64; 2]) -> Wall {
    WallSegment::new(start, end).to_wall()
}

/// Wall with a texture over a fallback color.
pub fn textured_wall(x: f64, z: f64, texture: Texture, fallback: &str) -> Wall {
    wall_at(x, z).with_color(fallback).with_texture(texture)
}

// ── Plan factories ──────────────────────────────────────────────

/// `n` default walls spaced 2 units apart along x.
pub fn row_of_walls(n: usize) -> FloorPlan {
    (0..n).map(|i| wall_at(i as f64 * 2.0, 0.0)).collect()
}

/// Closed square room of side `side` with its corner at the origin.
pub fn square_room(side: f64) -> FloorPlan {
    let corners = [[0.0, 0.0], [side, 0.0], [side, side], [0.0, side]];
    (0..4)
        .map(|i| segment_wall(corners[i], corners[(i + 1) % 4]))
        .collect()
}

/// Small mixed plan: one plain, one colored and one textured wall.
pub fn sample_plan() -> FloorPlan {
    vec![
        wall_at(0.0, 0.0),
        wall_at(2.0, 0.0).with_color("white"),
        textured_wall(4.0, 0.0, Texture::Brick, "red"),
    ]
}

/// Serialize a plan to its wire JSON.
pub fn plan_json(walls: &[Wall]) -> String {
    serde_json::to_string(walls).unwrap_or_default()
}

// ── Project factories ───────────────────────────────────────────

/// Fixed timestamp `seconds` after the epoch.
pub fn timestamp(seconds: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(seconds, 0).single().unwrap_or_default()
}

/// Saved project with a fixed creation time.
pub fn project(id: &str, owner: &str, name: &str, walls: FloorPlan, created: i64) -> Project {
    Project {
        id: id.to_string(),
        owner: owner.to_string(),
        name: name.to_string(),
        walls,
        created_at: timestamp(created),
    }
}
