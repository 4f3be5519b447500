//! Avian2d collider geometry used for range checks.
//!
//! The simulation moves units itself; no physics pipeline is installed. Colliders
//! only describe shapes so reach is measured surface to surface.

use avian2d::collision::collider::contact_query;
use avian2d::prelude::*;
use bevy::prelude::*;

/// Compute the minimum distance between two collider *surfaces*.
///
/// Uses avian2d's GJK-based `contact_query::distance()` under the hood.
/// Returns `f32::MAX` if the shape pair is unsupported.
#[must_use]
pub fn surface_distance(c1: &Collider, pos1: Vec2, c2: &Collider, pos2: Vec2) -> f32 {
    contact_query::distance(c1, pos1, 0.0, c2, pos2, 0.0).unwrap_or(f32::MAX)
}
