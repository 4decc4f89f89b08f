//! Terrain collaborator interface for pathfinding on a spherical surface

use bevy::math::DVec3;

pub mod constants;
pub mod coordinates;

use constants::NORMAL_SAMPLE_ANGLE;
use coordinates::{angle_between, tangent_basis};

/// Height and normal queries over a planet whose center sits at the origin.
///
/// Implementors only need `radius_at`, `base_radius` and `water_level`;
/// everything else is derived. `water_level` is an absolute radius, so a
/// point is underwater when the terrain radius under it is smaller.
pub trait Terrain: Send + Sync {
    /// Distance from the planet center to the surface along `direction`
    fn radius_at(&self, direction: DVec3) -> f64;

    fn base_radius(&self) -> f64;

    /// Radius of the water surface
    fn water_level(&self) -> f64;

    /// Unit surface normal at (or above/below) `position`.
    ///
    /// The default uses central differences of `radius_at` over the local
    /// tangent plane and always points away from the center.
    fn normal_at(&self, position: DVec3) -> DVec3 {
        let up = position.normalize_or_zero();
        if up == DVec3::ZERO {
            return DVec3::Y;
        }

        let (east, north) = tangent_basis(up);
        let sample = |offset: DVec3| self.project(up + offset * NORMAL_SAMPLE_ANGLE);
        let d_east = sample(east) - sample(-east);
        let d_north = sample(north) - sample(-north);

        let normal = d_east.cross(d_north).normalize_or_zero();
        if normal == DVec3::ZERO {
            up
        } else if normal.dot(up) < 0.0 {
            -normal
        } else {
            normal
        }
    }

    /// Move `position` radially onto the terrain surface
    fn project(&self, position: DVec3) -> DVec3 {
        let direction = match position.try_normalize() {
            Some(direction) => direction,
            None => DVec3::Y,
        };
        direction * self.radius_at(direction)
    }

    fn height_above_base(&self, direction: DVec3) -> f64 {
        self.radius_at(direction.normalize_or_zero()) - self.base_radius()
    }

    /// Water depth over the terrain under `position` (negative on dry land)
    fn depth_below_water(&self, position: DVec3) -> f64 {
        self.water_level() - self.radius_at(position.normalize_or_zero())
    }

    /// True when the water over the terrain is deeper than `margin`
    fn is_submerged(&self, position: DVec3, margin: f64) -> bool {
        self.depth_below_water(position) > margin
    }

    /// Angle between the terrain normal and radial up, in degrees
    fn slope_angle_deg(&self, position: DVec3) -> f64 {
        angle_between(self.normal_at(position), position).to_degrees()
    }
}
