use crate::math::Vec2;

/// One rigid box.
///
/// The collision shape is an axis-aligned box of full extents `width` in the
/// body's local frame; `position`/`rotation` place it in the world. A body
/// with infinite mass is static: it never integrates and never receives
/// impulses (`inv_mass == inv_i == 0`).
#[derive(Copy, Clone, Debug)]
pub struct Body {
    pub position: Vec2,
    pub rotation: f32,

    pub velocity: Vec2,
    pub angular_velocity: f32,

    /// Force/torque accumulators, cleared at the end of every step.
    pub force: Vec2,
    pub torque: f32,

    /// Full extents of the box.
    pub width: Vec2,

    /// Coulomb friction coefficient in [0, 1].
    pub friction: f32,

    pub mass: f32,
    pub inv_mass: f32,
    /// Moment of inertia about the center of mass, and its inverse.
    pub i: f32,
    pub inv_i: f32,
}

impl Default for Body {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            rotation: 0.0,
            velocity: Vec2::ZERO,
            angular_velocity: 0.0,
            force: Vec2::ZERO,
            torque: 0.0,
            width: Vec2::new(1.0, 1.0),
            friction: 0.2,
            mass: f32::INFINITY,
            inv_mass: 0.0,
            i: f32::INFINITY,
            inv_i: 0.0,
        }
    }
}

impl Body {
    /// A body at the origin with the given extents and mass. Pass
    /// `f32::INFINITY` for a static body.
    pub fn new(width: Vec2, mass: f32) -> Self {
        let mut body = Self::default();
        body.set(width, mass);
        body
    }

    /// Re-initializes the shape and mass properties in place.
    ///
    /// For a finite mass the inertia of a solid box applies,
    /// `I = m (w² + h²) / 12`; infinite mass zeroes both inverses.
    pub fn set(&mut self, width: Vec2, mass: f32) {
        debug_assert!(width.x > 0.0 && width.y > 0.0);
        debug_assert!(mass > 0.0);

        self.width = width;
        self.mass = mass;

        if mass.is_finite() {
            self.inv_mass = 1.0 / mass;
            self.i = mass * (width.x * width.x + width.y * width.y) / 12.0;
            self.inv_i = 1.0 / self.i;
        } else {
            self.inv_mass = 0.0;
            self.i = f32::INFINITY;
            self.inv_i = 0.0;
        }
    }

    #[inline]
    pub fn add_force(&mut self, f: Vec2) {
        self.force += f;
    }

    #[inline]
    pub fn is_static(&self) -> bool {
        self.inv_mass == 0.0
    }
}
