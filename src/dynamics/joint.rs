use crate::dynamics::{Body, BodyId, SolverConfig, World};
use crate::math::{Mat22, Vec2};

/// Pins a point of one body to a point of another.
///
/// The anchor given at construction is remembered in both bodies' local
/// frames; the solver then drives the two world-space anchor points back
/// together each step. `softness` adds compliance (zero is rigid) and
/// `bias_factor` scales how aggressively positional drift is corrected;
/// both may be tuned per joint before it is added to the world.
#[derive(Copy, Clone, Debug)]
pub struct Joint {
    pub body_a: BodyId,
    pub body_b: BodyId,

    pub softness: f32,
    pub bias_factor: f32,

    local_anchor_a: Vec2,
    local_anchor_b: Vec2,

    // Per-step solver state.
    r1: Vec2,
    r2: Vec2,
    m: Mat22,
    bias: Vec2,
    p: Vec2,
}

/// `inv_i * skew(r) * skew(r)ᵀ`, the angular part of a body's contribution
/// to the joint's K matrix.
#[inline]
fn inertia_term(inv_i: f32, r: Vec2) -> Mat22 {
    Mat22::new(
        Vec2::new(inv_i * r.y * r.y, -inv_i * r.x * r.y),
        Vec2::new(-inv_i * r.x * r.y, inv_i * r.x * r.x),
    )
}

impl Joint {
    /// Joins `body_a` and `body_b` at the world-space point `anchor`, given
    /// the bodies' current poses.
    pub fn new(world: &World, body_a: BodyId, body_b: BodyId, anchor: Vec2) -> Self {
        let b1 = world.body(body_a);
        let b2 = world.body(body_b);

        let local_anchor_a = Mat22::from_angle(b1.rotation).transpose() * (anchor - b1.position);
        let local_anchor_b = Mat22::from_angle(b2.rotation).transpose() * (anchor - b2.position);

        Self {
            body_a,
            body_b,
            softness: 0.0,
            bias_factor: 0.2,
            local_anchor_a,
            local_anchor_b,
            r1: Vec2::ZERO,
            r2: Vec2::ZERO,
            m: Mat22::default(),
            bias: Vec2::ZERO,
            p: Vec2::ZERO,
        }
    }

    /// Re-targets the joint to a new pair and anchor, clearing accumulated
    /// impulse and restoring the default tunables.
    pub fn set(&mut self, world: &World, body_a: BodyId, body_b: BodyId, anchor: Vec2) {
        *self = Joint::new(world, body_a, body_b, anchor);
    }

    /// World-space anchor points on each body, for inspection or rendering.
    pub fn anchors(&self, world: &World) -> (Vec2, Vec2) {
        let b1 = world.body(self.body_a);
        let b2 = world.body(self.body_b);

        let p1 = b1.position + Mat22::from_angle(b1.rotation) * self.local_anchor_a;
        let p2 = b2.position + Mat22::from_angle(b2.rotation) * self.local_anchor_b;
        (p1, p2)
    }

    /// Accumulated constraint impulse.
    #[inline]
    pub fn impulse(&self) -> Vec2 {
        self.p
    }

    /// Builds the effective-mass matrix and positional bias, and applies the
    /// warm-start impulse. `b1`/`b2` must be the bodies for `body_a`/`body_b`.
    pub fn pre_step(&mut self, inv_dt: f32, b1: &mut Body, b2: &mut Body, config: SolverConfig) {
        self.r1 = Mat22::from_angle(b1.rotation) * self.local_anchor_a;
        self.r2 = Mat22::from_angle(b2.rotation) * self.local_anchor_b;

        let inv_mass = b1.inv_mass + b2.inv_mass;
        let mut k = Mat22::new(Vec2::new(inv_mass, 0.0), Vec2::new(0.0, inv_mass))
            + inertia_term(b1.inv_i, self.r1)
            + inertia_term(b2.inv_i, self.r2);
        k.col1.x += self.softness;
        k.col2.y += self.softness;
        self.m = k.invert();

        let dp = (b2.position + self.r2) - (b1.position + self.r1);
        self.bias = if config.position_correction {
            -self.bias_factor * inv_dt * dp
        } else {
            Vec2::ZERO
        };

        if config.warm_starting {
            b1.velocity -= b1.inv_mass * self.p;
            b1.angular_velocity -= b1.inv_i * self.r1.cross(self.p);

            b2.velocity += b2.inv_mass * self.p;
            b2.angular_velocity += b2.inv_i * self.r2.cross(self.p);
        } else {
            self.p = Vec2::ZERO;
        }
    }

    /// Applies one corrective impulse toward zero relative anchor velocity.
    pub fn apply_impulse(&mut self, b1: &mut Body, b2: &mut Body) {
        let dv = b2.velocity + Vec2::cross_sv(b2.angular_velocity, self.r2)
            - b1.velocity
            - Vec2::cross_sv(b1.angular_velocity, self.r1);

        let impulse = self.m * (self.bias - dv - self.softness * self.p);

        b1.velocity -= b1.inv_mass * impulse;
        b1.angular_velocity -= b1.inv_i * self.r1.cross(impulse);

        b2.velocity += b2.inv_mass * impulse;
        b2.angular_velocity += b2.inv_i * self.r2.cross(impulse);

        self.p += impulse;
    }
}
