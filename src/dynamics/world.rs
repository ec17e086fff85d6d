use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use crate::collision::{Arbiter, PairKey};
use crate::dynamics::{Body, Joint};
use crate::math::Vec2;

/// Index of a body inside its [`World`], assigned monotonically by
/// [`World::add_body`].
#[repr(transparent)]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct BodyId(pub usize);

/// Index of a joint inside its [`World`].
#[repr(transparent)]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct JointId(pub usize);

/// Solver behavior toggles, snapshot at the top of every [`World::step`].
#[derive(Copy, Clone, Debug)]
pub struct SolverConfig {
    /// Clamp accumulated impulses instead of per-iteration increments.
    pub accumulate_impulses: bool,
    /// Carry impulses across steps via feature matching.
    pub warm_starting: bool,
    /// Use Baumgarte positional bias in contact and joint pre-steps.
    pub position_correction: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            accumulate_impulses: true,
            warm_starting: true,
            position_correction: true,
        }
    }
}

/// The simulation: bodies, joints, the persistent arbiter cache, and the
/// step pipeline that ties them together.
pub struct World {
    pub gravity: Vec2,
    pub iterations: u32,
    pub config: SolverConfig,

    bodies: Vec<Body>,
    joints: Vec<Joint>,
    arbiters: BTreeMap<PairKey, Arbiter>,
}

impl World {
    pub fn new(gravity: Vec2, iterations: u32) -> Self {
        Self {
            gravity,
            iterations,
            config: SolverConfig::default(),
            bodies: Vec::new(),
            joints: Vec::new(),
            arbiters: BTreeMap::new(),
        }
    }

    pub fn with_config(gravity: Vec2, iterations: u32, config: SolverConfig) -> Self {
        Self {
            config,
            ..Self::new(gravity, iterations)
        }
    }

    pub fn add_body(&mut self, body: Body) -> BodyId {
        let id = BodyId(self.bodies.len());
        self.bodies.push(body);
        id
    }

    pub fn add_joint(&mut self, joint: Joint) -> JointId {
        let id = JointId(self.joints.len());
        self.joints.push(joint);
        id
    }

    #[inline]
    pub fn body(&self, id: BodyId) -> &Body {
        &self.bodies[id.0]
    }

    #[inline]
    pub fn body_mut(&mut self, id: BodyId) -> &mut Body {
        &mut self.bodies[id.0]
    }

    #[inline]
    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    #[inline]
    pub fn joint(&self, id: JointId) -> &Joint {
        &self.joints[id.0]
    }

    #[inline]
    pub fn joint_mut(&mut self, id: JointId) -> &mut Joint {
        &mut self.joints[id.0]
    }

    #[inline]
    pub fn joints(&self) -> &[Joint] {
        &self.joints
    }

    /// The live contact cache, keyed by canonical body pair. Read-only;
    /// renderers use it to draw contact points.
    #[inline]
    pub fn arbiters(&self) -> &BTreeMap<PairKey, Arbiter> {
        &self.arbiters
    }

    pub fn clear(&mut self) {
        self.bodies.clear();
        self.joints.clear();
        self.arbiters.clear();
    }

    /// All-pairs sweep: collide every non-static pair and reconcile the
    /// result with the arbiter cache (insert on first touch, feature-merge
    /// while touching, drop on separation).
    fn broad_phase(&mut self, warm_starting: bool) {
        for i in 0..self.bodies.len() {
            for j in (i + 1)..self.bodies.len() {
                if self.bodies[i].is_static() && self.bodies[j].is_static() {
                    continue;
                }

                let (a, b) = (BodyId(i), BodyId(j));
                let fresh = Arbiter::new(a, b, &self.bodies[i], &self.bodies[j]);
                let key = PairKey::new(a, b);

                if fresh.count > 0 {
                    match self.arbiters.entry(key) {
                        Entry::Vacant(slot) => {
                            slot.insert(fresh);
                        }
                        Entry::Occupied(mut slot) => {
                            slot.get_mut()
                                .update(&fresh.contacts[..fresh.count], warm_starting);
                        }
                    }
                } else {
                    self.arbiters.remove(&key);
                }
            }
        }
    }

    /// Advances the simulation by `dt` seconds.
    ///
    /// Pipeline order is fixed: broad phase, force integration, contact and
    /// joint pre-steps, `iterations` Gauss–Seidel sweeps (arbiters in key
    /// order, then joints in insertion order), position integration. With
    /// `dt == 0` forces and biases are inert and the step is a no-op.
    pub fn step(&mut self, dt: f32) {
        let inv_dt = if dt > 0.0 { 1.0 / dt } else { 0.0 };
        let config = self.config;

        self.broad_phase(config.warm_starting);

        let Self {
            gravity,
            iterations,
            bodies,
            joints,
            arbiters,
            ..
        } = self;

        // Integrate forces.
        for b in bodies.iter_mut() {
            if b.is_static() {
                continue;
            }
            b.velocity += dt * (*gravity + b.inv_mass * b.force);
            b.angular_velocity += dt * b.inv_i * b.torque;
        }

        // Pre-steps.
        for arb in arbiters.values_mut() {
            let (b1, b2) = two_bodies_mut(bodies, arb.body_a, arb.body_b);
            arb.pre_step(inv_dt, b1, b2, config);
        }
        for joint in joints.iter_mut() {
            let (b1, b2) = two_bodies_mut(bodies, joint.body_a, joint.body_b);
            joint.pre_step(inv_dt, b1, b2, config);
        }

        // Solver iterations.
        for _ in 0..*iterations {
            for arb in arbiters.values_mut() {
                let (b1, b2) = two_bodies_mut(bodies, arb.body_a, arb.body_b);
                arb.apply_impulse(b1, b2, config);
            }
            for joint in joints.iter_mut() {
                let (b1, b2) = two_bodies_mut(bodies, joint.body_a, joint.body_b);
                joint.apply_impulse(b1, b2);
            }
        }

        // Integrate positions and clear accumulators.
        for b in bodies.iter_mut() {
            b.position += dt * b.velocity;
            b.rotation += dt * b.angular_velocity;

            b.force = Vec2::ZERO;
            b.torque = 0.0;
        }
    }
}

/// Mutable references to two distinct bodies of one slice.
fn two_bodies_mut(bodies: &mut [Body], a: BodyId, b: BodyId) -> (&mut Body, &mut Body) {
    debug_assert!(a != b, "a pair must reference two distinct bodies");

    if a.0 < b.0 {
        let (head, tail) = bodies.split_at_mut(b.0);
        (&mut head[a.0], &mut tail[0])
    } else {
        let (head, tail) = bodies.split_at_mut(a.0);
        (&mut tail[0], &mut head[b.0])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn two_bodies_mut_resolves_either_order() {
        let mut bodies = vec![
            Body::new(Vec2::new(1.0, 1.0), 1.0),
            Body::new(Vec2::new(1.0, 1.0), 2.0),
            Body::new(Vec2::new(1.0, 1.0), 4.0),
        ];

        let (x, y) = two_bodies_mut(&mut bodies, BodyId(2), BodyId(0));
        assert_relative_eq!(x.inv_mass, 0.25);
        assert_relative_eq!(y.inv_mass, 1.0);
    }

    #[test]
    fn add_body_assigns_monotonic_ids() {
        let mut world = World::new(Vec2::ZERO, 10);
        let a = world.add_body(Body::new(Vec2::new(1.0, 1.0), 1.0));
        let b = world.add_body(Body::new(Vec2::new(1.0, 1.0), 1.0));
        assert_eq!(a, BodyId(0));
        assert_eq!(b, BodyId(1));
    }

    #[test]
    fn gravity_integrates_velocity_then_position() {
        let mut world = World::new(Vec2::new(0.0, -10.0), 10);
        let id = world.add_body(Body::new(Vec2::new(1.0, 1.0), 2.0));

        world.step(0.1);

        let b = world.body(id);
        assert_relative_eq!(b.velocity.y, -1.0, epsilon = 1e-6);
        assert_relative_eq!(b.position.y, -0.1, epsilon = 1e-6);
    }

    #[test]
    fn static_bodies_never_move() {
        let mut world = World::new(Vec2::new(0.0, -10.0), 10);
        let mut floor = Body::new(Vec2::new(10.0, 1.0), f32::INFINITY);
        floor.position = Vec2::new(0.0, 3.0);
        let id = world.add_body(floor);

        world.step(0.1);

        let b = world.body(id);
        assert_eq!(b.position, Vec2::new(0.0, 3.0));
        assert_eq!(b.velocity, Vec2::ZERO);
    }

    #[test]
    fn accumulators_clear_after_step() {
        let mut world = World::new(Vec2::ZERO, 10);
        let id = world.add_body(Body::new(Vec2::new(1.0, 1.0), 1.0));

        world.body_mut(id).add_force(Vec2::new(3.0, 0.0));
        world.body_mut(id).torque = 1.5;
        world.step(0.1);

        let b = world.body(id);
        assert_eq!(b.force, Vec2::ZERO);
        assert_eq!(b.torque, 0.0);
        // But the force did act for one step.
        assert_relative_eq!(b.velocity.x, 0.3, epsilon = 1e-6);
    }

    #[test]
    fn clear_empties_everything() {
        let mut world = World::new(Vec2::new(0.0, -10.0), 10);
        let mut floor = Body::new(Vec2::new(100.0, 20.0), f32::INFINITY);
        floor.position = Vec2::new(0.0, -10.0);
        world.add_body(floor);
        let mut cube = Body::new(Vec2::new(1.0, 1.0), 1.0);
        cube.position = Vec2::new(0.0, 0.4);
        world.add_body(cube);

        world.step(1.0 / 60.0);
        assert!(!world.arbiters().is_empty());

        world.clear();
        assert!(world.bodies().is_empty());
        assert!(world.joints().is_empty());
        assert!(world.arbiters().is_empty());
    }

    #[test]
    fn zero_iterations_is_tolerated() {
        let mut world = World::new(Vec2::new(0.0, -10.0), 0);
        let mut floor = Body::new(Vec2::new(100.0, 20.0), f32::INFINITY);
        floor.position = Vec2::new(0.0, -10.0);
        world.add_body(floor);
        let mut cube = Body::new(Vec2::new(1.0, 1.0), 1.0);
        cube.position = Vec2::new(0.0, 0.4);
        let cube = world.add_body(cube);

        // Unconstrained but well-defined: the box just keeps sinking.
        world.step(1.0 / 60.0);
        assert!(world.body(cube).velocity.y < 0.0);
    }
}
