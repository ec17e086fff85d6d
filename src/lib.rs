//! A small 2D rigid body physics engine for oriented boxes.
//!
//! Each [`World::step`] runs the classic pipeline: an all-pairs broad phase
//! feeding SAT box-box collision, a persistent per-pair contact cache
//! ([`Arbiter`]) that warm-starts the solver from last frame's impulses, and
//! a fixed number of Sequential Impulses iterations over contact and joint
//! constraints, followed by symplectic Euler integration.
//!
//! ```
//! use impulse2d::{Body, Vec2, World};
//!
//! let mut world = World::new(Vec2::new(0.0, -10.0), 10);
//!
//! let mut floor = Body::new(Vec2::new(100.0, 20.0), f32::INFINITY);
//! floor.position = Vec2::new(0.0, -10.0);
//! world.add_body(floor);
//!
//! let mut cube = Body::new(Vec2::new(1.0, 1.0), 200.0);
//! cube.position = Vec2::new(0.0, 4.0);
//! let cube = world.add_body(cube);
//!
//! for _ in 0..120 {
//!     world.step(1.0 / 60.0);
//! }
//! assert!(world.body(cube).position.y < 4.0);
//! ```

pub mod collision;
pub mod dynamics;
pub mod math;

pub use collision::{Arbiter, Contact, Edge, FeaturePair, MAX_CONTACTS, PairKey, collide};
pub use dynamics::{Body, BodyId, Joint, JointId, SolverConfig, World};
pub use math::{Mat22, Vec2};
