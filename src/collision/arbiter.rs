//! Persistent contact state for one colliding pair.

use crate::collision::{FeaturePair, collide};
use crate::dynamics::{Body, BodyId, SolverConfig};
use crate::math::Vec2;

/// A manifold holds at most two points for box-box contact.
pub const MAX_CONTACTS: usize = 2;

/// One point of a contact manifold, plus the impulses and solver constants
/// attached to it.
#[derive(Copy, Clone, Debug, Default)]
pub struct Contact {
    /// World-space contact point, snapped onto the reference face.
    pub position: Vec2,
    /// Unit normal pointing from the pair's first body toward its second.
    pub normal: Vec2,
    /// Offset from each body's center to the contact, computed in `pre_step`.
    pub r1: Vec2,
    pub r2: Vec2,
    /// Signed overlap along the normal; negative while penetrating.
    pub separation: f32,
    /// Accumulated normal, tangent, and positional-bias impulses.
    pub normal_impulse: f32,
    pub tangent_impulse: f32,
    pub bias_impulse: f32,
    /// Effective masses along the normal and tangent directions.
    pub normal_mass: f32,
    pub tangent_mass: f32,
    /// Baumgarte velocity bias for penetration recovery.
    pub bias: f32,
    /// Stable identity used to re-match this point across frames.
    pub feature: FeaturePair,
}

/// Canonical key for a body pair: always stores `(min, max)`, so the pair
/// (a, b) and the pair (b, a) index the same cache slot. Ordering is plain
/// lexicographic via the derived `Ord`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct PairKey {
    pub first: BodyId,
    pub second: BodyId,
}

impl PairKey {
    #[inline]
    pub fn new(a: BodyId, b: BodyId) -> Self {
        if a <= b {
            Self { first: a, second: b }
        } else {
            Self { first: b, second: a }
        }
    }
}

/// The cached manifold between two specific bodies.
///
/// Lives in the world's arbiter map from the first frame a pair touches
/// until the first frame it separates. Across updates, contacts whose
/// features match keep their accumulated impulses, which is what lets the
/// iterative solver start each frame near last frame's solution.
#[derive(Clone, Debug)]
pub struct Arbiter {
    /// Canonical pair, `body_a < body_b`.
    pub body_a: BodyId,
    pub body_b: BodyId,

    pub contacts: [Contact; MAX_CONTACTS],
    pub count: usize,

    /// Combined friction coefficient, `sqrt(friction_a * friction_b)`.
    pub friction: f32,
}

impl Arbiter {
    /// Collides the two bodies and builds a fresh arbiter. `a`/`b` may be
    /// given in either order; `ba`/`bb` must be the bodies for `a`/`b`.
    pub fn new(a: BodyId, b: BodyId, ba: &Body, bb: &Body) -> Self {
        let (body_a, body_b, ba, bb) = if a <= b { (a, b, ba, bb) } else { (b, a, bb, ba) };

        let mut contacts = [Contact::default(); MAX_CONTACTS];
        let count = collide(&mut contacts, ba, bb);

        Self {
            body_a,
            body_b,
            contacts,
            count,
            friction: (ba.friction * bb.friction).sqrt(),
        }
    }

    /// Replaces the stored manifold with a freshly collided one, carrying
    /// accumulated impulses over from old contacts whose feature matches.
    pub fn update(&mut self, fresh: &[Contact], warm_starting: bool) {
        debug_assert!(fresh.len() <= MAX_CONTACTS);

        let mut merged = [Contact::default(); MAX_CONTACTS];
        for (slot, new_contact) in merged.iter_mut().zip(fresh) {
            *slot = *new_contact;

            if !warm_starting {
                continue;
            }
            let matched = self.contacts[..self.count]
                .iter()
                .find(|old| old.feature == new_contact.feature);
            if let Some(old) = matched {
                slot.normal_impulse = old.normal_impulse;
                slot.tangent_impulse = old.tangent_impulse;
                slot.bias_impulse = old.bias_impulse;
            }
        }

        self.contacts = merged;
        self.count = fresh.len();
    }

    /// Computes per-contact solver constants and applies the warm-start
    /// impulses. `b1`/`b2` must be the bodies for `body_a`/`body_b`.
    pub fn pre_step(&mut self, inv_dt: f32, b1: &mut Body, b2: &mut Body, config: SolverConfig) {
        const ALLOWED_PENETRATION: f32 = 0.01;
        let bias_factor = if config.position_correction { 0.2 } else { 0.0 };

        for c in &mut self.contacts[..self.count] {
            c.r1 = c.position - b1.position;
            c.r2 = c.position - b2.position;

            let rn1 = c.r1.dot(c.normal);
            let rn2 = c.r2.dot(c.normal);
            let k_normal = b1.inv_mass
                + b2.inv_mass
                + b1.inv_i * (c.r1.dot(c.r1) - rn1 * rn1)
                + b2.inv_i * (c.r2.dot(c.r2) - rn2 * rn2);
            c.normal_mass = 1.0 / k_normal;

            let tangent = Vec2::cross_vs(c.normal, 1.0);
            let rt1 = c.r1.dot(tangent);
            let rt2 = c.r2.dot(tangent);
            let k_tangent = b1.inv_mass
                + b2.inv_mass
                + b1.inv_i * (c.r1.dot(c.r1) - rt1 * rt1)
                + b2.inv_i * (c.r2.dot(c.r2) - rt2 * rt2);
            c.tangent_mass = 1.0 / k_tangent;

            c.bias = -bias_factor * inv_dt * (c.separation + ALLOWED_PENETRATION).min(0.0);

            if config.accumulate_impulses {
                // Start the iteration from last frame's converged impulse.
                let p = c.normal_impulse * c.normal + c.tangent_impulse * tangent;

                b1.velocity -= b1.inv_mass * p;
                b1.angular_velocity -= b1.inv_i * c.r1.cross(p);

                b2.velocity += b2.inv_mass * p;
                b2.angular_velocity += b2.inv_i * c.r2.cross(p);
            } else {
                c.normal_impulse = 0.0;
                c.tangent_impulse = 0.0;
                c.bias_impulse = 0.0;
            }
        }
    }

    /// One Gauss–Seidel sweep: a clamped normal impulse per contact, then a
    /// friction impulse bounded by the friction cone.
    pub fn apply_impulse(&mut self, b1: &mut Body, b2: &mut Body, config: SolverConfig) {
        for c in &mut self.contacts[..self.count] {
            let mut dv = b2.velocity + Vec2::cross_sv(b2.angular_velocity, c.r2)
                - b1.velocity
                - Vec2::cross_sv(b1.angular_velocity, c.r1);

            let vn = dv.dot(c.normal);
            let mut d_pn = c.normal_mass * (-vn + c.bias);

            if config.accumulate_impulses {
                // Clamp the accumulator, not the increment: intermediate
                // iterations may pull impulse back out as long as the total
                // stays non-negative.
                let pn0 = c.normal_impulse;
                c.normal_impulse = (pn0 + d_pn).max(0.0);
                d_pn = c.normal_impulse - pn0;
            } else {
                d_pn = d_pn.max(0.0);
            }

            let pn = d_pn * c.normal;
            b1.velocity -= b1.inv_mass * pn;
            b1.angular_velocity -= b1.inv_i * c.r1.cross(pn);
            b2.velocity += b2.inv_mass * pn;
            b2.angular_velocity += b2.inv_i * c.r2.cross(pn);

            // Relative velocity changed above; re-sample it for friction.
            dv = b2.velocity + Vec2::cross_sv(b2.angular_velocity, c.r2)
                - b1.velocity
                - Vec2::cross_sv(b1.angular_velocity, c.r1);

            let tangent = Vec2::cross_vs(c.normal, 1.0);
            let vt = dv.dot(tangent);
            let mut d_pt = c.tangent_mass * (-vt);

            if config.accumulate_impulses {
                let max_pt = self.friction * c.normal_impulse;
                let pt0 = c.tangent_impulse;
                c.tangent_impulse = (pt0 + d_pt).clamp(-max_pt, max_pt);
                d_pt = c.tangent_impulse - pt0;
            } else {
                let max_pt = self.friction * d_pn;
                d_pt = d_pt.clamp(-max_pt, max_pt);
            }

            let pt = d_pt * tangent;
            b1.velocity -= b1.inv_mass * pt;
            b1.angular_velocity -= b1.inv_i * c.r1.cross(pt);
            b2.velocity += b2.inv_mass * pt;
            b2.angular_velocity += b2.inv_i * c.r2.cross(pt);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::features::Edge;
    use approx::assert_relative_eq;

    #[test]
    fn pair_key_is_order_independent() {
        let a = BodyId(7);
        let b = BodyId(3);
        assert_eq!(PairKey::new(a, b), PairKey::new(b, a));
        assert_eq!(PairKey::new(a, b).first, b);
        assert_eq!(PairKey::new(a, b).second, a);
    }

    #[test]
    fn pair_keys_sort_lexicographically() {
        let mut keys = vec![
            PairKey::new(BodyId(2), BodyId(9)),
            PairKey::new(BodyId(0), BodyId(3)),
            PairKey::new(BodyId(2), BodyId(4)),
            PairKey::new(BodyId(0), BodyId(1)),
        ];
        keys.sort();
        assert_eq!(
            keys,
            vec![
                PairKey::new(BodyId(0), BodyId(1)),
                PairKey::new(BodyId(0), BodyId(3)),
                PairKey::new(BodyId(2), BodyId(4)),
                PairKey::new(BodyId(2), BodyId(9)),
            ]
        );
    }

    fn arbiter_with_one_contact(feature: FeaturePair) -> Arbiter {
        let mut arb = Arbiter {
            body_a: BodyId(0),
            body_b: BodyId(1),
            contacts: [Contact::default(); MAX_CONTACTS],
            count: 1,
            friction: 0.5,
        };
        arb.contacts[0].feature = feature;
        arb.contacts[0].normal_impulse = 2.0;
        arb.contacts[0].tangent_impulse = -0.25;
        arb.contacts[0].bias_impulse = 0.125;
        arb
    }

    #[test]
    fn update_carries_impulses_for_matching_features() {
        let feature = FeaturePair::new(Edge::Top, Edge::None, Edge::Left, Edge::Bottom);
        let mut arb = arbiter_with_one_contact(feature);

        let mut fresh = Contact::default();
        fresh.feature = feature;

        arb.update(&[fresh], true);
        assert_eq!(arb.count, 1);
        assert_relative_eq!(arb.contacts[0].normal_impulse, 2.0);
        assert_relative_eq!(arb.contacts[0].tangent_impulse, -0.25);
        assert_relative_eq!(arb.contacts[0].bias_impulse, 0.125);
    }

    #[test]
    fn update_without_warm_starting_resets_impulses() {
        let feature = FeaturePair::new(Edge::Top, Edge::None, Edge::Left, Edge::Bottom);
        let mut arb = arbiter_with_one_contact(feature);

        let mut fresh = Contact::default();
        fresh.feature = feature;

        arb.update(&[fresh], false);
        assert_relative_eq!(arb.contacts[0].normal_impulse, 0.0);
        assert_relative_eq!(arb.contacts[0].tangent_impulse, 0.0);
        assert_relative_eq!(arb.contacts[0].bias_impulse, 0.0);
    }

    #[test]
    fn update_discards_impulses_of_unmatched_features() {
        let mut arb = arbiter_with_one_contact(FeaturePair::new(
            Edge::Top,
            Edge::None,
            Edge::Left,
            Edge::Bottom,
        ));

        let mut fresh = Contact::default();
        fresh.feature = FeaturePair::new(Edge::Bottom, Edge::None, Edge::Left, Edge::Top);

        arb.update(&[fresh], true);
        assert_relative_eq!(arb.contacts[0].normal_impulse, 0.0);
    }

    #[test]
    fn update_to_empty_manifold_clears_count() {
        let mut arb = arbiter_with_one_contact(FeaturePair::default());
        arb.update(&[], true);
        assert_eq!(arb.count, 0);
    }
}
