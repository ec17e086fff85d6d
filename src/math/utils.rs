use rand::Rng;

/// Sign of `x`, with zero mapped to +1 so callers always get a usable
/// direction.
#[inline]
pub fn sign(x: f32) -> f32 {
    if x < 0.0 { -1.0 } else { 1.0 }
}

/// Uniform sample from [-1, 1].
#[inline]
pub fn random_unit(rng: &mut impl Rng) -> f32 {
    rng.gen_range(-1.0..=1.0)
}

/// Uniform sample from [lo, hi].
#[inline]
pub fn random_range(rng: &mut impl Rng, lo: f32, hi: f32) -> f32 {
    rng.gen_range(lo..=hi)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn sign_never_returns_zero() {
        assert_eq!(sign(-3.0), -1.0);
        assert_eq!(sign(-f32::MIN_POSITIVE), -1.0);
        assert_eq!(sign(0.0), 1.0);
        assert_eq!(sign(7.5), 1.0);
    }

    #[test]
    fn random_helpers_stay_in_bounds() {
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..1_000 {
            let u = random_unit(&mut rng);
            assert!((-1.0..=1.0).contains(&u));

            let r = random_range(&mut rng, -0.1, 0.1);
            assert!((-0.1..=0.1).contains(&r));
        }
    }
}
