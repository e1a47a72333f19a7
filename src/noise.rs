//! Deterministic smooth noise for turbulence.
//!
//! Integer hashing plus quintic-smoothed value noise. Pure functions of
//! position and time, so two runs with the same inputs see the same field.

use glam::{Vec2, Vec3};

/// Low-bias 32-bit integer hash.
#[inline]
pub fn hash(n: u32) -> u32 {
    let mut x = n;
    x ^= x >> 17;
    x = x.wrapping_mul(0xed5a_d4bb);
    x ^= x >> 11;
    x = x.wrapping_mul(0xac4c_1b51);
    x ^= x >> 15;
    x = x.wrapping_mul(0x3184_8bab);
    x ^= x >> 14;
    x
}

#[inline]
fn hash2(x: i32, y: i32) -> u32 {
    hash((x as u32).wrapping_add(hash(y as u32)))
}

/// Lattice value in `[-1, 1]`.
#[inline]
fn lattice(x: i32, y: i32) -> f32 {
    hash2(x, y) as f32 / u32::MAX as f32 * 2.0 - 1.0
}

#[inline]
fn fade(t: f32) -> f32 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

/// 2D value noise in `[-1, 1]`, continuous in both axes.
pub fn noise2(p: Vec2) -> f32 {
    if !p.is_finite() {
        return 0.0;
    }
    let cell = p.floor();
    let f = p - cell;
    let (ix, iy) = (cell.x as i32, cell.y as i32);

    let a = lattice(ix, iy);
    let b = lattice(ix.wrapping_add(1), iy);
    let c = lattice(ix, iy.wrapping_add(1));
    let d = lattice(ix.wrapping_add(1), iy.wrapping_add(1));

    let u = fade(f.x);
    let v = fade(f.y);
    let top = a + (b - a) * u;
    let bottom = c + (d - c) * u;
    top + (bottom - top) * v
}

/// Turbulence vector at `position` and `time`, each component in `[-1, 1]`.
#[inline]
pub fn turbulence(position: Vec3, scale: f32, time: f32) -> Vec3 {
    let p = position.truncate() * scale + Vec2::splat(time);
    Vec3::new(
        noise2(p),
        noise2(p + Vec2::new(100.0, 37.0)),
        0.0,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noise_range() {
        for i in 0..200 {
            let p = Vec2::new(i as f32 * 0.173 - 17.0, i as f32 * -0.291 + 4.0);
            let n = noise2(p);
            assert!((-1.0..=1.0).contains(&n), "noise {n} out of range at {p}");
        }
    }

    #[test]
    fn test_noise_is_deterministic() {
        let p = Vec2::new(3.7, -1.2);
        assert_eq!(noise2(p).to_bits(), noise2(p).to_bits());
    }

    #[test]
    fn test_noise_is_continuous() {
        let p = Vec2::new(2.0, 5.0);
        let eps = Vec2::splat(1e-4);
        assert!((noise2(p) - noise2(p - eps)).abs() < 1e-2);
    }

    #[test]
    fn test_non_finite_input_is_zero() {
        assert_eq!(noise2(Vec2::new(f32::NAN, 0.0)), 0.0);
        assert_eq!(turbulence(Vec3::new(f32::INFINITY, 0.0, 0.0), 1.0, 0.0), Vec3::ZERO);
    }
}
