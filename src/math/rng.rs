//! Low-discrepancy sequences and integer hashing.

use glam::Vec2;

const SCRAMBLE_X: u32 = 5569;
const SCRAMBLE_Y: u32 = 95597;

/// Radical inverse in base 2, XOR-scrambled.
#[inline]
#[must_use]
pub fn van_der_corput(n: u32, scramble: u32) -> u32 {
    n.reverse_bits() ^ scramble
}

/// Second dimension of the Sobol (0,2)-sequence, XOR-scrambled.
#[must_use]
pub fn sobol2(mut n: u32, mut scramble: u32) -> u32 {
    let mut v: u32 = 1 << 31;
    while n != 0 {
        if n & 1 != 0 {
            scramble ^= v;
        }
        n >>= 1;
        v ^= v >> 1;
    }
    scramble
}

/// Maps the upper 24 bits to `[0, 1)`. Dropping the low bits keeps the
/// result strictly below one after rounding to f32.
#[inline]
#[must_use]
pub fn to_unit_float(bits: u32) -> f32 {
    (bits >> 8) as f32 * (1.0 / (1u32 << 24) as f32)
}

/// The `n`th point of a scrambled 2D (0,2)-sequence in `[0, 1)^2`.
///
/// Any power-of-two prefix of the sequence is stratified in every dyadic
/// elementary interval, which makes it a good fit for quasi-Monte Carlo
/// integration.
#[must_use]
pub fn sample02(n: u32) -> Vec2 {
    Vec2::new(
        to_unit_float(van_der_corput(n, SCRAMBLE_X)),
        to_unit_float(sobol2(n, SCRAMBLE_Y)),
    )
}

/// Robert Jenkins' 32 bit integer hash.
#[must_use]
pub fn hash(mut a: u32) -> u32 {
    a = a.wrapping_add(0x7ed5_5d16).wrapping_add(a << 12);
    a = (a ^ 0xc761_c23c) ^ (a >> 19);
    a = a.wrapping_add(0x1656_67b1).wrapping_add(a << 5);
    a = a.wrapping_add(0xd3a2_646c) ^ (a << 9);
    a = a.wrapping_add(0xfd70_46c5).wrapping_add(a << 3);
    (a ^ 0xb55a_4f09) ^ (a >> 16)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn samples_stay_in_unit_square() {
        for n in 0..4096 {
            let s = sample02(n);
            assert!((0.0..1.0).contains(&s.x) && (0.0..1.0).contains(&s.y), "{s:?}");
        }
        assert!(to_unit_float(u32::MAX) < 1.0);
    }

    #[test]
    fn power_of_two_prefix_is_stratified() {
        // 16 points: one per 4x4 cell.
        let mut cells = [false; 16];
        for n in 0..16 {
            let s = sample02(n);
            let cell = (s.x * 4.0) as usize + 4 * (s.y * 4.0) as usize;
            assert!(!cells[cell], "cell {cell} hit twice");
            cells[cell] = true;
        }
    }

    #[test]
    fn hash_scatters_neighbours() {
        assert_ne!(hash(0), hash(1));
        assert_ne!(hash(1), hash(2));
    }
}
