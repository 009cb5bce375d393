//! Fixed-point math for deterministic physics.
//!
//! Formats:
//! - `Fixed`: signed Q19.12, raw `i32` where 4096 == 1.0
//! - Angles are degrees carried as `Fixed`
//! - Trig tables: quarter-wave sin at whole degrees, Q12
//!
//! Conversions and products truncate toward zero, so every platform
//! produces the same bits for the same inputs.

use std::fmt;
use std::ops::{Add, AddAssign, Div, Mul, MulAssign, Neg, Sub, SubAssign};

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Fractional bits of `Fixed`
pub const FRACTION_BITS: u32 = 12;
const SCALE: i32 = 1 << FRACTION_BITS;

/// Signed fixed-point scalar with 12 fractional bits
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fixed(i32);

impl Fixed {
    pub const ZERO: Fixed = Fixed(0);
    pub const ONE: Fixed = Fixed(SCALE);
    pub const HALF: Fixed = Fixed(SCALE / 2);

    #[inline]
    pub const fn from_raw(raw: i32) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn raw(self) -> i32 {
        self.0
    }

    #[inline]
    pub const fn from_int(value: i32) -> Self {
        Self(value * SCALE)
    }

    /// Truncates toward zero: `from_f64(0.02).raw() == 81`
    #[inline]
    pub const fn from_f64(value: f64) -> Self {
        Self((value * SCALE as f64) as i32)
    }

    /// Integer part, truncated toward zero
    #[inline]
    pub const fn integer(self) -> i32 {
        self.0 / SCALE
    }

    #[inline]
    pub fn to_f32(self) -> f32 {
        self.0 as f32 / SCALE as f32
    }

    #[inline]
    pub const fn abs(self) -> Self {
        Self(self.0.abs())
    }

    /// -1, 0 or 1
    #[inline]
    pub const fn signum(self) -> i32 {
        self.0.signum()
    }
}

impl From<i32> for Fixed {
    fn from(value: i32) -> Self {
        Self::from_int(value)
    }
}

impl fmt::Display for Fixed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}", self.to_f32())
    }
}

impl Add for Fixed {
    type Output = Fixed;
    #[inline]
    fn add(self, rhs: Fixed) -> Fixed {
        Fixed(self.0 + rhs.0)
    }
}

impl Sub for Fixed {
    type Output = Fixed;
    #[inline]
    fn sub(self, rhs: Fixed) -> Fixed {
        Fixed(self.0 - rhs.0)
    }
}

impl Neg for Fixed {
    type Output = Fixed;
    #[inline]
    fn neg(self) -> Fixed {
        Fixed(-self.0)
    }
}

impl Mul for Fixed {
    type Output = Fixed;
    #[inline]
    fn mul(self, rhs: Fixed) -> Fixed {
        Fixed(((i64::from(self.0) * i64::from(rhs.0)) / i64::from(SCALE)) as i32)
    }
}

impl Div for Fixed {
    type Output = Fixed;
    #[inline]
    fn div(self, rhs: Fixed) -> Fixed {
        Fixed(((i64::from(self.0) * i64::from(SCALE)) / i64::from(rhs.0)) as i32)
    }
}

impl Mul<i32> for Fixed {
    type Output = Fixed;
    #[inline]
    fn mul(self, rhs: i32) -> Fixed {
        Fixed(self.0 * rhs)
    }
}

impl Div<i32> for Fixed {
    type Output = Fixed;
    #[inline]
    fn div(self, rhs: i32) -> Fixed {
        Fixed(self.0 / rhs)
    }
}

impl AddAssign for Fixed {
    fn add_assign(&mut self, rhs: Fixed) {
        self.0 += rhs.0;
    }
}

impl SubAssign for Fixed {
    fn sub_assign(&mut self, rhs: Fixed) {
        self.0 -= rhs.0;
    }
}

impl MulAssign for Fixed {
    fn mul_assign(&mut self, rhs: Fixed) {
        *self = *self * rhs;
    }
}

/// 2D fixed-point vector (positions and velocities)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FixedVec2 {
    pub x: Fixed,
    pub y: Fixed,
}

impl FixedVec2 {
    pub const ZERO: FixedVec2 = FixedVec2::new(Fixed::ZERO, Fixed::ZERO);

    #[inline]
    pub const fn new(x: Fixed, y: Fixed) -> Self {
        Self { x, y }
    }

    /// Presentation-side float copy (sprites only, never fed back into physics)
    #[inline]
    pub fn to_vec2(self) -> Vec2 {
        Vec2::new(self.x.to_f32(), self.y.to_f32())
    }
}

impl Add for FixedVec2 {
    type Output = FixedVec2;
    fn add(self, rhs: FixedVec2) -> FixedVec2 {
        FixedVec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for FixedVec2 {
    type Output = FixedVec2;
    fn sub(self, rhs: FixedVec2) -> FixedVec2 {
        FixedVec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl AddAssign for FixedVec2 {
    fn add_assign(&mut self, rhs: FixedVec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl SubAssign for FixedVec2 {
    fn sub_assign(&mut self, rhs: FixedVec2) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

/// Quarter-wave sin table, Q12, one entry per whole degree.
/// SIN_TABLE[i] = round(sin(i deg) * 4096)
static SIN_TABLE: [i16; 91] = [
    0, 71, 143, 214, 286, 357, 428, 499, 570, 641, 711, 782, 852, 921, 991, 1060,
    1129, 1198, 1266, 1334, 1401, 1468, 1534, 1600, 1666, 1731, 1796, 1860, 1923, 1986, 2048, 2110,
    2171, 2231, 2290, 2349, 2408, 2465, 2522, 2578, 2633, 2687, 2741, 2793, 2845, 2896, 2946, 2996,
    3044, 3091, 3138, 3183, 3228, 3271, 3314, 3355, 3396, 3435, 3474, 3511, 3547, 3582, 3617, 3650,
    3681, 3712, 3742, 3770, 3798, 3824, 3849, 3873, 3896, 3917, 3937, 3956, 3974, 3991, 4006, 4021,
    4034, 4046, 4056, 4065, 4074, 4080, 4086, 4090, 4094, 4095, 4096,
];

/// One octant of atan in degrees, Q12.
/// ATAN_TABLE[i] = round(atan(i / 64) in degrees * 4096)
static ATAN_TABLE: [i32; 65] = [
    0, 3667, 7331, 10993, 14649, 18297, 21937, 25567, 29184, 32787, 36375, 39946, 43498, 47030,
    50541, 54029, 57492, 60931, 64343, 67727, 71082, 74408, 77703, 80966, 84198, 87396, 90560,
    93691, 96786, 99846, 102870, 105859, 108810, 111726, 114604, 117445, 120249, 123016, 125746,
    128439, 131094, 133712, 136294, 138839, 141347, 143819, 146255, 148655, 151019, 153348,
    155643, 157903, 160128, 162320, 164479, 166605, 168698, 170758, 172787, 174785, 176752,
    178689, 180595, 182472, 184320,
];

/// Sin of a whole degree in `[0, 360)`, Q12 raw
fn sin_whole_degree(degree: i32) -> i32 {
    let table = |i: i32| i32::from(SIN_TABLE[i as usize]);
    match degree {
        0..=90 => table(degree),
        91..=180 => table(180 - degree),
        181..=270 => -table(degree - 180),
        _ => -table(360 - degree),
    }
}

/// Sine of an angle in degrees, linearly interpolated between whole degrees
pub fn sin_deg(angle: Fixed) -> Fixed {
    let raw = angle.raw().rem_euclid(360 * SCALE);
    let whole = raw / SCALE;
    let frac = raw % SCALE;
    let low = sin_whole_degree(whole);
    let high = sin_whole_degree((whole + 1) % 360);
    Fixed(low + ((high - low) * frac) / SCALE)
}

/// Cosine of an angle in degrees
pub fn cos_deg(angle: Fixed) -> Fixed {
    sin_deg(Fixed(angle.raw().rem_euclid(360 * SCALE)) + Fixed::from_int(90))
}

/// Sine of a whole-degree angle
#[inline]
pub fn degrees_sin(degrees: i32) -> Fixed {
    sin_deg(Fixed::from_int(degrees.rem_euclid(360)))
}

/// Cosine of a whole-degree angle
#[inline]
pub fn degrees_cos(degrees: i32) -> Fixed {
    cos_deg(Fixed::from_int(degrees.rem_euclid(360)))
}

/// Angle of the vector `(x, y)` in degrees, in `(-180, 180]`.
///
/// Octant reduction plus table lookup. `atan2_deg(0, 0)` is defined as 0.
pub fn atan2_deg(y: i32, x: i32) -> Fixed {
    if x == 0 && y == 0 {
        return Fixed::ZERO;
    }

    let abs_x = i64::from(x.unsigned_abs());
    let abs_y = i64::from(y.unsigned_abs());
    let (num, den, swapped) = if abs_x >= abs_y {
        (abs_y, abs_x, false)
    } else {
        (abs_x, abs_y, true)
    };

    // Ratio in [0, 1] scaled to table steps, with SCALE fractional precision
    let scale = i64::from(SCALE);
    let steps = num * 64 * scale / den;
    let index = (steps / scale) as usize;
    let frac = steps % scale;
    let low = i64::from(ATAN_TABLE[index]);
    let high = i64::from(ATAN_TABLE[(index + 1).min(64)]);
    let mut angle = low + (high - low) * frac / scale;

    if swapped {
        angle = 90 * scale - angle;
    }
    if x < 0 {
        angle = 180 * scale - angle;
    }
    if y < 0 {
        angle = -angle;
    }
    Fixed(angle as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversions_truncate() {
        assert_eq!(Fixed::from_f64(0.02).raw(), 81);
        assert_eq!(Fixed::from_f64(-0.02).raw(), -81);
        assert_eq!(Fixed::from_f64(2.75).integer(), 2);
        assert_eq!(Fixed::from_f64(-2.75).integer(), -2);
    }

    #[test]
    fn test_arithmetic() {
        let a = Fixed::from_f64(1.5);
        let b = Fixed::from_int(2);
        assert_eq!(a * b, Fixed::from_int(3));
        assert_eq!(Fixed::from_int(3) / b, a);
        assert_eq!(a * 2, Fixed::from_int(3));
        assert_eq!(Fixed::from_int(3) / 2, a);
        assert_eq!(-a + a, Fixed::ZERO);
        assert_eq!(Fixed::from_f64(-0.25).abs(), Fixed::from_f64(0.25));
        assert_eq!(Fixed::from_f64(-0.25).signum(), -1);
        assert_eq!(Fixed::ZERO.signum(), 0);
    }

    #[test]
    fn test_trig_cardinal_angles() {
        assert_eq!(degrees_sin(0), Fixed::ZERO);
        assert_eq!(degrees_sin(90), Fixed::ONE);
        assert_eq!(degrees_cos(0), Fixed::ONE);
        assert_eq!(degrees_cos(90), Fixed::ZERO);
        assert_eq!(degrees_cos(180), -Fixed::ONE);
        assert_eq!(degrees_sin(270), -Fixed::ONE);
        assert_eq!(degrees_sin(30), Fixed::HALF);
        assert_eq!(degrees_sin(-90), -Fixed::ONE);
        assert_eq!(degrees_sin(450), Fixed::ONE);
    }

    #[test]
    fn test_trig_interpolates_fractional_degrees() {
        let s = sin_deg(Fixed::from_f64(30.5)).to_f32();
        assert!((s - 0.5075).abs() < 0.001, "sin(30.5) = {s}");
    }

    #[test]
    fn test_atan2() {
        assert_eq!(atan2_deg(0, 0), Fixed::ZERO);
        assert_eq!(atan2_deg(0, 5), Fixed::ZERO);
        assert_eq!(atan2_deg(1, 1), Fixed::from_int(45));
        assert_eq!(atan2_deg(5, 0), Fixed::from_int(90));
        assert_eq!(atan2_deg(0, -5), Fixed::from_int(180));
        assert_eq!(atan2_deg(-5, 0), Fixed::from_int(-90));
        assert_eq!(atan2_deg(-3, -3), Fixed::from_int(-135));

        let a = atan2_deg(1, 2).to_f32();
        assert!((a - 26.565).abs() < 0.01, "atan2(1, 2) = {a}");
    }
}
