//! Fixed six-decimal safety values.

use std::{
    fmt::{self, Display},
    str::FromStr,
};

use num_bigint::BigUint;
use num_traits::{ToPrimitive as _, Zero as _};

const SCALE: u32 = 1_000_000;

/// Fixed-point precision of [`ratio`].
const PRECISION: u64 = 1 << 40;

/// The probability that a tile is clear, in millionths.
///
/// `Safety::ONE` and `Safety::ZERO` are reserved for certainties: a value
/// computed from a ratio that is neither exactly 0 nor exactly 1 is clamped
/// into `0.000001..=0.999999`, so `safety == ONE` always means "provably
/// clear" and `safety == ZERO` always means "provably a marker".
///
/// On the wire a safety is a string with six decimal places.
///
/// # Examples
///
/// ```
/// use mineprobe_solver::Safety;
///
/// let half = Safety::from_millionths(500_000);
/// assert_eq!(half.to_string(), "0.500000");
/// assert_eq!("0.500000".parse::<Safety>(), Ok(half));
/// assert_eq!(Safety::ONE.to_string(), "1.000000");
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Safety(u32);

impl Safety {
    /// Provably a marker.
    pub const ZERO: Self = Self(0);
    /// Provably clear.
    pub const ONE: Self = Self(SCALE);

    /// Creates a safety from millionths, saturating at [`Safety::ONE`].
    #[must_use]
    pub const fn from_millionths(millionths: u32) -> Self {
        if millionths > SCALE {
            Self(SCALE)
        } else {
            Self(millionths)
        }
    }

    /// Returns the value in millionths.
    #[must_use]
    pub const fn millionths(self) -> u32 {
        self.0
    }

    /// Returns the value as a float.
    #[must_use]
    pub fn as_f64(self) -> f64 {
        f64::from(self.0) / f64::from(SCALE)
    }

    /// Returns `true` if the tile is provably clear.
    #[must_use]
    pub fn is_certain_safe(self) -> bool {
        self == Self::ONE
    }

    /// Returns `true` if the tile is provably a marker.
    #[must_use]
    pub fn is_certain_mine(self) -> bool {
        self == Self::ZERO
    }

    /// Safety of a tile that is a marker in `tally` out of `total` weighted
    /// solutions: `1 - floor(tally / total, 6dp)`.
    ///
    /// Returns [`Safety::ZERO`] when `total` is zero.
    #[must_use]
    pub fn from_mine_tally(tally: &BigUint, total: &BigUint) -> Self {
        if total.is_zero() || tally >= total {
            return Self::ZERO;
        }
        if tally.is_zero() {
            return Self::ONE;
        }
        let floored = (tally * SCALE / total).to_u32().unwrap_or(SCALE);
        Self((SCALE - floored).clamp(1, SCALE - 1))
    }

    /// Safety of a tile when `mines` markers are spread uniformly over
    /// `tiles` tiles, rounded to the nearest millionth.
    #[must_use]
    pub fn from_uniform(mines: usize, tiles: usize) -> Self {
        if tiles == 0 || mines >= tiles {
            return Self::ZERO;
        }
        if mines == 0 {
            return Self::ONE;
        }
        let clear = (tiles - mines) as u128;
        let tiles = tiles as u128;
        let rounded = (clear * u128::from(SCALE) * 2 + tiles) / (tiles * 2);
        let rounded = u32::try_from(rounded).unwrap_or(SCALE);
        Self(rounded.clamp(1, SCALE - 1))
    }
}

impl Display for Safety {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:06}", self.0 / SCALE, self.0 % SCALE)
    }
}

/// Error returned when parsing a [`Safety`] string fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("safety must be a decimal between 0 and 1 with at most six places")]
pub struct ParseSafetyError;

impl FromStr for Safety {
    type Err = ParseSafetyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (int, frac) = s.split_once('.').unwrap_or((s, ""));
        if frac.len() > 6 || !frac.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ParseSafetyError);
        }
        let int: u32 = int.parse().map_err(|_| ParseSafetyError)?;
        let mut frac_value = 0u32;
        for (i, b) in frac.bytes().enumerate() {
            frac_value += u32::from(b - b'0') * 10u32.pow(5 - u32::try_from(i).unwrap_or(5));
        }
        match int {
            0 => Ok(Self(frac_value)),
            1 if frac_value == 0 => Ok(Self::ONE),
            _ => Err(ParseSafetyError),
        }
    }
}

impl serde::Serialize for Safety {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for Safety {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = <std::borrow::Cow<'de, str>>::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// `numerator / denominator` as a float, without overflowing on huge
/// solution counts.
pub(crate) fn ratio(numerator: &BigUint, denominator: &BigUint) -> f64 {
    if denominator.is_zero() {
        return 0.0;
    }
    let scaled = (numerator * PRECISION / denominator).to_u64().unwrap_or(u64::MAX);
    #[expect(clippy::cast_precision_loss)]
    let value = scaled as f64 / PRECISION as f64;
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    fn big(n: u64) -> BigUint {
        BigUint::from(n)
    }

    #[test]
    fn test_mine_tally_floors() {
        assert_eq!(Safety::from_mine_tally(&big(1), &big(2)).to_string(), "0.500000");
        assert_eq!(Safety::from_mine_tally(&big(1), &big(3)).to_string(), "0.666667");
        assert_eq!(Safety::from_mine_tally(&big(2), &big(3)).to_string(), "0.333334");
        assert_eq!(Safety::from_mine_tally(&big(0), &big(3)), Safety::ONE);
        assert_eq!(Safety::from_mine_tally(&big(3), &big(3)), Safety::ZERO);
        assert_eq!(Safety::from_mine_tally(&big(1), &big(0)), Safety::ZERO);
    }

    #[test]
    fn test_near_certain_values_are_clamped() {
        let almost_safe = Safety::from_mine_tally(&big(1), &big(10_000_000));
        assert_eq!(almost_safe.millionths(), 999_999);
        assert!(!almost_safe.is_certain_safe());

        let almost_mine = Safety::from_mine_tally(&big(9_999_999), &big(10_000_000));
        assert_eq!(almost_mine.millionths(), 1);
        assert!(!almost_mine.is_certain_mine());
    }

    #[test]
    fn test_uniform_rounds() {
        assert_eq!(Safety::from_uniform(5, 20).to_string(), "0.750000");
        assert_eq!(Safety::from_uniform(1, 3).to_string(), "0.666667");
        assert_eq!(Safety::from_uniform(2, 3).to_string(), "0.333333");
        assert_eq!(Safety::from_uniform(0, 3), Safety::ONE);
        assert_eq!(Safety::from_uniform(0, 0), Safety::ZERO);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!("0.75".parse::<Safety>(), Ok(Safety::from_millionths(750_000)));
        assert_eq!("1".parse::<Safety>(), Ok(Safety::ONE));
        assert!("1.5".parse::<Safety>().is_err());
        assert!("0.1234567".parse::<Safety>().is_err());
        assert!("-0.1".parse::<Safety>().is_err());
        assert!("abc".parse::<Safety>().is_err());
    }

    #[test]
    fn test_serde_as_string() {
        let json = serde_json::to_string(&Safety::from_millionths(123_456)).unwrap();
        assert_eq!(json, "\"0.123456\"");
        let back: Safety = serde_json::from_str(&json).unwrap();
        assert_eq!(back.millionths(), 123_456);
    }

    #[test]
    fn test_ratio() {
        assert!((ratio(&big(1), &big(4)) - 0.25).abs() < 1e-9);
        assert!(ratio(&big(1), &big(0)).abs() < f64::EPSILON);
    }
}
