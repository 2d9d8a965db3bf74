//! Shared D8 direction table.
//!
//! One immutable table of the eight grid neighbors, ordered clockwise from
//! north-east, each carrying its row/column offset, power-of-two bit code,
//! step length and compass azimuth. All propagation engines index into this
//! table; backlink grids store the bit codes and decode them with
//! [`from_code`].

/// A single D8 neighbor direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Direction {
    pub d_row: isize,
    pub d_col: isize,
    /// Power-of-two bit code, 1..=128.
    pub code: i32,
    /// Step length in cell units: 1 for orthogonal, sqrt(2) for diagonal.
    pub step: f64,
    /// Compass azimuth of the step in degrees (0 = north, clockwise).
    pub azimuth: f64,
}

const SQRT_2: f64 = std::f64::consts::SQRT_2;

/// The eight directions, clockwise from north-east.
pub const DIRECTIONS: [Direction; 8] = [
    Direction { d_row: -1, d_col: 1, code: 1, step: SQRT_2, azimuth: 45.0 }, // NE
    Direction { d_row: 0, d_col: 1, code: 2, step: 1.0, azimuth: 90.0 },     // E
    Direction { d_row: 1, d_col: 1, code: 4, step: SQRT_2, azimuth: 135.0 }, // SE
    Direction { d_row: 1, d_col: 0, code: 8, step: 1.0, azimuth: 180.0 },    // S
    Direction { d_row: 1, d_col: -1, code: 16, step: SQRT_2, azimuth: 225.0 }, // SW
    Direction { d_row: 0, d_col: -1, code: 32, step: 1.0, azimuth: 270.0 },  // W
    Direction { d_row: -1, d_col: -1, code: 64, step: SQRT_2, azimuth: 315.0 }, // NW
    Direction { d_row: -1, d_col: 0, code: 128, step: 1.0, azimuth: 0.0 },   // N
];

/// Index of the direction opposite to `index`.
pub const fn opposite(index: usize) -> usize {
    (index + 4) % 8
}

/// Decode a bit code back to its table index (discrete log base 2).
///
/// Returns `None` for anything that is not exactly one of the eight codes.
pub fn from_code(code: i32) -> Option<usize> {
    if code <= 0 || code > 128 {
        return None;
    }
    let index = code.trailing_zeros() as usize;
    (DIRECTIONS[index].code == code).then_some(index)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_distinct_powers_of_two() {
        for (i, dir) in DIRECTIONS.iter().enumerate() {
            assert_eq!(dir.code, 1 << i);
        }
    }

    #[test]
    fn test_opposite_reverses_offsets() {
        for (i, dir) in DIRECTIONS.iter().enumerate() {
            let opp = &DIRECTIONS[opposite(i)];
            assert_eq!(dir.d_row, -opp.d_row);
            assert_eq!(dir.d_col, -opp.d_col);
        }
    }

    #[test]
    fn test_from_code_roundtrip() {
        for (i, dir) in DIRECTIONS.iter().enumerate() {
            assert_eq!(from_code(dir.code), Some(i));
        }
        assert_eq!(from_code(0), None);
        assert_eq!(from_code(-1), None);
        assert_eq!(from_code(3), None);
        assert_eq!(from_code(256), None);
    }

    #[test]
    fn test_diagonals_have_sqrt2_step() {
        for dir in &DIRECTIONS {
            let diagonal = dir.d_row != 0 && dir.d_col != 0;
            let expected = if diagonal { SQRT_2 } else { 1.0 };
            assert_eq!(dir.step, expected);
        }
    }
}
