use serde::{Deserialize, Serialize};

use crate::problem::ProblemError;

/// Optimization sense
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sense {
    #[default]
    Minimize,
    Maximize,
}

impl Sense {
    pub fn as_str(self) -> &'static str {
        match self {
            Sense::Minimize => "minimize",
            Sense::Maximize => "maximize",
        }
    }

    /// Multiplier that turns this sense into minimization.
    pub fn min_factor(self) -> f64 {
        match self {
            Sense::Minimize => 1.0,
            Sense::Maximize => -1.0,
        }
    }
}

/// Constraint row type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RowType {
    /// `a·x <= rhs`
    LessEqual,
    /// `a·x >= rhs`
    GreaterEqual,
    /// `a·x == rhs`
    Equal,
    /// `rhs - |range| <= a·x <= rhs`
    Range,
}

impl RowType {
    pub fn from_code(code: char) -> Result<Self, ProblemError> {
        match code.to_ascii_uppercase() {
            'L' => Ok(RowType::LessEqual),
            'G' => Ok(RowType::GreaterEqual),
            'E' => Ok(RowType::Equal),
            'R' => Ok(RowType::Range),
            _ => Err(ProblemError::InvalidRowType { code }),
        }
    }

    pub fn code(self) -> char {
        match self {
            RowType::LessEqual => 'L',
            RowType::GreaterEqual => 'G',
            RowType::Equal => 'E',
            RowType::Range => 'R',
        }
    }

    /// Parse a string of row type codes such as `"LLG"`.
    pub fn parse_codes(codes: &str) -> Result<Vec<Self>, ProblemError> {
        codes.chars().map(RowType::from_code).collect()
    }

    /// Activity bounds implied by a row type, right-hand side and range width.
    pub fn bounds(self, rhs: f64, range: f64) -> Bounds {
        match self {
            RowType::LessEqual => Bounds::new(f64::NEG_INFINITY, rhs),
            RowType::GreaterEqual => Bounds::new(rhs, f64::INFINITY),
            RowType::Equal => Bounds::new(rhs, rhs),
            RowType::Range => Bounds::new(rhs - range.abs(), rhs),
        }
    }
}

/// Column integrality marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ColumnType {
    #[default]
    Continuous,
    Integer,
    /// Integer restricted to `[0, 1]`.
    Binary,
}

impl ColumnType {
    pub fn from_code(code: char) -> Result<Self, ProblemError> {
        match code.to_ascii_uppercase() {
            'C' => Ok(ColumnType::Continuous),
            'I' => Ok(ColumnType::Integer),
            'B' => Ok(ColumnType::Binary),
            _ => Err(ProblemError::InvalidColumnType { code }),
        }
    }

    pub fn code(self) -> char {
        match self {
            ColumnType::Continuous => 'C',
            ColumnType::Integer => 'I',
            ColumnType::Binary => 'B',
        }
    }

    /// Parse a string of column type codes such as `"CIC"`.
    pub fn parse_codes(codes: &str) -> Result<Vec<Self>, ProblemError> {
        codes.chars().map(ColumnType::from_code).collect()
    }

    pub fn is_integer(self) -> bool {
        !matches!(self, ColumnType::Continuous)
    }
}

/// Lower and upper bound pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub lower: f64,
    pub upper: f64,
}

impl Bounds {
    pub fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }

    pub fn contains(&self, value: f64, tolerance: f64) -> bool {
        value >= self.lower - tolerance && value <= self.upper + tolerance
    }
}

/// Problem class declared by the loaded annotations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProblemClass {
    /// Pure linear program.
    Linear,
    /// Carries integer, semi-continuous, SOS or priority annotations.
    Mixed,
}

impl ProblemClass {
    pub fn as_str(self) -> &'static str {
        match self {
            ProblemClass::Linear => "lp",
            ProblemClass::Mixed => "mip",
        }
    }
}

/// Preferred first branch for a prioritized column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BranchDirection {
    Down,
    Up,
    #[default]
    Auto,
}

impl BranchDirection {
    /// Decode the integer convention used by packed priority arrays:
    /// negative is down, positive is up, zero lets the engine choose.
    pub fn from_code(code: i32) -> Self {
        match code.signum() {
            -1 => BranchDirection::Down,
            1 => BranchDirection::Up,
            _ => BranchDirection::Auto,
        }
    }
}

/// Special-ordered-set kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SosKind {
    /// At most one member may be nonzero.
    Type1,
    /// At most two adjacent members may be nonzero.
    Type2,
}

impl SosKind {
    pub fn from_code(code: i32) -> Result<Self, ProblemError> {
        match code {
            1 => Ok(SosKind::Type1),
            2 => Ok(SosKind::Type2),
            _ => Err(ProblemError::InvalidSosType { code }),
        }
    }

    pub fn code(self) -> i32 {
        match self {
            SosKind::Type1 => 1,
            SosKind::Type2 => 2,
        }
    }

    /// Maximum number of adjacent nonzero members.
    pub fn max_nonzero(self) -> usize {
        match self {
            SosKind::Type1 => 1,
            SosKind::Type2 => 2,
        }
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_row_type_codes() {
        assert_eq!(
            RowType::parse_codes("LGER").unwrap(),
            vec![
                RowType::LessEqual,
                RowType::GreaterEqual,
                RowType::Equal,
                RowType::Range
            ]
        );
        assert_eq!(RowType::from_code('l').unwrap(), RowType::LessEqual);
        assert!(matches!(
            RowType::from_code('X'),
            Err(ProblemError::InvalidRowType { code: 'X' })
        ));
    }

    #[test]
    fn test_row_bounds() {
        assert_eq!(
            RowType::LessEqual.bounds(5.0, 0.0),
            Bounds::new(f64::NEG_INFINITY, 5.0)
        );
        assert_eq!(
            RowType::GreaterEqual.bounds(5.0, 0.0),
            Bounds::new(5.0, f64::INFINITY)
        );
        assert_eq!(RowType::Equal.bounds(5.0, 3.0), Bounds::new(5.0, 5.0));
        assert_eq!(RowType::Range.bounds(5.0, -3.0), Bounds::new(2.0, 5.0));
    }

    #[test]
    fn test_column_type_codes() {
        let types = ColumnType::parse_codes("CIB").unwrap();
        assert_eq!(
            types,
            vec![ColumnType::Continuous, ColumnType::Integer, ColumnType::Binary]
        );
        assert!(!types[0].is_integer());
        assert!(types[1].is_integer());
        assert!(types[2].is_integer());
        assert!(ColumnType::from_code('Z').is_err());
    }

    #[test]
    fn test_branch_direction_from_code() {
        assert_eq!(BranchDirection::from_code(-3), BranchDirection::Down);
        assert_eq!(BranchDirection::from_code(1), BranchDirection::Up);
        assert_eq!(BranchDirection::from_code(0), BranchDirection::Auto);
    }

    #[test]
    fn test_sos_kind() {
        assert_eq!(SosKind::from_code(2).unwrap(), SosKind::Type2);
        assert_eq!(SosKind::Type1.max_nonzero(), 1);
        assert!(SosKind::from_code(3).is_err());
    }
}
