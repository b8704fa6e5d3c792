//! Mixed-integer annotations: integer markers, branching priorities,
//! special ordered sets, semi-continuous columns and initial values.

use crate::problem::error::ProblemError;
use crate::problem::Problem;
use crate::types::{BranchDirection, ColumnType, SosKind};

/// Branching priority override for one column.
///
/// Lower `priority` values are branched on first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BranchPriority {
    pub column: usize,
    pub priority: i32,
    pub direction: BranchDirection,
}

/// One member of a special ordered set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SosMember {
    pub column: usize,
    /// Reference weight that orders the set.
    pub weight: f64,
}

/// A special ordered set of type 1 or 2.
#[derive(Debug, Clone, PartialEq)]
pub struct SosSet {
    pub kind: SosKind,
    pub priority: i32,
    pub members: Vec<SosMember>,
}

impl SosSet {
    pub fn new(kind: SosKind, members: Vec<SosMember>) -> Self {
        Self {
            kind,
            priority: 0,
            members,
        }
    }

    /// Members sorted by ascending reference weight.
    pub fn ordered_members(&self) -> Vec<SosMember> {
        let mut members = self.members.clone();
        members.sort_by(|a, b| a.weight.total_cmp(&b.weight));
        members
    }
}

/// SOS sets in packed form: set `k` owns `index[begin[k]..begin[k + 1]]`.
///
/// `begin` may hold `sos_count` or `sos_count + 1` offsets; the last set then
/// ends at `nonzero_count`. Missing reference weights default to `1, 2, ...`
/// within each set.
#[derive(Debug, Clone, Copy)]
pub struct SosInput<'a> {
    pub sos_count: usize,
    pub nonzero_count: usize,
    pub types: &'a [i32],
    pub priorities: Option<&'a [i32]>,
    pub begin: &'a [usize],
    pub index: &'a [usize],
    pub reference: Option<&'a [f64]>,
}

fn sos_error(reason: String) -> ProblemError {
    ProblemError::InvalidSosData { reason }
}

impl SosInput<'_> {
    fn into_sets(self) -> Result<Vec<SosSet>, ProblemError> {
        let count = self.sos_count;
        if self.types.len() != count {
            return Err(sos_error(format!(
                "{} types for {} sets",
                self.types.len(),
                count
            )));
        }
        if let Some(priorities) = self.priorities {
            if priorities.len() != count {
                return Err(sos_error(format!(
                    "{} priorities for {} sets",
                    priorities.len(),
                    count
                )));
            }
        }
        if self.begin.len() != count && self.begin.len() != count + 1 {
            return Err(sos_error(format!(
                "{} begin offsets for {} sets",
                self.begin.len(),
                count
            )));
        }
        if self.index.len() != self.nonzero_count {
            return Err(sos_error(format!(
                "declared {} members but index holds {}",
                self.nonzero_count,
                self.index.len()
            )));
        }
        if let Some(reference) = self.reference {
            if reference.len() != self.nonzero_count {
                return Err(sos_error(format!(
                    "{} reference weights for {} members",
                    reference.len(),
                    self.nonzero_count
                )));
            }
        }

        let mut sets = Vec::with_capacity(count);
        for set in 0..count {
            let start = self.begin[set];
            let end = self
                .begin
                .get(set + 1)
                .copied()
                .unwrap_or(self.nonzero_count);
            if start > end || end > self.nonzero_count {
                return Err(sos_error(format!(
                    "set {set} spans {start}..{end} outside {} members",
                    self.nonzero_count
                )));
            }
            let members = (start..end)
                .map(|position| SosMember {
                    column: self.index[position],
                    weight: self
                        .reference
                        .map_or((position - start + 1) as f64, |weights| weights[position]),
                })
                .collect();
            sets.push(SosSet {
                kind: SosKind::from_code(self.types[set])?,
                priority: self.priorities.map_or(0, |p| p[set]),
                members,
            });
        }
        Ok(sets)
    }
}

impl Problem {
    /// Load per-column integrality markers.
    ///
    /// Binary columns get their bounds clamped to `[0, 1]`. A later load
    /// first restores the bounds a previous load clamped.
    pub fn load_column_types(&mut self, types: &[ColumnType]) -> Result<(), ProblemError> {
        self.ensure_loaded("load_column_types")?;
        if types.len() != self.num_columns() {
            return Err(ProblemError::LengthMismatch {
                field: "column types",
                expected: self.num_columns(),
                got: types.len(),
            });
        }
        for (column, lower, upper) in self.unclamped_bounds.drain(..) {
            self.col_lower[column] = lower;
            self.col_upper[column] = upper;
        }
        for (column, column_type) in types.iter().enumerate() {
            if *column_type == ColumnType::Binary {
                let (lower, upper) = (self.col_lower[column], self.col_upper[column]);
                self.unclamped_bounds.push((column, lower, upper));
                self.col_lower[column] = lower.max(0.0);
                self.col_upper[column] = upper.min(1.0);
            }
        }
        self.column_types = Some(types.to_vec());
        tracing::debug!(
            component = "problem",
            operation = "load_integer",
            status = "success",
            problem = %self.name,
            integer_columns = self.num_integer_columns(),
            "Loaded column integrality"
        );
        Ok(())
    }

    /// Load integrality from a string of `C`/`I`/`B` codes.
    pub fn load_column_type_codes(&mut self, codes: &str) -> Result<(), ProblemError> {
        let types = ColumnType::parse_codes(codes)?;
        self.load_column_types(&types)
    }

    /// Load branching priority overrides.
    pub fn load_priorities(&mut self, priorities: &[BranchPriority]) -> Result<(), ProblemError> {
        self.ensure_loaded("load_priorities")?;
        for priority in priorities {
            self.ensure_column("priorities", priority.column)?;
        }
        self.priorities = priorities.to_vec();
        tracing::debug!(
            component = "problem",
            operation = "load_priorities",
            status = "success",
            problem = %self.name,
            count = priorities.len(),
            "Loaded branching priorities"
        );
        Ok(())
    }

    /// Load priorities from parallel arrays; `branch` uses the sign
    /// convention of [`BranchDirection::from_code`].
    pub fn load_priority_arrays(
        &mut self,
        index: &[usize],
        values: &[i32],
        branch: Option<&[i32]>,
    ) -> Result<(), ProblemError> {
        if values.len() != index.len() {
            return Err(ProblemError::LengthMismatch {
                field: "priority values",
                expected: index.len(),
                got: values.len(),
            });
        }
        if let Some(branch) = branch {
            if branch.len() != index.len() {
                return Err(ProblemError::LengthMismatch {
                    field: "priority branch",
                    expected: index.len(),
                    got: branch.len(),
                });
            }
        }
        let priorities: Vec<BranchPriority> = index
            .iter()
            .enumerate()
            .map(|(position, &column)| BranchPriority {
                column,
                priority: values[position],
                direction: branch
                    .map_or(BranchDirection::Auto, |b| BranchDirection::from_code(b[position])),
            })
            .collect();
        self.load_priorities(&priorities)
    }

    /// Load special ordered sets.
    pub fn load_sos(&mut self, sets: Vec<SosSet>) -> Result<(), ProblemError> {
        self.ensure_loaded("load_sos")?;
        for set in &sets {
            for member in &set.members {
                self.ensure_column("sos members", member.column)?;
                if !member.weight.is_finite() {
                    return Err(sos_error(format!(
                        "non-finite weight for column {}",
                        member.column
                    )));
                }
            }
        }
        tracing::debug!(
            component = "problem",
            operation = "load_sos",
            status = "success",
            problem = %self.name,
            sets = sets.len(),
            members = sets.iter().map(|s| s.members.len()).sum::<usize>(),
            "Loaded special ordered sets"
        );
        self.sos_sets = sets;
        Ok(())
    }

    /// Load special ordered sets from packed arrays.
    pub fn load_sos_packed(&mut self, input: SosInput<'_>) -> Result<(), ProblemError> {
        self.ensure_loaded("load_sos")?;
        let sets = input.into_sets()?;
        self.load_sos(sets)
    }

    /// Mark columns as semi-continuous: zero, or within their bounds.
    pub fn load_semi_continuous(&mut self, columns: &[usize]) -> Result<(), ProblemError> {
        self.ensure_loaded("load_semi_continuous")?;
        for &column in columns {
            self.ensure_column("semi-continuous", column)?;
        }
        let mut sorted = columns.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        tracing::debug!(
            component = "problem",
            operation = "load_semi_continuous",
            status = "success",
            problem = %self.name,
            count = sorted.len(),
            "Loaded semi-continuous columns"
        );
        self.semi_continuous = sorted;
        Ok(())
    }

    /// Provide a primal starting point.
    pub fn load_initial_values(&mut self, values: &[f64]) -> Result<(), ProblemError> {
        self.ensure_loaded("load_initial_values")?;
        if values.len() != self.num_columns() {
            return Err(ProblemError::LengthMismatch {
                field: "initial values",
                expected: self.num_columns(),
                got: values.len(),
            });
        }
        self.initial_values = Some(values.to_vec());
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::problem::tests::support::bakery;

    #[test]
    fn test_binary_clamps_bounds() {
        let mut problem = bakery();
        problem.load_column_type_codes("BC").unwrap();
        assert_eq!(problem.column_lower()[0], 0.0);
        assert_eq!(problem.column_upper()[0], 1.0);
        assert_eq!(problem.column_upper()[1], 1_000_000.0);
        assert!(problem.is_integer(0));
        assert!(!problem.is_integer(1));
    }

    #[test]
    fn test_reloading_continuous_restores_bounds() {
        let mut problem = bakery();
        problem.load_column_type_codes("BB").unwrap();
        problem.load_column_type_codes("CB").unwrap();
        assert_eq!(problem.column_upper()[0], 1_000_000.0);
        assert_eq!(problem.column_upper()[1], 1.0);

        problem.load_column_type_codes("CC").unwrap();
        assert_eq!(problem.column_lower(), &[0.0, 0.0]);
        assert_eq!(problem.column_upper(), &[1_000_000.0, 1_000_000.0]);
        assert_eq!(problem.num_integer_columns(), 0);
    }

    #[test]
    fn test_column_type_length_mismatch() {
        let mut problem = bakery();
        let err = problem.load_column_type_codes("I").unwrap_err();
        assert!(matches!(err, ProblemError::LengthMismatch { expected: 2, got: 1, .. }));
        assert!(problem.column_types().is_none());
    }

    #[test]
    fn test_priority_arrays() {
        let mut problem = bakery();
        problem
            .load_priority_arrays(&[1, 0], &[5, 10], Some(&[1, -1]))
            .unwrap();
        assert_eq!(
            problem.priorities()[0],
            BranchPriority {
                column: 1,
                priority: 5,
                direction: BranchDirection::Up
            }
        );
        assert_eq!(problem.priorities()[1].direction, BranchDirection::Down);
    }

    #[test]
    fn test_priority_column_out_of_range() {
        let mut problem = bakery();
        let err = problem.load_priority_arrays(&[7], &[1], None).unwrap_err();
        assert_eq!(err.code(), "COLUMN_OUT_OF_BOUNDS");
    }

    #[test]
    fn test_sos_packed_default_weights() {
        let mut problem = bakery();
        problem
            .load_sos_packed(SosInput {
                sos_count: 1,
                nonzero_count: 2,
                types: &[1],
                priorities: None,
                begin: &[0],
                index: &[0, 1],
                reference: None,
            })
            .unwrap();
        let set = &problem.sos_sets()[0];
        assert_eq!(set.kind, SosKind::Type1);
        assert_eq!(set.members[1].weight, 2.0);
    }

    #[test]
    fn test_sos_packed_rejects_bad_counts() {
        let mut problem = bakery();
        let err = problem
            .load_sos_packed(SosInput {
                sos_count: 1,
                nonzero_count: 3,
                types: &[2],
                priorities: None,
                begin: &[0, 2],
                index: &[0, 1],
                reference: None,
            })
            .unwrap_err();
        assert_eq!(err.code(), "SOS_INVALID_DATA");
    }

    #[test]
    fn test_semi_continuous_dedups() {
        let mut problem = bakery();
        problem.load_semi_continuous(&[1, 0, 1]).unwrap();
        assert_eq!(problem.semi_continuous(), &[0, 1]);
        assert!(problem.is_semi_continuous(1));
    }

    #[test]
    fn test_initial_values_length() {
        let mut problem = bakery();
        assert!(problem.load_initial_values(&[1.0]).is_err());
        problem.load_initial_values(&[1.0, 2.0]).unwrap();
        assert_eq!(problem.initial_values(), Some(&[1.0, 2.0][..]));
    }
}
