//! Consistency validation.

use std::collections::HashSet;

use crate::problem::error::{ConsistencyError, Issue, NameKind};
use crate::problem::Problem;

impl Problem {
    /// Validate the loaded problem without changing it.
    ///
    /// Every violation is collected; the first one does not short-circuit.
    pub fn check(&self) -> Result<(), ConsistencyError> {
        let issues = self.collect_issues();
        if issues.is_empty() {
            tracing::debug!(
                component = "problem",
                operation = "check",
                status = "success",
                problem = %self.name,
                "Problem is consistent"
            );
            return Ok(());
        }
        tracing::warn!(
            component = "problem",
            operation = "check",
            status = "error",
            problem = %self.name,
            issues = issues.len(),
            first = %issues[0],
            "Problem check failed"
        );
        Err(ConsistencyError { issues })
    }

    fn collect_issues(&self) -> Vec<Issue> {
        if !self.loaded {
            return vec![Issue::NotLoaded];
        }
        let mut issues = Vec::new();
        self.check_columns(&mut issues);
        self.check_rows(&mut issues);
        self.check_matrix(&mut issues);
        self.check_names(&mut issues);
        self.check_mip(&mut issues);
        issues
    }

    fn check_columns(&self, issues: &mut Vec<Issue>) {
        for (column, (&lower, &upper)) in self.col_lower.iter().zip(&self.col_upper).enumerate() {
            if lower.is_nan() || upper.is_nan() || lower == f64::INFINITY || upper == f64::NEG_INFINITY
            {
                issues.push(Issue::ColumnBoundsInvalid {
                    column,
                    lower,
                    upper,
                });
            } else if lower > upper {
                issues.push(Issue::ColumnBoundsInverted {
                    column,
                    lower,
                    upper,
                });
            }
        }
        for (column, coeff) in self.objective.iter().enumerate() {
            if !coeff.is_finite() {
                issues.push(Issue::ObjectiveInvalid { column });
            }
        }
    }

    fn check_rows(&self, issues: &mut Vec<Issue>) {
        for (row, (&rhs, &range)) in self.rhs.iter().zip(&self.ranges).enumerate() {
            if !rhs.is_finite() || !range.is_finite() || range < 0.0 {
                issues.push(Issue::RowValueInvalid { row, rhs, range });
            }
        }
    }

    fn check_matrix(&self, issues: &mut Vec<Issue>) {
        let rows = self.num_rows();
        for column in 0..self.matrix.num_columns() {
            for (row, coeff) in self.matrix.column(column) {
                if row >= rows {
                    issues.push(Issue::MatrixIndexOutOfRange { column, row });
                } else if !coeff.is_finite() {
                    issues.push(Issue::MatrixValueInvalid { column, row });
                }
            }
        }
    }

    fn check_names(&self, issues: &mut Vec<Issue>) {
        for (kind, table) in [
            (NameKind::Column, self.column_names.as_ref()),
            (NameKind::Row, self.row_names.as_ref()),
        ] {
            let Some(table) = table else { continue };
            for (name, first, second) in table.duplicates() {
                issues.push(Issue::DuplicateName {
                    kind,
                    name,
                    first,
                    second,
                });
            }
        }
        let objective = self.objective_name();
        if let Some(row) = self.row_by_name(objective) {
            issues.push(Issue::ObjectiveNameClash {
                name: objective.to_string(),
                row,
            });
        }
    }

    fn check_mip(&self, issues: &mut Vec<Issue>) {
        let columns = self.num_columns();
        for &column in &self.semi_continuous {
            if column < columns && !self.col_upper[column].is_finite() {
                issues.push(Issue::SemiContinuousUnbounded { column });
            }
        }

        for (set, sos) in self.sos_sets.iter().enumerate() {
            let mut seen = HashSet::with_capacity(sos.members.len());
            for member in &sos.members {
                if member.column >= columns {
                    issues.push(Issue::SosMemberOutOfRange {
                        set,
                        column: member.column,
                    });
                } else if !seen.insert(member.column) {
                    issues.push(Issue::SosMemberDuplicated {
                        set,
                        column: member.column,
                    });
                }
            }
            let ordered = sos.ordered_members();
            if ordered.windows(2).any(|pair| pair[0].weight >= pair[1].weight) {
                issues.push(Issue::SosWeightsNotDistinct { set });
            }
        }

        for priority in &self.priorities {
            if priority.column >= columns {
                issues.push(Issue::PriorityColumnOutOfRange {
                    column: priority.column,
                });
            }
        }
    }
}
