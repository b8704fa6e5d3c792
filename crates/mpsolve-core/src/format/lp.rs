//! CPLEX-style LP writer.

use std::io::Write;

use crate::format::{check_name, stream_error, FormatError};
use crate::problem::{NameKind, Problem};
use crate::types::{ColumnType, RowType, Sense, SosKind};

const TERMS_PER_LINE: usize = 8;

fn bound(value: f64) -> String {
    if value == f64::INFINITY {
        "+inf".to_string()
    } else if value == f64::NEG_INFINITY {
        "-inf".to_string()
    } else {
        format!("{value}")
    }
}

/// Render `sum coeff * name`, wrapping long expressions.
fn expression(terms: &[(f64, &str)]) -> String {
    let mut out = String::new();
    for (position, (coeff, name)) in terms.iter().enumerate() {
        if position > 0 && position % TERMS_PER_LINE == 0 {
            out.push_str("\n   ");
        }
        if position == 0 {
            if *coeff < 0.0 {
                out.push_str(&format!("-{} {}", coeff.abs(), name));
            } else {
                out.push_str(&format!("{coeff} {name}"));
            }
        } else if *coeff < 0.0 {
            out.push_str(&format!(" - {} {}", coeff.abs(), name));
        } else {
            out.push_str(&format!(" + {coeff} {name}"));
        }
    }
    out
}

/// Write `problem` in LP format.
pub fn write<W: Write>(problem: &Problem, out: &mut W) -> Result<(), FormatError> {
    let columns: Vec<String> = (0..problem.num_columns())
        .map(|column| problem.column_name(column).into_owned())
        .collect();
    for name in &columns {
        check_name(NameKind::Column, name)?;
    }
    let rows: Vec<String> = (0..problem.num_rows())
        .map(|row| problem.row_name(row).into_owned())
        .collect();
    for name in &rows {
        check_name(NameKind::Row, name)?;
    }
    check_name(NameKind::Row, problem.objective_name())?;

    let mut text = String::new();
    text.push_str(&format!("\\ Problem name: {}\n", problem.name()));
    text.push_str(match problem.sense() {
        Sense::Minimize => "Minimize\n",
        Sense::Maximize => "Maximize\n",
    });
    let objective: Vec<(f64, &str)> = problem
        .objective()
        .iter()
        .zip(&columns)
        .filter(|(coeff, _)| **coeff != 0.0)
        .map(|(coeff, name)| (*coeff, name.as_str()))
        .collect();
    let mut objective_text = expression(&objective);
    let constant = problem.objective_constant();
    if constant != 0.0 || objective_text.is_empty() {
        if objective_text.is_empty() {
            objective_text = format!("{constant}");
        } else if constant < 0.0 {
            objective_text.push_str(&format!(" - {}", constant.abs()));
        } else {
            objective_text.push_str(&format!(" + {constant}"));
        }
    }
    text.push_str(&format!(" {}: {}\n", problem.objective_name(), objective_text));

    text.push_str("Subject To\n");
    let row_terms = problem.matrix().rows();
    for (row, entries) in row_terms.iter().enumerate() {
        let mut terms: Vec<(f64, &str)> = entries
            .iter()
            .map(|(column, coeff)| (*coeff, columns[*column].as_str()))
            .collect();
        if terms.is_empty() {
            if let Some(first) = columns.first() {
                terms.push((0.0, first.as_str()));
            }
        }
        let expr = expression(&terms);
        let rhs = problem.rhs()[row];
        let line = match problem.row_types()[row] {
            RowType::LessEqual => format!("{expr} <= {rhs}"),
            RowType::GreaterEqual => format!("{expr} >= {rhs}"),
            RowType::Equal => format!("{expr} = {rhs}"),
            RowType::Range => {
                let bounds = problem.row_types()[row].bounds(rhs, problem.ranges()[row]);
                format!("{} <= {expr} <= {}", bounds.lower, bounds.upper)
            }
        };
        text.push_str(&format!(" {}: {}\n", rows[row], line));
    }

    let mut bound_lines = Vec::new();
    for (column, name) in columns.iter().enumerate() {
        let lower = problem.column_lower()[column];
        let upper = problem.column_upper()[column];
        if problem.column_type(column) == ColumnType::Binary && lower == 0.0 && upper == 1.0 {
            continue;
        }
        let line = if lower == upper {
            format!(" {name} = {}", bound(lower))
        } else if lower == f64::NEG_INFINITY && upper == f64::INFINITY {
            format!(" {name} free")
        } else if lower == 0.0 && upper == f64::INFINITY {
            continue;
        } else if upper == f64::INFINITY {
            format!(" {name} >= {}", bound(lower))
        } else {
            format!(" {} <= {name} <= {}", bound(lower), bound(upper))
        };
        bound_lines.push(line);
    }
    if !bound_lines.is_empty() {
        text.push_str("Bounds\n");
        for line in bound_lines {
            text.push_str(&line);
            text.push('\n');
        }
    }

    let general: Vec<&str> = (0..problem.num_columns())
        .filter(|&column| problem.column_type(column) == ColumnType::Integer)
        .map(|column| columns[column].as_str())
        .collect();
    if !general.is_empty() {
        text.push_str("General\n");
        text.push_str(&format!(" {}\n", general.join(" ")));
    }
    let binary: Vec<&str> = (0..problem.num_columns())
        .filter(|&column| problem.column_type(column) == ColumnType::Binary)
        .map(|column| columns[column].as_str())
        .collect();
    if !binary.is_empty() {
        text.push_str("Binary\n");
        text.push_str(&format!(" {}\n", binary.join(" ")));
    }
    if !problem.semi_continuous().is_empty() {
        let names: Vec<&str> = problem
            .semi_continuous()
            .iter()
            .map(|&column| columns[column].as_str())
            .collect();
        text.push_str("Semi-continuous\n");
        text.push_str(&format!(" {}\n", names.join(" ")));
    }
    if !problem.sos_sets().is_empty() {
        text.push_str("SOS\n");
        for (set, sos) in problem.sos_sets().iter().enumerate() {
            let kind = match sos.kind {
                SosKind::Type1 => "S1",
                SosKind::Type2 => "S2",
            };
            let members: Vec<String> = sos
                .members
                .iter()
                .map(|member| format!("{}:{}", columns[member.column], member.weight))
                .collect();
            text.push_str(&format!(" sos{}: {}:: {}\n", set + 1, kind, members.join(" ")));
        }
    }
    text.push_str("End\n");

    out.write_all(text.as_bytes()).map_err(stream_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::MatrixInput;

    fn sample() -> Problem {
        let mut problem = Problem::new("sample");
        problem
            .load_matrix(MatrixInput {
                col_count: 2,
                row_count: 2,
                nonzero_count: 3,
                range_count: 1,
                sense: Sense::Minimize,
                objective_constant: 2.5,
                objective: &[1.0, -3.0],
                lower_bounds: Some(&[f64::NEG_INFINITY, 1.0]),
                upper_bounds: Some(&[f64::INFINITY, 4.0]),
                row_types: &[RowType::GreaterEqual, RowType::Range],
                rhs: &[1.0, 10.0],
                ranges: Some(&[0.0, 6.0]),
                begin: &[0, 2, 3],
                count: None,
                index: &[0, 1, 1],
                value: &[1.0, 2.0, -1.0],
            })
            .unwrap();
        problem.load_column_type_codes("CI").unwrap();
        problem
    }

    #[test]
    fn test_lp_sections() {
        let mut out = Vec::new();
        write(&sample(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("\\ Problem name: sample\nMinimize\n OBJ: 1 C1 - 3 C2 + 2.5\n"));
        assert!(text.contains(" R1: 1 C1 >= 1\n"));
        assert!(text.contains(" R2: 4 <= 2 C1 - 1 C2 <= 10\n"));
        assert!(text.contains("Bounds\n C1 free\n 1 <= C2 <= 4\n"));
        assert!(text.contains("General\n C2\n"));
        assert!(text.ends_with("End\n"));
    }
}
