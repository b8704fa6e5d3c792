//! MPS writer and reader.
//!
//! The reader tokenizes on whitespace, so it accepts both fixed and free
//! layouts as long as names contain no spaces. Section headers start in the
//! first column; data lines are indented.

use std::collections::HashMap;
use std::io::{BufRead, Write};

use crate::format::{check_name, stream_error, FormatError};
use crate::problem::{MatrixInput, NameKind, Problem, SosMember, SosSet};
use crate::types::{ColumnType, RowType, Sense, SosKind};

const RHS_SET: &str = "RHS";
const RANGE_SET: &str = "RNG";
const BOUND_SET: &str = "BND";
const SOS_SET_PREFIX: &str = "SOS";

/// Field layout of written MPS lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Fields padded to the classic column positions
    Fixed,
    /// Fields separated by single spaces
    Free,
}

struct LineWriter<'w, W: Write> {
    layout: Layout,
    out: &'w mut W,
}

impl<W: Write> LineWriter<'_, W> {
    fn header(&mut self, text: &str) -> Result<(), FormatError> {
        writeln!(self.out, "{text}").map_err(stream_error)
    }

    /// Data line: a short code field followed by name/value fields.
    fn data(&mut self, code: &str, fields: &[&str]) -> Result<(), FormatError> {
        let mut line = String::with_capacity(64);
        match self.layout {
            Layout::Fixed => {
                line.push(' ');
                line.push_str(&format!("{code:<2}"));
                line.push(' ');
                for (position, field) in fields.iter().enumerate() {
                    // Values sit in the third and fifth fields.
                    let width = if position == 2 || position == 4 { 12 } else { 8 };
                    line.push_str(&format!("{field:<width$}"));
                    if position + 1 < fields.len() {
                        line.push_str("  ");
                    }
                }
            }
            Layout::Free => {
                line.push(' ');
                if !code.is_empty() {
                    line.push_str(code);
                    line.push(' ');
                } else {
                    line.push_str("   ");
                }
                line.push_str(&fields.join(" "));
            }
        }
        writeln!(self.out, "{}", line.trim_end()).map_err(stream_error)
    }
}

fn number(value: f64) -> String {
    format!("{value}")
}

/// Write `problem` as MPS.
pub fn write<W: Write>(problem: &Problem, layout: Layout, out: &mut W) -> Result<(), FormatError> {
    let columns: Vec<String> = (0..problem.num_columns())
        .map(|column| problem.column_name(column).into_owned())
        .collect();
    let rows: Vec<String> = (0..problem.num_rows())
        .map(|row| problem.row_name(row).into_owned())
        .collect();
    for name in &columns {
        check_name(NameKind::Column, name)?;
    }
    for name in &rows {
        check_name(NameKind::Row, name)?;
    }
    let objective = problem.objective_name();
    check_name(NameKind::Row, objective)?;

    let mut w = LineWriter { layout, out };
    if problem.name().is_empty() {
        w.header("NAME")?;
    } else {
        w.header(&format!("NAME          {}", problem.name()))?;
    }
    if problem.sense() == Sense::Maximize {
        w.header("OBJSENSE")?;
        w.data("", &["MAX"])?;
    }

    w.header("ROWS")?;
    w.data("N", &[objective])?;
    for (row, name) in rows.iter().enumerate() {
        let code = match problem.row_types()[row] {
            RowType::LessEqual | RowType::Range => "L",
            RowType::GreaterEqual => "G",
            RowType::Equal => "E",
        };
        w.data(code, &[name.as_str()])?;
    }

    w.header("COLUMNS")?;
    let matrix = problem.matrix();
    let mut in_marker = false;
    let mut marker = 0usize;
    for (column, name) in columns.iter().enumerate() {
        let integer = problem.is_integer(column);
        if integer != in_marker {
            let (tag, label) = if integer {
                ("'INTORG'", format!("MARKER{marker:02}"))
            } else {
                ("'INTEND'", format!("MARKER{marker:02}"))
            };
            w.data("", &[label.as_str(), "'MARKER'", tag])?;
            marker += 1;
            in_marker = integer;
        }
        let coeff = problem.objective()[column];
        if coeff != 0.0 || matrix.count(column) == 0 {
            w.data("", &[name.as_str(), objective, number(coeff).as_str()])?;
        }
        for (row, value) in matrix.column(column) {
            w.data("", &[name.as_str(), rows[row].as_str(), number(value).as_str()])?;
        }
    }
    if in_marker {
        let label = format!("MARKER{marker:02}");
        w.data("", &[label.as_str(), "'MARKER'", "'INTEND'"])?;
    }

    w.header("RHS")?;
    if problem.objective_constant() != 0.0 {
        let value = number(-problem.objective_constant());
        w.data("", &[RHS_SET, objective, value.as_str()])?;
    }
    for (row, name) in rows.iter().enumerate() {
        let rhs = problem.rhs()[row];
        if rhs != 0.0 {
            w.data("", &[RHS_SET, name.as_str(), number(rhs).as_str()])?;
        }
    }

    let range_rows: Vec<usize> = (0..problem.num_rows())
        .filter(|&row| problem.row_types()[row] == RowType::Range)
        .collect();
    if !range_rows.is_empty() {
        w.header("RANGES")?;
        for row in range_rows {
            let value = number(problem.ranges()[row]);
            w.data("", &[RANGE_SET, rows[row].as_str(), value.as_str()])?;
        }
    }

    let mut bounds: Vec<(&str, &str, Option<String>)> = Vec::new();
    for (column, name) in columns.iter().enumerate() {
        let lower = problem.column_lower()[column];
        let upper = problem.column_upper()[column];
        if problem.is_semi_continuous(column) {
            if lower != 0.0 {
                bounds.push(("LO", name.as_str(), Some(number(lower))));
            }
            bounds.push(("SC", name.as_str(), Some(number(upper))));
            continue;
        }
        if problem.column_type(column) == ColumnType::Binary && lower == 0.0 && upper == 1.0 {
            bounds.push(("BV", name.as_str(), None));
            continue;
        }
        if lower == upper {
            bounds.push(("FX", name.as_str(), Some(number(lower))));
            continue;
        }
        match (lower.is_finite(), upper.is_finite()) {
            (false, false) => bounds.push(("FR", name.as_str(), None)),
            (false, true) => {
                bounds.push(("MI", name.as_str(), None));
                bounds.push(("UP", name.as_str(), Some(number(upper))));
            }
            (true, upper_finite) => {
                if lower != 0.0 {
                    bounds.push(("LO", name.as_str(), Some(number(lower))));
                }
                if upper_finite {
                    bounds.push(("UP", name.as_str(), Some(number(upper))));
                }
            }
        }
    }
    if !bounds.is_empty() {
        w.header("BOUNDS")?;
        for &(code, name, ref value) in &bounds {
            match value {
                Some(value) => w.data(code, &[BOUND_SET, name, value.as_str()])?,
                None => w.data(code, &[BOUND_SET, name])?,
            }
        }
    }

    if !problem.sos_sets().is_empty() {
        w.header("SOS")?;
        for (set, sos) in problem.sos_sets().iter().enumerate() {
            let set_name = format!("{SOS_SET_PREFIX}{}", set + 1);
            let code = match sos.kind {
                SosKind::Type1 => "S1",
                SosKind::Type2 => "S2",
            };
            let priority = sos.priority.to_string();
            w.data(code, &[SOS_SET_PREFIX, set_name.as_str(), priority.as_str()])?;
            for member in &sos.members {
                let weight = number(member.weight);
                w.data(
                    "",
                    &[set_name.as_str(), columns[member.column].as_str(), weight.as_str()],
                )?;
            }
        }
    }

    w.header("ENDATA")?;
    tracing::trace!(
        component = "format",
        operation = "write_mps",
        status = "success",
        problem = %problem.name(),
        layout = ?layout,
        bounds = bounds.len(),
        "Wrote MPS sections"
    );
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    None,
    ObjSense,
    Rows,
    Columns,
    Rhs,
    Ranges,
    Bounds,
    Sos,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RowSlot {
    Objective,
    // Extra free rows are dropped.
    Free,
    Constraint(usize),
}

#[derive(Debug)]
struct RowEntry {
    code: char,
    rhs: f64,
    range: Option<f64>,
}

#[derive(Debug)]
struct ColumnEntry {
    objective: f64,
    entries: Vec<(usize, f64)>,
    integer: bool,
    binary: bool,
    lower: f64,
    upper: f64,
    semi: bool,
}

#[derive(Debug)]
struct PendingSos {
    kind: SosKind,
    priority: i32,
    members: Vec<(usize, f64)>,
}

#[derive(Debug, Default)]
struct Reader {
    name: String,
    sense: Sense,
    constant: f64,
    objective_name: Option<String>,
    row_slots: HashMap<String, RowSlot>,
    row_names: Vec<String>,
    rows: Vec<RowEntry>,
    column_slots: HashMap<String, usize>,
    column_names: Vec<String>,
    columns: Vec<ColumnEntry>,
    in_integer_block: bool,
    sos_sets: Vec<PendingSos>,
    sos_slots: HashMap<String, usize>,
}

fn parse_number(line: usize, token: &str) -> Result<f64, FormatError> {
    let value: f64 = token
        .parse()
        .map_err(|_| FormatError::parse(line, format!("invalid number '{token}'")))?;
    if value.is_nan() {
        return Err(FormatError::parse(line, "NaN is not a valid value"));
    }
    Ok(value)
}

fn is_number(token: &str) -> bool {
    token.parse::<f64>().is_ok()
}

/// Drop the optional set name in front of `(name, value)` pairs.
fn strip_set_name<'t>(tokens: &'t [&'t str]) -> &'t [&'t str] {
    if tokens.len() % 2 == 1 {
        &tokens[1..]
    } else {
        tokens
    }
}

impl Reader {
    fn section(&mut self, line: usize, tokens: &[&str]) -> Result<Option<Section>, FormatError> {
        let section = match tokens[0].to_ascii_uppercase().as_str() {
            "NAME" => {
                self.name = tokens[1..].join(" ");
                Section::None
            }
            "OBJSENSE" => {
                if let Some(sense) = tokens.get(1) {
                    self.set_sense(line, sense)?;
                    Section::None
                } else {
                    Section::ObjSense
                }
            }
            "ROWS" => Section::Rows,
            "COLUMNS" => Section::Columns,
            "RHS" => Section::Rhs,
            "RANGES" => Section::Ranges,
            "BOUNDS" => Section::Bounds,
            "SOS" => Section::Sos,
            "ENDATA" => return Ok(None),
            other => {
                return Err(FormatError::parse(line, format!("unknown section '{other}'")));
            }
        };
        Ok(Some(section))
    }

    fn set_sense(&mut self, line: usize, token: &str) -> Result<(), FormatError> {
        self.sense = match token.to_ascii_uppercase().as_str() {
            "MAX" | "MAXIMIZE" => Sense::Maximize,
            "MIN" | "MINIMIZE" => Sense::Minimize,
            other => {
                return Err(FormatError::parse(line, format!("unknown objective sense '{other}'")));
            }
        };
        Ok(())
    }

    fn row(&mut self, line: usize, tokens: &[&str]) -> Result<(), FormatError> {
        let [code, name] = tokens else {
            return Err(FormatError::parse(line, "ROWS entry needs a type and a name"));
        };
        let code = code
            .chars()
            .next()
            .map(|c| c.to_ascii_uppercase())
            .unwrap_or(' ');
        if self.row_slots.contains_key(*name) {
            return Err(FormatError::parse(line, format!("duplicate row '{name}'")));
        }
        let slot = match code {
            'N' if self.objective_name.is_none() => {
                self.objective_name = Some((*name).to_string());
                RowSlot::Objective
            }
            'N' => RowSlot::Free,
            'L' | 'G' | 'E' => {
                self.rows.push(RowEntry {
                    code,
                    rhs: 0.0,
                    range: None,
                });
                self.row_names.push((*name).to_string());
                RowSlot::Constraint(self.rows.len() - 1)
            }
            other => {
                return Err(FormatError::parse(line, format!("unknown row type '{other}'")));
            }
        };
        self.row_slots.insert((*name).to_string(), slot);
        Ok(())
    }

    fn row_slot(&self, line: usize, name: &str) -> Result<RowSlot, FormatError> {
        self.row_slots
            .get(name)
            .copied()
            .ok_or_else(|| FormatError::parse(line, format!("unknown row '{name}'")))
    }

    fn column_index(&self, line: usize, name: &str) -> Result<usize, FormatError> {
        self.column_slots
            .get(name)
            .copied()
            .ok_or_else(|| FormatError::parse(line, format!("unknown column '{name}'")))
    }

    fn column(&mut self, line: usize, tokens: &[&str]) -> Result<(), FormatError> {
        if tokens.len() >= 3 && tokens[1].eq_ignore_ascii_case("'MARKER'") {
            match tokens[2].to_ascii_uppercase().as_str() {
                "'INTORG'" => self.in_integer_block = true,
                "'INTEND'" => self.in_integer_block = false,
                other => {
                    return Err(FormatError::parse(line, format!("unknown marker {other}")));
                }
            }
            return Ok(());
        }
        if tokens.len() != 3 && tokens.len() != 5 {
            return Err(FormatError::parse(
                line,
                "COLUMNS entry needs a column and one or two row/value pairs",
            ));
        }
        let name = tokens[0];
        let column = match self.column_slots.get(name) {
            Some(&column) => column,
            None => {
                self.columns.push(ColumnEntry {
                    objective: 0.0,
                    entries: Vec::new(),
                    integer: self.in_integer_block,
                    binary: false,
                    lower: 0.0,
                    upper: f64::INFINITY,
                    semi: false,
                });
                self.column_names.push(name.to_string());
                self.column_slots
                    .insert(name.to_string(), self.columns.len() - 1);
                self.columns.len() - 1
            }
        };
        for pair in tokens[1..].chunks(2) {
            let value = parse_number(line, pair[1])?;
            match self.row_slot(line, pair[0])? {
                RowSlot::Objective => self.columns[column].objective += value,
                RowSlot::Free => {}
                RowSlot::Constraint(row) => self.columns[column].entries.push((row, value)),
            }
        }
        Ok(())
    }

    fn rhs(&mut self, line: usize, tokens: &[&str]) -> Result<(), FormatError> {
        let pairs = strip_set_name(tokens);
        if pairs.is_empty() {
            return Err(FormatError::parse(line, "RHS entry needs a row and a value"));
        }
        for pair in pairs.chunks(2) {
            let value = parse_number(line, pair[1])?;
            match self.row_slot(line, pair[0])? {
                RowSlot::Objective => self.constant = -value,
                RowSlot::Free => {}
                RowSlot::Constraint(row) => self.rows[row].rhs = value,
            }
        }
        Ok(())
    }

    fn range(&mut self, line: usize, tokens: &[&str]) -> Result<(), FormatError> {
        let pairs = strip_set_name(tokens);
        if pairs.is_empty() {
            return Err(FormatError::parse(line, "RANGES entry needs a row and a value"));
        }
        for pair in pairs.chunks(2) {
            let value = parse_number(line, pair[1])?;
            match self.row_slot(line, pair[0])? {
                RowSlot::Constraint(row) => self.rows[row].range = Some(value),
                RowSlot::Objective | RowSlot::Free => {
                    return Err(FormatError::parse(
                        line,
                        format!("range on free row '{}'", pair[0]),
                    ));
                }
            }
        }
        Ok(())
    }

    fn bound(&mut self, line: usize, tokens: &[&str]) -> Result<(), FormatError> {
        let code = tokens[0].to_ascii_uppercase();
        let rest = &tokens[1..];
        let needs_value = matches!(code.as_str(), "UP" | "LO" | "FX" | "LI" | "UI" | "SC");
        let (name, value) = match (needs_value, rest.len()) {
            (_, 3) => (rest[1], Some(rest[2])),
            (true, 2) if code == "SC" && !is_number(rest[1]) => (rest[1], None),
            (true, 2) => (rest[0], Some(rest[1])),
            (false, 2) if self.column_slots.contains_key(rest[0]) && is_number(rest[1]) => {
                (rest[0], Some(rest[1]))
            }
            (false, 2) => (rest[1], None),
            (false, 1) => (rest[0], None),
            _ => {
                return Err(FormatError::parse(line, format!("malformed {code} bound")));
            }
        };
        let column = self.column_index(line, name)?;
        let value = value.map(|token| parse_number(line, token)).transpose()?;
        let entry = &mut self.columns[column];
        let required = || FormatError::parse(line, format!("{code} bound needs a value"));
        match code.as_str() {
            "UP" => entry.upper = value.ok_or_else(required)?,
            "LO" => entry.lower = value.ok_or_else(required)?,
            "FX" => {
                let value = value.ok_or_else(required)?;
                entry.lower = value;
                entry.upper = value;
            }
            "FR" => {
                entry.lower = f64::NEG_INFINITY;
                entry.upper = f64::INFINITY;
            }
            "MI" => entry.lower = f64::NEG_INFINITY,
            "PL" => entry.upper = f64::INFINITY,
            "BV" => {
                entry.integer = true;
                entry.binary = true;
                entry.lower = 0.0;
                entry.upper = 1.0;
            }
            "LI" => {
                entry.integer = true;
                entry.lower = value.ok_or_else(required)?;
            }
            "UI" => {
                entry.integer = true;
                entry.upper = value.ok_or_else(required)?;
            }
            "SC" => {
                entry.semi = true;
                entry.upper = value.unwrap_or(f64::INFINITY);
            }
            other => {
                return Err(FormatError::parse(line, format!("unknown bound type '{other}'")));
            }
        }
        Ok(())
    }

    fn sos(&mut self, line: usize, tokens: &[&str]) -> Result<(), FormatError> {
        let head = tokens[0].to_ascii_uppercase();
        if head == "S1" || head == "S2" {
            let kind = if head == "S1" {
                SosKind::Type1
            } else {
                SosKind::Type2
            };
            // ` S1 SOS <set> [priority]`
            let name = tokens
                .get(2)
                .ok_or_else(|| FormatError::parse(line, "SOS header needs a set name"))?;
            let priority = match tokens.get(3) {
                Some(token) => token
                    .parse::<i32>()
                    .map_err(|_| FormatError::parse(line, format!("invalid priority '{token}'")))?,
                None => 0,
            };
            self.sos_slots
                .insert((*name).to_string(), self.sos_sets.len());
            self.sos_sets.push(PendingSos {
                kind,
                priority,
                members: Vec::new(),
            });
            return Ok(());
        }

        let (set, column, weight) = match tokens {
            [set, column, weight] => (Some(*set), *column, Some(*weight)),
            [column, weight] if is_number(weight) => (None, *column, Some(*weight)),
            [column] => (None, *column, None),
            _ => return Err(FormatError::parse(line, "malformed SOS member")),
        };
        let set = match set {
            Some(name) => *self
                .sos_slots
                .get(name)
                .ok_or_else(|| FormatError::parse(line, format!("unknown SOS set '{name}'")))?,
            None => self
                .sos_sets
                .len()
                .checked_sub(1)
                .ok_or_else(|| FormatError::parse(line, "SOS member before any set"))?,
        };
        let column = self.column_index(line, column)?;
        let members = &mut self.sos_sets[set].members;
        let weight = match weight {
            Some(token) => parse_number(line, token)?,
            None => (members.len() + 1) as f64,
        };
        members.push((column, weight));
        Ok(())
    }

    fn finish(self) -> Result<Problem, FormatError> {
        let n = self.columns.len();
        let m = self.rows.len();

        let mut row_types = Vec::with_capacity(m);
        let mut rhs = Vec::with_capacity(m);
        let mut ranges = vec![0.0; m];
        for (row, entry) in self.rows.iter().enumerate() {
            let (row_type, value) = match (entry.code, entry.range) {
                ('L', None) => (RowType::LessEqual, entry.rhs),
                ('G', None) => (RowType::GreaterEqual, entry.rhs),
                ('E', None) => (RowType::Equal, entry.rhs),
                ('L', Some(range)) => {
                    ranges[row] = range.abs();
                    (RowType::Range, entry.rhs)
                }
                ('G', Some(range)) => {
                    ranges[row] = range.abs();
                    (RowType::Range, entry.rhs + range.abs())
                }
                ('E', Some(range)) if range > 0.0 => {
                    ranges[row] = range;
                    (RowType::Range, entry.rhs + range)
                }
                ('E', Some(range)) if range < 0.0 => {
                    ranges[row] = -range;
                    (RowType::Range, entry.rhs)
                }
                (_, _) => (RowType::Equal, entry.rhs),
            };
            row_types.push(row_type);
            rhs.push(value);
        }
        let range_count = row_types.iter().filter(|t| **t == RowType::Range).count();

        let mut begin = Vec::with_capacity(n + 1);
        let mut index = Vec::new();
        let mut value = Vec::new();
        begin.push(0);
        for column in &self.columns {
            for &(row, coeff) in &column.entries {
                index.push(row);
                value.push(coeff);
            }
            begin.push(index.len());
        }
        let objective: Vec<f64> = self.columns.iter().map(|c| c.objective).collect();
        let lower: Vec<f64> = self.columns.iter().map(|c| c.lower).collect();
        let upper: Vec<f64> = self.columns.iter().map(|c| c.upper).collect();

        let mut problem = Problem::new(self.name);
        problem.load_matrix(MatrixInput {
            col_count: n,
            row_count: m,
            nonzero_count: index.len(),
            range_count,
            sense: self.sense,
            objective_constant: self.constant,
            objective: &objective,
            lower_bounds: Some(&lower),
            upper_bounds: Some(&upper),
            row_types: &row_types,
            rhs: &rhs,
            ranges: (range_count > 0).then_some(ranges.as_slice()),
            begin: &begin,
            count: None,
            index: &index,
            value: &value,
        })?;
        problem.load_names(
            Some(self.column_names.as_slice()),
            Some(self.row_names.as_slice()),
            self.objective_name.as_deref(),
        )?;

        if self.columns.iter().any(|c| c.integer) {
            let types: Vec<ColumnType> = self
                .columns
                .iter()
                .map(|c| match (c.integer, c.binary) {
                    (true, true) => ColumnType::Binary,
                    (true, false) => ColumnType::Integer,
                    _ => ColumnType::Continuous,
                })
                .collect();
            problem.load_column_types(&types)?;
        }
        let semi: Vec<usize> = (0..n).filter(|&c| self.columns[c].semi).collect();
        if !semi.is_empty() {
            problem.load_semi_continuous(&semi)?;
        }
        if !self.sos_sets.is_empty() {
            let sets = self
                .sos_sets
                .into_iter()
                .map(|pending| SosSet {
                    kind: pending.kind,
                    priority: pending.priority,
                    members: pending
                        .members
                        .into_iter()
                        .map(|(column, weight)| SosMember { column, weight })
                        .collect(),
                })
                .collect();
            problem.load_sos(sets)?;
        }
        Ok(problem)
    }
}

/// Read an MPS problem from a buffered reader.
pub fn read<R: BufRead>(reader: R) -> Result<Problem, FormatError> {
    let mut state = Reader::default();
    let mut section = Section::None;
    let mut finished = false;

    for (offset, line) in reader.lines().enumerate() {
        let number = offset + 1;
        let line = line.map_err(stream_error)?;
        if line.trim().is_empty() || line.starts_with('*') {
            continue;
        }
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if !line.starts_with(char::is_whitespace) {
            match state.section(number, &tokens)? {
                Some(next) => section = next,
                None => {
                    finished = true;
                    break;
                }
            }
            continue;
        }
        match section {
            Section::None => {
                return Err(FormatError::parse(number, "data line outside any section"));
            }
            Section::ObjSense => state.set_sense(number, tokens[0])?,
            Section::Rows => state.row(number, &tokens)?,
            Section::Columns => state.column(number, &tokens)?,
            Section::Rhs => state.rhs(number, &tokens)?,
            Section::Ranges => state.range(number, &tokens)?,
            Section::Bounds => state.bound(number, &tokens)?,
            Section::Sos => state.sos(number, &tokens)?,
        }
    }
    if !finished {
        return Err(FormatError::parse(0, "missing ENDATA"));
    }
    state.finish()
}
