//! Branching candidate selection.
//!
//! Three kinds of violation are branched on: a fractional integer column, a
//! semi-continuous column strictly between zero and its lower bound, and a
//! special ordered set with too many (or non-adjacent) nonzero members.
//! Candidates are ranked by priority first (lower value first, unprioritized
//! columns last) and by how badly they are violated second.

use mpsolve_core::{BranchDirection, Problem, SosKind, SosMember, SosSet};

/// New bounds for one column in a child node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct BoundChange {
    pub(crate) column: usize,
    pub(crate) lower: f64,
    pub(crate) upper: f64,
}

impl BoundChange {
    /// Integer down branch: `x <= floor(value)`.
    fn down(column: usize, lower: f64, value: f64) -> Self {
        Self {
            column,
            lower,
            upper: value.floor(),
        }
    }

    /// Integer up branch: `x >= ceil(value)`.
    fn up(column: usize, value: f64, upper: f64) -> Self {
        Self {
            column,
            lower: value.ceil(),
            upper,
        }
    }

    /// Force a column to zero within its current bounds.
    fn zero(column: usize, lower: f64, upper: f64) -> Self {
        Self {
            column,
            lower: lower.max(0.0),
            upper: upper.min(0.0),
        }
    }

    pub(crate) fn is_infeasible(&self) -> bool {
        self.lower > self.upper
    }
}

/// What a decision branches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BranchKind {
    Integer { column: usize },
    SemiContinuous { column: usize },
    Sos { set: usize },
}

impl BranchKind {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            BranchKind::Integer { .. } => "integer",
            BranchKind::SemiContinuous { .. } => "semi_continuous",
            BranchKind::Sos { .. } => "sos",
        }
    }
}

/// Two children; `first` is explored before `second`.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct BranchDecision {
    pub(crate) kind: BranchKind,
    pub(crate) first: Vec<BoundChange>,
    pub(crate) second: Vec<BoundChange>,
    rank: i64,
    score: f64,
}

impl BranchDecision {
    fn ordered(
        kind: BranchKind,
        rank: i64,
        score: f64,
        down_first: bool,
        down: Vec<BoundChange>,
        up: Vec<BoundChange>,
    ) -> Self {
        let (first, second) = if down_first { (down, up) } else { (up, down) };
        Self {
            kind,
            first,
            second,
            rank,
            score,
        }
    }

    fn beats(&self, other: &Self) -> bool {
        self.rank < other.rank || (self.rank == other.rank && self.score > other.score)
    }
}

pub(crate) struct BranchingSelector<'a> {
    problem: &'a Problem,
    // SOS members sorted by reference weight.
    sets: Vec<Vec<SosMember>>,
    // Per-column (rank, direction); unprioritized columns rank last.
    preferences: Vec<(i64, BranchDirection)>,
    tolerance: f64,
    integer_tolerance: f64,
}

impl<'a> BranchingSelector<'a> {
    pub(crate) fn new(problem: &'a Problem, tolerance: f64, integer_tolerance: f64) -> Self {
        let mut preferences = vec![(i64::MAX, BranchDirection::Auto); problem.num_columns()];
        for priority in problem.priorities() {
            if let Some(slot) = preferences.get_mut(priority.column) {
                *slot = (i64::from(priority.priority), priority.direction);
            }
        }
        let sets = problem
            .sos_sets()
            .iter()
            .map(SosSet::ordered_members)
            .collect();
        Self {
            problem,
            sets,
            preferences,
            tolerance,
            integer_tolerance,
        }
    }

    /// Lower bounds of the root relaxation: semi-continuous columns may be zero.
    pub(crate) fn relaxed_lower(&self) -> Vec<f64> {
        let mut lower = self.problem.column_lower().to_vec();
        for &column in self.problem.semi_continuous() {
            lower[column] = lower[column].min(0.0);
        }
        lower
    }

    /// Pick the branching decision for a relaxation point, or `None` when the
    /// point satisfies every integrality, semi-continuity and SOS condition.
    pub(crate) fn select(&self, values: &[f64], lower: &[f64], upper: &[f64]) -> Option<BranchDecision> {
        let mut best: Option<BranchDecision> = None;
        let mut consider = |decision: BranchDecision| {
            if best.as_ref().is_none_or(|current| decision.beats(current)) {
                best = Some(decision);
            }
        };

        let integer_columns = (0..self.problem.num_columns()).filter(|&c| self.problem.is_integer(c));
        for column in integer_columns {
            if let Some(decision) = self.integer_branch(column, values[column], lower, upper) {
                consider(decision);
            }
        }
        for &column in self.problem.semi_continuous() {
            if let Some(decision) = self.semi_continuous_branch(column, values[column], lower, upper)
            {
                consider(decision);
            }
        }
        for (index, set) in self.problem.sos_sets().iter().enumerate() {
            if let Some(decision) = self.sos_branch(index, set, values, lower, upper) {
                consider(decision);
            }
        }
        best
    }

    fn integer_branch(
        &self,
        column: usize,
        value: f64,
        lower: &[f64],
        upper: &[f64],
    ) -> Option<BranchDecision> {
        let fraction = value - value.floor();
        let distance = fraction.min(1.0 - fraction);
        if distance <= self.integer_tolerance {
            return None;
        }
        let (rank, direction) = self.preferences[column];
        let down_first = match direction {
            BranchDirection::Down => true,
            BranchDirection::Up => false,
            BranchDirection::Auto => fraction <= 0.5,
        };
        Some(BranchDecision::ordered(
            BranchKind::Integer { column },
            rank,
            distance,
            down_first,
            vec![BoundChange::down(column, lower[column], value)],
            vec![BoundChange::up(column, value, upper[column])],
        ))
    }

    fn semi_continuous_branch(
        &self,
        column: usize,
        value: f64,
        lower: &[f64],
        upper: &[f64],
    ) -> Option<BranchDecision> {
        let threshold = self.problem.column_lower()[column];
        if threshold <= 0.0 || value <= self.tolerance || value >= threshold - self.tolerance {
            return None;
        }
        let (rank, direction) = self.preferences[column];
        let off_first = match direction {
            BranchDirection::Down => true,
            BranchDirection::Up => false,
            BranchDirection::Auto => value < threshold / 2.0,
        };
        let off = BoundChange {
            column,
            lower: lower[column],
            upper: 0.0,
        };
        let on = BoundChange {
            column,
            lower: threshold,
            upper: upper[column],
        };
        Some(BranchDecision::ordered(
            BranchKind::SemiContinuous { column },
            rank,
            value.min(threshold - value) / threshold,
            off_first,
            vec![off],
            vec![on],
        ))
    }

    fn sos_branch(
        &self,
        index: usize,
        set: &SosSet,
        values: &[f64],
        lower: &[f64],
        upper: &[f64],
    ) -> Option<BranchDecision> {
        let members = &self.sets[index];
        let nonzero: Vec<usize> = members
            .iter()
            .enumerate()
            .filter(|(_, member)| values[member.column].abs() > self.tolerance)
            .map(|(position, _)| position)
            .collect();
        let (&first, &last) = (nonzero.first()?, nonzero.last()?);
        let span = match set.kind {
            SosKind::Type1 => 1,
            SosKind::Type2 => 2,
        };
        if last - first < span {
            return None;
        }

        // Split at the weighted centre of the nonzero members, kept inside
        // the range that cuts the current point off on both sides.
        let (weighted, total) = members.iter().fold((0.0, 0.0), |(w, t), member| {
            let magnitude = values[member.column].abs();
            (w + member.weight * magnitude, t + magnitude)
        });
        let centre = weighted / total;
        let (low, high) = match set.kind {
            SosKind::Type1 => (first, last - 1),
            SosKind::Type2 => (first + 1, last - 1),
        };
        let split = (low..=high)
            .rev()
            .find(|&position| members[position].weight <= centre)
            .unwrap_or(low);

        let zero = |positions: std::ops::Range<usize>| -> Vec<BoundChange> {
            positions
                .map(|position| {
                    let column = members[position].column;
                    BoundChange::zero(column, lower[column], upper[column])
                })
                .collect()
        };
        let keep_low = zero(split + 1..members.len());
        let keep_high = match set.kind {
            SosKind::Type1 => zero(0..split + 1),
            SosKind::Type2 => zero(0..split),
        };
        Some(BranchDecision::ordered(
            BranchKind::Sos { set: index },
            i64::from(set.priority),
            0.5,
            true,
            keep_low,
            keep_high,
        ))
    }
}
