//! An abstract mixed-integer linear program.
//!
//! The formulation code writes columns, rows and objective coefficients into a [`Problem`]; the
//! [`solver`](crate::solver) module translates it into whatever the backend needs. Keeping the
//! model in our own representation means it can be inspected (and checked against a candidate
//! solution) without involving the solver at all.
use float_cmp::approx_eq;
use indexmap::IndexMap;
use std::ops::RangeInclusive;

/// Coefficients with a smaller magnitude than this are dropped from expressions
pub const COEFFICIENT_EPSILON: f64 = 1e-12;

/// How far the constant of a row with no terms may lie outside its bounds before the row is kept
const EMPTY_ROW_TOLERANCE: f64 = 1e-9;

/// A decision variable in the optimisation.
///
/// Note that this type does **not** include the value of the variable; it just refers to a
/// particular column of the problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(pub usize);

/// A column of the problem
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// Lower bound (may be `-inf`)
    pub lower: f64,
    /// Upper bound (may be `inf`)
    pub upper: f64,
    /// Whether the variable must take an integer value
    pub integer: bool,
    /// Objective coefficient
    pub cost: f64,
}

/// The sense of a row, derived from its bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowSense {
    /// `lower == upper`
    Equal,
    /// Only an upper bound
    LessEqual,
    /// Only a lower bound
    GreaterEqual,
    /// Both bounds, and they differ
    Ranged,
}

/// A linear constraint `lower <= sum(coeff * var) <= upper`
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    /// Coefficient for each variable (each variable appears once)
    pub terms: Vec<(VarId, f64)>,
    /// Lower bound (may be `-inf`)
    pub lower: f64,
    /// Upper bound (may be `inf`)
    pub upper: f64,
}

impl Row {
    /// The sense of the constraint
    pub fn sense(&self) -> RowSense {
        match (self.lower.is_finite(), self.upper.is_finite()) {
            (true, true) if approx_eq!(f64, self.lower, self.upper) => RowSense::Equal,
            (true, true) => RowSense::Ranged,
            (false, true) => RowSense::LessEqual,
            (true, false) => RowSense::GreaterEqual,
            (false, false) => RowSense::Ranged,
        }
    }

    /// Value of the left-hand side for the given assignment
    pub fn activity(&self, values: &[f64]) -> f64 {
        self.terms.iter().map(|(var, coeff)| coeff * values[var.0]).sum()
    }
}

/// A linear expression with a constant term
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinearExpr {
    terms: Vec<(VarId, f64)>,
    constant: f64,
}

impl LinearExpr {
    /// Create an empty expression
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an expression containing a single variable
    pub fn from_var(var: VarId, coeff: f64) -> Self {
        let mut expr = Self::new();
        expr.add_term(var, coeff);
        expr
    }

    /// Add `coeff * var`
    pub fn add_term(&mut self, var: VarId, coeff: f64) -> &mut Self {
        self.terms.push((var, coeff));
        self
    }

    /// Add a constant
    pub fn add_constant(&mut self, value: f64) -> &mut Self {
        self.constant += value;
        self
    }

    /// Add `scale * other`
    pub fn add_scaled(&mut self, other: &LinearExpr, scale: f64) -> &mut Self {
        self.terms
            .extend(other.terms.iter().map(|(var, coeff)| (*var, coeff * scale)));
        self.constant += other.constant * scale;
        self
    }

    /// The constant term
    pub fn constant(&self) -> f64 {
        self.constant
    }

    /// The raw (possibly repeated) terms
    pub fn terms(&self) -> &[(VarId, f64)] {
        &self.terms
    }

    /// Evaluate the expression for the given assignment
    pub fn evaluate(&self, values: &[f64]) -> f64 {
        self.constant
            + self
                .terms
                .iter()
                .map(|(var, coeff)| coeff * values[var.0])
                .sum::<f64>()
    }

    /// Merge repeated variables and drop negligible coefficients.
    ///
    /// Variables keep the order of their first appearance.
    pub fn merged_terms(&self) -> Vec<(VarId, f64)> {
        let mut merged: IndexMap<VarId, f64> = IndexMap::with_capacity(self.terms.len());
        for (var, coeff) in &self.terms {
            *merged.entry(*var).or_insert(0.0) += coeff;
        }

        merged
            .into_iter()
            .filter(|(_, coeff)| coeff.abs() >= COEFFICIENT_EPSILON)
            .collect()
    }
}

/// A mixed-integer linear program with a minimisation objective
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Problem {
    columns: Vec<Column>,
    rows: Vec<Row>,
}

impl Problem {
    /// Add a continuous column with the given bounds and no objective coefficient
    pub fn add_column(&mut self, bounds: RangeInclusive<f64>) -> VarId {
        self.push_column(bounds, false)
    }

    /// Add an integer column with the given bounds and no objective coefficient
    pub fn add_integer_column(&mut self, bounds: RangeInclusive<f64>) -> VarId {
        self.push_column(bounds, true)
    }

    /// Add a binary column
    pub fn add_binary_column(&mut self) -> VarId {
        self.push_column(0.0..=1.0, true)
    }

    fn push_column(&mut self, bounds: RangeInclusive<f64>, integer: bool) -> VarId {
        let (lower, upper) = bounds.into_inner();
        self.columns.push(Column {
            lower,
            upper,
            integer,
            cost: 0.0,
        });

        VarId(self.columns.len() - 1)
    }

    /// Add `coeff` to the objective coefficient of `var`
    pub fn add_objective_term(&mut self, var: VarId, coeff: f64) {
        self.columns[var.0].cost += coeff;
    }

    /// Add the constraint `lower <= expr <= upper`.
    ///
    /// The constant of `expr` is moved into the bounds. If no terms survive merging and the
    /// constant satisfies the bounds, nothing is added and `None` is returned. A row with no terms
    /// whose constant violates its bounds is kept, so the problem stays infeasible.
    pub fn add_row(&mut self, expr: &LinearExpr, bounds: RangeInclusive<f64>) -> Option<usize> {
        let terms = expr.merged_terms();
        let (lower, upper) = bounds.into_inner();
        if terms.is_empty()
            && expr.constant() >= lower - EMPTY_ROW_TOLERANCE
            && expr.constant() <= upper + EMPTY_ROW_TOLERANCE
        {
            return None;
        }

        self.rows.push(Row {
            terms,
            lower: lower - expr.constant(),
            upper: upper - expr.constant(),
        });

        Some(self.rows.len() - 1)
    }

    /// Add the constraint `expr <= rhs`
    pub fn add_le(&mut self, expr: &LinearExpr, rhs: f64) -> Option<usize> {
        self.add_row(expr, f64::NEG_INFINITY..=rhs)
    }

    /// Add the constraint `expr >= rhs`
    pub fn add_ge(&mut self, expr: &LinearExpr, rhs: f64) -> Option<usize> {
        self.add_row(expr, rhs..=f64::INFINITY)
    }

    /// Add the constraint `expr == rhs`
    pub fn add_eq(&mut self, expr: &LinearExpr, rhs: f64) -> Option<usize> {
        self.add_row(expr, rhs..=rhs)
    }

    /// The columns of the problem
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// The rows of the problem
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Number of columns
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// Number of rows
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// Number of integer columns
    pub fn num_integer_columns(&self) -> usize {
        self.columns.iter().filter(|col| col.integer).count()
    }

    /// Objective value for the given assignment
    pub fn objective_value(&self, values: &[f64]) -> f64 {
        self.columns
            .iter()
            .zip(values)
            .map(|(col, value)| col.cost * value)
            .sum()
    }

    /// The largest violation of any bound, row or integrality requirement
    pub fn max_violation(&self, values: &[f64]) -> f64 {
        if values.len() != self.columns.len() {
            return f64::INFINITY;
        }

        let column_violation = self
            .columns
            .iter()
            .zip(values)
            .map(|(col, &value)| {
                let bound = (col.lower - value).max(value - col.upper).max(0.0);
                let integrality = if col.integer {
                    (value - value.round()).abs()
                } else {
                    0.0
                };
                bound.max(integrality)
            })
            .fold(0.0, f64::max);

        let row_violation = self
            .rows
            .iter()
            .map(|row| {
                let activity = row.activity(values);
                (row.lower - activity).max(activity - row.upper).max(0.0)
            })
            .fold(0.0, f64::max);

        column_violation.max(row_violation)
    }
}
