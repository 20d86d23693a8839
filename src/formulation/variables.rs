//! Allocation and indexing of the decision variables.
//!
//! Every variable family is stored as a dense block addressed by `entity * T + t`, where `T` is
//! the length of the horizon. Families with an extra stage dimension (cost segments, startup
//! categories) keep one block per unit, addressed by `stage * T + t`.
use crate::error::{ScucError, ScucResult};
use crate::instance::UCInput;
use crate::milp::{Problem, VarId};
use std::ops::RangeInclusive;

/// A dense block of variables indexed by (entity, hour)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariableBlock {
    time_horizon: usize,
    vars: Vec<VarId>,
}

impl VariableBlock {
    /// Add one column per (entity, hour), with bounds given by `bounds(entity, t)`
    fn new<F>(
        problem: &mut Problem,
        num_entities: usize,
        time_horizon: usize,
        integer: bool,
        mut bounds: F,
    ) -> Self
    where
        F: FnMut(usize, usize) -> RangeInclusive<f64>,
    {
        let mut vars = Vec::with_capacity(num_entities * time_horizon);
        for entity in 0..num_entities {
            for t in 0..time_horizon {
                let range = bounds(entity, t);
                vars.push(if integer {
                    problem.add_integer_column(range)
                } else {
                    problem.add_column(range)
                });
            }
        }

        Self { time_horizon, vars }
    }

    /// Add a block of binary variables
    fn binary(problem: &mut Problem, num_entities: usize, time_horizon: usize) -> Self {
        Self::new(problem, num_entities, time_horizon, true, |_, _| 0.0..=1.0)
    }

    /// Flat position of (entity, t) within the block
    pub fn flat_index(&self, entity: usize, t: usize) -> usize {
        debug_assert!(t < self.time_horizon, "Hour {t} is outside the horizon");
        entity * self.time_horizon + t
    }

    /// Inverse of [`VariableBlock::flat_index`]
    pub fn split_index(&self, idx: usize) -> (usize, usize) {
        (idx / self.time_horizon, idx % self.time_horizon)
    }

    /// The variable for (entity, t)
    pub fn get(&self, entity: usize, t: usize) -> VarId {
        self.vars[self.flat_index(entity, t)]
    }

    /// Number of variables in the block
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// Whether the block is empty
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Number of entities covered by the block
    pub fn num_entities(&self) -> usize {
        if self.time_horizon == 0 {
            0
        } else {
            self.vars.len() / self.time_horizon
        }
    }

    /// Iterate over `((entity, t), var)` in flat order
    pub fn iter(&self) -> impl Iterator<Item = ((usize, usize), VarId)> + '_ {
        self.vars
            .iter()
            .enumerate()
            .map(|(idx, var)| (self.split_index(idx), *var))
    }
}

/// Every decision variable in the problem
#[derive(Debug, Clone, PartialEq)]
pub struct VariableManager {
    time_horizon: usize,
    /// Commitment `u(g, t)`
    commitment: VariableBlock,
    /// Startup indicator `w(g, t)`
    startup: VariableBlock,
    /// Output above minimum power `p(g, t)`
    production: VariableBlock,
    /// Output within each cost segment, one block per unit indexed by (segment, t)
    segments: Vec<VariableBlock>,
    /// Startup category selection, one block per unit indexed by (category, t)
    startup_categories: Vec<VariableBlock>,
    /// Position of each thermal unit in `reserve`, if it is reserve-eligible
    reserve_slot: Vec<Option<usize>>,
    /// Reserve provision `r(e, t)` for each reserve-eligible unit
    reserve: VariableBlock,
    /// Reserve shortfall `s(r, t)`
    shortfall: VariableBlock,
    /// Curtailed load `c(b, t)`
    curtailment: VariableBlock,
    /// Profiled output
    profiled: VariableBlock,
    /// Price-sensitive load served
    served: VariableBlock,
    /// Base-case flow limit violation per line
    flow_violation: VariableBlock,
    /// Post-contingency flow limit violation per relevant pair
    contingency_violation: VariableBlock,
}

impl VariableManager {
    /// Add every variable family to `problem`.
    ///
    /// Bounds come from the input data. Binary families are bounded to `[0, 1]` and slack
    /// families to be non-negative. Reserve shortfall is fixed at zero when the requirement is
    /// hard.
    pub fn build(problem: &mut Problem, input: &UCInput) -> ScucResult<Self> {
        let first_column = problem.num_columns();
        let time_horizon = input.time_horizon;
        let units = &input.thermal_gens;

        let commitment = VariableBlock::binary(problem, units.len(), time_horizon);
        let startup = VariableBlock::binary(problem, units.len(), time_horizon);
        let production =
            VariableBlock::new(problem, units.len(), time_horizon, false, |g, _| {
                0.0..=units[g].headroom()
            });
        let segments = units
            .iter()
            .map(|unit| {
                VariableBlock::new(
                    problem,
                    unit.cost_segments.len(),
                    time_horizon,
                    false,
                    |s, _| 0.0..=unit.cost_segments[s].length,
                )
            })
            .collect();
        let startup_categories = units
            .iter()
            .map(|unit| VariableBlock::binary(problem, unit.startup_stages.len(), time_horizon))
            .collect();

        let mut eligible = Vec::new();
        let reserve_slot = units
            .iter()
            .enumerate()
            .map(|(g, unit)| {
                unit.is_reserve_eligible().then(|| {
                    eligible.push(g);
                    eligible.len() - 1
                })
            })
            .collect();
        let reserve = VariableBlock::new(problem, eligible.len(), time_horizon, false, |e, _| {
            0.0..=units[eligible[e]].headroom()
        });
        let shortfall =
            VariableBlock::new(problem, input.reserves.len(), time_horizon, false, |r, _| {
                if input.reserves[r].shortfall_enabled() {
                    0.0..=f64::INFINITY
                } else {
                    0.0..=0.0
                }
            });

        let curtailment =
            VariableBlock::new(problem, input.buses.len(), time_horizon, false, |b, t| {
                0.0..=input.nodal_demand[t][b].max(0.0)
            });
        let profiled = non_negative(problem, input.profiled_gens.len(), time_horizon);
        let served = non_negative(problem, input.price_sensitive_loads.len(), time_horizon);
        let flow_violation = non_negative(problem, input.lines.len(), time_horizon);
        let contingency_violation =
            non_negative(problem, input.relevant_pairs.len(), time_horizon);

        let vars = Self {
            time_horizon,
            commitment,
            startup,
            production,
            segments,
            startup_categories,
            reserve_slot,
            reserve,
            shortfall,
            curtailment,
            profiled,
            served,
            flow_violation,
            contingency_violation,
        };
        vars.check_column_count(problem.num_columns() - first_column)?;

        Ok(vars)
    }

    /// Check that every column added to the problem belongs to exactly one variable
    fn check_column_count(&self, added: usize) -> ScucResult<()> {
        let expected = self.num_variables();
        if added != expected {
            return Err(ScucError::ModelConstruction(format!(
                "{added} columns were added but {expected} variables are indexed"
            )));
        }

        Ok(())
    }

    /// Total number of variables across all families
    pub fn num_variables(&self) -> usize {
        let nested: usize = self
            .segments
            .iter()
            .chain(&self.startup_categories)
            .map(VariableBlock::len)
            .sum();

        nested
            + [
                &self.commitment,
                &self.startup,
                &self.production,
                &self.reserve,
                &self.shortfall,
                &self.curtailment,
                &self.profiled,
                &self.served,
                &self.flow_violation,
                &self.contingency_violation,
            ]
            .iter()
            .map(|block| block.len())
            .sum::<usize>()
    }

    /// Number of hours in the horizon
    pub fn time_horizon(&self) -> usize {
        self.time_horizon
    }

    /// Commitment of thermal unit `g` in hour `t`
    pub fn commitment(&self, g: usize, t: usize) -> VarId {
        self.commitment.get(g, t)
    }

    /// Startup indicator of thermal unit `g` in hour `t`
    pub fn startup(&self, g: usize, t: usize) -> VarId {
        self.startup.get(g, t)
    }

    /// Output of thermal unit `g` above its minimum power in hour `t`
    pub fn production(&self, g: usize, t: usize) -> VarId {
        self.production.get(g, t)
    }

    /// Output of thermal unit `g` within cost segment `s` in hour `t`
    pub fn segment(&self, g: usize, s: usize, t: usize) -> VarId {
        self.segments[g].get(s, t)
    }

    /// Selection of startup category `c` for thermal unit `g` in hour `t`
    pub fn startup_category(&self, g: usize, c: usize, t: usize) -> VarId {
        self.startup_categories[g].get(c, t)
    }

    /// Reserve provided by thermal unit `g` in hour `t`, if it is reserve-eligible
    pub fn reserve(&self, g: usize, t: usize) -> Option<VarId> {
        self.reserve_slot[g].map(|e| self.reserve.get(e, t))
    }

    /// Shortfall of reserve requirement `r` in hour `t`
    pub fn shortfall(&self, r: usize, t: usize) -> VarId {
        self.shortfall.get(r, t)
    }

    /// Load curtailed at bus `b` in hour `t`
    pub fn curtailment(&self, b: usize, t: usize) -> VarId {
        self.curtailment.get(b, t)
    }

    /// Output of profiled unit `p` in hour `t`
    pub fn profiled(&self, p: usize, t: usize) -> VarId {
        self.profiled.get(p, t)
    }

    /// Demand served for price-sensitive load `d` in hour `t`
    pub fn served(&self, d: usize, t: usize) -> VarId {
        self.served.get(d, t)
    }

    /// Base-case flow limit violation on line `l` in hour `t`
    pub fn flow_violation(&self, l: usize, t: usize) -> VarId {
        self.flow_violation.get(l, t)
    }

    /// Post-contingency flow limit violation for relevant pair `pair` in hour `t`
    pub fn contingency_violation(&self, pair: usize, t: usize) -> VarId {
        self.contingency_violation.get(pair, t)
    }

    /// Iterate over every block, labelled with the family it belongs to
    pub fn iter_blocks(&self) -> impl Iterator<Item = (&'static str, &VariableBlock)> {
        [
            ("commitment", &self.commitment),
            ("startup", &self.startup),
            ("production", &self.production),
            ("reserve", &self.reserve),
            ("shortfall", &self.shortfall),
            ("curtailment", &self.curtailment),
            ("profiled", &self.profiled),
            ("served", &self.served),
            ("flow_violation", &self.flow_violation),
            ("contingency_violation", &self.contingency_violation),
        ]
        .into_iter()
        .chain(self.segments.iter().map(|block| ("segment", block)))
        .chain(
            self.startup_categories
                .iter()
                .map(|block| ("startup_category", block)),
        )
    }
}

/// Add a block of continuous variables bounded below by zero
fn non_negative(problem: &mut Problem, num_entities: usize, time_horizon: usize) -> VariableBlock {
    VariableBlock::new(problem, num_entities, time_horizon, false, |_, _| {
        0.0..=f64::INFINITY
    })
}
