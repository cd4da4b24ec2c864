//! SIR compartmental model integrated with the explicit Euler method.

use crate::config::{SirConfig, check_num, check_steps};
use anyhow::{Context, Result, bail};

/// Population compartments at a given step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SirState {
    pub s: f64,
    pub i: f64,
    pub r: f64,
}

impl SirState {
    pub fn total(&self) -> f64 {
        self.s + self.i + self.r
    }
}

/// Model parameters, fixed for the duration of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct SirParams {
    beta: f64,
    gamma: f64,
    init: SirState,
}

impl SirParams {
    /// Create validated parameters.
    ///
    /// # Errors
    /// Returns an error if a rate or compartment is negative or not finite,
    /// or if the total population is zero.
    pub fn new(beta: f64, gamma: f64, init: SirState) -> Result<Self> {
        check_num(beta, 0.0..f64::INFINITY).context("invalid transmission rate")?;
        check_num(gamma, 0.0..f64::INFINITY).context("invalid recovery rate")?;
        check_num(init.s, 0.0..f64::INFINITY).context("invalid susceptible population")?;
        check_num(init.i, 0.0..f64::INFINITY).context("invalid infected population")?;
        check_num(init.r, 0.0..f64::INFINITY).context("invalid recovered population")?;
        let n = init.total();
        if !(n > 0.0 && n.is_finite()) {
            bail!("total population must be positive and finite, but is {n}");
        }
        Ok(Self { beta, gamma, init })
    }

    pub fn from_config(cfg: &SirConfig) -> Result<Self> {
        let init = SirState {
            s: cfg.init.susceptible,
            i: cfg.init.infected,
            r: cfg.init.recovered,
        };
        Self::new(cfg.model.beta, cfg.model.gamma, init)
    }

    /// Total population `N = S0 + I0 + R0`.
    pub fn population(&self) -> f64 {
        self.init.total()
    }

    fn derivative(&self, state: &SirState) -> SirState {
        let infection = self.beta * state.s * state.i / self.population();
        let recovery = self.gamma * state.i;
        SirState {
            s: -infection,
            i: infection - recovery,
            r: recovery,
        }
    }
}

/// Sampled trajectory of a SIR run.
///
/// All four series have the same length and `time[t] == t * dt`.
#[derive(Debug, Clone)]
pub struct SirTrajectory {
    pub time: Vec<f64>,
    pub s: Vec<f64>,
    pub i: Vec<f64>,
    pub r: Vec<f64>,
}

impl SirTrajectory {
    fn with_capacity(n_steps: usize) -> Self {
        Self {
            time: Vec::with_capacity(n_steps),
            s: Vec::with_capacity(n_steps),
            i: Vec::with_capacity(n_steps),
            r: Vec::with_capacity(n_steps),
        }
    }

    fn push(&mut self, time: f64, state: &SirState) {
        self.time.push(time);
        self.s.push(state.s);
        self.i.push(state.i);
        self.r.push(state.r);
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn state(&self, step: usize) -> SirState {
        SirState {
            s: self.s[step],
            i: self.i[step],
            r: self.r[step],
        }
    }

    pub fn final_state(&self) -> SirState {
        self.state(self.len() - 1)
    }

    /// Time and value of the largest number of infected (first occurrence).
    pub fn peak_infected(&self) -> (f64, f64) {
        let mut i_peak = 0;
        for (step, &val) in self.i.iter().enumerate() {
            if val > self.i[i_peak] {
                i_peak = step;
            }
        }
        (self.time[i_peak], self.i[i_peak])
    }
}

/// Number of samples of a run: `floor(duration / time_step)`.
///
/// The fractional last step is dropped.
pub fn num_steps(duration: f64, time_step: f64) -> usize {
    (duration / time_step).floor() as usize
}

/// Integrate the model over `duration` with step `time_step`.
///
/// The initial condition is always kept, so a run shorter than two steps
/// returns only the initial condition.
///
/// # Errors
/// Returns an error if `duration` or `time_step` is not positive and finite,
/// or if the run would exceed [`MAX_STEPS`](crate::config::MAX_STEPS) steps.
pub fn simulate(params: &SirParams, duration: f64, time_step: f64) -> Result<SirTrajectory> {
    check_num(duration, f64::MIN_POSITIVE..f64::INFINITY).context("invalid duration")?;
    check_num(time_step, f64::MIN_POSITIVE..f64::INFINITY).context("invalid time step")?;
    check_steps(duration, time_step).context("invalid number of steps")?;

    let n_steps = num_steps(duration, time_step).max(1);
    let mut traj = SirTrajectory::with_capacity(n_steps);

    let mut state = params.init;
    traj.push(0.0, &state);

    for step in 1..n_steps {
        let deriv = params.derivative(&state);

        // Clamp small negative overshoot near zero.
        state = SirState {
            s: (state.s + deriv.s * time_step).max(0.0),
            i: (state.i + deriv.i * time_step).max(0.0),
            r: (state.r + deriv.r * time_step).max(0.0),
        };

        traj.push(step as f64 * time_step, &state);
    }

    Ok(traj)
}
