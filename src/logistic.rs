//! Logistic growth model integrated with the explicit Euler method.

use crate::config::{LogisticConfig, check_num, check_step_advances, check_steps};
use crate::solver::solve_growth_rate;
use anyhow::{Context, Result, bail};

/// Everything a logistic run needs except the growth rate.
#[derive(Debug, Clone, PartialEq)]
pub struct LogisticSetup {
    /// Initial time.
    pub x0: f64,
    /// Initial population.
    pub y0: f64,
    /// Euler step size.
    pub step: f64,
    /// Simulation horizon.
    pub x_end: f64,
    /// Population threshold whose first crossing time is recorded.
    pub y_end: f64,
    /// Carrying capacity.
    pub capacity: f64,
}

impl LogisticSetup {
    pub fn from_config(cfg: &LogisticConfig) -> Self {
        Self {
            x0: cfg.init.x,
            y0: cfg.init.y,
            step: cfg.output.step,
            x_end: cfg.output.x_end,
            y_end: cfg.output.y_end,
            capacity: cfg.model.capacity,
        }
    }

    fn validate(&self) -> Result<()> {
        check_num(self.step, f64::MIN_POSITIVE..f64::INFINITY).context("invalid step size")?;
        check_num(self.y0, f64::MIN_POSITIVE..f64::INFINITY)
            .context("invalid initial population")?;
        check_num(self.capacity, f64::MIN_POSITIVE..f64::INFINITY)
            .context("invalid carrying capacity")?;
        check_num(self.x0, f64::MIN..f64::INFINITY).context("invalid initial time")?;
        check_num(self.x_end, self.x0..f64::INFINITY).context("invalid horizon")?;
        check_step_advances(self.x0, self.step).context("invalid step size")?;
        check_step_advances(self.x_end, self.step).context("invalid step size")?;
        check_steps(self.x_end - self.x0, self.step).context("invalid number of steps")?;
        if self.y_end.is_nan() {
            bail!("population threshold must be a number");
        }
        Ok(())
    }
}

/// Logistic parameters with a fitted growth rate.
///
/// Immutable once built: the growth rate comes either from
/// [`LogisticParams::fit`] or is given explicitly.
#[derive(Debug, Clone, PartialEq)]
pub struct LogisticParams {
    setup: LogisticSetup,
    growth_rate: f64,
}

impl LogisticParams {
    /// Build parameters with a known growth rate.
    pub fn new(setup: LogisticSetup, growth_rate: f64) -> Result<Self> {
        setup.validate().context("invalid logistic setup")?;
        if !growth_rate.is_finite() {
            bail!("growth rate must be finite, but is {growth_rate}");
        }
        Ok(Self { setup, growth_rate })
    }

    /// Fit the growth rate so that the closed-form solution through
    /// `(x0, y0)` passes through the observation `(xf, yf)`.
    ///
    /// # Errors
    /// Returns an error if the setup is invalid or the root finder fails.
    pub fn fit(setup: LogisticSetup, xf: f64, yf: f64) -> Result<Self> {
        setup.validate().context("invalid logistic setup")?;

        let growth_rate = solve_growth_rate(setup.x0, setup.y0, xf, yf, setup.capacity, 0.0)
            .with_context(|| format!("failed to fit growth rate to observation ({xf}, {yf})"))?;
        log::info!("fitted growth rate k = {growth_rate}");

        Self::new(setup, growth_rate)
    }

    pub fn setup(&self) -> &LogisticSetup {
        &self.setup
    }

    pub fn growth_rate(&self) -> f64 {
        self.growth_rate
    }

    fn derivative(&self, y: f64) -> f64 {
        self.growth_rate * (1.0 - y / self.setup.capacity) * y
    }
}

/// Sampled trajectory of a logistic run.
#[derive(Debug, Clone)]
pub struct LogisticTrajectory {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    /// First time at which the population had reached the threshold,
    /// or `None` if the horizon was exhausted first.
    pub time_to_y_end: Option<f64>,
}

impl LogisticTrajectory {
    pub fn final_point(&self) -> (f64, f64) {
        let last = self.x.len() - 1;
        (self.x[last], self.y[last])
    }
}

/// Integrate the model from `(x0, y0)` while `x + step <= x_end`.
///
/// The crossing time is checked before each step, so it is the time of the
/// sample that first meets the threshold, and a threshold met only by the
/// last sample is not recorded.
pub fn simulate(params: &LogisticParams) -> LogisticTrajectory {
    let setup = &params.setup;

    let mut x = vec![setup.x0];
    let mut y = vec![setup.y0];
    let mut time_to_y_end = None;

    let mut x_last = setup.x0;
    let mut y_last = setup.y0;
    while x_last + setup.step <= setup.x_end {
        if time_to_y_end.is_none() && y_last >= setup.y_end {
            time_to_y_end = Some(x_last);
        }

        let slope = params.derivative(y_last);
        x_last += setup.step;
        y_last = (y_last + slope * setup.step).max(0.0);

        x.push(x_last);
        y.push(y_last);
    }

    LogisticTrajectory {
        x,
        y,
        time_to_y_end,
    }
}
