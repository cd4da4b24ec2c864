//! Human-readable run summaries.

use crate::logistic::{LogisticParams, LogisticTrajectory};
use crate::sir::SirTrajectory;
use std::fmt;

/// Final-step summary of a SIR run, rounded to whole individuals.
#[derive(Debug, PartialEq)]
pub struct SirReport {
    pub day: f64,
    pub susceptible: f64,
    pub infected: f64,
    pub recovered: f64,
    pub total: f64,
    pub peak_day: f64,
    pub peak_infected: f64,
}

impl SirReport {
    pub fn new(duration: f64, traj: &SirTrajectory) -> Self {
        let last = traj.final_state();
        let (peak_day, peak_infected) = traj.peak_infected();
        Self {
            day: duration,
            susceptible: last.s.round(),
            infected: last.i.round(),
            recovered: last.r.round(),
            total: last.total().round(),
            peak_day,
            peak_infected: peak_infected.round(),
        }
    }
}

impl fmt::Display for SirReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "RESULTS ON DAY {}:", self.day)?;
        writeln!(f, "- Susceptible: {}", self.susceptible)?;
        writeln!(f, "- Infected: {}", self.infected)?;
        writeln!(f, "- Recovered: {}", self.recovered)?;
        writeln!(f, "- Total Population: {}", self.total)?;
        write!(
            f,
            "- Infection Peak: {} on day {:.1}",
            self.peak_infected, self.peak_day
        )
    }
}

/// Summary of a logistic run.
#[derive(Debug, PartialEq)]
pub struct LogisticReport {
    pub growth_rate: f64,
    pub x_final: f64,
    pub y_final: f64,
    pub y_end: f64,
    pub time_to_y_end: Option<f64>,
}

impl LogisticReport {
    pub fn new(params: &LogisticParams, traj: &LogisticTrajectory) -> Self {
        let (x_final, y_final) = traj.final_point();
        Self {
            growth_rate: params.growth_rate(),
            x_final,
            y_final,
            y_end: params.setup().y_end,
            time_to_y_end: traj.time_to_y_end,
        }
    }
}

impl fmt::Display for LogisticReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Fitted growth rate: {:.6}", self.growth_rate)?;
        writeln!(f, "Population at {:.1}: {:.2}", self.x_final, self.y_final)?;
        match self.time_to_y_end {
            Some(time) => write!(f, "Population reaches {} at: {:.1}", self.y_end, time),
            None => write!(f, "Population does not reach {}", self.y_end),
        }
    }
}
