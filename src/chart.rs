//! Line-chart descriptions handed to an external plotter.

use crate::logistic::LogisticTrajectory;
use crate::sir::SirTrajectory;
use anyhow::{Context, Result, bail};
use rmp_serde::encode;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

/// One labeled dependent-variable series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Curve {
    pub label: String,
    pub values: Vec<f64>,
}

/// A line chart: one independent-variable series plus one or more curves
/// of matching length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub x: Vec<f64>,
    pub curves: Vec<Curve>,
}

impl Chart {
    pub fn new(title: &str, x_label: &str, y_label: &str, x: Vec<f64>) -> Self {
        Self {
            title: title.to_string(),
            x_label: x_label.to_string(),
            y_label: y_label.to_string(),
            x,
            curves: Vec::new(),
        }
    }

    /// Add a curve, checking that it matches the independent series.
    pub fn add_curve(&mut self, label: &str, values: Vec<f64>) -> Result<()> {
        let exp_len = self.x.len();
        let len = values.len();
        if len != exp_len {
            bail!("curve {label:?} must have length {exp_len}, but has {len}");
        }
        self.curves.push(Curve {
            label: label.to_string(),
            values,
        });
        Ok(())
    }

    pub fn from_sir(traj: &SirTrajectory) -> Result<Self> {
        let mut chart = Self::new(
            "SIR Model Simulation with Euler's method",
            "Days",
            "Population",
            traj.time.clone(),
        );
        chart.add_curve("Susceptible", traj.s.clone())?;
        chart.add_curve("Infected", traj.i.clone())?;
        chart.add_curve("Recovered", traj.r.clone())?;
        Ok(chart)
    }

    pub fn from_logistic(traj: &LogisticTrajectory) -> Result<Self> {
        let mut chart = Self::new(
            "Population Growth Simulation",
            "Years",
            "Population",
            traj.x.clone(),
        );
        chart.add_curve("Population", traj.y.clone())?;
        Ok(chart)
    }

    /// Save the chart to a MessagePack-encoded file.
    pub fn save<P: AsRef<Path>>(&self, file: P) -> Result<()> {
        let file = file.as_ref();
        let file = File::create(file).with_context(|| format!("failed to create {file:?}"))?;
        let mut writer = BufWriter::new(file);
        encode::write(&mut writer, self).context("failed to serialize chart")?;
        writer.flush().context("failed to flush writer stream")?;
        Ok(())
    }
}
