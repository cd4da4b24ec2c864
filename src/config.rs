use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::{fmt::Debug, fs, ops::RangeBounds, path::Path};

/// Largest number of integration steps a single run may take.
pub const MAX_STEPS: usize = 10_000_000;

/// Simulation configuration parameters.
///
/// Loaded from a TOML file and validated before use.
/// See [`Config::from_file`] for loading.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// SIR epidemic scenario.
    pub sir: Option<SirConfig>,
    /// Logistic growth scenario.
    pub logistic: Option<LogisticConfig>,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SirConfig {
    pub model: SirModelConfig,
    pub init: SirInitConfig,
    pub output: SirOutputConfig,
}

/// SIR model rates.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SirModelConfig {
    /// Transmission rate.
    pub beta: f64,
    /// Recovery rate.
    pub gamma: f64,
}

/// SIR initial compartments.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SirInitConfig {
    pub susceptible: f64,
    pub infected: f64,
    pub recovered: f64,
}

/// SIR integration controls.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SirOutputConfig {
    /// Total simulated time (days).
    pub duration: f64,
    /// Euler step size (days).
    pub time_step: f64,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogisticConfig {
    pub model: LogisticModelConfig,
    pub init: PointConfig,
    pub observation: PointConfig,
    pub output: LogisticOutputConfig,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogisticModelConfig {
    /// Carrying capacity.
    pub capacity: f64,
}

/// A `(time, population)` pair.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PointConfig {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogisticOutputConfig {
    /// Euler step size.
    pub step: f64,
    /// Simulation horizon.
    pub x_end: f64,
    /// Population threshold whose crossing time is reported.
    pub y_end: f64,
}

impl Config {
    /// Load a [`Config`] from a file.
    ///
    /// The file must be TOML-encoded and contain a serialized [`Config`].
    /// Performs validation on all parameters before returning.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, deserialized,
    /// or if the configuration values are invalid.
    pub fn from_file<P: AsRef<Path>>(file: P) -> Result<Self> {
        let file = file.as_ref();
        let contents =
            fs::read_to_string(file).with_context(|| format!("failed to read {file:?}"))?;

        Self::from_toml(&contents)
    }

    /// Parse and validate a [`Config`] from a TOML string.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents).context("failed to deserialize config")?;

        config.validate().context("failed to validate config")?;

        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.sir.is_none() && self.logistic.is_none() {
            bail!("config must contain at least one of the sections [sir] or [logistic]");
        }
        if let Some(sir) = &self.sir {
            sir.validate().context("invalid [sir] section")?;
        }
        if let Some(logistic) = &self.logistic {
            logistic.validate().context("invalid [logistic] section")?;
        }
        Ok(())
    }
}

impl SirConfig {
    fn validate(&self) -> Result<()> {
        check_num(self.model.beta, 0.0..1e6).context("invalid transmission rate")?;
        check_num(self.model.gamma, 0.0..1e6).context("invalid recovery rate")?;

        check_num(self.init.susceptible, 0.0..1e12).context("invalid susceptible population")?;
        check_num(self.init.infected, 0.0..1e12).context("invalid infected population")?;
        check_num(self.init.recovered, 0.0..1e12).context("invalid recovered population")?;
        let total = self.init.susceptible + self.init.infected + self.init.recovered;
        if total <= 0.0 {
            bail!("total population must be positive, but is {total}");
        }

        check_num(self.output.duration, f64::MIN_POSITIVE..1e9).context("invalid duration")?;
        check_num(self.output.time_step, f64::MIN_POSITIVE..1e9).context("invalid time step")?;
        check_steps(self.output.duration, self.output.time_step)
            .context("invalid number of steps")?;

        Ok(())
    }
}

impl LogisticConfig {
    fn validate(&self) -> Result<()> {
        let capacity = self.model.capacity;
        check_num(capacity, f64::MIN_POSITIVE..1e12).context("invalid carrying capacity")?;

        check_num(self.init.x, -1e9..1e9).context("invalid initial time")?;
        check_num(self.init.y, f64::MIN_POSITIVE..1e12).context("invalid initial population")?;

        check_num(self.observation.x, -1e9..1e9).context("invalid observation time")?;
        if self.observation.x == self.init.x {
            bail!("observation time must differ from the initial time");
        }
        check_num(self.observation.y, f64::MIN_POSITIVE..capacity)
            .context("invalid observed population")?;

        check_num(self.output.step, f64::MIN_POSITIVE..1e9).context("invalid step size")?;
        check_num(self.output.x_end, self.init.x..1e9).context("invalid horizon")?;
        check_step_advances(self.init.x, self.output.step).context("invalid step size")?;
        check_step_advances(self.output.x_end, self.output.step).context("invalid step size")?;
        check_steps(self.output.x_end - self.init.x, self.output.step)
            .context("invalid number of steps")?;
        check_num(self.output.y_end, 0.0..1e12).context("invalid population threshold")?;

        Ok(())
    }
}

pub fn check_num<T, R>(num: T, range: R) -> Result<()>
where
    T: PartialOrd + Debug,
    R: RangeBounds<T> + Debug,
{
    if !range.contains(&num) {
        bail!("number must be in the range {range:?}, but is {num:?}");
    }
    Ok(())
}

/// Check that `span / step` is a finite number of steps no larger than [`MAX_STEPS`].
pub fn check_steps(span: f64, step: f64) -> Result<()> {
    check_num(span / step, 0.0..=MAX_STEPS as f64)
}

/// Check that adding `step` to `x` produces a larger number.
pub fn check_step_advances(x: f64, step: f64) -> Result<()> {
    if x + step <= x {
        bail!("step {step:?} is below the floating-point resolution at {x:?}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const REFERENCE: &str = r#"
[sir.model]
beta = 0.3
gamma = 0.1

[sir.init]
susceptible = 990.0
infected = 10.0
recovered = 0.0

[sir.output]
duration = 50.0
time_step = 0.1

[logistic.model]
capacity = 300.0

[logistic.init]
x = 0.0
y = 15.0

[logistic.observation]
x = 4.0
y = 56.0

[logistic.output]
step = 0.1
x_end = 12.0
y_end = 150.0
"#;

    #[test]
    fn parses_reference_scenarios() {
        let cfg = Config::from_toml(REFERENCE).expect("reference config should be valid");

        let sir = cfg.sir.expect("missing sir section");
        assert_eq!(sir.model.beta, 0.3);
        assert_eq!(sir.init.susceptible, 990.0);
        assert_eq!(sir.output.time_step, 0.1);

        let logistic = cfg.logistic.expect("missing logistic section");
        assert_eq!(logistic.model.capacity, 300.0);
        assert_eq!(logistic.observation.y, 56.0);
        assert_eq!(logistic.output.y_end, 150.0);
    }

    #[test]
    fn accepts_single_section() {
        let contents = REFERENCE.split("[logistic.model]").next().unwrap();
        let cfg = Config::from_toml(contents).unwrap();
        assert!(cfg.sir.is_some());
        assert!(cfg.logistic.is_none());
    }

    #[test]
    fn rejects_empty_config() {
        assert!(Config::from_toml("").is_err());
    }

    #[test]
    fn rejects_unknown_fields() {
        let contents = REFERENCE.replace("beta = 0.3", "beta = 0.3\ndelta = 1.0");
        assert!(Config::from_toml(&contents).is_err());
    }

    #[test]
    fn rejects_non_positive_step() {
        let contents = REFERENCE.replace("time_step = 0.1", "time_step = 0.0");
        let err = Config::from_toml(&contents).unwrap_err();
        assert!(format!("{err:#}").contains("invalid time step"));

        let contents = REFERENCE.replace("step = 0.1", "step = -0.1");
        assert!(Config::from_toml(&contents).is_err());
    }

    #[test]
    fn accepts_step_longer_than_duration() {
        let contents = REFERENCE.replace("time_step = 0.1", "time_step = 80.0");
        let cfg = Config::from_toml(&contents).unwrap();
        assert_eq!(cfg.sir.unwrap().output.time_step, 80.0);
    }

    #[test]
    fn rejects_input_with_too_many_steps() {
        let contents = REFERENCE.replace("time_step = 0.1", "time_step = 1e-300");
        let err = Config::from_toml(&contents).unwrap_err();
        assert!(format!("{err:#}").contains("invalid number of steps"));

        let contents = REFERENCE.replace("x_end = 12.0", "x_end = 1e8");
        let err = Config::from_toml(&contents).unwrap_err();
        assert!(format!("{err:#}").contains("invalid number of steps"));
    }

    #[test]
    fn rejects_step_below_time_resolution() {
        let contents = REFERENCE
            .replace("x = 0.0", "x = 1e8")
            .replace("x = 4.0", "x = 1.00000004e8")
            .replace("\nstep = 0.1", "\nstep = 1e-9")
            .replace("x_end = 12.0", "x_end = 1.00000001e8");
        let err = Config::from_toml(&contents).unwrap_err();
        assert!(format!("{err:#}").contains("below the floating-point resolution"));
    }

    #[test]
    fn rejects_empty_population() {
        let contents = REFERENCE
            .replace("susceptible = 990.0", "susceptible = 0.0")
            .replace("infected = 10.0", "infected = 0.0");
        let err = Config::from_toml(&contents).unwrap_err();
        assert!(format!("{err:#}").contains("total population must be positive"));
    }

    #[test]
    fn rejects_non_positive_initial_population() {
        let contents = REFERENCE.replace("y = 15.0", "y = 0.0");
        assert!(Config::from_toml(&contents).is_err());
    }

    #[test]
    fn rejects_observation_above_capacity() {
        let contents = REFERENCE.replace("y = 56.0", "y = 300.0");
        let err = Config::from_toml(&contents).unwrap_err();
        assert!(format!("{err:#}").contains("invalid observed population"));
    }

    #[test]
    fn rejects_nan() {
        let contents = REFERENCE.replace("gamma = 0.1", "gamma = nan");
        assert!(Config::from_toml(&contents).is_err());
    }
}
