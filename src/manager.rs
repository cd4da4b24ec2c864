use crate::chart::Chart;
use crate::config::Config;
use crate::logistic::{self, LogisticParams, LogisticSetup};
use crate::report::{LogisticReport, SirReport};
use crate::sir::{self, SirParams};
use anyhow::{Context, Result};
use glob::glob;
use std::{
    fs,
    path::{Path, PathBuf},
};

pub struct Manager {
    sim_dir: PathBuf,
    cfg: Config,
}

impl Manager {
    pub fn new<P: AsRef<Path>>(sim_dir: P) -> Result<Self> {
        let sim_dir = sim_dir.as_ref().to_path_buf();

        let cfg =
            Config::from_file(sim_dir.join("config.toml")).context("failed to construct cfg")?;
        log::info!("{cfg:#?}");

        Ok(Self { sim_dir, cfg })
    }

    pub fn run_sir(&self) -> Result<SirReport> {
        let cfg = self.cfg.sir.as_ref().context("config has no [sir] section")?;

        let params = SirParams::from_config(cfg).context("failed to construct SIR params")?;
        let traj = sir::simulate(&params, cfg.output.duration, cfg.output.time_step)
            .context("failed to simulate SIR model")?;
        log::info!("simulated {} SIR steps", traj.len());

        let chart = Chart::from_sir(&traj).context("failed to build SIR chart")?;
        self.save_chart(&chart, "sir")?;

        Ok(SirReport::new(cfg.output.duration, &traj))
    }

    pub fn run_logistic(&self) -> Result<LogisticReport> {
        let cfg = self
            .cfg
            .logistic
            .as_ref()
            .context("config has no [logistic] section")?;

        let setup = LogisticSetup::from_config(cfg);
        let params = LogisticParams::fit(setup, cfg.observation.x, cfg.observation.y)
            .context("failed to construct logistic params")?;
        let traj = logistic::simulate(&params);
        log::info!("simulated {} logistic steps", traj.x.len() - 1);

        let chart = Chart::from_logistic(&traj).context("failed to build logistic chart")?;
        self.save_chart(&chart, "logistic")?;

        Ok(LogisticReport::new(&params, &traj))
    }

    pub fn clean_sim(&self) -> Result<()> {
        let pattern = self.sim_dir.join("*-chart.msgpack");
        let pattern = pattern.to_str().context("pattern is not valid UTF-8")?;
        for file in glob(pattern).context("failed to glob chart files")? {
            let file = file.context("failed to read glob entry")?;
            fs::remove_file(&file).with_context(|| format!("failed to remove {file:?}"))?;
            log::info!("removed {file:?}");
        }
        Ok(())
    }

    fn save_chart(&self, chart: &Chart, model: &str) -> Result<()> {
        let file = self.chart_file(model);
        chart
            .save(&file)
            .with_context(|| format!("failed to save {file:?}"))?;
        log::info!("saved {file:?}");
        Ok(())
    }

    fn chart_file(&self, model: &str) -> PathBuf {
        self.sim_dir.join(format!("{model}-chart.msgpack"))
    }
}
