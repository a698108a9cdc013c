#[macro_use]
extern crate log;

use anyhow::anyhow;
use clap::{Args, Parser, Subcommand};
use dotenv::dotenv;
use rand::{SeedableRng, rngs::StdRng};
use serde::Serialize;
use serde_json::json;
use trainload::report::{
    CtlReport, FitReport, FuelReport, LoadReport, MonteCarloReport, TssCurveReport,
};
use trainload_algos::{
    CtlSimulator, DailyLoad, FAT_OXIDATION_SAMPLES, FuelModel, LoadModel, TssMode, polyfit,
    tss::tss_curve,
};

#[derive(Parser)]
pub struct TrainloadCli {
    /// Print computed sequences as JSON instead of a summary
    #[arg(long, global = true)]
    pub json: bool,
    #[clap(subcommand)]
    pub subcommand: TrainloadCommand,
}

#[derive(Subcommand)]
pub enum TrainloadCommand {
    ///
    /// Simulate chronic training load over a training schedule
    ///
    Ctl {
        #[command(subcommand)]
        mode: CtlMode,
    },
    ///
    /// Repeat the randomized simulation and summarize final CTL
    ///
    MonteCarlo {
        #[command(flatten)]
        horizon: Horizon,
        #[command(flatten)]
        random: RandomizedArgs,
        #[arg(long, env, default_value_t = 100)]
        runs: usize,
        #[arg(long, env, default_value_t = 0)]
        seed: u64,
    },
    ///
    /// Track fitness, fatigue and form over a list of daily loads
    ///
    Load {
        #[command(flatten)]
        model: ModelArgs,
        #[command(flatten)]
        start: StartArgs,
        /// Comma separated daily TSS
        #[arg(long, value_delimiter = ',', required = true)]
        tss: Vec<f64>,
    },
    ///
    /// Compute the load for today that reaches a target tomorrow
    ///
    Plan {
        #[command(flatten)]
        model: ModelArgs,
        #[command(flatten)]
        start: StartArgs,
        #[command(flatten)]
        target: PlanTarget,
        /// Rest tomorrow and reach the form target the morning after
        #[arg(long)]
        then_rest: bool,
    },
    ///
    /// TSS against intensity factor for a steady effort
    ///
    Tss {
        #[arg(long, env, default_value_t = 1.0)]
        hours: f64,
        #[arg(long, env, default_value_t = 100)]
        points: usize,
    },
    ///
    /// Fat and carbohydrate burn against power
    ///
    Fuel {
        #[arg(long, env, default_value_t = 212.0)]
        ftp: f64,
        #[arg(long, env, default_value_t = 1.5)]
        max_ratio: f64,
        #[arg(long, env, default_value_t = 1.0)]
        step: f64,
        /// Also report the burn this many watts above fat max
        #[arg(long, env, default_value_t = 20.0, allow_negative_numbers = true)]
        offset: f64,
    },
    ///
    /// Least squares fit of the fat oxidation samples
    ///
    PolyFit {
        #[arg(long, env, default_value_t = 2)]
        degree: usize,
    },
}

#[derive(Subcommand)]
pub enum CtlMode {
    ///
    /// Ride every other day, starting on the first day
    ///
    Alternating {
        #[command(flatten)]
        horizon: Horizon,
        #[arg(long, env, default_value_t = 50.0)]
        tss_per_day: f64,
    },
    ///
    /// Ride on random days with random loads
    ///
    Randomized {
        #[command(flatten)]
        horizon: Horizon,
        #[command(flatten)]
        random: RandomizedArgs,
        /// Seed for a reproducible run
        #[arg(long, env)]
        seed: Option<u64>,
    },
}

#[derive(Args)]
pub struct Horizon {
    #[arg(long, env, default_value_t = CtlSimulator::DEFAULT_DAYS)]
    pub days: usize,
    #[arg(long, env, default_value_t = CtlSimulator::DEFAULT_TAU)]
    pub tau: f64,
}

#[derive(Args)]
pub struct RandomizedArgs {
    #[arg(long, env, default_value_t = 0.0)]
    pub seed_ctl: f64,
    #[arg(long, env, default_value_t = 0.6)]
    pub ride_probability: f64,
    #[arg(long, env, default_value_t = 30.0)]
    pub min_tss: f64,
    #[arg(long, env, default_value_t = 120.0)]
    pub max_tss: f64,
}

impl RandomizedArgs {
    fn mode(&self) -> TssMode {
        TssMode::Randomized {
            ride_probability: self.ride_probability,
            min_tss: self.min_tss,
            max_tss: self.max_tss,
        }
    }
}

#[derive(Args)]
pub struct ModelArgs {
    #[arg(long, env, default_value_t = LoadModel::DEFAULT_FITNESS_TAU)]
    pub fitness_tau: f64,
    #[arg(long, env, default_value_t = LoadModel::DEFAULT_FATIGUE_TAU)]
    pub fatigue_tau: f64,
}

#[derive(Args)]
pub struct StartArgs {
    /// Yesterday's fitness (CTL)
    #[arg(long, default_value_t = 0.0)]
    pub fitness: f64,
    /// Yesterday's fatigue (ATL)
    #[arg(long, default_value_t = 0.0)]
    pub fatigue: f64,
}

#[derive(Args)]
#[group(required = true, multiple = false)]
pub struct PlanTarget {
    /// Form (fitness - fatigue) to reach
    #[arg(long, allow_negative_numbers = true)]
    pub form: Option<f64>,
    /// Form as a fraction of fitness, e.g. -0.1
    #[arg(long, allow_negative_numbers = true)]
    pub form_ratio: Option<f64>,
    #[arg(long)]
    pub target_fitness: Option<f64>,
    #[arg(long)]
    pub target_fatigue: Option<f64>,
}

#[derive(Serialize)]
struct Plan {
    fitness: f64,
    fatigue: f64,
    required_tss: f64,
    /// Today's load, then a rest day when resting first.
    days: Vec<DailyLoad>,
}

fn main() -> anyhow::Result<()> {
    let dotenv_result = dotenv();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    if let Err(error) = dotenv_result {
        debug!("No .env loaded: {}", error);
    }

    let cli = TrainloadCli::parse();
    let json = cli.json;

    match cli.subcommand {
        TrainloadCommand::Ctl { mode } => {
            let (simulator, seed) = match mode {
                CtlMode::Alternating {
                    horizon,
                    tss_per_day,
                } => (
                    CtlSimulator::new(
                        horizon.days,
                        horizon.tau,
                        0.0,
                        TssMode::Alternating { tss_per_day },
                    )?,
                    None,
                ),
                CtlMode::Randomized {
                    horizon,
                    random,
                    seed,
                } => (
                    CtlSimulator::new(horizon.days, horizon.tau, random.seed_ctl, random.mode())?,
                    seed,
                ),
            };

            let run = match seed {
                Some(seed) => simulator.run_with(&mut StdRng::seed_from_u64(seed)),
                None => simulator.run(),
            };
            info!(
                "CTL after {} days: {:.2}",
                simulator.days(),
                run.final_ctl()
            );

            if json {
                print_json(&json!({ "config": simulator, "run": run }))?;
            } else {
                println!(
                    "{}",
                    CtlReport {
                        simulator: &simulator,
                        run: &run
                    }
                );
            }
            Ok(())
        }
        TrainloadCommand::MonteCarlo {
            horizon,
            random,
            runs,
            seed,
        } => {
            let simulator =
                CtlSimulator::new(horizon.days, horizon.tau, random.seed_ctl, random.mode())?;
            let summary = simulator.monte_carlo(runs, seed)?;
            info!("Simulated {} runs from seed {}", runs, seed);

            if json {
                print_json(&json!({ "config": simulator, "summary": summary }))?;
            } else {
                println!("{}", MonteCarloReport(&summary));
            }
            Ok(())
        }
        TrainloadCommand::Load { model, start, tss } => {
            let model = LoadModel::new(model.fitness_tau, model.fatigue_tau)?;
            let history = model.history(DailyLoad::new(start.fitness, start.fatigue), &tss)?;

            if json {
                print_json(&history)?;
            } else {
                println!("{}", LoadReport(&history));
            }
            Ok(())
        }
        TrainloadCommand::Plan {
            model,
            start,
            target,
            then_rest,
        } => {
            let model = LoadModel::new(model.fitness_tau, model.fatigue_tau)?;
            let required_tss = required_tss(&model, &start, &target, then_rest)?;
            if required_tss < 0.0 {
                warn!(
                    "Target needs {:.1} TSS, even a rest day overshoots it",
                    required_tss
                );
            }

            let mut loads = vec![required_tss];
            if then_rest {
                loads.push(0.0);
            }
            // step directly, the required load may be negative
            let days = loads
                .iter()
                .scan(DailyLoad::new(start.fitness, start.fatigue), |prev, &tss| {
                    *prev = model.step(*prev, tss);
                    Some(*prev)
                })
                .collect::<Vec<_>>();
            let plan = Plan {
                fitness: start.fitness,
                fatigue: start.fatigue,
                required_tss,
                days,
            };

            if json {
                print_json(&plan)?;
            } else {
                println!("Required TSS: {:.1}", plan.required_tss);
                for (label, day) in ["Tomorrow", "After rest"].iter().zip(&plan.days) {
                    println!(
                        "{}: Fitness: {:.2}, Fatigue: {:.2}, Form: {:.2}",
                        label, day.fitness, day.fatigue, day.form
                    );
                }
            }
            Ok(())
        }
        TrainloadCommand::Tss { hours, points } => {
            let curve = tss_curve(hours, points);
            if json {
                print_json(&curve)?;
            } else {
                println!("{}", TssCurveReport(&curve));
            }
            Ok(())
        }
        TrainloadCommand::Fuel {
            ftp,
            max_ratio,
            step,
            offset,
        } => {
            if ftp <= 0.0 {
                warn!("FTP {} is not positive, every watt counts as fat", ftp);
            }
            let sweep = FuelModel::new(ftp).sweep(max_ratio, step)?;
            if sweep.burns.is_empty() {
                return Err(anyhow!(
                    "Empty sweep for max ratio {} and step {} W",
                    max_ratio,
                    step
                ));
            }

            if json {
                print_json(&sweep)?;
            } else {
                println!(
                    "{}",
                    FuelReport {
                        sweep: &sweep,
                        offset_watts: offset
                    }
                );
            }
            Ok(())
        }
        TrainloadCommand::PolyFit { degree } => {
            let (x, y): (Vec<f64>, Vec<f64>) = FAT_OXIDATION_SAMPLES.iter().copied().unzip();
            let poly = polyfit(&x, &y, degree)?;

            if json {
                print_json(&json!({ "coefficients": poly.coefficients_desc() }))?;
            } else {
                println!("{}", FitReport(&poly));
            }
            Ok(())
        }
    }
}

fn required_tss(
    model: &LoadModel,
    start: &StartArgs,
    target: &PlanTarget,
    then_rest: bool,
) -> anyhow::Result<f64> {
    let equal_taus = || anyhow!("Form does not depend on load with these time constants");

    if then_rest {
        return if let Some(form) = target.form {
            model
                .required_load_before_rest_for_form(start.fitness, start.fatigue, form)
                .ok_or_else(equal_taus)
        } else if let Some(ratio) = target.form_ratio {
            model
                .required_load_before_rest_for_form_ratio(start.fitness, start.fatigue, ratio)
                .ok_or_else(|| anyhow!("Form ratio {} cannot be reached by any load", ratio))
        } else {
            Err(anyhow!("--then-rest needs a --form or --form-ratio target"))
        };
    }

    if let Some(form) = target.form {
        model
            .required_load_for_form(start.fitness, start.fatigue, form)
            .ok_or_else(equal_taus)
    } else if let Some(ratio) = target.form_ratio {
        model
            .required_load_for_form_ratio(start.fitness, start.fatigue, ratio)
            .ok_or_else(|| anyhow!("Form ratio {} cannot be reached by any load", ratio))
    } else if let Some(fitness) = target.target_fitness {
        Ok(model.required_load_for_fitness(start.fitness, fitness))
    } else if let Some(fatigue) = target.target_fatigue {
        Ok(model.required_load_for_fatigue(start.fatigue, fatigue))
    } else {
        Err(anyhow!("No target given"))
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        TrainloadCli::command().debug_assert();
    }

    #[test]
    fn parses_randomized_ctl() {
        let cli = TrainloadCli::try_parse_from([
            "trainload",
            "ctl",
            "randomized",
            "--days",
            "90",
            "--ride-probability",
            "0.4",
            "--seed",
            "7",
            "--json",
        ])
        .unwrap();
        assert!(cli.json);
        let TrainloadCommand::Ctl {
            mode: CtlMode::Randomized {
                horizon,
                random,
                seed,
            },
        } = cli.subcommand
        else {
            panic!("expected randomized ctl");
        };
        assert_eq!(horizon.days, 90);
        assert_eq!(horizon.tau, 42.0);
        assert_eq!(random.ride_probability, 0.4);
        assert_eq!(seed, Some(7));
    }

    #[test]
    fn plan_takes_exactly_one_target() {
        assert!(TrainloadCli::try_parse_from(["trainload", "plan"]).is_err());
        assert!(
            TrainloadCli::try_parse_from([
                "trainload",
                "plan",
                "--form",
                "-5",
                "--target-fitness",
                "50"
            ])
            .is_err()
        );
    }

    #[test]
    fn plan_for_negative_form() {
        let cli = TrainloadCli::try_parse_from([
            "trainload",
            "plan",
            "--fitness",
            "60",
            "--fatigue",
            "55",
            "--form",
            "-10",
        ])
        .unwrap();
        let TrainloadCommand::Plan {
            model,
            start,
            target,
            then_rest,
        } = cli.subcommand
        else {
            panic!("expected plan");
        };
        assert!(!then_rest);
        let model = LoadModel::new(model.fitness_tau, model.fatigue_tau).unwrap();
        let tss = required_tss(&model, &start, &target, then_rest).unwrap();
        let tomorrow = model.step(DailyLoad::new(60.0, 55.0), tss);
        assert!((tomorrow.form + 10.0).abs() < 1e-9);
    }

    #[test]
    fn plan_form_after_rest_day() {
        let cli = TrainloadCli::try_parse_from([
            "trainload",
            "plan",
            "--fitness",
            "60",
            "--fatigue",
            "55",
            "--form",
            "5",
            "--then-rest",
        ])
        .unwrap();
        let TrainloadCommand::Plan {
            model,
            start,
            target,
            then_rest,
        } = cli.subcommand
        else {
            panic!("expected plan");
        };
        let model = LoadModel::new(model.fitness_tau, model.fatigue_tau).unwrap();
        let tss = required_tss(&model, &start, &target, then_rest).unwrap();
        let days = model
            .history(DailyLoad::new(60.0, 55.0), &[tss, 0.0])
            .unwrap();
        assert!((days[1].form - 5.0).abs() < 1e-9);
    }

    #[test]
    fn then_rest_needs_form_target() {
        let cli = TrainloadCli::try_parse_from([
            "trainload",
            "plan",
            "--target-fitness",
            "50",
            "--then-rest",
        ])
        .unwrap();
        let TrainloadCommand::Plan {
            model,
            start,
            target,
            then_rest,
        } = cli.subcommand
        else {
            panic!("expected plan");
        };
        let model = LoadModel::new(model.fitness_tau, model.fatigue_tau).unwrap();
        assert!(required_tss(&model, &start, &target, then_rest).is_err());
    }
}
