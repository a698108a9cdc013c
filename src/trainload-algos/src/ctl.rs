use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};

use crate::{
    AlgoError, ConfigIssue,
    helpers::series_math::{mean, std_dev},
};

/// How the daily training stress of a run is produced.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum TssMode {
    /// `tss_per_day` on even days, rest on odd days. Day 0 rides and seeds CTL.
    Alternating { tss_per_day: f64 },
    /// Each day rides with `ride_probability`; a ride draws its TSS from
    /// `[min_tss, max_tss)`.
    Randomized {
        ride_probability: f64,
        min_tss: f64,
        max_tss: f64,
    },
}

impl TssMode {
    fn validate(&self) -> Result<(), ConfigIssue> {
        match *self {
            TssMode::Alternating { tss_per_day } => check_tss(tss_per_day),
            TssMode::Randomized {
                ride_probability,
                min_tss,
                max_tss,
            } => {
                if !(0.0..=1.0).contains(&ride_probability) {
                    return Err(ConfigIssue::RideProbabilityOutOfRange(ride_probability));
                }
                check_tss(min_tss)?;
                check_tss(max_tss)?;
                if max_tss < min_tss {
                    return Err(ConfigIssue::InvertedTssRange { min_tss, max_tss });
                }
                Ok(())
            }
        }
    }
}

pub(crate) fn check_tss(tss: f64) -> Result<(), ConfigIssue> {
    if tss.is_finite() && tss >= 0.0 {
        Ok(())
    } else {
        Err(ConfigIssue::TssOutOfRange(tss))
    }
}

/// `1 / tau`, rejecting any `tau` that would put the factor outside `(0, 1]`.
pub(crate) fn smoothing_factor(tau: f64) -> Result<f64, ConfigIssue> {
    if tau.is_finite() && tau >= 1.0 {
        Ok(1.0 / tau)
    } else {
        Err(ConfigIssue::TauOutOfRange(tau))
    }
}

/// Randomness consumed by [`TssMode::Randomized`], one ride decision and one
/// magnitude per simulated day.
pub trait RideSource {
    /// `true` with the given probability.
    fn will_ride(&mut self, probability: f64) -> bool;

    /// A load in `[min_tss, max_tss)`, or `min_tss` when the range is empty.
    fn magnitude(&mut self, min_tss: f64, max_tss: f64) -> f64;
}

impl<R: Rng> RideSource for R {
    fn will_ride(&mut self, probability: f64) -> bool {
        self.random_bool(probability)
    }

    fn magnitude(&mut self, min_tss: f64, max_tss: f64) -> f64 {
        if max_tss <= min_tss {
            return min_tss;
        }
        // float sampling can round up onto the excluded bound
        loop {
            let tss = self.random_range(min_tss..max_tss);
            if tss < max_tss {
                return tss;
            }
        }
    }
}

/// Chronic Training Load simulator.
///
/// CTL is an exponentially weighted moving average of daily TSS:
/// `CTL[i] = CTL[i-1] + alpha * (TSS[i] - CTL[i-1])` with `alpha = 1 / tau`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CtlSimulator {
    days: usize,
    tau: f64,
    alpha: f64,
    seed_ctl: f64,
    mode: TssMode,
}

impl CtlSimulator {
    pub const DEFAULT_DAYS: usize = 42;

    /// Conventional CTL time constant in days.
    pub const DEFAULT_TAU: f64 = 42.0;

    /// `seed_ctl` is the day-0 CTL in randomized mode. Alternating mode seeds
    /// from its first training day instead.
    pub fn new(days: usize, tau: f64, seed_ctl: f64, mode: TssMode) -> Result<Self, AlgoError> {
        if days < 1 {
            return Err(ConfigIssue::ZeroDays.into());
        }
        let alpha = smoothing_factor(tau)?;
        if !seed_ctl.is_finite() {
            return Err(ConfigIssue::NonFiniteSeed(seed_ctl).into());
        }
        mode.validate()?;

        Ok(Self {
            days,
            tau,
            alpha,
            seed_ctl,
            mode,
        })
    }

    pub fn days(&self) -> usize {
        self.days
    }

    pub fn tau(&self) -> f64 {
        self.tau
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn seed_ctl(&self) -> f64 {
        self.seed_ctl
    }

    pub fn mode(&self) -> TssMode {
        self.mode
    }

    /// Runs against the thread-local generator.
    pub fn run(&self) -> CtlRun {
        self.run_with(&mut rand::rng())
    }

    /// Generates the TSS sequence and smooths it into CTL. The source is only
    /// read in randomized mode.
    pub fn run_with<S: RideSource + ?Sized>(&self, source: &mut S) -> CtlRun {
        let (tss, rides, seed) = match self.mode {
            TssMode::Alternating { tss_per_day } => {
                let rides = (0..self.days).map(|i| i % 2 == 0).collect::<Vec<_>>();
                let tss = rides
                    .iter()
                    .map(|&ride| if ride { tss_per_day } else { 0.0 })
                    .collect::<Vec<_>>();
                (tss, rides, tss_per_day)
            }
            TssMode::Randomized {
                ride_probability,
                min_tss,
                max_tss,
            } => {
                let mut tss = vec![0.0; self.days];
                let mut rides = vec![false; self.days];
                for day in 1..self.days {
                    let ride = source.will_ride(ride_probability);
                    let magnitude = source.magnitude(min_tss, max_tss);
                    if ride {
                        rides[day] = true;
                        tss[day] = magnitude;
                    }
                }
                (tss, rides, self.seed_ctl)
            }
        };

        let ctl = smooth(seed, &tss, self.alpha);
        trace!(
            "simulated {} days, {} rides, final CTL {:.2}",
            self.days,
            rides.iter().filter(|r| **r).count(),
            ctl.last().copied().unwrap_or(seed)
        );

        CtlRun { tss, ctl, rides }
    }

    /// Repeats the run `runs` times. Run `k` draws from its own generator
    /// seeded with `seed + k`, so a summary is reproducible from `seed`.
    pub fn monte_carlo(&self, runs: usize, seed: u64) -> Result<MonteCarloSummary, AlgoError> {
        if runs == 0 {
            return Err(ConfigIssue::ZeroRuns.into());
        }

        let mut ctl_sums = vec![0.0; self.days];
        let mut finals = Vec::with_capacity(runs);
        for k in 0..runs {
            let mut rng = StdRng::seed_from_u64(seed.wrapping_add(k as u64));
            let run = self.run_with(&mut rng);
            for (sum, ctl) in ctl_sums.iter_mut().zip(run.ctl()) {
                *sum += ctl;
            }
            finals.push(run.final_ctl());
        }

        let mean_final_ctl = mean(&finals);
        let summary = MonteCarloSummary {
            runs,
            mean_ctl: ctl_sums.into_iter().map(|s| s / runs as f64).collect(),
            mean_final_ctl,
            std_final_ctl: std_dev(&finals, mean_final_ctl),
            min_final_ctl: finals.iter().copied().fold(f64::INFINITY, f64::min),
            max_final_ctl: finals.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        };
        debug!(
            "monte carlo: {} runs, final CTL {:.2} +/- {:.2}",
            runs, summary.mean_final_ctl, summary.std_final_ctl
        );

        Ok(summary)
    }
}

fn smooth(seed: f64, tss: &[f64], alpha: f64) -> Vec<f64> {
    let mut ctl = Vec::with_capacity(tss.len());
    let mut current = seed;
    ctl.push(current);
    for &load in tss.iter().skip(1) {
        current += alpha * (load - current);
        ctl.push(current);
    }
    ctl
}

/// One simulated horizon: the TSS actually used and the CTL it produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CtlRun {
    tss: Vec<f64>,
    ctl: Vec<f64>,
    rides: Vec<bool>,
}

impl CtlRun {
    pub fn tss(&self) -> &[f64] {
        &self.tss
    }

    pub fn ctl(&self) -> &[f64] {
        &self.ctl
    }

    /// Whether each day was a training day.
    pub fn rides(&self) -> &[bool] {
        &self.rides
    }

    pub fn days(&self) -> usize {
        self.ctl.len()
    }

    pub fn final_ctl(&self) -> f64 {
        self.ctl.last().copied().unwrap_or_default()
    }

    pub fn peak_ctl(&self) -> f64 {
        self.ctl.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    pub fn mean_tss(&self) -> f64 {
        mean(&self.tss)
    }

    pub fn ride_days(&self) -> usize {
        self.rides.iter().filter(|r| **r).count()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonteCarloSummary {
    pub runs: usize,
    /// Mean CTL per day across runs.
    pub mean_ctl: Vec<f64>,
    pub mean_final_ctl: f64,
    pub std_final_ctl: f64,
    pub min_final_ctl: f64,
    pub max_final_ctl: f64,
}
