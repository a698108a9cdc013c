use serde::{Deserialize, Serialize};

use crate::{
    AlgoError,
    ctl::{check_tss, smoothing_factor},
};

/// One day of the performance management model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyLoad {
    pub tss: f64,
    /// Chronic load (CTL).
    pub fitness: f64,
    /// Acute load (ATL).
    pub fatigue: f64,
    /// `fitness - fatigue`.
    pub form: f64,
}

impl DailyLoad {
    pub fn new(fitness: f64, fatigue: f64) -> Self {
        Self {
            tss: 0.0,
            fitness,
            fatigue,
            form: fitness - fatigue,
        }
    }
}

/// Fitness and fatigue as two exponential averages of the same daily TSS,
/// plus the inverse problem: what TSS lands tomorrow on a target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoadModel {
    fitness_tau: f64,
    fatigue_tau: f64,
    fitness_alpha: f64,
    fatigue_alpha: f64,
}

impl LoadModel {
    pub const DEFAULT_FITNESS_TAU: f64 = 42.0;
    pub const DEFAULT_FATIGUE_TAU: f64 = 7.0;

    pub fn new(fitness_tau: f64, fatigue_tau: f64) -> Result<Self, AlgoError> {
        Ok(Self {
            fitness_tau,
            fatigue_tau,
            fitness_alpha: smoothing_factor(fitness_tau)?,
            fatigue_alpha: smoothing_factor(fatigue_tau)?,
        })
    }

    pub fn fitness_tau(&self) -> f64 {
        self.fitness_tau
    }

    pub fn fatigue_tau(&self) -> f64 {
        self.fatigue_tau
    }

    pub fn step(&self, prev: DailyLoad, tss: f64) -> DailyLoad {
        let fitness = prev.fitness + self.fitness_alpha * (tss - prev.fitness);
        let fatigue = prev.fatigue + self.fatigue_alpha * (tss - prev.fatigue);
        DailyLoad {
            tss,
            fitness,
            fatigue,
            form: fitness - fatigue,
        }
    }

    /// Applies each day's TSS in order, starting from `start`. The result has
    /// one entry per TSS value and does not include `start`. Every load must be
    /// finite and non-negative.
    pub fn history(
        &self,
        start: DailyLoad,
        daily_tss: &[f64],
    ) -> Result<Vec<DailyLoad>, AlgoError> {
        for &tss in daily_tss {
            check_tss(tss)?;
        }
        Ok(daily_tss
            .iter()
            .scan(start, |prev, &tss| {
                *prev = self.step(*prev, tss);
                Some(*prev)
            })
            .collect())
    }

    /// TSS that moves fitness from `fitness_yesterday` to `target` in one day.
    pub fn required_load_for_fitness(&self, fitness_yesterday: f64, target: f64) -> f64 {
        self.fitness_tau * target - (self.fitness_tau - 1.0) * fitness_yesterday
    }

    /// TSS that moves fatigue from `fatigue_yesterday` to `target` in one day.
    pub fn required_load_for_fatigue(&self, fatigue_yesterday: f64, target: f64) -> f64 {
        self.fatigue_tau * target - (self.fatigue_tau - 1.0) * fatigue_yesterday
    }

    /// TSS that makes today's form equal `target_form`.
    ///
    /// Form is linear in today's load with slope `fitness_alpha - fatigue_alpha`;
    /// with equal time constants it does not depend on load and there is no answer.
    pub fn required_load_for_form(
        &self,
        fitness_yesterday: f64,
        fatigue_yesterday: f64,
        target_form: f64,
    ) -> Option<f64> {
        let slope = self.fitness_alpha - self.fatigue_alpha;
        if slope == 0.0 {
            return None;
        }
        let carried = (1.0 - self.fitness_alpha) * fitness_yesterday
            - (1.0 - self.fatigue_alpha) * fatigue_yesterday;
        Some((target_form - carried) / slope)
    }

    /// TSS that makes today's `form / fitness` equal `ratio`.
    pub fn required_load_for_form_ratio(
        &self,
        fitness_yesterday: f64,
        fatigue_yesterday: f64,
        ratio: f64,
    ) -> Option<f64> {
        let a = self.fitness_alpha;
        let b = self.fatigue_alpha;
        let denominator = (a - b) - ratio * a;
        if denominator == 0.0 {
            return None;
        }
        let numerator =
            (ratio - 1.0) * (1.0 - a) * fitness_yesterday + (1.0 - b) * fatigue_yesterday;
        Some(numerator / denominator)
    }

    /// TSS for today such that, after a rest day tomorrow, the form the
    /// morning after equals `target_form`.
    pub fn required_load_before_rest_for_form(
        &self,
        fitness_yesterday: f64,
        fatigue_yesterday: f64,
        target_form: f64,
    ) -> Option<f64> {
        let keep_fitness = 1.0 - self.fitness_alpha;
        let keep_fatigue = 1.0 - self.fatigue_alpha;
        let slope = self.fitness_alpha * keep_fitness - self.fatigue_alpha * keep_fatigue;
        if slope == 0.0 {
            return None;
        }
        let carried = keep_fitness.powi(2) * fitness_yesterday
            - keep_fatigue.powi(2) * fatigue_yesterday;
        Some((target_form - carried) / slope)
    }

    /// Like [`Self::required_load_before_rest_for_form`], targeting
    /// `form / fitness` after the rest day.
    pub fn required_load_before_rest_for_form_ratio(
        &self,
        fitness_yesterday: f64,
        fatigue_yesterday: f64,
        ratio: f64,
    ) -> Option<f64> {
        let keep_fitness = 1.0 - self.fitness_alpha;
        let keep_fatigue = 1.0 - self.fatigue_alpha;
        let denominator = (1.0 - ratio) * self.fitness_alpha * keep_fitness
            - self.fatigue_alpha * keep_fatigue;
        if denominator == 0.0 {
            return None;
        }
        let numerator = keep_fatigue.powi(2) * fatigue_yesterday
            - (1.0 - ratio) * keep_fitness.powi(2) * fitness_yesterday;
        Some(numerator / denominator)
    }
}

impl Default for LoadModel {
    fn default() -> Self {
        let fitness_tau = Self::DEFAULT_FITNESS_TAU;
        let fatigue_tau = Self::DEFAULT_FATIGUE_TAU;
        Self {
            fitness_tau,
            fatigue_tau,
            fitness_alpha: 1.0 / fitness_tau,
            fatigue_alpha: 1.0 / fatigue_tau,
        }
    }
}
