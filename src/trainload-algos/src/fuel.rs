use serde::Serialize;

use crate::{
    AlgoError, ConfigIssue,
    helpers::series_math::argmax,
    tss::{intensity_factor, tss_from_intensity},
};

/// Fat and carbohydrate burn for a steady effort, estimated from intensity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FuelModel {
    pub ftp: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FuelBurn {
    pub power: f64,
    pub intensity: f64,
    pub fat_kcal_per_hour: f64,
    pub carb_kcal_per_hour: f64,
    pub total_kcal_per_hour: f64,
    /// TSS of one hour at this power.
    pub tss_per_hour: f64,
}

impl FuelModel {
    /// Fat fraction `A*IF^2 + B*IF + C`, fitted to published fueling calculator output.
    pub const FAT_FRACTION_COEFFS: [f64; 3] = [-0.34648829, -0.28680936, 1.02073278];

    /// kJ of mechanical work per watt-hour.
    const KJ_PER_WATT_HOUR: f64 = 3.6;

    /// Metabolic kcal per mechanical kJ.
    const KCAL_PER_KJ: f64 = 9.0 / 7.0;

    /// Upper bound on the number of powers one sweep samples.
    pub const MAX_SWEEP_POINTS: usize = 100_000;

    pub fn new(ftp: f64) -> Self {
        Self { ftp }
    }

    /// Share of energy from fat at `intensity`, clamped to `[0, 1]`.
    pub fn fat_fraction(intensity: f64) -> f64 {
        let [a, b, c] = Self::FAT_FRACTION_COEFFS;
        (a * intensity.powi(2) + b * intensity + c).clamp(0.0, 1.0)
    }

    pub fn carb_fraction(intensity: f64) -> f64 {
        1.0 - Self::fat_fraction(intensity)
    }

    pub fn kcal_per_hour(power: f64) -> f64 {
        power * Self::KJ_PER_WATT_HOUR * Self::KCAL_PER_KJ
    }

    pub fn burn(&self, power: f64) -> FuelBurn {
        let intensity = intensity_factor(power, self.ftp);
        let total = Self::kcal_per_hour(power);
        let fat = total * Self::fat_fraction(intensity);
        FuelBurn {
            power,
            intensity,
            fat_kcal_per_hour: fat,
            carb_kcal_per_hour: total * Self::carb_fraction(intensity),
            total_kcal_per_hour: total,
            tss_per_hour: tss_from_intensity(1.0, intensity),
        }
    }

    /// Burns from 0 W up to `ftp * max_ratio` in `step_watts` increments.
    /// A negative top power gives an empty sweep.
    pub fn sweep(&self, max_ratio: f64, step_watts: f64) -> Result<FuelSweep, AlgoError> {
        if !(step_watts.is_finite() && step_watts > 0.0) {
            return Err(ConfigIssue::SweepStepOutOfRange(step_watts).into());
        }
        let top = (self.ftp * max_ratio).floor();
        if top < 0.0 {
            return Ok(FuelSweep { burns: Vec::new() });
        }

        let steps = (top / step_watts).floor();
        if !steps.is_finite() || steps >= Self::MAX_SWEEP_POINTS as f64 {
            return Err(ConfigIssue::TooManySweepPoints(steps).into());
        }
        let burns = (0..=steps as usize)
            .map(|i| self.burn(i as f64 * step_watts))
            .collect();
        Ok(FuelSweep { burns })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FuelSweep {
    pub burns: Vec<FuelBurn>,
}

impl FuelSweep {
    /// The effort burning the most fat per hour. Ties go to the lower power.
    pub fn fat_max(&self) -> Option<FuelBurn> {
        let fat = self
            .burns
            .iter()
            .map(|b| b.fat_kcal_per_hour)
            .collect::<Vec<_>>();
        argmax(&fat).map(|i| self.burns[i])
    }

    /// The sampled burn closest to `power`.
    pub fn at_power(&self, power: f64) -> Option<FuelBurn> {
        self.burns
            .iter()
            .min_by(|a, b| (a.power - power).abs().total_cmp(&(b.power - power).abs()))
            .copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fat_fraction_is_clamped() {
        assert_eq!(FuelModel::fat_fraction(0.0), 1.0);
        assert_eq!(FuelModel::fat_fraction(2.0), 0.0);
        let mid = FuelModel::fat_fraction(0.7);
        assert!(mid > 0.0 && mid < 1.0);
        assert!((mid + FuelModel::carb_fraction(0.7) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn energy_per_hour() {
        // 100 W -> 360 kJ/h -> 462.857 kcal/h
        assert!((FuelModel::kcal_per_hour(100.0) - 462.857_142_857).abs() < 1e-6);
    }

    #[test]
    fn burn_splits_total() {
        let burn = FuelModel::new(212.0).burn(180.0);
        assert!(
            (burn.fat_kcal_per_hour + burn.carb_kcal_per_hour - burn.total_kcal_per_hour).abs()
                < 1e-9
        );
        assert!((burn.intensity - 180.0 / 212.0).abs() < 1e-12);
    }

    #[test]
    fn zero_ftp_burns_only_fat() {
        let burn = FuelModel::new(0.0).burn(200.0);
        assert_eq!(burn.intensity, 0.0);
        assert_eq!(burn.tss_per_hour, 0.0);
        assert_eq!(burn.carb_kcal_per_hour, 0.0);
    }

    #[test]
    fn sweep_covers_zero_to_max_ratio() {
        let sweep = FuelModel::new(212.0).sweep(1.5, 1.0).unwrap();
        // 0..=318 W
        assert_eq!(sweep.burns.len(), 319);
        assert_eq!(sweep.burns[0].power, 0.0);
        assert_eq!(sweep.burns.last().unwrap().power, 318.0);
    }

    #[test]
    fn fat_max_for_212_ftp() {
        let sweep = FuelModel::new(212.0).sweep(1.5, 1.0).unwrap();
        let peak = sweep.fat_max().unwrap();
        assert_eq!(peak.power, 160.0);
        assert!((peak.fat_kcal_per_hour - 449.46).abs() < 0.01);
        assert!((peak.carb_kcal_per_hour - 291.11).abs() < 0.01);

        let above = sweep.at_power(peak.power + 20.0).unwrap();
        assert_eq!(above.power, 180.0);
        assert!((above.fat_kcal_per_hour - 439.43).abs() < 0.01);
    }

    #[test]
    fn empty_sweep_below_zero_watts() {
        let sweep = FuelModel::new(212.0).sweep(-1.0, 1.0).unwrap();
        assert!(sweep.burns.is_empty());
        assert!(sweep.fat_max().is_none());
        assert!(sweep.at_power(100.0).is_none());
    }

    #[test]
    fn rejects_bad_sweep_step() {
        let model = FuelModel::new(212.0);
        for step in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(
                matches!(
                    model.sweep(1.5, step),
                    Err(AlgoError::InvalidConfiguration(
                        ConfigIssue::SweepStepOutOfRange(_)
                    ))
                ),
                "step {step} accepted"
            );
        }
    }

    #[test]
    fn rejects_oversized_sweeps() {
        let model = FuelModel::new(212.0);
        assert_eq!(
            model.sweep(1.5, 1e-9),
            Err(AlgoError::InvalidConfiguration(
                ConfigIssue::TooManySweepPoints(318e9)
            ))
        );
        assert!(FuelModel::new(f64::INFINITY).sweep(1.5, 1.0).is_err());
        assert!(FuelModel::new(f64::NAN).sweep(1.5, 1.0).is_err());
    }
}
