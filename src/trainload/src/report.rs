//! Console summaries of the sequences computed by `trainload-algos`.

use std::fmt::{Display, Formatter, Result};

use trainload_algos::{
    CtlRun, CtlSimulator, DailyLoad, FuelBurn, FuelSweep, MonteCarloSummary, Polynomial,
    TssPoint,
};

use crate::helpers::format_series::FormatSeries;

pub struct CtlReport<'a> {
    pub simulator: &'a CtlSimulator,
    pub run: &'a CtlRun,
}

impl Display for CtlReport<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let run = self.run;
        writeln!(f, "Days: {}", run.days())?;
        writeln!(
            f,
            "Tau: {} (alpha {:.4})",
            self.simulator.tau(),
            self.simulator.alpha()
        )?;
        writeln!(f, "Final CTL: {}", run.final_ctl().format_series())?;
        writeln!(f, "Peak CTL: {}", run.peak_ctl().format_series())?;
        writeln!(f, "Mean TSS: {}", run.mean_tss().format_series())?;
        writeln!(f, "Ride days: {} {}", run.ride_days(), run.rides().format_series())?;
        writeln!(f)?;
        write!(f, "{:>4} {:>8} {:>8}", "Day", "TSS", "CTL")?;
        for (day, (tss, ctl)) in run.tss().iter().zip(run.ctl()).enumerate() {
            write!(f, "\n{:>4} {:>8.1} {:>8.2}", day + 1, tss, ctl)?;
        }
        Ok(())
    }
}

pub struct MonteCarloReport<'a>(pub &'a MonteCarloSummary);

impl Display for MonteCarloReport<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let summary = self.0;
        writeln!(f, "Runs: {}", summary.runs)?;
        writeln!(
            f,
            "Final CTL: {} +/- {} (min {}, max {})",
            summary.mean_final_ctl.format_series(),
            summary.std_final_ctl.format_series(),
            summary.min_final_ctl.format_series(),
            summary.max_final_ctl.format_series()
        )?;
        write!(f, "Mean CTL by day: {}", summary.mean_ctl.format_series())
    }
}

pub struct LoadReport<'a>(pub &'a [DailyLoad]);

impl Display for LoadReport<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(
            f,
            "{:>4} {:>8} {:>8} {:>8} {:>8}",
            "Day", "TSS", "Fitness", "Fatigue", "Form"
        )?;
        for (day, load) in self.0.iter().enumerate() {
            write!(
                f,
                "\n{:>4} {:>8.1} {:>8.2} {:>8.2} {:>8.2}",
                day + 1,
                load.tss,
                load.fitness,
                load.fatigue,
                load.form
            )?;
        }
        Ok(())
    }
}

pub struct TssCurveReport<'a>(pub &'a [TssPoint]);

impl Display for TssCurveReport<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(f, "{:>6} {:>8}", "IF", "TSS")?;
        for point in self.0 {
            write!(f, "\n{:>6.2} {:>8.1}", point.intensity, point.tss)?;
        }
        Ok(())
    }
}

/// Fat-max summary of a power sweep, plus the burn `offset_watts` above it.
pub struct FuelReport<'a> {
    pub sweep: &'a FuelSweep,
    pub offset_watts: f64,
}

impl FuelReport<'_> {
    fn burn_line(f: &mut Formatter<'_>, label: &str, burn: &FuelBurn) -> Result {
        writeln!(
            f,
            "{label}: fat {:.1} kcal/h, carb {:.1} kcal/h, total {:.1} kcal/h at {:.0} W (IF={:.2}, {:.0} TSS/h)",
            burn.fat_kcal_per_hour,
            burn.carb_kcal_per_hour,
            burn.total_kcal_per_hour,
            burn.power,
            burn.intensity,
            burn.tss_per_hour
        )
    }
}

impl Display for FuelReport<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let Some(peak) = self.sweep.fat_max() else {
            return writeln!(f, "No powers sampled");
        };
        Self::burn_line(f, "Fat max", &peak)?;

        let target = peak.power + self.offset_watts;
        match self.sweep.at_power(target) {
            Some(burn) if (burn.power - target).abs() < f64::EPSILON => {
                Self::burn_line(f, &format!("Fat max {:+.0} W", self.offset_watts), &burn)
            }
            _ => writeln!(f, "Fat max {:+.0} W: outside the sweep", self.offset_watts),
        }
    }
}

pub struct FitReport<'a>(pub &'a Polynomial);

impl Display for FitReport<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        writeln!(f, "Fit: {}", self.0)?;
        write!(
            f,
            "Polynomial coefficients: {:?}",
            self.0.coefficients_desc()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trainload_algos::{FuelModel, LoadModel, TssMode, tss::tss_curve};

    #[test]
    fn ctl_report_lists_every_day() {
        let simulator =
            CtlSimulator::new(5, 42.0, 0.0, TssMode::Alternating { tss_per_day: 50.0 }).unwrap();
        let run = simulator.run();
        let report = CtlReport {
            simulator: &simulator,
            run: &run,
        }
        .to_string();

        assert!(report.contains("Final CTL: 47.73"));
        assert!(report.contains("Peak CTL: 50.00"));
        assert!(report.contains("Ride days: 3 R.R.R"));
        assert!(report.contains("   2      0.0    48.81"));
        assert_eq!(report.lines().count(), 6 + 1 + 1 + 5);
    }

    #[test]
    fn monte_carlo_report_shows_spread() {
        let simulator = CtlSimulator::new(
            10,
            42.0,
            0.0,
            TssMode::Randomized {
                ride_probability: 0.5,
                min_tss: 30.0,
                max_tss: 120.0,
            },
        )
        .unwrap();
        let summary = simulator.monte_carlo(10, 1).unwrap();
        let report = MonteCarloReport(&summary).to_string();
        assert!(report.starts_with("Runs: 10\nFinal CTL: "));
        assert!(report.contains("Mean CTL by day: [0.00, "));
    }

    #[test]
    fn load_report_has_header_and_rows() {
        let history = LoadModel::default()
            .history(DailyLoad::default(), &[70.0, 0.0])
            .unwrap();
        let report = LoadReport(&history).to_string();
        let lines = report.lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("Fitness"));
        assert!(lines[1].starts_with("   1     70.0"));
    }

    #[test]
    fn tss_curve_report_ends_at_threshold() {
        let curve = tss_curve(1.0, 11);
        let report = TssCurveReport(&curve).to_string();
        assert!(report.ends_with("  1.00    100.0"));
    }

    #[test]
    fn fuel_report_for_212_ftp() {
        let sweep = FuelModel::new(212.0).sweep(1.5, 1.0).unwrap();
        let report = FuelReport {
            sweep: &sweep,
            offset_watts: 20.0,
        }
        .to_string();
        assert!(report.contains("Fat max: fat 449.5 kcal/h"));
        assert!(report.contains("at 160 W (IF=0.75"));
        assert!(report.contains("Fat max +20 W: fat 439.4 kcal/h"));
    }

    #[test]
    fn fuel_report_outside_sweep() {
        let sweep = FuelModel::new(212.0).sweep(1.5, 1.0).unwrap();
        let report = FuelReport {
            sweep: &sweep,
            offset_watts: 500.0,
        }
        .to_string();
        assert!(report.contains("outside the sweep"));
    }

    #[test]
    fn fit_report_prints_formula() {
        let poly = Polynomial::new(vec![1.0, -2.0, 3.0]);
        let report = FitReport(&poly).to_string();
        assert_eq!(
            report,
            "Fit: 3.0000x² -2.0000x +1.0000\nPolynomial coefficients: [3.0, -2.0, 1.0]"
        );
    }
}
