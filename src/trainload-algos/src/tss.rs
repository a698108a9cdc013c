//! Training Stress Score for steady efforts.
//!
//! `TSS = hours x IF^2 x 100` where `IF = power / FTP`, so one hour at FTP
//! scores exactly 100.

use serde::Serialize;

use crate::helpers::series_math::linspace;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TssPoint {
    pub intensity: f64,
    pub tss: f64,
}

/// `power / ftp`, or 0 without a usable FTP.
pub fn intensity_factor(power: f64, ftp: f64) -> f64 {
    if ftp > 0.0 { power / ftp } else { 0.0 }
}

pub fn tss_from_intensity(hours: f64, intensity: f64) -> f64 {
    hours * intensity.powi(2) * 100.0
}

pub fn training_stress_score(hours: f64, power: f64, ftp: f64) -> f64 {
    if ftp <= 0.0 {
        return 0.0;
    }
    tss_from_intensity(hours, intensity_factor(power, ftp))
}

/// Hours at `intensity` needed to collect `target_tss`.
pub fn hours_for_tss(intensity: f64, target_tss: f64) -> Option<f64> {
    if intensity <= 0.0 {
        return None;
    }
    Some(target_tss / 100.0 / intensity.powi(2))
}

/// TSS of a `hours` long effort for `points` intensities evenly spaced on `[0, 1]`.
pub fn tss_curve(hours: f64, points: usize) -> Vec<TssPoint> {
    linspace(0.0, 1.0, points)
        .into_iter()
        .map(|intensity| TssPoint {
            intensity,
            tss: tss_from_intensity(hours, intensity),
        })
        .collect()
}
