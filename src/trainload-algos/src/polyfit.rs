use std::fmt::Display;

use serde::Serialize;

use crate::AlgoError;

/// Fat share of energy (y) against intensity factor (x), read off a fueling
/// calculator. A quadratic fit of these samples gives
/// [`FuelModel::FAT_FRACTION_COEFFS`](crate::FuelModel::FAT_FRACTION_COEFFS).
pub const FAT_OXIDATION_SAMPLES: [(f64, f64); 24] = [
    (0.15, 0.97),
    (0.20, 0.95),
    (0.25, 0.93),
    (0.30, 0.90),
    (0.35, 0.88),
    (0.40, 0.85),
    (0.45, 0.82),
    (0.50, 0.79),
    (0.55, 0.76),
    (0.60, 0.72),
    (0.65, 0.69),
    (0.70, 0.65),
    (0.75, 0.61),
    (0.80, 0.57),
    (0.85, 0.53),
    (0.90, 0.48),
    (0.95, 0.43),
    (1.00, 0.39),
    (1.05, 0.34),
    (1.10, 0.29),
    (1.15, 0.23),
    (1.20, 0.18),
    (1.25, 0.12),
    (1.30, 0.06),
];

/// Polynomial with coefficients in ascending order of power.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Polynomial {
    coefficients: Vec<f64>,
}

impl Polynomial {
    pub fn new(coefficients: Vec<f64>) -> Self {
        Self { coefficients }
    }

    pub fn degree(&self) -> usize {
        self.coefficients.len().saturating_sub(1)
    }

    /// Constant term first.
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    /// Highest power first.
    pub fn coefficients_desc(&self) -> Vec<f64> {
        self.coefficients.iter().rev().copied().collect()
    }

    pub fn eval(&self, x: f64) -> f64 {
        self.coefficients
            .iter()
            .rev()
            .fold(0.0, |acc, c| acc * x + c)
    }
}

impl Display for Polynomial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let degree = self.degree();
        for (i, c) in self.coefficients_desc().into_iter().enumerate() {
            let power = degree - i;
            if i == 0 {
                write!(f, "{c:.4}")?;
            } else {
                write!(f, " {c:+.4}")?;
            }
            match power {
                0 => {}
                1 => f.write_str("x")?,
                2 => f.write_str("x²")?,
                3 => f.write_str("x³")?,
                _ => write!(f, "x^{power}")?,
            }
        }
        Ok(())
    }
}

/// Least squares fit of `degree`, solved through the normal equations.
pub fn polyfit(x: &[f64], y: &[f64], degree: usize) -> Result<Polynomial, AlgoError> {
    if x.len() != y.len() {
        return Err(AlgoError::LengthMismatch {
            x: x.len(),
            y: y.len(),
        });
    }
    let size = degree + 1;
    if x.len() < size {
        return Err(AlgoError::NotEnoughPoints {
            degree,
            needed: size,
            got: x.len(),
        });
    }

    // fit against x / scale so the power sums stay near 1
    let scale = match x.iter().fold(0.0_f64, |acc, v| acc.max(v.abs())) {
        s if s > 0.0 && s.is_finite() => s,
        _ => 1.0,
    };

    // power sums: sums[k] = sum(t^k) for k in 0..=2*degree
    let mut sums = vec![0.0; 2 * degree + 1];
    let mut rhs = vec![0.0; size];
    for (&xi, &yi) in x.iter().zip(y) {
        let t = xi / scale;
        let mut p = 1.0;
        for (k, sum) in sums.iter_mut().enumerate() {
            *sum += p;
            if k < size {
                rhs[k] += p * yi;
            }
            p *= t;
        }
    }

    let mut system = (0..size)
        .map(|row| {
            let mut line = sums[row..row + size].to_vec();
            line.push(rhs[row]);
            line
        })
        .collect::<Vec<_>>();

    let coefficients = solve(&mut system)?
        .into_iter()
        .zip(0..)
        .map(|(c, k)| c / scale.powi(k))
        .collect();
    debug!("fitted degree {} polynomial to {} points", degree, x.len());
    Ok(Polynomial::new(coefficients))
}

/// Gauss-Jordan elimination with partial pivoting on an augmented matrix.
fn solve(system: &mut [Vec<f64>]) -> Result<Vec<f64>, AlgoError> {
    let size = system.len();
    let largest = system
        .iter()
        .flat_map(|line| &line[..size])
        .fold(0.0_f64, |acc, v| acc.max(v.abs()));
    let tolerance = f64::EPSILON * size as f64 * largest;

    for col in 0..size {
        let pivot = (col..size)
            .max_by(|&a, &b| system[a][col].abs().total_cmp(&system[b][col].abs()))
            .ok_or(AlgoError::SingularFit)?;
        if system[pivot][col].abs() <= tolerance {
            return Err(AlgoError::SingularFit);
        }
        system.swap(col, pivot);

        for row in 0..size {
            if row == col {
                continue;
            }
            let factor = system[row][col] / system[col][col];
            if factor == 0.0 {
                continue;
            }
            for k in col..=size {
                let delta = factor * system[col][k];
                system[row][k] -= delta;
            }
        }
    }

    Ok((0..size).map(|i| system[i][size] / system[i][i]).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FuelModel;

    fn samples() -> (Vec<f64>, Vec<f64>) {
        FAT_OXIDATION_SAMPLES.iter().copied().unzip()
    }

    #[test]
    fn fits_exact_quadratic() {
        let x = [-2.0, -1.0, 0.0, 1.0, 2.0, 3.0];
        let y = x.map(|v| 3.0 * v * v - 2.0 * v + 0.5);
        let poly = polyfit(&x, &y, 2).unwrap();
        let expected = [0.5, -2.0, 3.0];
        for (c, e) in poly.coefficients().iter().zip(expected) {
            assert!((c - e).abs() < 1e-9, "{c} vs {e}");
        }
    }

    #[test]
    fn fits_line_through_noisy_points() {
        // symmetric noise around y = 2x + 1
        let x = [0.0, 1.0, 2.0, 3.0];
        let y = [1.1, 2.9, 5.1, 6.9];
        let poly = polyfit(&x, &y, 1).unwrap();
        assert!((poly.eval(1.5) - 4.0).abs() < 1e-9);
        assert_eq!(poly.degree(), 1);
    }

    #[test]
    fn fat_samples_reproduce_fuel_coefficients() {
        let (x, y) = samples();
        let poly = polyfit(&x, &y, 2).unwrap();
        for (c, e) in poly
            .coefficients_desc()
            .iter()
            .zip(FuelModel::FAT_FRACTION_COEFFS)
        {
            assert!((c - e).abs() < 1e-6, "{c} vs {e}");
        }
    }

    #[test]
    fn eval_uses_ascending_coefficients() {
        let poly = Polynomial::new(vec![1.0, 0.0, 2.0]);
        assert_eq!(poly.eval(3.0), 19.0);
        assert_eq!(poly.coefficients_desc(), vec![2.0, 0.0, 1.0]);
    }

    #[test]
    fn display_like_a_formula() {
        let poly = Polynomial::new(vec![1.0207, -0.2868, -0.3465]);
        assert_eq!(poly.to_string(), "-0.3465x² -0.2868x +1.0207");
    }

    #[test]
    fn rejects_mismatched_lengths() {
        assert_eq!(
            polyfit(&[1.0, 2.0], &[1.0], 1),
            Err(AlgoError::LengthMismatch { x: 2, y: 1 })
        );
    }

    #[test]
    fn rejects_too_few_points() {
        assert_eq!(
            polyfit(&[1.0, 2.0], &[1.0, 2.0], 2),
            Err(AlgoError::NotEnoughPoints {
                degree: 2,
                needed: 3,
                got: 2
            })
        );
    }

    #[test]
    fn fits_small_scale_x() {
        let x = [1e-5, 2e-5, 3e-5, 4e-5];
        let y = x.map(|v| 1.0 + v);
        let poly = polyfit(&x, &y, 2).unwrap();
        assert!((poly.coefficients()[0] - 1.0).abs() < 1e-9);
        for (xi, yi) in x.iter().zip(y) {
            assert!((poly.eval(*xi) - yi).abs() < 1e-9);
        }
    }

    #[test]
    fn fits_large_scale_x() {
        let x = [1e5, 2e5, 3e5, 4e5];
        let y = x.map(|v| 2.0 * v - 3.0);
        let poly = polyfit(&x, &y, 1).unwrap();
        assert!((poly.coefficients()[1] - 2.0).abs() < 1e-9);
        assert!((poly.eval(2.5e5) - 499_997.0).abs() < 1e-4);
    }

    #[test]
    fn rejects_repeated_x() {
        let result = polyfit(&[1.0, 1.0, 1.0], &[1.0, 2.0, 3.0], 1);
        assert_eq!(result, Err(AlgoError::SingularFit));
    }
}
