use crate::error::{PreprocessError, PreprocessResult};
use churn_frame::Frame;

/// Significance level for the normality routing decision.
pub const NORMALITY_ALPHA: f64 = 0.05;

/// The test draws at most this many leading values from a column.
pub const NORMALITY_SAMPLE_LIMIT: usize = 5000;

/// Outcome of the Shapiro–Wilk test.
#[derive(Debug, Clone, Copy)]
pub struct ShapiroTest {
    pub statistic: f64,
    pub p_value: f64,
}

/// One-time classification of continuous columns into the two
/// normalization buckets. Computed from training data only and threaded
/// through every subsequent transform, so test and predict subsets can never
/// be routed differently from the training subset.
#[derive(Debug, Clone, Default)]
pub struct ColumnRouting {
    pub gaussian: Vec<String>,
    pub non_gaussian: Vec<String>,
}

impl ColumnRouting {
    pub fn gaussian_refs(&self) -> Vec<&str> {
        self.gaussian.iter().map(String::as_str).collect()
    }

    pub fn non_gaussian_refs(&self) -> Vec<&str> {
        self.non_gaussian.iter().map(String::as_str).collect()
    }
}

/// Classify each continuous training column as Gaussian or non-Gaussian.
///
/// The first `NORMALITY_SAMPLE_LIMIT` values of each column are tested at
/// α = `NORMALITY_ALPHA`; p below α routes the column to the quantile
/// transform, otherwise to standardization.
pub fn route_columns(train: &Frame, continuous: &[&str]) -> PreprocessResult<ColumnRouting> {
    let mut routing = ColumnRouting::default();
    for &name in continuous {
        let column = train.column(name)?;
        let values = column.data();
        let sample = &values[..values.len().min(NORMALITY_SAMPLE_LIMIT)];
        let test = shapiro_wilk(sample)?;
        if test.p_value < NORMALITY_ALPHA {
            routing.non_gaussian.push(name.to_string());
        } else {
            routing.gaussian.push(name.to_string());
        }
    }
    Ok(routing)
}

/// Shapiro–Wilk W test for departure from normality (Royston's AS R94).
///
/// Valid for samples of 3 to 5000 values. Returns the W statistic and an
/// approximate p-value; small p means the sample is unlikely to be normal.
pub fn shapiro_wilk(sample: &[f64]) -> PreprocessResult<ShapiroTest> {
    let n = sample.len();
    if n < 3 {
        return Err(PreprocessError::SampleTooSmall { n, min: 3 });
    }
    if n > NORMALITY_SAMPLE_LIMIT {
        return Err(PreprocessError::SampleTooLarge {
            n,
            max: NORMALITY_SAMPLE_LIMIT,
        });
    }

    let mut x: Vec<f64> = sample.to_vec();
    x.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    if x[n - 1] - x[0] == 0.0 {
        return Err(PreprocessError::ConstantSample);
    }

    // Expected normal order statistics (Blom scores).
    let m: Vec<f64> = (1..=n)
        .map(|i| norm_ppf((i as f64 - 0.375) / (n as f64 + 0.25)))
        .collect();
    let m_sq_sum: f64 = m.iter().map(|v| v * v).sum();

    // Weight vector: antisymmetric, with polynomial corrections for the
    // one or two extreme pairs.
    let mut a = vec![0.0; n];
    if n == 3 {
        a[0] = -std::f64::consts::FRAC_1_SQRT_2;
        a[2] = std::f64::consts::FRAC_1_SQRT_2;
    } else {
        let rsn = 1.0 / (n as f64).sqrt();
        let a1 = poly(
            &[-2.706056, 4.434685, -2.071190, -0.147981, 0.221157],
            rsn,
        ) + m[n - 1] / m_sq_sum.sqrt();

        if n <= 5 {
            let phi = (m_sq_sum - 2.0 * m[n - 1] * m[n - 1]) / (1.0 - 2.0 * a1 * a1);
            let scale = phi.sqrt();
            for i in 1..n - 1 {
                a[i] = m[i] / scale;
            }
            a[n - 1] = a1;
            a[0] = -a1;
        } else {
            let a2 = poly(
                &[-3.582633, 5.682633, -1.752461, -0.293762, 0.042981],
                rsn,
            ) + m[n - 2] / m_sq_sum.sqrt();
            let phi = (m_sq_sum
                - 2.0 * m[n - 1] * m[n - 1]
                - 2.0 * m[n - 2] * m[n - 2])
                / (1.0 - 2.0 * a1 * a1 - 2.0 * a2 * a2);
            let scale = phi.sqrt();
            for i in 2..n - 2 {
                a[i] = m[i] / scale;
            }
            a[n - 1] = a1;
            a[0] = -a1;
            a[n - 2] = a2;
            a[1] = -a2;
        }
    }

    let mean = x.iter().sum::<f64>() / n as f64;
    let ss: f64 = x.iter().map(|&v| (v - mean) * (v - mean)).sum();
    let b: f64 = a.iter().zip(x.iter()).map(|(&ai, &xi)| ai * xi).sum();
    let w = ((b * b) / ss).min(1.0);

    let p_value = shapiro_p_value(w, n);
    Ok(ShapiroTest {
        statistic: w,
        p_value,
    })
}

/// Significance of W under Royston's normalizing transformations.
fn shapiro_p_value(w: f64, n: usize) -> f64 {
    let one_minus_w = (1.0 - w).max(1e-12);

    if n == 3 {
        let p = 6.0 / std::f64::consts::PI
            * ((w.sqrt()).asin() - (0.75f64.sqrt()).asin());
        return p.clamp(0.0, 1.0);
    }

    let z = if n <= 11 {
        let nf = n as f64;
        let g = -2.273 + 0.459 * nf;
        let mu = 0.5440 - 0.39978 * nf + 0.025054 * nf * nf - 0.0006714 * nf * nf * nf;
        let sigma = (1.3822 - 0.77857 * nf + 0.062767 * nf * nf - 0.0020322 * nf * nf * nf).exp();
        (-(g - one_minus_w.ln()).ln() - mu) / sigma
    } else {
        let ln_n = (n as f64).ln();
        let mu = 0.0038915 * ln_n.powi(3) - 0.083751 * ln_n.powi(2) - 0.31082 * ln_n - 1.5861;
        let sigma = (0.0030302 * ln_n.powi(2) - 0.082676 * ln_n - 0.4803).exp();
        (one_minus_w.ln() - mu) / sigma
    };

    (1.0 - norm_cdf(z)).clamp(0.0, 1.0)
}

/// Evaluate a polynomial with coefficients ordered highest degree first,
/// final implicit constant term 0.
fn poly(coeffs: &[f64], x: f64) -> f64 {
    coeffs.iter().fold(0.0, |acc, &c| acc * x + c) * x
}

/// Inverse standard normal CDF (Acklam's rational approximation).
fn norm_ppf(p: f64) -> f64 {
    const A: [f64; 6] = [
        -3.969683028665376e+01,
        2.209460984245205e+02,
        -2.759285104469687e+02,
        1.383577518672690e+02,
        -3.066479806614716e+01,
        2.506628277459239e+00,
    ];
    const B: [f64; 5] = [
        -5.447609879822406e+01,
        1.615858368580409e+02,
        -1.556989798598866e+02,
        6.680131188771972e+01,
        -1.328068155288572e+01,
    ];
    const C: [f64; 6] = [
        -7.784894002430293e-03,
        -3.223964580411365e-01,
        -2.400758277161838e+00,
        -2.549732539343734e+00,
        4.374664141464968e+00,
        2.938163982698783e+00,
    ];
    const D: [f64; 4] = [
        7.784695709041462e-03,
        3.224671290700398e-01,
        2.445134137142996e+00,
        3.754408661907416e+00,
    ];

    const P_LOW: f64 = 0.02425;

    if p < P_LOW {
        let q = (-2.0 * p.ln()).sqrt();
        (((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
            / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0)
    } else if p <= 1.0 - P_LOW {
        let q = p - 0.5;
        let r = q * q;
        (((((A[0] * r + A[1]) * r + A[2]) * r + A[3]) * r + A[4]) * r + A[5]) * q
            / (((((B[0] * r + B[1]) * r + B[2]) * r + B[3]) * r + B[4]) * r + 1.0)
    } else {
        -norm_ppf(1.0 - p)
    }
}

/// Standard normal CDF via the Abramowitz–Stegun erf approximation.
fn norm_cdf(z: f64) -> f64 {
    0.5 * (1.0 + erf(z / std::f64::consts::SQRT_2))
}

fn erf(x: f64) -> f64 {
    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();
    let t = 1.0 / (1.0 + 0.3275911 * x);
    let y = 1.0
        - (((((1.061405429 * t - 1.453152027) * t) + 1.421413741) * t - 0.284496736) * t
            + 0.254829592)
            * t
            * (-x * x).exp();
    sign * y
}
