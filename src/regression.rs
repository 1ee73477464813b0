use std::fmt::Write as _;

use chrono::{Local, NaiveDateTime};
use faer::Mat;
use serde::Serialize;
use statrs::distribution::{ChiSquared, ContinuousCDF, FisherSnedecor, StudentsT};

use crate::error::AnalysisError;

pub const CONST_NAME: &str = "const";

#[derive(Debug, Clone, Serialize)]
pub struct Coefficient {
    pub name: String,
    pub coef: f64,
    pub std_err: f64,
    pub t_value: f64,
    pub p_value: f64,
    pub ci_low: f64,
    pub ci_high: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct OlsFit {
    pub dep_var: String,
    pub n_obs: usize,
    pub df_model: usize,
    pub df_resid: usize,
    pub coefficients: Vec<Coefficient>,
    pub r_squared: f64,
    pub adj_r_squared: f64,
    pub f_statistic: f64,
    pub f_p_value: f64,
    pub log_likelihood: f64,
    pub aic: f64,
    pub bic: f64,
    pub durbin_watson: f64,
    pub skew: f64,
    pub kurtosis: f64,
    pub jarque_bera: f64,
    pub jb_p_value: f64,
    pub condition_number: f64,
    #[serde(skip)]
    pub residuals: Vec<f64>,
}

impl OlsFit {
    pub fn coefficient(&self, name: &str) -> Option<&Coefficient> {
        self.coefficients.iter().find(|c| c.name == name)
    }

    pub fn summary(&self) -> String {
        self.summary_at(Local::now().naive_local())
    }

    /// Plain-text results table in the familiar statsmodels layout.
    pub fn summary_at(&self, when: NaiveDateTime) -> String {
        const RULE: &str =
            "==============================================================================";
        const THIN: &str =
            "------------------------------------------------------------------------------";

        let mut out = String::new();
        let _ = writeln!(out, "{:^78}", "OLS Regression Results");
        let _ = writeln!(out, "{RULE}");
        let header = [
            ("Dep. Variable:", self.dep_var.clone(), "R-squared:", fmt_stat(self.r_squared)),
            ("Model:", "OLS".to_string(), "Adj. R-squared:", fmt_stat(self.adj_r_squared)),
            ("Method:", "Least Squares".to_string(), "F-statistic:", fmt_stat(self.f_statistic)),
            (
                "Date:",
                when.format("%a, %d %b %Y").to_string(),
                "Prob (F-statistic):",
                fmt_stat(self.f_p_value),
            ),
            (
                "Time:",
                when.format("%H:%M:%S").to_string(),
                "Log-Likelihood:",
                fmt_stat(self.log_likelihood),
            ),
            ("No. Observations:", self.n_obs.to_string(), "AIC:", fmt_stat(self.aic)),
            ("Df Residuals:", self.df_resid.to_string(), "BIC:", fmt_stat(self.bic)),
        ];
        for (l_label, l_val, r_label, r_val) in &header {
            let _ = writeln!(out, "{}", pair_line(l_label, l_val, r_label, r_val));
        }
        let _ = writeln!(out, "{}", pair_line("Df Model:", &self.df_model.to_string(), "", ""));
        let _ = writeln!(out, "{RULE}");

        let name_width = self
            .coefficients
            .iter()
            .map(|c| c.name.len())
            .max()
            .unwrap_or(0)
            .max(14);
        let _ = writeln!(
            out,
            "{:<name_width$}{:>10}{:>11}{:>11}{:>11}{:>12}{:>12}",
            "", "coef", "std err", "t", "P>|t|", "[0.025", "0.975]"
        );
        let _ = writeln!(out, "{THIN}");
        for c in &self.coefficients {
            let _ = writeln!(
                out,
                "{:<name_width$}{:>10}{:>11}{:>11}{:>11}{:>12}{:>12}",
                c.name,
                fmt_stat(c.coef),
                fmt_stat(c.std_err),
                fmt_fixed(c.t_value, 3),
                fmt_fixed(c.p_value, 3),
                fmt_stat(c.ci_low),
                fmt_stat(c.ci_high),
            );
        }
        let _ = writeln!(out, "{RULE}");
        let _ = writeln!(
            out,
            "{}",
            pair_line(
                "Durbin-Watson:",
                &fmt_fixed(self.durbin_watson, 3),
                "Jarque-Bera (JB):",
                &fmt_fixed(self.jarque_bera, 3)
            )
        );
        let _ = writeln!(
            out,
            "{}",
            pair_line("Skew:", &fmt_fixed(self.skew, 3), "Prob(JB):", &fmt_fixed(self.jb_p_value, 3))
        );
        let _ = writeln!(
            out,
            "{}",
            pair_line(
                "Kurtosis:",
                &fmt_fixed(self.kurtosis, 3),
                "Cond. No.",
                &format!("{:.3e}", self.condition_number)
            )
        );
        let _ = writeln!(out, "{RULE}");
        out
    }
}

fn pair_line(l_label: &str, l_val: &str, r_label: &str, r_val: &str) -> String {
    format!("{l_label:<20}{l_val:>16}   {r_label:<24}{r_val:>15}")
        .trim_end()
        .to_string()
}

fn fmt_fixed(v: f64, places: usize) -> String {
    if v.is_nan() {
        "nan".to_string()
    } else if v.is_infinite() {
        if v > 0.0 { "inf".to_string() } else { "-inf".to_string() }
    } else {
        format!("{v:.places$}")
    }
}

fn fmt_stat(v: f64) -> String {
    if !v.is_finite() {
        return fmt_fixed(v, 4);
    }
    let a = v.abs();
    if a != 0.0 && !(1e-3..1e6).contains(&a) {
        format!("{v:.3e}")
    } else {
        format!("{v:.4}")
    }
}

/// Prepend an intercept column of ones.
pub fn add_constant(columns: Vec<(String, Vec<f64>)>, n_obs: usize) -> Vec<(String, Vec<f64>)> {
    let mut out = Vec::with_capacity(columns.len() + 1);
    out.push((CONST_NAME.to_string(), vec![1.0; n_obs]));
    out.extend(columns);
    out
}

/// Ordinary least squares of `y` on the given design columns.
///
/// A zero-variance regressor, a constant dependent variable or a singular
/// design is reported as `DegenerateFit` instead of producing a summary.
pub fn fit_ols(
    dep_var: &str,
    y: &[f64],
    exog: &[(String, Vec<f64>)],
) -> Result<OlsFit, AnalysisError> {
    let n = y.len();
    let k = exog.len();
    if k == 0 {
        return Err(AnalysisError::DegenerateFit("no regressors".to_string()));
    }
    if n <= k {
        return Err(AnalysisError::InsufficientData {
            observations: n,
            params: k,
        });
    }
    for (name, col) in exog {
        if col.len() != n {
            return Err(AnalysisError::DegenerateFit(format!(
                "column {name} has {} values for {n} observations",
                col.len()
            )));
        }
        if name != CONST_NAME && variance(col) == 0.0 {
            return Err(AnalysisError::DegenerateFit(format!("{name} has zero variance")));
        }
    }
    let const_idx = exog
        .iter()
        .position(|(name, col)| name == CONST_NAME && col.iter().all(|v| *v == 1.0));
    let has_constant = const_idx.is_some();
    let y_mean = mean(y);
    let tss_centered: f64 = y.iter().map(|v| (v - y_mean).powi(2)).sum();
    if tss_centered == 0.0 {
        return Err(AnalysisError::DegenerateFit(format!("{dep_var} has zero variance")));
    }

    let LeastSquares {
        beta,
        cov_diag,
        residuals,
    } = solve_least_squares(y, exog, const_idx)?;
    let ssr: f64 = residuals.iter().map(|e| e * e).sum();

    let df_model = if has_constant { k - 1 } else { k };
    let df_resid = n - k;
    let tss = if has_constant {
        tss_centered
    } else {
        y.iter().map(|v| v * v).sum()
    };
    let r_squared = 1.0 - ssr / tss;
    let adj_r_squared = if has_constant {
        1.0 - (n as f64 - 1.0) / df_resid as f64 * (1.0 - r_squared)
    } else {
        1.0 - n as f64 / df_resid as f64 * (1.0 - r_squared)
    };

    let sigma2 = ssr / df_resid as f64;
    let t_dist = StudentsT::new(0.0, 1.0, df_resid as f64)
        .map_err(|e| AnalysisError::DegenerateFit(format!("t distribution: {e}")))?;
    let t_crit = t_dist.inverse_cdf(0.975);

    let coefficients = exog
        .iter()
        .enumerate()
        .map(|(i, (name, _))| {
            let std_err = (sigma2 * cov_diag[i]).max(0.0).sqrt();
            let t_value = if std_err > 0.0 {
                beta[i] / std_err
            } else if beta[i] == 0.0 {
                f64::NAN
            } else {
                beta[i].signum() * f64::INFINITY
            };
            let p_value = if t_value.is_nan() {
                f64::NAN
            } else {
                (2.0 * (1.0 - t_dist.cdf(t_value.abs()))).clamp(0.0, 1.0)
            };
            Coefficient {
                name: name.clone(),
                coef: beta[i],
                std_err,
                t_value,
                p_value,
                ci_low: beta[i] - t_crit * std_err,
                ci_high: beta[i] + t_crit * std_err,
            }
        })
        .collect();

    let (f_statistic, f_p_value) = if df_model == 0 {
        (f64::NAN, f64::NAN)
    } else if ssr == 0.0 {
        (f64::INFINITY, 0.0)
    } else {
        let f = ((tss - ssr) / df_model as f64) / sigma2;
        let f_dist = FisherSnedecor::new(df_model as f64, df_resid as f64)
            .map_err(|e| AnalysisError::DegenerateFit(format!("F distribution: {e}")))?;
        (f, (1.0 - f_dist.cdf(f)).clamp(0.0, 1.0))
    };

    let nf = n as f64;
    let log_likelihood = -nf / 2.0 * ((2.0 * std::f64::consts::PI).ln() + (ssr / nf).ln() + 1.0);
    let aic = -2.0 * log_likelihood + 2.0 * k as f64;
    let bic = -2.0 * log_likelihood + nf.ln() * k as f64;

    let durbin_watson = if ssr == 0.0 {
        f64::NAN
    } else {
        residuals.windows(2).map(|w| (w[1] - w[0]).powi(2)).sum::<f64>() / ssr
    };
    let (skew, kurtosis) = moments(&residuals);
    let jarque_bera = nf / 6.0 * (skew.powi(2) + (kurtosis - 3.0).powi(2) / 4.0);
    let jb_p_value = match ChiSquared::new(2.0) {
        Ok(chi2) if jarque_bera.is_finite() => 1.0 - chi2.cdf(jarque_bera),
        _ => f64::NAN,
    };

    let condition_number = condition_number(exog)?;

    Ok(OlsFit {
        dep_var: dep_var.to_string(),
        n_obs: n,
        df_model,
        df_resid,
        coefficients,
        r_squared,
        adj_r_squared,
        f_statistic,
        f_p_value,
        log_likelihood,
        aic,
        bic,
        durbin_watson,
        skew,
        kurtosis,
        jarque_bera,
        jb_p_value,
        condition_number,
        residuals,
    })
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn variance(values: &[f64]) -> f64 {
    let m = mean(values);
    values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len().max(1) as f64
}

// Population skew and (non-excess) kurtosis.
fn moments(values: &[f64]) -> (f64, f64) {
    let m = mean(values);
    let n = values.len().max(1) as f64;
    let m2 = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / n;
    if m2 == 0.0 {
        return (f64::NAN, f64::NAN);
    }
    let m3 = values.iter().map(|v| (v - m).powi(3)).sum::<f64>() / n;
    let m4 = values.iter().map(|v| (v - m).powi(4)).sum::<f64>() / n;
    (m3 / m2.powf(1.5), m4 / (m2 * m2))
}

struct LeastSquares {
    beta: Vec<f64>,
    cov_diag: Vec<f64>,
    residuals: Vec<f64>,
}

fn design_matrix(n: usize, cols: &[&[f64]], shift: &[f64]) -> Mat<f64> {
    Mat::from_fn(n, cols.len(), |r, j| cols[j][r] - shift[j])
}

fn thin_svd(m: &Mat<f64>) -> Result<(Mat<f64>, Vec<f64>, Mat<f64>), AnalysisError> {
    let svd = m.thin_svd().map_err(|_| {
        AnalysisError::DegenerateFit("singular value decomposition did not converge".to_string())
    })?;
    let s = svd.S().column_vector();
    let values = (0..m.ncols()).map(|i| s[i]).collect();
    Ok((svd.U().to_owned(), values, svd.V().to_owned()))
}

/// Least squares through a thin SVD of the design. With an intercept the
/// other columns are centred first and the intercept is recovered from the
/// means, so regressors far from zero keep full precision.
///
/// `cov_diag` is the diagonal of (XᵀX)⁻¹ in `exog` order.
fn solve_least_squares(
    y: &[f64],
    exog: &[(String, Vec<f64>)],
    const_idx: Option<usize>,
) -> Result<LeastSquares, AnalysisError> {
    let n = y.len();
    let free: Vec<usize> = (0..exog.len()).filter(|&i| Some(i) != const_idx).collect();
    let m = free.len();
    let cols: Vec<&[f64]> = free.iter().map(|&i| exog[i].1.as_slice()).collect();
    let (x_means, y_shift): (Vec<f64>, f64) = match const_idx {
        Some(_) => (cols.iter().map(|c| mean(c)).collect(), mean(y)),
        None => (vec![0.0; m], 0.0),
    };

    let mut beta = vec![0.0; exog.len()];
    let mut cov_diag = vec![0.0; exog.len()];
    let mut residuals: Vec<f64> = y.iter().map(|v| v - y_shift).collect();
    let mut gram_inv = vec![vec![0.0; m]; m];

    if m > 0 {
        let (u, s, v) = thin_svd(&design_matrix(n, &cols, &x_means))?;
        let s_max = s.iter().copied().fold(0.0, f64::max);
        if s.iter().any(|&sv| sv <= s_max * 1e-12) {
            return Err(AnalysisError::DegenerateFit(
                "design matrix is singular (collinear columns)".to_string(),
            ));
        }

        // b = V Σ⁻¹ Uᵀ y
        let scaled: Vec<f64> = (0..m)
            .map(|i| (0..n).map(|r| u[(r, i)] * residuals[r]).sum::<f64>() / s[i])
            .collect();
        let b: Vec<f64> = (0..m)
            .map(|j| (0..m).map(|i| v[(j, i)] * scaled[i]).sum())
            .collect();
        // (ZᵀZ)⁻¹ = V Σ⁻² Vᵀ
        for (a, row) in gram_inv.iter_mut().enumerate() {
            for (c, cell) in row.iter_mut().enumerate() {
                *cell = (0..m).map(|i| v[(a, i)] * v[(c, i)] / (s[i] * s[i])).sum();
            }
        }

        for (r, resid) in residuals.iter_mut().enumerate() {
            *resid -= (0..m).map(|j| (cols[j][r] - x_means[j]) * b[j]).sum::<f64>();
        }
        for (j, &idx) in free.iter().enumerate() {
            beta[idx] = b[j];
            cov_diag[idx] = gram_inv[j][j];
        }
    }

    if let Some(c) = const_idx {
        let shift: f64 = free
            .iter()
            .enumerate()
            .map(|(j, &idx)| beta[idx] * x_means[j])
            .sum();
        beta[c] = y_shift - shift;
        let spread: f64 = (0..m)
            .map(|a| (0..m).map(|c2| x_means[a] * gram_inv[a][c2] * x_means[c2]).sum::<f64>())
            .sum();
        cov_diag[c] = 1.0 / n as f64 + spread;
    }

    Ok(LeastSquares {
        beta,
        cov_diag,
        residuals,
    })
}

/// Ratio of the largest to smallest singular value of the raw design.
fn condition_number(exog: &[(String, Vec<f64>)]) -> Result<f64, AnalysisError> {
    let n = exog.first().map_or(0, |(_, col)| col.len());
    let cols: Vec<&[f64]> = exog.iter().map(|(_, col)| col.as_slice()).collect();
    let origin = vec![0.0; cols.len()];
    let (_, s, _) = thin_svd(&design_matrix(n, &cols, &origin))?;
    let max = s.iter().copied().fold(0.0, f64::max);
    let min = s.iter().copied().fold(f64::INFINITY, f64::min);
    Ok(if min > 0.0 { max / min } else { f64::INFINITY })
}
