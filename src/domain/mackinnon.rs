//! Dickey-Fuller tau distribution for a single series with a constant term.
//!
//! p-values use the MacKinnon (1994) response surface: the statistic is
//! mapped through a polynomial and then the standard normal CDF, with separate
//! polynomials below and above `TAU_STAR`. Critical values use the MacKinnon
//! (2010) finite-sample surface, a cubic in `1 / nobs`.

use statrs::function::erf::erfc;

const TAU_MAX: f64 = 2.74;
const TAU_MIN: f64 = -18.83;
const TAU_STAR: f64 = -1.61;

const SMALL_P: [f64; 3] = [2.1659, 1.4412, 0.038269];
const LARGE_P: [f64; 4] = [1.7339, 0.93202, -0.12745, -0.010368];

const CRIT_1PCT: [f64; 4] = [-3.43035, -6.5393, -16.786, -79.433];
const CRIT_5PCT: [f64; 4] = [-2.86154, -2.8903, -4.234, -40.040];
const CRIT_10PCT: [f64; 4] = [-2.56677, -1.5384, -2.809, 0.0];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CriticalValues {
    pub one_pct: f64,
    pub five_pct: f64,
    pub ten_pct: f64,
}

/// Left-tail p-value of a tau statistic.
pub fn p_value(statistic: f64) -> f64 {
    if statistic > TAU_MAX {
        return 1.0;
    }
    if statistic < TAU_MIN {
        return 0.0;
    }
    let z = if statistic <= TAU_STAR {
        polyval(&SMALL_P, statistic)
    } else {
        polyval(&LARGE_P, statistic)
    };
    standard_normal_cdf(z)
}

pub fn critical_values(nobs: usize) -> CriticalValues {
    let inv = 1.0 / nobs as f64;
    CriticalValues {
        one_pct: polyval(&CRIT_1PCT, inv),
        five_pct: polyval(&CRIT_5PCT, inv),
        ten_pct: polyval(&CRIT_10PCT, inv),
    }
}

/// `coeffs[0] + coeffs[1] x + coeffs[2] x^2 + ...`
fn polyval(coeffs: &[f64], x: f64) -> f64 {
    coeffs.iter().rev().fold(0.0, |acc, c| acc * x + c)
}

fn standard_normal_cdf(z: f64) -> f64 {
    0.5 * erfc(-z / std::f64::consts::SQRT_2)
}
