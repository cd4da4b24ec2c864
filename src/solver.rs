//! Growth-rate fitting for the logistic model.
//!
//! The closed-form logistic solution
//!
//! ```text
//! y(x) = N / (1 + (N / y0 - 1) * exp(-k * (x - x0)))
//! ```
//!
//! is matched to a single observation `(xf, yf)` by finding the root in `k` of
//! `f(k) = yf - y(xf)`. The root finder is derivative-free: it first expands a
//! bracket around the initial guess and then refines it with the Illinois
//! variant of regula falsi.

use thiserror::Error;

/// Relative tolerance on successive root estimates.
const K_TOL: f64 = 1e-12;
/// Iteration cap for both bracket expansion and refinement.
const MAX_ITER: usize = 200;
/// Initial half-width of the bracket search.
const INIT_STEP: f64 = 1e-2;

#[derive(Debug, Error, PartialEq)]
pub enum ConvergenceError {
    #[error("residual has no sign change within {iters} bracket expansions around {guess}")]
    NoBracket { guess: f64, iters: usize },

    #[error("residual is not finite at k = {k}")]
    NonFinite { k: f64 },

    #[error("root not converged after {iters} iterations (last estimate {k})")]
    MaxIterations { k: f64, iters: usize },
}

/// Evaluate the closed-form logistic solution at `x`.
pub fn logistic_solution(x0: f64, y0: f64, n: f64, k: f64, x: f64) -> f64 {
    n / (1.0 + (n / y0 - 1.0) * (-k * (x - x0)).exp())
}

/// Solve for the growth rate `k` such that the logistic solution through
/// `(x0, y0)` with carrying capacity `n` passes through `(xf, yf)`.
///
/// Returns the first root found. Uniqueness is not checked.
pub fn solve_growth_rate(
    x0: f64,
    y0: f64,
    xf: f64,
    yf: f64,
    n: f64,
    initial_guess: f64,
) -> Result<f64, ConvergenceError> {
    let residual = |k: f64| -> Result<f64, ConvergenceError> {
        let res = yf - logistic_solution(x0, y0, n, k, xf);
        if !res.is_finite() {
            return Err(ConvergenceError::NonFinite { k });
        }
        Ok(res)
    };

    let f_guess = residual(initial_guess)?;
    if f_guess == 0.0 {
        return Ok(initial_guess);
    }

    // Expand symmetrically until the residual changes sign.
    let mut step = INIT_STEP;
    let mut bracket = None;
    'expand: for _ in 0..MAX_ITER {
        for k in [initial_guess + step, initial_guess - step] {
            let f_k = residual(k)?;
            if f_k == 0.0 {
                return Ok(k);
            }
            if f_k.is_sign_negative() != f_guess.is_sign_negative() {
                bracket = Some((k, f_k));
                break 'expand;
            }
        }
        step *= 2.0;
    }
    let Some((mut b, mut f_b)) = bracket else {
        return Err(ConvergenceError::NoBracket {
            guess: initial_guess,
            iters: MAX_ITER,
        });
    };
    log::debug!("bracketed growth rate between {initial_guess} and {b}");

    let (mut a, mut f_a) = (initial_guess, f_guess);
    for iter in 0..MAX_ITER {
        let c = b - f_b * (b - a) / (f_b - f_a);
        let f_c = residual(c)?;
        log::debug!("iteration {iter}: k = {c}, residual = {f_c}");

        if f_c == 0.0 || (c - b).abs() <= K_TOL * (1.0 + c.abs()) {
            return Ok(c);
        }

        if f_c.is_sign_negative() != f_b.is_sign_negative() {
            a = b;
            f_a = f_b;
        } else {
            // Illinois modification: halve the retained endpoint's weight.
            f_a /= 2.0;
        }
        b = c;
        f_b = f_c;
    }

    Err(ConvergenceError::MaxIterations { k: b, iters: MAX_ITER })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_round_trip(x0: f64, y0: f64, xf: f64, yf: f64, n: f64) -> f64 {
        let k = solve_growth_rate(x0, y0, xf, yf, n, 0.0).expect("solver should converge");
        let y = logistic_solution(x0, y0, n, k, xf);
        assert!((y - yf).abs() < 1e-6, "k = {k} gives {y}, expected {yf}");
        k
    }

    #[test]
    fn fits_reference_observation() {
        let k = assert_round_trip(0.0, 15.0, 4.0, 56.0, 300.0);
        // Analytic: k = -ln((N / yf - 1) / (N / y0 - 1)) / (xf - x0)
        let exact = -((300.0 / 56.0 - 1.0) / (300.0 / 15.0 - 1.0_f64)).ln() / 4.0;
        assert!((k - exact).abs() < 1e-9);
        assert!((k - 0.368_155_6).abs() < 1e-6);
    }

    #[test]
    fn fits_observations_past_the_inflection_point() {
        assert_round_trip(0.0, 15.0, 4.0, 200.0, 300.0);
        assert_round_trip(0.0, 15.0, 4.0, 290.0, 300.0);
        assert_round_trip(0.0, 15.0, 4.0, 299.999, 300.0);
        assert_round_trip(0.0, 1.0, 10.0, 999.0, 1000.0);
    }

    #[test]
    fn fits_tiny_growth() {
        let k = assert_round_trip(0.0, 100.0, 1.0, 100.0001, 300.0);
        assert!(k > 0.0);
    }

    #[test]
    fn declining_observation_gives_negative_rate() {
        let k = assert_round_trip(0.0, 15.0, 4.0, 10.0, 300.0);
        assert!(k < 0.0);
    }

    #[test]
    fn unchanged_observation_returns_guess() {
        assert_eq!(solve_growth_rate(0.0, 15.0, 4.0, 15.0, 300.0, 0.0), Ok(0.0));
    }

    #[test]
    fn observation_above_capacity_has_no_root() {
        let err = solve_growth_rate(0.0, 15.0, 4.0, 350.0, 300.0, 0.0).unwrap_err();
        assert!(matches!(err, ConvergenceError::NoBracket { .. }));
    }

    #[test]
    fn nan_input_is_reported() {
        let err = solve_growth_rate(0.0, 15.0, 4.0, f64::NAN, 300.0, 0.0).unwrap_err();
        assert_eq!(err, ConvergenceError::NonFinite { k: 0.0 });
    }

    #[test]
    fn closed_form_starts_at_initial_condition() {
        assert_eq!(logistic_solution(2.0, 15.0, 300.0, 0.7, 2.0), 15.0);
        let far = logistic_solution(0.0, 15.0, 300.0, 0.7, 1e3);
        assert!((far - 300.0).abs() < 1e-9);
    }
}
