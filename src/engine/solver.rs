//! Adaptive Runge-Kutta solver with dense output.
//!
//! Implements the Dormand-Prince 5(4) embedded pair:
//! - 5th order propagation, 4th order error estimate
//! - First-same-as-last (FSAL): six new derivative evaluations per step
//! - Step size control on a mixed absolute/relative RMS error norm
//! - 4th order continuous extension for output at arbitrary times
//!
//! The continuous extension is what lets a caller request a uniform output
//! grid without forcing the solver onto that grid: each accepted step builds
//! an interpolant from its seven stage derivatives and every requested time
//! inside the step is evaluated from it.
//!
//! # References
//!
//! Dormand & Prince, "A family of embedded Runge-Kutta formulae," 1980.
//! Hairer, Nørsett, Wanner, "Solving Ordinary Differential Equations I," §II.4-6.

use serde::{Deserialize, Serialize};

use crate::error::{PendulumError, PendulumResult};

/// Right-hand side of an autonomous or time-dependent ODE `y' = f(t, y)`.
pub trait OdeSystem<const N: usize> {
    /// Evaluate `f(t, y)`.
    fn rhs(&self, t: f64, y: &[f64; N]) -> [f64; N];
}

/// Nodes `c_i`.
const C: [f64; 6] = [0.0, 1.0 / 5.0, 3.0 / 10.0, 4.0 / 5.0, 8.0 / 9.0, 1.0];

/// Runge-Kutta matrix (lower triangle, row `i` has `i` entries).
const A: [[f64; 5]; 6] = [
    [0.0, 0.0, 0.0, 0.0, 0.0],
    [1.0 / 5.0, 0.0, 0.0, 0.0, 0.0],
    [3.0 / 40.0, 9.0 / 40.0, 0.0, 0.0, 0.0],
    [44.0 / 45.0, -56.0 / 15.0, 32.0 / 9.0, 0.0, 0.0],
    [
        19372.0 / 6561.0,
        -25360.0 / 2187.0,
        64448.0 / 6561.0,
        -212.0 / 729.0,
        0.0,
    ],
    [
        9017.0 / 3168.0,
        -355.0 / 33.0,
        46732.0 / 5247.0,
        49.0 / 176.0,
        -5103.0 / 18656.0,
    ],
];

/// 5th order weights.
const B: [f64; 6] = [
    35.0 / 384.0,
    0.0,
    500.0 / 1113.0,
    125.0 / 192.0,
    -2187.0 / 6784.0,
    11.0 / 84.0,
];

/// Difference between the 5th and embedded 4th order weights, including the
/// FSAL stage.
const E: [f64; 7] = [
    -71.0 / 57600.0,
    0.0,
    71.0 / 16695.0,
    -71.0 / 1920.0,
    17253.0 / 339_200.0,
    -22.0 / 525.0,
    1.0 / 40.0,
];

/// Continuous extension coefficients: row per stage, column per power of
/// the normalized step position `x = (t - t_old) / h`, from `x` to `x^4`.
const P: [[f64; 4]; 7] = [
    [
        1.0,
        -8_048_581_381.0 / 2_820_520_608.0,
        8_663_915_743.0 / 2_820_520_608.0,
        -12_715_105_075.0 / 11_282_082_432.0,
    ],
    [0.0, 0.0, 0.0, 0.0],
    [
        0.0,
        131_558_114_200.0 / 32_700_410_799.0,
        -68_118_460_800.0 / 10_900_136_933.0,
        87_487_479_700.0 / 32_700_410_799.0,
    ],
    [
        0.0,
        -1_754_552_775.0 / 470_086_768.0,
        14_199_869_525.0 / 1_410_260_304.0,
        -10_690_763_975.0 / 1_880_347_072.0,
    ],
    [
        0.0,
        127_303_824_393.0 / 49_829_197_408.0,
        -318_862_633_887.0 / 49_829_197_408.0,
        701_980_252_875.0 / 199_316_789_632.0,
    ],
    [
        0.0,
        -282_668_133.0 / 205_662_961.0,
        2_019_193_451.0 / 616_988_883.0,
        -1_453_857_185.0 / 822_651_844.0,
    ],
    [
        0.0,
        40_617_522.0 / 29_380_423.0,
        -110_615_467.0 / 29_380_423.0,
        69_997_945.0 / 29_380_423.0,
    ],
];

const SAFETY: f64 = 0.9;
const MIN_FACTOR: f64 = 0.2;
const MAX_FACTOR: f64 = 10.0;
/// `-1 / (q + 1)` for the embedded order `q = 4`.
const ERROR_EXPONENT: f64 = -0.2;

/// Error tolerances for step size control.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tolerances {
    /// Relative tolerance.
    pub rtol: f64,
    /// Absolute tolerance.
    pub atol: f64,
}

impl Tolerances {
    /// Create tolerances.
    #[must_use]
    pub const fn new(rtol: f64, atol: f64) -> Self {
        Self { rtol, atol }
    }
}

impl Default for Tolerances {
    fn default() -> Self {
        Self::new(1e-9, 1e-9)
    }
}

/// Work counters for one solve.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolverStats {
    /// Steps that met the tolerance.
    pub accepted_steps: u64,
    /// Steps retried with a smaller size.
    pub rejected_steps: u64,
    /// Right-hand side evaluations.
    pub fn_evals: u64,
}

/// Interpolant over one accepted step.
#[derive(Debug, Clone)]
pub struct DenseStep<const N: usize> {
    t_old: f64,
    t_new: f64,
    h: f64,
    y_old: [f64; N],
    q: [[f64; 4]; N],
}

impl<const N: usize> DenseStep<N> {
    fn new(t_old: f64, t_new: f64, y_old: [f64; N], k: &[[f64; N]; 7]) -> Self {
        let h = t_new - t_old;
        let mut q = [[0.0; 4]; N];
        for (i, row) in q.iter_mut().enumerate() {
            for (j, coeff) in row.iter_mut().enumerate() {
                *coeff = k.iter().zip(P.iter()).map(|(ks, p)| ks[i] * p[j]).sum();
            }
        }
        Self {
            t_old,
            t_new,
            h,
            y_old,
            q,
        }
    }

    /// Start of the step.
    #[must_use]
    pub const fn t_old(&self) -> f64 {
        self.t_old
    }

    /// End of the step.
    #[must_use]
    pub const fn t_new(&self) -> f64 {
        self.t_new
    }

    /// Evaluate the interpolant at `t`.
    ///
    /// Meaningful for `t` inside `[t_old, t_new]`.
    #[must_use]
    pub fn eval(&self, t: f64) -> [f64; N] {
        let x = (t - self.t_old) / self.h;
        let powers = [x, x * x, x * x * x, x * x * x * x];
        let mut y = self.y_old;
        for (yi, qi) in y.iter_mut().zip(self.q.iter()) {
            let poly: f64 = qi.iter().zip(powers.iter()).map(|(a, b)| a * b).sum();
            *yi += self.h * poly;
        }
        y
    }
}

/// Dormand-Prince 5(4) adaptive solver.
///
/// # Example
///
/// ```rust
/// use pendular::engine::solver::{DormandPrince45, OdeSystem, Tolerances};
///
/// struct Decay;
/// impl OdeSystem<1> for Decay {
///     fn rhs(&self, _t: f64, y: &[f64; 1]) -> [f64; 1] {
///         [-y[0]]
///     }
/// }
///
/// let mut solver = DormandPrince45::new(Tolerances::new(1e-10, 1e-12));
/// let out = solver.solve_at(&Decay, 0.0, [1.0], 1.0, &[0.0, 0.5]).unwrap();
/// assert!((out[1][0] - (-0.5f64).exp()).abs() < 1e-8);
/// ```
#[derive(Debug, Clone)]
pub struct DormandPrince45 {
    tolerances: Tolerances,
    max_steps: u64,
    stats: SolverStats,
}

impl DormandPrince45 {
    /// Default cap on accepted plus rejected steps per solve.
    pub const DEFAULT_MAX_STEPS: u64 = 1_000_000;

    /// Create a solver with the given tolerances.
    #[must_use]
    pub const fn new(tolerances: Tolerances) -> Self {
        Self {
            tolerances,
            max_steps: Self::DEFAULT_MAX_STEPS,
            stats: SolverStats {
                accepted_steps: 0,
                rejected_steps: 0,
                fn_evals: 0,
            },
        }
    }

    /// Set the step budget.
    #[must_use]
    pub const fn with_max_steps(mut self, max_steps: u64) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Tolerances in use.
    #[must_use]
    pub const fn tolerances(&self) -> Tolerances {
        self.tolerances
    }

    /// Counters from the most recent solve.
    #[must_use]
    pub const fn stats(&self) -> SolverStats {
        self.stats
    }

    /// Integrate from `t0` to `t_end` and return the solution at each of
    /// `times`.
    ///
    /// `times` must be sorted ascending and lie inside `[t0, t_end]`.
    ///
    /// # Errors
    ///
    /// Returns `Integration` if the right-hand side is non-finite at the
    /// initial point, if the step size collapses below the resolution of
    /// `t`, or if the step budget is exhausted. Returns `InputValidation`
    /// if `times` is unsorted or out of range.
    pub fn solve_at<S, const N: usize>(
        &mut self,
        system: &S,
        t0: f64,
        y0: [f64; N],
        t_end: f64,
        times: &[f64],
    ) -> PendulumResult<Vec<[f64; N]>>
    where
        S: OdeSystem<N> + ?Sized,
    {
        validate_request(t0, t_end, times)?;

        let mut out = Vec::with_capacity(times.len());
        // Requested times at t0 are answered without taking a step.
        for _ in times.iter().take_while(|&&t| t <= t0) {
            out.push(y0);
        }

        let stop_at = times.last().copied().unwrap_or(t_end);
        self.solve_dense(system, t0, y0, t_end, stop_at, |step| {
            while let Some(&t) = times.get(out.len()) {
                if t > step.t_new() {
                    break;
                }
                out.push(step.eval(t));
            }
        })?;
        Ok(out)
    }

    /// Integrate from `t0` until `stop_at` (never past `t_end`), handing
    /// every accepted step's interpolant to `on_step`.
    fn solve_dense<S, F, const N: usize>(
        &mut self,
        system: &S,
        t0: f64,
        y0: [f64; N],
        t_end: f64,
        stop_at: f64,
        mut on_step: F,
    ) -> PendulumResult<()>
    where
        S: OdeSystem<N> + ?Sized,
        F: FnMut(&DenseStep<N>),
    {
        self.stats = SolverStats::default();

        if !is_finite(&y0) {
            return Err(PendulumError::integration("initial state is not finite", t0));
        }

        let mut t = t0;
        let mut y = y0;
        let mut f = self.eval(system, t, &y);
        if !is_finite(&f) {
            return Err(PendulumError::integration(
                "derivative is not finite at the initial state",
                t,
            ));
        }

        let mut h = self.initial_step(system, t, &y, &f, t_end - t);

        while t < stop_at {
            let min_step = 10.0 * f64::EPSILON * t.abs().max(f64::MIN_POSITIVE);
            let mut rejected = false;

            loop {
                if self.stats.accepted_steps + self.stats.rejected_steps >= self.max_steps {
                    return Err(PendulumError::integration(
                        format!("step budget of {} exhausted", self.max_steps),
                        t,
                    ));
                }
                if h < min_step {
                    return Err(PendulumError::integration(
                        format!("step size {h:.3e} fell below the resolution of t"),
                        t,
                    ));
                }

                let reaches_end = h >= t_end - t;
                let step = if reaches_end { t_end - t } else { h };
                let (y_new, f_new, k) = self.try_step(system, t, &y, &f, step);
                let err_norm = self.error_norm(&y, &y_new, &k, step);

                let acceptable = err_norm.is_finite()
                    && err_norm < 1.0
                    && is_finite(&y_new)
                    && is_finite(&f_new);

                if acceptable {
                    let mut factor = if err_norm == 0.0 {
                        MAX_FACTOR
                    } else {
                        (SAFETY * err_norm.powf(ERROR_EXPONENT)).min(MAX_FACTOR)
                    };
                    if rejected {
                        factor = factor.min(1.0);
                    }

                    let t_new = if reaches_end { t_end } else { t + step };
                    let dense = DenseStep::new(t, t_new, y, &k);
                    self.stats.accepted_steps += 1;
                    on_step(&dense);

                    t = t_new;
                    y = y_new;
                    f = f_new;
                    h = step * factor;
                    break;
                }

                let factor = if err_norm.is_finite() {
                    (SAFETY * err_norm.powf(ERROR_EXPONENT)).max(MIN_FACTOR)
                } else {
                    MIN_FACTOR
                };
                self.stats.rejected_steps += 1;
                rejected = true;
                h = step * factor;
            }
        }

        Ok(())
    }

    fn eval<S, const N: usize>(&mut self, system: &S, t: f64, y: &[f64; N]) -> [f64; N]
    where
        S: OdeSystem<N> + ?Sized,
    {
        self.stats.fn_evals += 1;
        system.rhs(t, y)
    }

    /// One trial step of size `h`; returns the 5th order solution, its
    /// derivative, and all seven stage derivatives.
    fn try_step<S, const N: usize>(
        &mut self,
        system: &S,
        t: f64,
        y: &[f64; N],
        f: &[f64; N],
        h: f64,
    ) -> ([f64; N], [f64; N], [[f64; N]; 7])
    where
        S: OdeSystem<N> + ?Sized,
    {
        let mut k = [[0.0; N]; 7];
        k[0] = *f;

        for s in 1..6 {
            let mut ys = *y;
            for (i, yi) in ys.iter_mut().enumerate() {
                let incr: f64 = (0..s).map(|j| A[s][j] * k[j][i]).sum();
                *yi += h * incr;
            }
            k[s] = self.eval(system, t + C[s] * h, &ys);
        }

        let mut y_new = *y;
        for (i, yi) in y_new.iter_mut().enumerate() {
            let incr: f64 = (0..6).map(|j| B[j] * k[j][i]).sum();
            *yi += h * incr;
        }

        let f_new = self.eval(system, t + h, &y_new);
        k[6] = f_new;

        (y_new, f_new, k)
    }

    fn error_norm<const N: usize>(
        &self,
        y: &[f64; N],
        y_new: &[f64; N],
        k: &[[f64; N]; 7],
        h: f64,
    ) -> f64 {
        let mut sum = 0.0;
        for i in 0..N {
            let err: f64 = h * (0..7).map(|j| E[j] * k[j][i]).sum::<f64>();
            let scale = self.tolerances.atol + y[i].abs().max(y_new[i].abs()) * self.tolerances.rtol;
            let r = err / scale;
            sum += r * r;
        }
        (sum / N as f64).sqrt()
    }

    fn rms_scaled<const N: usize>(&self, v: &[f64; N], y: &[f64; N]) -> f64 {
        let mut sum = 0.0;
        for i in 0..N {
            let scale = self.tolerances.atol + y[i].abs() * self.tolerances.rtol;
            let r = v[i] / scale;
            sum += r * r;
        }
        (sum / N as f64).sqrt()
    }

    /// Starting step size (Hairer, Nørsett, Wanner §II.4).
    fn initial_step<S, const N: usize>(
        &mut self,
        system: &S,
        t0: f64,
        y0: &[f64; N],
        f0: &[f64; N],
        interval: f64,
    ) -> f64
    where
        S: OdeSystem<N> + ?Sized,
    {
        let d0 = self.rms_scaled(y0, y0);
        let d1 = self.rms_scaled(f0, y0);
        let h0 = if d0 < 1e-5 || d1 < 1e-5 { 1e-6 } else { 0.01 * d0 / d1 };

        let mut y1 = *y0;
        for (yi, fi) in y1.iter_mut().zip(f0.iter()) {
            *yi += h0 * fi;
        }
        let f1 = self.eval(system, t0 + h0, &y1);

        let mut df = [0.0; N];
        for i in 0..N {
            df[i] = f1[i] - f0[i];
        }
        let d2 = self.rms_scaled(&df, y0) / h0;

        let h1 = if d1 <= 1e-15 && d2 <= 1e-15 {
            (h0 * 1e-3).max(1e-6)
        } else {
            (0.01 / d1.max(d2)).powf(1.0 / 5.0)
        };

        let h = (100.0 * h0).min(h1).min(interval);
        if h.is_finite() && h > 0.0 {
            h
        } else {
            interval.min(1e-6)
        }
    }
}

impl Default for DormandPrince45 {
    fn default() -> Self {
        Self::new(Tolerances::default())
    }
}

fn validate_request(t0: f64, t_end: f64, times: &[f64]) -> PendulumResult<()> {
    if !t0.is_finite() || !t_end.is_finite() || t_end <= t0 {
        return Err(PendulumError::input(
            "t_end",
            format!("integration interval [{t0}, {t_end}] is empty or non-finite"),
        ));
    }
    if times.windows(2).any(|w| w[1] < w[0]) {
        return Err(PendulumError::input("times", "output times must be sorted"));
    }
    if times.iter().any(|&t| !(t0..=t_end).contains(&t)) {
        return Err(PendulumError::input(
            "times",
            format!("output times must lie inside [{t0}, {t_end}]"),
        ));
    }
    Ok(())
}

fn is_finite<const N: usize>(v: &[f64; N]) -> bool {
    v.iter().all(|x| x.is_finite())
}
