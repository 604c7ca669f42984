use crate::error::GaitError;

/// Minimum knots for a not-a-knot cubic.
pub const MIN_KNOTS: usize = 4;

/// Interpolating cubic spline on unit-spaced knots `0, 1, .., n-1` with
/// not-a-knot end conditions (third derivative continuous at knots 1 and n-2).
#[derive(Debug, Clone)]
pub struct CubicSpline {
    y: Vec<f64>,
    /// Second derivatives at the knots.
    m: Vec<f64>,
}

impl CubicSpline {
    pub fn not_a_knot(y: &[f64]) -> Result<Self, GaitError> {
        let n = y.len();
        if n < MIN_KNOTS {
            return Err(GaitError::InsufficientStrideLength { points: n });
        }
        // M[i-1] + 4 M[i] + M[i+1] = 6 (y[i-1] - 2 y[i] + y[i+1]) for interior knots.
        let rhs: Vec<f64> = (0..n)
            .map(|i| {
                if i == 0 || i == n - 1 {
                    0.0
                } else {
                    6.0 * (y[i - 1] - 2.0 * y[i] + y[i + 1])
                }
            })
            .collect();

        let mut m = vec![0.0; n];
        // Substituting M[0] = 2 M[1] - M[2] (and its mirror) into the first and
        // last interior equations leaves 6 M[1] = rhs[1], 6 M[n-2] = rhs[n-2].
        m[1] = rhs[1] / 6.0;
        m[n - 2] = rhs[n - 2] / 6.0;

        if n > MIN_KNOTS {
            let lo = 2;
            let hi = n - 3;
            let mut d: Vec<f64> = rhs[lo..=hi].to_vec();
            d[0] -= m[1];
            let last = d.len() - 1;
            d[last] -= m[n - 2];
            let solved = solve_tridiagonal(&d);
            m[lo..=hi].copy_from_slice(&solved);
        }

        m[0] = 2.0 * m[1] - m[2];
        m[n - 1] = 2.0 * m[n - 2] - m[n - 3];
        Ok(Self { y: y.to_vec(), m })
    }

    /// Largest valid abscissa.
    pub fn x_max(&self) -> f64 {
        (self.y.len() - 1) as f64
    }

    pub fn eval(&self, x: f64) -> f64 {
        let x = x.clamp(0.0, self.x_max());
        let i = (x.floor() as usize).min(self.y.len() - 2);
        let t = x - i as f64;
        let s = 1.0 - t;
        s * self.y[i]
            + t * self.y[i + 1]
            + ((s * s * s - s) * self.m[i] + (t * t * t - t) * self.m[i + 1]) / 6.0
    }
}

/// Thomas algorithm for the constant (1, 4, 1) system.
fn solve_tridiagonal(d: &[f64]) -> Vec<f64> {
    let n = d.len();
    let mut c_prime = vec![0.0; n];
    let mut d_prime = vec![0.0; n];
    c_prime[0] = 1.0 / 4.0;
    d_prime[0] = d[0] / 4.0;
    for i in 1..n {
        let denom = 4.0 - c_prime[i - 1];
        c_prime[i] = 1.0 / denom;
        d_prime[i] = (d[i] - d_prime[i - 1]) / denom;
    }
    let mut x = vec![0.0; n];
    x[n - 1] = d_prime[n - 1];
    for i in (0..n - 1).rev() {
        x[i] = d_prime[i] - c_prime[i] * x[i + 1];
    }
    x
}

/// `count` evenly spaced values over `[start, end]`, inclusive.
pub fn linspace(start: f64, end: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (count - 1) as f64;
            (0..count)
                .map(|i| {
                    if i == count - 1 {
                        end
                    } else {
                        start + step * i as f64
                    }
                })
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cubic(x: f64) -> f64 {
        0.3 * x * x * x - 1.2 * x * x + 0.5 * x - 2.0
    }

    #[test]
    fn reproduces_a_cubic_exactly() {
        for n in [4usize, 5, 6, 11] {
            let y: Vec<f64> = (0..n).map(|i| cubic(i as f64)).collect();
            let spline = CubicSpline::not_a_knot(&y).expect("fit");
            for x in linspace(0.0, (n - 1) as f64, 37) {
                assert!(
                    (spline.eval(x) - cubic(x)).abs() < 1e-9,
                    "n={n} x={x}: {} vs {}",
                    spline.eval(x),
                    cubic(x)
                );
            }
        }
    }

    #[test]
    fn passes_through_knots() {
        let y: Vec<f64> = (0..16).map(|i| (i as f64 * 0.4).sin()).collect();
        let spline = CubicSpline::not_a_knot(&y).expect("fit");
        for (i, v) in y.iter().enumerate() {
            assert!((spline.eval(i as f64) - v).abs() < 1e-12);
        }
        // close to the underlying curve between knots
        assert!((spline.eval(7.5) - (7.5f64 * 0.4).sin()).abs() < 1e-3);
    }

    #[test]
    fn rejects_fewer_than_four_knots() {
        let err = CubicSpline::not_a_knot(&[0.0, 1.0, 2.0]).unwrap_err();
        assert_eq!(err, GaitError::InsufficientStrideLength { points: 3 });
    }

    #[test]
    fn linspace_hits_both_ends() {
        let xs = linspace(0.0, 15.0, 100);
        assert_eq!(xs.len(), 100);
        assert_eq!(xs[0], 0.0);
        assert_eq!(xs[99], 15.0);
    }
}
