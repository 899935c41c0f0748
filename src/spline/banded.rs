// src/spline/banded.rs - O(n) solvers for the banded systems behind the spline fits

/// LDLᵀ factorization of a symmetric positive definite pentadiagonal matrix
#[derive(Debug, Clone)]
pub struct SymmetricPentadiagonal {
    d: Vec<f64>,
    l1: Vec<f64>,
    l2: Vec<f64>,
}

impl SymmetricPentadiagonal {
    /// Factor the matrix given its main diagonal and first/second super-diagonals.
    ///
    /// `upper1[i]` is A[i][i+1] and `upper2[i]` is A[i][i+2]; trailing entries past
    /// the matrix edge are ignored. Returns `None` on a non-positive pivot.
    pub fn factor(diag: &[f64], upper1: &[f64], upper2: &[f64]) -> Option<Self> {
        let n = diag.len();
        let mut d = vec![0.0; n];
        let mut l1 = vec![0.0; n];
        let mut l2 = vec![0.0; n];

        for i in 0..n {
            let mut pivot = diag[i];
            if i >= 1 {
                pivot -= l1[i - 1] * l1[i - 1] * d[i - 1];
            }
            if i >= 2 {
                pivot -= l2[i - 2] * l2[i - 2] * d[i - 2];
            }
            if !pivot.is_finite() || pivot <= f64::MIN_POSITIVE {
                return None;
            }
            d[i] = pivot;

            if i + 1 < n {
                let mut v = upper1[i];
                if i >= 1 {
                    v -= l1[i - 1] * d[i - 1] * l2[i - 1];
                }
                l1[i] = v / pivot;
            }
            if i + 2 < n {
                l2[i] = upper2[i] / pivot;
            }
        }

        Some(Self { d, l1, l2 })
    }

    pub fn solve(&self, rhs: &[f64]) -> Vec<f64> {
        let n = self.d.len();
        let mut z = rhs.to_vec();

        // L z = rhs
        for i in 0..n {
            if i >= 1 {
                z[i] -= self.l1[i - 1] * z[i - 1];
            }
            if i >= 2 {
                z[i] -= self.l2[i - 2] * z[i - 2];
            }
        }
        for (zi, di) in z.iter_mut().zip(&self.d) {
            *zi /= di;
        }
        // Lᵀ x = z
        for i in (0..n).rev() {
            if i + 1 < n {
                z[i] -= self.l1[i] * z[i + 1];
            }
            if i + 2 < n {
                z[i] -= self.l2[i] * z[i + 2];
            }
        }

        z
    }
}

/// Thomas algorithm; `sub[0]` and `sup[n-1]` are ignored
fn solve_tridiagonal(sub: &[f64], diag: &[f64], sup: &[f64], rhs: &[f64]) -> Option<Vec<f64>> {
    let n = diag.len();
    let mut c = vec![0.0; n];
    let mut d = vec![0.0; n];

    let mut denom = diag[0];
    if denom.abs() <= f64::MIN_POSITIVE {
        return None;
    }
    c[0] = if n > 1 { sup[0] / denom } else { 0.0 };
    d[0] = rhs[0] / denom;

    for i in 1..n {
        denom = diag[i] - sub[i] * c[i - 1];
        if !denom.is_finite() || denom.abs() <= f64::MIN_POSITIVE {
            return None;
        }
        c[i] = if i + 1 < n { sup[i] / denom } else { 0.0 };
        d[i] = (rhs[i] - sub[i] * d[i - 1]) / denom;
    }

    let mut x = vec![0.0; n];
    x[n - 1] = d[n - 1];
    for i in (0..n - 1).rev() {
        x[i] = d[i] - c[i] * x[i + 1];
    }

    Some(x)
}

/// Solve a cyclic tridiagonal system (Sherman–Morrison correction of Thomas).
///
/// Row i reads `sub[i]·x[i-1] + diag[i]·x[i] + sup[i]·x[i+1] = rhs[i]` with indices
/// taken modulo n, so `sub[0]` couples to x[n-1] and `sup[n-1]` to x[0]. Needs n >= 3.
pub fn solve_cyclic_tridiagonal(
    sub: &[f64],
    diag: &[f64],
    sup: &[f64],
    rhs: &[f64],
) -> Option<Vec<f64>> {
    let n = diag.len();
    if n < 3 || sub.len() != n || sup.len() != n || rhs.len() != n {
        return None;
    }

    let top_right = sub[0];
    let bottom_left = sup[n - 1];
    let gamma = -diag[0];
    if gamma == 0.0 {
        return None;
    }

    let mut modified = diag.to_vec();
    modified[0] -= gamma;
    modified[n - 1] -= bottom_left * top_right / gamma;

    let x = solve_tridiagonal(sub, &modified, sup, rhs)?;

    let mut u = vec![0.0; n];
    u[0] = gamma;
    u[n - 1] = bottom_left;
    let z = solve_tridiagonal(sub, &modified, sup, &u)?;

    let v_last = top_right / gamma;
    let denom = 1.0 + z[0] + v_last * z[n - 1];
    if denom.abs() <= f64::MIN_POSITIVE {
        return None;
    }
    let factor = (x[0] + v_last * x[n - 1]) / denom;

    let solution: Vec<f64> = x.iter().zip(&z).map(|(xi, zi)| xi - factor * zi).collect();
    solution.iter().all(|v| v.is_finite()).then_some(solution)
}
