use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

/// A square linear map `x -> A x`.
pub trait LinearOperator: Sync {
    fn nrows(&self) -> usize;
    fn apply(&self, x: &DVector<f64>) -> DVector<f64>;
}

impl LinearOperator for DMatrix<f64> {
    fn nrows(&self) -> usize {
        self.nrows()
    }

    fn apply(&self, x: &DVector<f64>) -> DVector<f64> {
        self * x
    }
}

/// Approximate inverse applied to residuals (left preconditioning).
pub trait Preconditioner: Sync {
    fn apply(&self, r: &DVector<f64>) -> DVector<f64>;
}

pub struct IdentityPreconditioner;

impl Preconditioner for IdentityPreconditioner {
    fn apply(&self, r: &DVector<f64>) -> DVector<f64> {
        r.clone()
    }
}

/// Diagonal scaling by the inverse of the matrix diagonal.
pub struct JacobiPreconditioner {
    inverse_diagonal: DVector<f64>,
}

impl JacobiPreconditioner {
    /// Zero diagonal entries are left unscaled.
    pub fn from_matrix(matrix: &DMatrix<f64>) -> Self {
        let inverse_diagonal = matrix
            .diagonal()
            .map(|d| if d.abs() > f64::EPSILON { 1.0 / d } else { 1.0 });
        Self { inverse_diagonal }
    }
}

impl Preconditioner for JacobiPreconditioner {
    fn apply(&self, r: &DVector<f64>) -> DVector<f64> {
        r.component_mul(&self.inverse_diagonal)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct GmresConfig {
    /// Krylov subspace size before a restart.
    pub restart: usize,
    /// Relative residual of the preconditioned system at which to stop.
    pub tolerance: f64,
    pub max_restarts: usize,
}

impl Default for GmresConfig {
    fn default() -> Self {
        Self {
            restart: 50,
            tolerance: 1e-6,
            max_restarts: 20,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GmresSolution {
    pub x: DVector<f64>,
    /// Number of operator applications inside Arnoldi steps.
    pub iterations: usize,
    pub restarts: usize,
    /// Final relative residual of the preconditioned system.
    pub residual: f64,
    pub converged: bool,
}

#[derive(Debug, Error, PartialEq)]
pub enum SolverError {
    #[error("Dimension mismatch: operator has {operator} rows, right-hand side has {rhs}")]
    DimensionMismatch { operator: usize, rhs: usize },
    #[error("Matrix is singular to working precision")]
    Singular,
    #[error("Invalid solver configuration: {0}")]
    InvalidConfig(String),
}

/// Restarted GMRES with modified Gram-Schmidt orthogonalisation and Givens
/// rotations, solving `M⁻¹A x = M⁻¹b`.
pub fn gmres<A, P>(
    operator: &A,
    b: &DVector<f64>,
    x0: Option<&DVector<f64>>,
    config: &GmresConfig,
    precond: &P,
) -> Result<GmresSolution, SolverError>
where
    A: LinearOperator + ?Sized,
    P: Preconditioner + ?Sized,
{
    let n = b.len();
    if operator.nrows() != n {
        return Err(SolverError::DimensionMismatch {
            operator: operator.nrows(),
            rhs: n,
        });
    }
    if config.restart == 0 || config.tolerance <= 0.0 {
        return Err(SolverError::InvalidConfig(format!(
            "restart must be positive and tolerance > 0 (got {} and {})",
            config.restart, config.tolerance
        )));
    }
    let m = config.restart.min(n.max(1));

    let mut x = match x0 {
        Some(guess) if guess.len() == n => guess.clone(),
        _ => DVector::zeros(n),
    };

    let b_norm = precond.apply(b).norm();
    if b_norm < 1e-15 {
        return Ok(GmresSolution {
            x: DVector::zeros(n),
            iterations: 0,
            restarts: 0,
            residual: 0.0,
            converged: true,
        });
    }

    let mut iterations = 0;
    let mut restarts = 0;

    loop {
        let r = precond.apply(&(b - operator.apply(&x)));
        let beta = r.norm();
        let relative = beta / b_norm;
        if relative < config.tolerance {
            return Ok(GmresSolution {
                x,
                iterations,
                restarts,
                residual: relative,
                converged: true,
            });
        }
        if restarts >= config.max_restarts {
            return Ok(GmresSolution {
                x,
                iterations,
                restarts,
                residual: relative,
                converged: false,
            });
        }

        let mut basis: Vec<DVector<f64>> = Vec::with_capacity(m + 1);
        basis.push(&r / beta);
        let mut h = DMatrix::<f64>::zeros(m + 1, m);
        let mut cs: Vec<f64> = Vec::with_capacity(m);
        let mut sn: Vec<f64> = Vec::with_capacity(m);
        let mut g = DVector::<f64>::zeros(m + 1);
        g[0] = beta;

        let mut steps = 0;
        for j in 0..m {
            iterations += 1;
            steps = j + 1;

            let mut w = precond.apply(&operator.apply(&basis[j]));
            for (i, v) in basis.iter().enumerate().take(j + 1) {
                let hij = v.dot(&w);
                h[(i, j)] = hij;
                w.axpy(-hij, v, 1.0);
            }
            let w_norm = w.norm();
            h[(j + 1, j)] = w_norm;
            let breakdown = w_norm < 1e-14;
            if !breakdown {
                basis.push(w / w_norm);
            }

            for i in 0..j {
                let temp = cs[i] * h[(i, j)] + sn[i] * h[(i + 1, j)];
                h[(i + 1, j)] = -sn[i] * h[(i, j)] + cs[i] * h[(i + 1, j)];
                h[(i, j)] = temp;
            }
            let (c, s) = givens_rotation(h[(j, j)], h[(j + 1, j)]);
            cs.push(c);
            sn.push(s);
            h[(j, j)] = c * h[(j, j)] + s * h[(j + 1, j)];
            h[(j + 1, j)] = 0.0;
            g[j + 1] = -s * g[j];
            g[j] *= c;

            if g[j + 1].abs() / b_norm < config.tolerance || breakdown {
                break;
            }
        }

        let y = solve_upper_triangular(&h, &g, steps);
        for (i, yi) in y.iter().enumerate() {
            x.axpy(*yi, &basis[i], 1.0);
        }
        restarts += 1;
        debug!(restarts, iterations, "GMRES cycle finished.");
    }
}

fn givens_rotation(a: f64, b: f64) -> (f64, f64) {
    if b == 0.0 {
        (1.0, 0.0)
    } else {
        let r = a.hypot(b);
        (a / r, b / r)
    }
}

fn solve_upper_triangular(h: &DMatrix<f64>, g: &DVector<f64>, k: usize) -> DVector<f64> {
    let mut y = DVector::zeros(k);
    for i in (0..k).rev() {
        let mut sum = g[i];
        for j in (i + 1)..k {
            sum -= h[(i, j)] * y[j];
        }
        y[i] = if h[(i, i)].abs() > 1e-300 { sum / h[(i, i)] } else { 0.0 };
    }
    y
}

/// Method used for the dense boundary-element system.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LinearSolver {
    Gmres(GmresConfig),
    /// LU factorisation with partial pivoting.
    Direct,
}

impl Default for LinearSolver {
    fn default() -> Self {
        Self::Gmres(GmresConfig::default())
    }
}

/// Statistics of a linear solve, serialized into result reports.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct SolverStats {
    pub method: String,
    pub iterations: usize,
    pub restarts: usize,
    pub residual: f64,
    pub converged: bool,
}

impl LinearSolver {
    /// Solves `matrix · x = b`.
    ///
    /// A GMRES run that exhausts its restarts is reported with
    /// `converged = false` and a warning rather than an error.
    pub fn solve(
        &self,
        matrix: &DMatrix<f64>,
        b: &DVector<f64>,
    ) -> Result<(DVector<f64>, SolverStats), SolverError> {
        match self {
            LinearSolver::Gmres(config) => {
                let precond = JacobiPreconditioner::from_matrix(matrix);
                let solution = gmres(matrix, b, None, config, &precond)?;
                if !solution.converged {
                    warn!(
                        iterations = solution.iterations,
                        residual = solution.residual,
                        tolerance = config.tolerance,
                        "GMRES did not converge; results may be inaccurate."
                    );
                }
                let stats = SolverStats {
                    method: "gmres".to_string(),
                    iterations: solution.iterations,
                    restarts: solution.restarts,
                    residual: solution.residual,
                    converged: solution.converged,
                };
                Ok((solution.x, stats))
            }
            LinearSolver::Direct => {
                if matrix.nrows() != b.len() || !matrix.is_square() {
                    return Err(SolverError::DimensionMismatch {
                        operator: matrix.nrows(),
                        rhs: b.len(),
                    });
                }
                let x = matrix.clone().lu().solve(b).ok_or(SolverError::Singular)?;
                let residual = (matrix * &x - b).norm() / b.norm().max(f64::MIN_POSITIVE);
                let stats = SolverStats {
                    method: "direct".to_string(),
                    iterations: 1,
                    restarts: 0,
                    residual,
                    converged: true,
                };
                Ok((x, stats))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_system(n: usize) -> (DMatrix<f64>, DVector<f64>) {
        let a = DMatrix::from_fn(n, n, |i, j| {
            if i == j {
                10.0 + i as f64 * 0.1
            } else {
                1.0 / (1.0 + (i as f64 - j as f64).abs() + 0.3 * j as f64)
            }
        });
        let b = DVector::from_fn(n, |i, _| (i as f64 * 0.7).sin() + 1.0);
        (a, b)
    }

    #[test]
    fn gmres_matches_direct_solution() {
        let (a, b) = test_system(40);
        let config = GmresConfig {
            tolerance: 1e-10,
            ..GmresConfig::default()
        };
        let solution = gmres(&a, &b, None, &config, &IdentityPreconditioner).unwrap();
        let direct = a.clone().lu().solve(&b).unwrap();
        assert!(solution.converged);
        assert!((&solution.x - &direct).norm() / direct.norm() < 1e-8);
    }

    #[test]
    fn restarted_gmres_still_converges() {
        let (a, b) = test_system(30);
        let config = GmresConfig {
            restart: 5,
            tolerance: 1e-9,
            max_restarts: 100,
        };
        let precond = JacobiPreconditioner::from_matrix(&a);
        let solution = gmres(&a, &b, None, &config, &precond).unwrap();
        assert!(solution.converged);
        assert!(solution.restarts > 0);
        assert!((&a * &solution.x - &b).norm() / b.norm() < 1e-7);
    }

    #[test]
    fn exact_initial_guess_needs_no_iterations() {
        let (a, b) = test_system(10);
        let x = a.clone().lu().solve(&b).unwrap();
        let solution = gmres(&a, &b, Some(&x), &GmresConfig::default(), &IdentityPreconditioner).unwrap();
        assert!(solution.converged);
        assert_eq!(solution.iterations, 0);
    }

    #[test]
    fn zero_rhs_returns_zero_solution() {
        let (a, _) = test_system(5);
        let solution = gmres(&a, &DVector::zeros(5), None, &GmresConfig::default(), &IdentityPreconditioner)
            .unwrap();
        assert!(solution.converged);
        assert_eq!(solution.x, DVector::zeros(5));
    }

    #[test]
    fn exhausted_restarts_report_non_convergence() {
        let (a, b) = test_system(30);
        let config = GmresConfig {
            restart: 1,
            tolerance: 1e-14,
            max_restarts: 2,
        };
        let (_, stats) = LinearSolver::Gmres(config).solve(&a, &b).unwrap();
        assert!(!stats.converged);
        assert_eq!(stats.method, "gmres");
        assert_eq!(stats.restarts, 2);
        assert_eq!(stats.iterations, 2);
    }

    #[test]
    fn dimension_mismatch_is_an_error() {
        let (a, _) = test_system(4);
        let result = gmres(&a, &DVector::zeros(3), None, &GmresConfig::default(), &IdentityPreconditioner);
        assert!(matches!(result, Err(SolverError::DimensionMismatch { operator: 4, rhs: 3 })));
    }

    #[test]
    fn direct_solver_detects_singular_matrix() {
        let a = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 2.0, 4.0]);
        let b = DVector::from_vec(vec![1.0, 1.0]);
        assert_eq!(LinearSolver::Direct.solve(&a, &b), Err(SolverError::Singular));
    }

    #[test]
    fn direct_solver_reports_small_residual() {
        let (a, b) = test_system(12);
        let (x, stats) = LinearSolver::Direct.solve(&a, &b).unwrap();
        assert!(stats.converged);
        assert!(stats.residual < 1e-12);
        assert!((&a * &x - &b).norm() < 1e-10);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let (a, b) = test_system(4);
        let config = GmresConfig {
            restart: 0,
            ..GmresConfig::default()
        };
        assert!(matches!(
            gmres(&a, &b, None, &config, &IdentityPreconditioner),
            Err(SolverError::InvalidConfig(_))
        ));
    }
}
