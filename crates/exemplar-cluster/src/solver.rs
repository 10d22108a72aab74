//! Message-passing solver.
//!
//! Alternates responsibility and availability updates with damping until the
//! implied exemplar set holds steady for `convergence_window` iterations or
//! the iteration budget runs out. R and A live only inside one solve; the
//! caller receives the diagonal evidence `A[i][i] + R[i][i]` and nothing else.

use std::collections::VecDeque;

use exemplar_core::ClusterParams;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::matrix::SquareMatrix;

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolveStatus {
    /// The exemplar set was unchanged for the whole convergence window.
    Converged,
    /// The iteration budget ran out first.
    Exhausted,
    /// Zero or one item; no iterations were needed.
    Trivial,
}

impl SolveStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Converged => "converged",
            Self::Exhausted => "exhausted",
            Self::Trivial => "trivial",
        }
    }
}

/// Solver state after a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverState {
    Running,
    Converged,
    Exhausted,
}

/// Result of a solve: termination info plus per-item exemplar evidence.
#[derive(Debug, Clone, PartialEq)]
pub struct SolveOutcome {
    pub status: SolveStatus,
    pub iterations: usize,
    /// `A[i][i] + R[i][i]` from the final matrices.
    pub evidence: Vec<f64>,
}

impl SolveOutcome {
    /// Items with positive evidence, ascending.
    pub fn exemplars(&self) -> Vec<usize> {
        exemplars_from_evidence(&self.evidence)
    }
}

pub(crate) fn exemplars_from_evidence(evidence: &[f64]) -> Vec<usize> {
    evidence
        .iter()
        .enumerate()
        .filter(|&(_, &e)| e > 0.0)
        .map(|(i, _)| i)
        .collect()
}

/// Working state of one affinity propagation solve.
///
/// Borrows S (preference already on the diagonal) and owns R and A.
pub struct MessagePassing<'a> {
    s: &'a SquareMatrix,
    damping: f64,
    max_iterations: usize,
    window: usize,
    responsibility: SquareMatrix,
    availability: SquareMatrix,
    history: VecDeque<Vec<usize>>,
    iterations: usize,
    state: SolverState,
}

impl<'a> MessagePassing<'a> {
    /// Allocate fresh zeroed R and A for `s`. `params` must already be validated.
    pub fn new(s: &'a SquareMatrix, params: &ClusterParams) -> Self {
        let n = s.n();
        Self {
            s,
            damping: params.damping,
            max_iterations: params.max_iterations,
            window: params.convergence_window,
            responsibility: SquareMatrix::zeros(n),
            availability: SquareMatrix::zeros(n),
            history: VecDeque::with_capacity(params.convergence_window + 1),
            iterations: 0,
            state: SolverState::Running,
        }
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn state(&self) -> SolverState {
        self.state
    }

    /// Run one iteration and return the resulting state.
    ///
    /// Calling `step` after a terminal state is a no-op.
    pub fn step(&mut self) -> SolverState {
        if self.state != SolverState::Running {
            return self.state;
        }
        if self.iterations >= self.max_iterations {
            self.state = SolverState::Exhausted;
            return self.state;
        }

        self.update_responsibility();
        self.update_availability();
        self.iterations += 1;

        let exemplars = self.current_exemplars();
        trace!(
            iteration = self.iterations,
            exemplars = exemplars.len(),
            "Message-passing iteration"
        );
        self.history.push_back(exemplars);
        if self.history.len() > self.window {
            self.history.pop_front();
        }

        if self.is_stable() {
            self.state = SolverState::Converged;
        } else if self.iterations >= self.max_iterations {
            self.state = SolverState::Exhausted;
        }
        self.state
    }

    /// Iterate to a terminal state and release R and A.
    pub fn run(mut self) -> SolveOutcome {
        while self.step() == SolverState::Running {}

        let status = match self.state {
            SolverState::Converged => {
                debug!(iterations = self.iterations, "Affinity propagation converged");
                SolveStatus::Converged
            }
            _ => {
                warn!(
                    iterations = self.iterations,
                    window = self.window,
                    "Affinity propagation did not converge within the iteration budget"
                );
                SolveStatus::Exhausted
            }
        };

        SolveOutcome {
            status,
            iterations: self.iterations,
            evidence: self.evidence(),
        }
    }

    /// `A[i][i] + R[i][i]` for every item.
    fn evidence(&self) -> Vec<f64> {
        self.availability
            .diagonal()
            .zip(self.responsibility.diagonal())
            .map(|(a, r)| a + r)
            .collect()
    }

    fn current_exemplars(&self) -> Vec<usize> {
        exemplars_from_evidence(&self.evidence())
    }

    fn is_stable(&self) -> bool {
        self.history.len() == self.window
            && self.history.iter().all(|h| h == &self.history[0])
    }

    /// `r(i,k) ← s(i,k) − max_{k'≠k} (a(i,k') + s(i,k'))`, damped.
    ///
    /// Tracks the top two values per row so each row costs O(n).
    fn update_responsibility(&mut self) {
        let s = self.s;
        let n = s.n();
        let keep = self.damping;
        let take = 1.0 - self.damping;
        for i in 0..n {
            let s_row = s.row(i);
            let a_row = self.availability.row(i);

            let mut best = f64::NEG_INFINITY;
            let mut runner_up = f64::NEG_INFINITY;
            let mut best_k = 0;
            for (k, (&a, &sim)) in a_row.iter().zip(s_row).enumerate() {
                let v = a + sim;
                if v > best {
                    runner_up = best;
                    best = v;
                    best_k = k;
                } else if v > runner_up {
                    runner_up = v;
                }
            }

            let r_row = self.responsibility.row_mut(i);
            for (k, r) in r_row.iter_mut().enumerate() {
                let competing = if k == best_k { runner_up } else { best };
                let raw = s_row[k] - competing;
                *r = take * raw + keep * *r;
            }
        }
    }

    /// `a(i,k) ← min(0, r(k,k) + Σ_{i'∉{i,k}} max(0, r(i',k)))` for i≠k,
    /// `a(k,k) ← Σ_{i'≠k} max(0, r(i',k))`, damped.
    fn update_availability(&mut self) {
        let n = self.s.n();
        let keep = self.damping;
        let take = 1.0 - self.damping;

        let mut col_sum = vec![0.0; n];
        for i in 0..n {
            for (k, &r) in self.responsibility.row(i).iter().enumerate() {
                if i != k {
                    col_sum[k] += r.max(0.0);
                }
            }
        }

        for i in 0..n {
            for k in 0..n {
                let raw = if i == k {
                    col_sum[k]
                } else {
                    let positive = self.responsibility[(i, k)].max(0.0);
                    (self.responsibility[(k, k)] + col_sum[k] - positive).min(0.0)
                };
                let a = &mut self.availability[(i, k)];
                *a = take * raw + keep * *a;
            }
        }
    }
}

/// Solve on `s` with the preference already applied.
pub fn solve(s: &SquareMatrix, params: &ClusterParams) -> SolveOutcome {
    MessagePassing::new(s, params).run()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform(n: usize, off: f64, pref: f64) -> SquareMatrix {
        let mut s = SquareMatrix::zeros(n);
        for i in 0..n {
            for j in 0..n {
                s[(i, j)] = if i == j { pref } else { off };
            }
        }
        s
    }

    // ── Message updates ─────────────────────────────────────────────

    #[test]
    fn test_first_iteration_messages() {
        // High preference: every item prefers itself.
        let s = uniform(3, 0.5, 10.0);
        let mut mp = MessagePassing::new(&s, &ClusterParams::default());
        mp.step();

        // raw r(i,i) = 10 - 0.5, raw r(i,k) = 0.5 - 10, halved by damping.
        assert_eq!(mp.responsibility[(0, 0)], 4.75);
        assert_eq!(mp.responsibility[(0, 1)], -4.75);
        // No positive off-diagonal responsibility: availabilities stay 0.
        assert_eq!(mp.availability[(0, 1)], 0.0);
        assert_eq!(mp.availability[(1, 1)], 0.0);
        assert_eq!(mp.current_exemplars(), vec![0, 1, 2]);
    }

    #[test]
    fn test_tied_row_maximum_uses_first_column() {
        // Row 0 ties between columns 1 and 2; the runner-up equals the max, so
        // both responsibilities come out 0.
        let s = uniform(3, 0.5, -100.0);
        let mut mp = MessagePassing::new(&s, &ClusterParams::default());
        mp.step();
        assert_eq!(mp.responsibility[(0, 1)], 0.0);
        assert_eq!(mp.responsibility[(0, 2)], 0.0);
        assert_eq!(mp.responsibility[(0, 0)], -50.25);
        assert_eq!(mp.availability[(1, 0)], -25.125);
        assert_eq!(mp.availability[(0, 0)], 0.0);
    }

    #[test]
    fn test_availability_uses_positive_column_sums() {
        let s = SquareMatrix::from_rows(&[
            vec![-2.0, -1.0, -4.0],
            vec![-1.0, -2.0, -1.0],
            vec![-4.0, -1.0, -2.0],
        ]);
        let mut mp = MessagePassing::new(&s, &ClusterParams::default().with_damping(0.5));
        mp.update_responsibility();
        mp.update_availability();
        // Column 1 collects positive responsibility from rows 0 and 2.
        let col: f64 = [0, 2]
            .iter()
            .map(|&i| mp.responsibility[(i, 1)].max(0.0))
            .sum();
        assert!(col > 0.0);
        assert_eq!(mp.availability[(1, 1)], 0.5 * col);
        for i in [0, 2] {
            let expected = 0.5
                * (mp.responsibility[(1, 1)] + col - mp.responsibility[(i, 1)].max(0.0)).min(0.0);
            assert_eq!(mp.availability[(i, 1)], expected);
        }
    }

    // ── Termination ─────────────────────────────────────────────────

    #[test]
    fn test_converges_after_window() {
        let s = uniform(3, 0.5, 10.0);
        let outcome = solve(&s, &ClusterParams::default());
        assert_eq!(outcome.status, SolveStatus::Converged);
        // Stable from the first iteration, so exactly one window.
        assert_eq!(outcome.iterations, 15);
        assert_eq!(outcome.exemplars(), vec![0, 1, 2]);
    }

    #[test]
    fn test_window_larger_than_budget_exhausts() {
        let s = uniform(3, 0.5, 10.0);
        let params = ClusterParams::default()
            .with_max_iterations(5)
            .with_convergence_window(15);
        let outcome = solve(&s, &params);
        assert_eq!(outcome.status, SolveStatus::Exhausted);
        assert_eq!(outcome.iterations, 5);
        // Evidence from the last iteration is still usable.
        assert_eq!(outcome.exemplars(), vec![0, 1, 2]);
    }

    #[test]
    fn test_step_after_termination_is_noop() {
        let s = uniform(2, 0.0, 1.0);
        let params = ClusterParams::default()
            .with_max_iterations(1)
            .with_convergence_window(1);
        let mut mp = MessagePassing::new(&s, &params);
        assert_eq!(mp.step(), SolverState::Converged);
        assert_eq!(mp.step(), SolverState::Converged);
        assert_eq!(mp.iterations(), 1);
    }

    #[test]
    fn test_history_is_capped_at_window() {
        let s = uniform(3, 0.5, 10.0);
        let params = ClusterParams::default().with_convergence_window(3);
        let mut mp = MessagePassing::new(&s, &params);
        for _ in 0..2 {
            mp.step();
            assert!(mp.history.len() <= 3);
        }
        assert_eq!(mp.state(), SolverState::Running);
        assert_eq!(mp.step(), SolverState::Converged);
        assert_eq!(mp.history.len(), 3);
    }

    #[test]
    fn test_solve_is_deterministic() {
        let s = SquareMatrix::from_rows(&[
            vec![-3.0, -1.0, -9.0, -16.0],
            vec![-1.0, -3.0, -4.0, -9.0],
            vec![-9.0, -4.0, -3.0, -1.0],
            vec![-16.0, -9.0, -1.0, -3.0],
        ]);
        let a = solve(&s, &ClusterParams::default());
        let b = solve(&s, &ClusterParams::default());
        assert_eq!(a, b);
    }

    #[test]
    fn test_exemplars_from_evidence() {
        assert_eq!(exemplars_from_evidence(&[0.1, 0.0, -2.0, 3.0]), vec![0, 3]);
        assert!(exemplars_from_evidence(&[]).is_empty());
    }

    #[test]
    fn test_status_as_str() {
        assert_eq!(SolveStatus::Converged.as_str(), "converged");
        assert_eq!(SolveStatus::Exhausted.as_str(), "exhausted");
        assert_eq!(SolveStatus::Trivial.as_str(), "trivial");
    }
}
