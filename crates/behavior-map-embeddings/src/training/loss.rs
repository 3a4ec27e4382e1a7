//! Skip-gram negative-sampling objective.
//!
//! For a focus activity `f`, its true context `c` and negative draws `n_k`:
//!
//! ```text
//! L = -log σ(u_c · v_f) - Σ_k log σ(-u_{n_k} · v_f)
//! ```
//!
//! where `v` are input (activity) vectors and `u` are output (context)
//! vectors.

/// Logistic function.
#[inline]
pub fn sigmoid(x: f32) -> f32 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

/// `log σ(x)` computed without overflow for large `|x|`.
#[inline]
pub fn log_sigmoid(x: f32) -> f32 {
    if x >= 0.0 {
        -(-x).exp().ln_1p()
    } else {
        x - x.exp().ln_1p()
    }
}

/// Loss of one positive pair with its negatives, given raw dot-product scores.
pub fn sgns_loss(positive_score: f32, negative_scores: &[f32]) -> f32 {
    -log_sigmoid(positive_score) - negative_scores.iter().map(|&s| log_sigmoid(-s)).sum::<f32>()
}

/// Running mean of per-pair losses over one epoch.
#[derive(Debug, Clone, Copy, Default)]
pub struct LossAccumulator {
    total: f64,
    pairs: usize,
}

impl LossAccumulator {
    pub fn add(&mut self, loss: f32) {
        self.total += loss as f64;
        self.pairs += 1;
    }

    pub fn pairs(&self) -> usize {
        self.pairs
    }

    /// Mean loss, or 0 when nothing was accumulated.
    pub fn mean(&self) -> f32 {
        if self.pairs == 0 {
            0.0
        } else {
            (self.total / self.pairs as f64) as f32
        }
    }
}
