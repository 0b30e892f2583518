#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SelectionError {
    #[error("weights must sum to a positive finite value (performance {performance}, budget {budget})")]
    InvalidWeights { performance: f64, budget: f64 },

    #[error("budget must be a non-negative finite amount, got {0}")]
    InvalidBudget(f64),

    #[error("lineup share must lie in [0, 1], got {0}")]
    InvalidShare(f64),
}
