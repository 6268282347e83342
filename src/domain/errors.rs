/// Every failure the chart engine can report. All of them are recoverable at
/// the chart level: the caller falls back to an empty or degraded chart.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartError {
    /// Nothing left in the price domain after filtering near-zero values.
    NoValidPriceData,
    /// Margins leave no drawable area.
    InvalidViewport { inner_width: f64, inner_height: f64 },
    /// The fixed-point fit hit its iteration limit or went non-finite. Reported
    /// as a diagnostic only; the solver still returns its best range.
    ScaleSolveNonConvergent { iterations: usize, residual: f64 },
    /// Malformed series payload or unknown chart type.
    InvalidInput(String),
}

impl std::fmt::Display for ChartError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChartError::NoValidPriceData => write!(f, "No valid price data"),
            ChartError::InvalidViewport { inner_width, inner_height } => write!(
                f,
                "Invalid viewport: inner area {:.1}x{:.1}",
                inner_width, inner_height
            ),
            ChartError::ScaleSolveNonConvergent { iterations, residual } => write!(
                f,
                "Scale fit did not converge after {} iterations (residual {:.4}px)",
                iterations, residual
            ),
            ChartError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
        }
    }
}

impl std::error::Error for ChartError {}

pub type SolveResult<T> = Result<T, ChartError>;
pub type IngestResult<T> = Result<T, ChartError>;
