// Analyst module: trait seam plus the Gemini-backed implementation.

pub mod gemini;
pub mod traits;

pub use gemini::GeminiAnalyst;
pub use traits::ChartAnalyst;
