pub mod assessment;
pub mod category;
pub mod engine;
pub mod error;
pub mod store;
pub mod team;
pub mod thresholds;

pub use category::Category;
pub use engine::{Analyzer, AnalyzerSettings};
pub use error::AnalysisError;
pub use store::OutcomeStore;
