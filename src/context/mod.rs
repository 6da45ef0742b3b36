mod analysis;
mod match_context;


pub use analysis::AnalysisContext;
pub use match_context::{MatchContext, Service, SourceName};
