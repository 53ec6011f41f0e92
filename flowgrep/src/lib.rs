pub mod config;
pub mod errors;
pub mod filters;
pub mod patterns;
pub mod results;
pub mod search;

pub use config::SearchConfig;
pub use errors::{SearchError, SearchResult};
pub use patterns::PatternSet;
pub use results::{MatchRecord, RecordBuilder, ResultSink};
pub use search::{search, SearchReport};
