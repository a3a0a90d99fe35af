pub mod hunt;
pub mod paginate;

pub use hunt::{Hunt, HuntSettings, HuntSummary};
pub use paginate::{collect_results, effective_limit, QueryOutcome};
