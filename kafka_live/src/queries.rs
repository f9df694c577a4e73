mod query_filter;
mod topic_query;

pub use query_filter::*;
pub use topic_query::*;
