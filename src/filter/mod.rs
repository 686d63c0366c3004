pub mod company;
pub mod error;
pub mod filter_order;
pub mod filter_where;
pub mod job;
pub mod partial_update;
pub mod types;

pub use company::CompanyFilter;
pub use error::FilterError;
pub use job::JobFilter;
pub use partial_update::sql_for_partial_update;
pub use types::*;
