pub mod binding;
pub mod error;
pub mod plan;
pub mod resolve;
pub mod wildcard;

pub use binding::bind_tables;
pub use error::{PlanError, PlanResult};
pub use plan::{ColumnPlan, SelectPlan, plan_select};
pub use resolve::SelectPlanner;
pub use wildcard::expand_wildcard;
