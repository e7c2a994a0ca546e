pub mod alert_log;
pub mod evaluator;
pub mod scheduler;
pub mod station_lookup;

pub use alert_log::{AlertKey, AlertLog};
pub use evaluator::AlertEvaluator;
pub use scheduler::AlertScheduler;
