pub mod alert;
pub mod job;
pub mod location;
pub mod station;

pub use alert::*;
pub use job::*;
pub use location::*;
pub use station::*;
