pub mod aggregation;
pub mod controller;
pub mod filler;
pub mod plan;

pub use aggregation::AggregationBuffer;
pub use controller::Buffering;
pub use filler::{AggregationBufferFiller, FullBufferHandler};
pub use plan::{BruteForcePlan, FixedPlan, DISPERSION_CONSTANT};
