pub mod bridge;
pub mod model;

pub use bridge::MonitorBridge;
pub use model::SummaryModel;
