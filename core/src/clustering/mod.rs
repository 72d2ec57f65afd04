pub mod config;
pub mod fof;
pub mod grid;
pub mod merge;

pub use config::ClusteringConfig;
pub use fof::Fof;
pub use grid::CellGrid;
pub use merge::SpsClustering;
