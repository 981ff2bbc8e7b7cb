// Domain layer - feed data types and the pure pipeline stages
pub mod channel;
pub mod dashboard;
pub mod labels;
pub mod metric;
pub mod series;
pub mod threshold;
pub mod trend;
