pub mod exposure;
pub mod running_mean;

pub use exposure::ExposureStacker;
pub use running_mean::RunningMean;
