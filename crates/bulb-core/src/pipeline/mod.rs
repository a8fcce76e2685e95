pub mod config;
mod driver;

pub use driver::{
    run_exposure, run_exposure_cancellable, run_exposure_partitioned,
    run_exposure_partitioned_cancellable, run_exposure_partitioned_reported,
    run_exposure_reported, CancelFlag, ExposureSummary,
};
