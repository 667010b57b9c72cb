//! File loaders for the salary tax estimator.
//!
//! Reads batches of salary inputs and slab schedules from CSV so they can be
//! fed to the calculators in `tax-core`.

mod cells;
mod salary_inputs;
mod slab_loader;

pub use salary_inputs::{SalaryInputLoader, SalaryInputLoaderError, SalaryRecord};
pub use slab_loader::{SlabRecord, SlabScheduleLoader, SlabScheduleLoaderError};
