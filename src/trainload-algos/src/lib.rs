#[macro_use]
extern crate log;

mod error;
pub use error::{AlgoError, ConfigIssue};

pub(crate) mod ctl;
pub use ctl::{CtlRun, CtlSimulator, MonteCarloSummary, RideSource, TssMode};

pub(crate) mod load;
pub use load::{DailyLoad, LoadModel};

pub mod tss;
pub use tss::TssPoint;

pub(crate) mod fuel;
pub use fuel::{FuelBurn, FuelModel, FuelSweep};

pub(crate) mod polyfit;
pub use polyfit::{FAT_OXIDATION_SAMPLES, Polynomial, polyfit};

pub mod helpers;
