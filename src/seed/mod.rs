pub mod flavor;
pub mod generate;
pub mod reference;
pub mod report;
pub mod runner;

pub use flavor::Flavor;
pub use report::SeedReport;
pub use runner::{run_seed, SeedPlan, MAX_SUPPLEMENTAL};
