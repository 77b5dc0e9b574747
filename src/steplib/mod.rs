pub mod models;
pub mod stepman;
pub mod version;

pub use models::{StepCatalog, StepVersion};
pub use stepman::{ExportType, StepmanClient};
pub use version::VersionComparator;
