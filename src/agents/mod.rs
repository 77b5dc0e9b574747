pub mod classifier;
pub mod command_runner;
pub mod const_rewriter;
pub mod dependency_updater;
pub mod fleet_analyser;
pub mod fleet_walker;
pub mod import_scanner;
pub mod package_path;
pub mod release_notes;
pub mod step_lister;
pub mod template_renderer;

pub use classifier::categorise_deps;
pub use command_runner::SystemCommandRunner;
pub use dependency_updater::{DependencyUpdater, UpdateOutcome};
pub use fleet_analyser::{FleetAnalyser, ProjectRequirement};
pub use import_scanner::ImportScanner;
pub use release_notes::{ReleaseNotesCollector, StepChanges, parse_cutoff};
pub use step_lister::{FilterCriteria, StepLister, ToolkitFilter};
pub use template_renderer::{DEFAULT_PRINT_TEMPLATE, TemplateRenderer};
