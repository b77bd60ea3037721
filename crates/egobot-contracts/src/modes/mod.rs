mod registry;

pub use registry::{ModeRegistry, ModeSpec, FULL_ANALYSIS_MODES};
