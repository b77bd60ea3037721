pub mod bench;
pub mod modes;
pub mod prompts;
pub mod results;
