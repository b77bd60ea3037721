pub mod action;
pub mod safety;
pub mod social;
pub mod spatial;
