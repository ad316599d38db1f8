pub mod dataset;
pub mod graph;
pub mod layout;
pub mod mocks;

#[macro_use]
extern crate approx;
