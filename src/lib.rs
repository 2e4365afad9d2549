#![forbid(unsafe_code)]

pub mod bus;
pub mod chart;
pub mod config;
pub mod datamodel;
pub mod engine;
pub mod exporters;
pub mod registry;
pub mod source;
pub mod store;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
