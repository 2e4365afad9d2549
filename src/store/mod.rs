pub mod data_point_store;

pub use data_point_store::DataPointStore;
