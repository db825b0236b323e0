pub mod catalog;
pub mod properties;
pub mod registry;
pub mod service;
