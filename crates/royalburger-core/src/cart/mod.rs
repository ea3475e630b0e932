//! Cart interaction logic that lives on the client
//!
//! - [`accelerator`]: batches rapid quantity presses into pending writes

pub mod accelerator;

pub use accelerator::{AcceleratorConfig, Direction, QuantityAccelerator, QuantityUpdate};
