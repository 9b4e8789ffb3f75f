pub mod rest;
pub mod traits;

pub use rest::{RestConfig, RestEventSource};
pub use traits::*;
