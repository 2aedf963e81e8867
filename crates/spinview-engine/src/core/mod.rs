//! Contract between the runtime and the code that feeds a view its program,
//! mesh and projection.

mod app;

pub use app::{App, AppControl};
