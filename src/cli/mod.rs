mod args;

pub use args::{Args, OutputFormat};
