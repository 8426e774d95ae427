mod args;
mod transaction;

// re-export the public interface
pub use args::{InspectArgs, InspectArgsBuilder};
pub use transaction::*;
