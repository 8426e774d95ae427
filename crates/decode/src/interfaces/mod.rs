mod result;

// re-export the public interface
pub use result::*;
