pub mod fallback;
pub mod refs;
pub mod transport;

// Re-export commonly used items
pub use fallback::*;
pub use refs::*;
pub use transport::*;
