pub mod conversation;
pub mod result_parser;
pub mod standings;

// Re-export main components
pub use conversation::*;
pub use result_parser::*;
pub use standings::*;
