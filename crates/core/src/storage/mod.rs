pub mod backend;
pub mod format;
pub mod session_store;
pub mod table;
pub mod traits;
