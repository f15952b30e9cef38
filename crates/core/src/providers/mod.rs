pub mod traits;

// Remote source implementations
pub mod http;
