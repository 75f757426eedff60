//! Request pipeline middleware.

pub mod error_handling;

pub use error_handling::handle_errors;
