//! Execution Engine
//!
//! CPU dispatch between kernel backends.

pub mod dispatcher;

pub use dispatcher::get_active_backend_name;
