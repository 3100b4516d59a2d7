//! Middleware module
//!
//! HTTP request middleware layered onto the router

pub mod logging;
