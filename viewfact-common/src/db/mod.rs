//! Database initialization for the viewfact star schema

pub mod init;

pub use init::*;
