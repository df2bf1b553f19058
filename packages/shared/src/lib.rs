//! Utilities shared by the codepair server and client.

pub mod logger;
pub mod time;
