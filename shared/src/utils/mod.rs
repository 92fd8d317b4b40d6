//! Utility helpers shared by the service crates

pub mod email;
