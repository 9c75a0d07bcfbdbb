//! Route handlers

pub mod data;
