pub mod api;
pub mod cli;
pub mod config;
pub mod controller;
pub mod error;
pub mod types;
pub mod util;
pub mod validation;
pub mod view;

#[cfg(test)]
pub mod testing;
