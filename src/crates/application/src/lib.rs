pub mod auth;
pub mod catalog;
pub mod command;
pub mod error;
pub mod vision;

#[cfg(test)]
mod test_support;
