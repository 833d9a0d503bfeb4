pub mod extraction;
pub mod playlist;
