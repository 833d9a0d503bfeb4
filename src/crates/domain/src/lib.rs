pub mod lineup;
pub mod playlist;
pub mod session;
pub mod user;
pub mod value;
