pub mod appointment;
pub mod log;
pub mod message;
pub mod teacher;
pub mod user;
