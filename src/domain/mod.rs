pub mod catalog;
pub mod operation;
pub mod options;
pub mod page;
pub mod ports;
pub mod user;
