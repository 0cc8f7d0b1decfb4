pub mod clustering;
pub mod error;
pub mod models;
pub mod storage;
pub mod utils;
