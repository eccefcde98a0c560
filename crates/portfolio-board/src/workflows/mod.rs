pub mod board;
pub mod portfolio;
