pub mod clean;
pub mod output;
