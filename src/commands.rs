pub mod fetch;
pub mod process;
