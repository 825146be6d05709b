pub mod assemble;
pub mod fetch;
pub mod format;
