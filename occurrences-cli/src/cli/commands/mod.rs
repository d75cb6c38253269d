pub mod header;
pub mod records;
pub mod serve;
