pub mod loc;
pub mod ngs;
pub mod num;
