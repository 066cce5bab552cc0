pub mod common;
pub mod list;
pub mod push;
pub mod status;
pub mod sync;
