pub mod saver;
pub mod storage;
