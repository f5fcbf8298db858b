pub mod battery;
pub mod disk;
pub mod snapshot;
pub mod storage;
