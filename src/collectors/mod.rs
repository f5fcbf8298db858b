pub mod attr;
pub mod diskstats;
pub mod storage;
