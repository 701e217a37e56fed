pub mod in_memory;
pub mod report_finance;
#[cfg(feature = "storage-rocksdb")]
pub mod rocksdb;
