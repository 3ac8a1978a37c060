pub mod config;
pub mod enrichment;
pub mod etl;
pub mod member_store;
pub mod sqlite_persistence;
