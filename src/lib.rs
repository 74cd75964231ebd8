pub mod aggregate;
pub mod bbr;
pub mod config;
pub mod corpus;
pub mod fetch;
pub mod report;
pub mod stats;
pub mod storage;
