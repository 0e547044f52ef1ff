pub mod grade;
pub mod init;
pub mod report;
pub mod seed;
pub mod serve;
pub mod validate;
