pub mod init;
pub mod python;
pub mod summarize;
pub mod tree;
