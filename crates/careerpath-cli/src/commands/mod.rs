pub mod catalog;
pub mod init;
pub mod output;
pub mod score;
pub mod take;
pub mod validate;
