pub mod done;
pub mod init;
pub mod root;
pub mod status;
