pub mod doctor;
pub mod hook;
pub mod init;
pub mod install;
pub mod tools;
