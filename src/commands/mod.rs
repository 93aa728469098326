pub mod config;
pub mod days;
pub mod login;
pub mod logout;
pub mod remote;
pub mod set;
pub mod watch;
