pub mod attest;
pub mod watch;
