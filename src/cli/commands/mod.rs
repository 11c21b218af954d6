pub mod entity;
pub mod guard;
pub mod remote;
pub mod session;
