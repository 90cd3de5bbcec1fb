pub mod bus;
pub mod config;
pub mod cpu;
pub mod debug;
pub mod image;
pub mod mem;
