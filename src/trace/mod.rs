pub mod console;
pub mod logger;
pub mod trace;
