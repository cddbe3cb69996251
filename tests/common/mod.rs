pub mod transport;
pub mod utils;
