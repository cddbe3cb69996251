pub mod interceptor;
pub mod pending;
