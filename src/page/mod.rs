pub mod document;
pub mod error;
pub mod form;
pub mod lifecycle;
pub mod parse;
pub mod snapshot;
