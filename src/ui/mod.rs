/// UI module exports
pub mod components;
pub mod options;
