pub mod batch;
pub mod conf;
pub mod domain;
pub mod errors;
pub mod interrogate;
pub mod report;
pub mod resolver;
pub mod security;
pub mod shared;
pub mod transport;
