pub mod buffer;
pub mod dns;
pub mod semaphore;
pub mod sink;

pub use semaphore::Semaphore;
pub use sink::{Level, Sink};
