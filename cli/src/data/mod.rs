pub mod power;
pub mod processes;

pub use power::PowerData;
pub use processes::{ProcessData, ProcessRow};
