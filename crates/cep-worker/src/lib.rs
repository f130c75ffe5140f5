pub mod engine;
pub mod worker;

pub use engine::CepEngine;
pub use worker::PatternWorker;
