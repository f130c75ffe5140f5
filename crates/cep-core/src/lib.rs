pub mod blueprint;
pub mod config;
pub mod driver;
pub mod error;
pub mod event;
pub mod formula;
pub mod optimizer;
pub mod pattern;
pub mod stats;
pub mod tree;
pub mod value;

pub use blueprint::Blueprint;
pub use driver::{match_channel, EvaluationDriver, MatchSink, MatchSource, PatternMatch};
pub use error::{CepError, CepResult};
pub use event::{Event, Stream};
pub use formula::{Formula, Term};
pub use optimizer::Optimizer;
pub use pattern::{LeafDesc, Pattern, Statistics, TopOp, Window};
pub use value::Value;
