pub mod types;
pub mod validator;

pub use types::{channel, ChannelSummary, Datalog, DatalogRow, OrderedRow};
pub use validator::{validate, DatalogError};
