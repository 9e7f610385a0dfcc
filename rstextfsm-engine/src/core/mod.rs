//! 内核公共数据模型
pub mod action;
pub mod record;
pub mod rule;
pub mod value;

pub use action::{Action, LineOp, RecordOp};
pub use record::{FieldValue, Record};
pub use rule::{Rule, State, StateId, Target};
pub use value::{ValueDescriptor, ValueOption, MAX_NAME_LEN};
