//! 工具模块：记录转换与模板开发辅助
pub mod blank_normalizer;
pub mod index_entry;
pub mod record_converter;
pub mod sample_layout;

pub use self::blank_normalizer::normalize_rule_whitespace;
pub use self::index_entry::{abbreviate_command, index_entry};
pub use self::record_converter::{ParsedSample, RecordConverter};
pub use self::sample_layout::SampleLayout;
