//! 内核辅助工具
pub mod preview;
