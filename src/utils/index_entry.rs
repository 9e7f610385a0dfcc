//! 生成 clitable index 文件条目
//! 形如 `cisco_ios_show_version.textfsm, .*, cisco_ios, sh[[ow]] ver[[sion]]`

use crate::error::{RstResult, RstextfsmError};

/// 命令缩写：每个单词写作 `短前缀[[剩余部分]]`
///
/// `short` 为最短可用命令，每个单词必须是完整命令对应单词的前缀。
pub fn abbreviate_command(command: &str, short: &str) -> RstResult<String> {
    let words: Vec<&str> = command.split_whitespace().collect();
    let shorts: Vec<&str> = short.split_whitespace().collect();
    if shorts.len() > words.len() {
        return Err(RstextfsmError::InvalidInput(format!(
            "缩写命令单词数多于完整命令：{:?} / {:?}",
            short, command
        )));
    }

    let mut parts = Vec::with_capacity(shorts.len());
    for (word, short_word) in words.iter().zip(&shorts) {
        let rest = word.strip_prefix(short_word).ok_or_else(|| {
            RstextfsmError::InvalidInput(format!("{:?} 不是 {:?} 的前缀", short_word, word))
        })?;
        if rest.is_empty() {
            parts.push(short_word.to_string());
        } else {
            parts.push(format!("{}[[{}]]", short_word, rest));
        }
    }
    Ok(parts.join(" "))
}

/// 生成完整 index 条目
pub fn index_entry(
    template_file: &str,
    platform: &str,
    command: &str,
    short: &str,
) -> RstResult<String> {
    Ok(format!(
        "{}, .*, {}, {}",
        template_file,
        platform,
        abbreviate_command(command, short)?
    ))
}
