use std::fmt::{self, Write};

/// 日志中输入行的紧凑预览
///
/// 连续空白显示为一个空格，超过 `max_chars` 个字符时以 `…` 截断；
/// 格式化时直接写入 Formatter，不分配新字符串
pub fn preview_compact(line: &str, max_chars: usize) -> impl fmt::Display + '_ {
    LinePreview { line, max_chars }
}

struct LinePreview<'a> {
    line: &'a str,
    max_chars: usize,
}

impl fmt::Display for LinePreview<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut written = 0;
        let mut words = self.line.split_whitespace().peekable();
        // 行首空白同样折叠为一个空格
        let mut pending_space = self.line.starts_with(char::is_whitespace);

        while let Some(word) = words.next() {
            for ch in pending_space.then_some(' ').into_iter().chain(word.chars()) {
                if written == self.max_chars {
                    return f.write_char('…');
                }
                f.write_char(ch)?;
                written += 1;
            }
            pending_space = words.peek().is_some()
                || self.line.ends_with(char::is_whitespace);
        }
        if pending_space && written < self.max_chars {
            f.write_char(' ')?;
        }
        Ok(())
    }
}
