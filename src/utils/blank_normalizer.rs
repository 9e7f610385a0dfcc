//! 规则行空白归一化
//! 将规则正则部分中的字面空格替换为 `\s+`，动作子句保持不变

use once_cell::sync::Lazy;
use regex::Regex;

/// 动作子句：第一个 ` -> ` 到行尾
static ACTION_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"( -> .*)$").unwrap());

/// 规则行前缀（两个空格缩进 + `^`）
const RULE_PREFIX: &str = "  ^";

/// 归一化整份模板文本
/// 只处理以两个空格加 `^` 开头的规则行，其余行原样保留
pub fn normalize_rule_whitespace(text: &str) -> String {
    let mut lines: Vec<String> = text.lines().map(normalize_line).collect();
    if text.ends_with('\n') {
        lines.push(String::new());
    }
    lines.join("\n")
}

fn normalize_line(line: &str) -> String {
    if !line.starts_with(RULE_PREFIX) {
        return line.to_string();
    }

    let body = &line[2..];
    let (pattern, action) = match ACTION_REGEX.find(body) {
        Some(m) => (&body[..m.start()], m.as_str()),
        None => (body, ""),
    };

    let collapsed = pattern.split_whitespace().collect::<Vec<_>>().join(r"\s+");
    format!("  {}{}", collapsed, action)
}
