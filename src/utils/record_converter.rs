//! 记录格式转换工具
//! 将内核输出的记录转为字典/JSON/YAML，供调用方或样例文件使用

use std::time::Instant;

use log::debug;
use rstextfsm_engine::{FieldValue, Record};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::RstResult;

/// 样例文件的顶层结构：`parsed_sample: [...]`
#[derive(Debug, Clone, Serialize)]
pub struct ParsedSample {
    pub parsed_sample: Vec<Map<String, Value>>,
}

/// 记录转换工具
pub struct RecordConverter;

impl RecordConverter {
    /// 将记录转为字典列表，列名可选转小写
    pub fn to_dicts(records: &[Record], lowercase_keys: bool) -> Vec<Map<String, Value>> {
        let start = Instant::now();
        let dicts: Vec<Map<String, Value>> = records
            .iter()
            .map(|record| {
                record
                    .iter()
                    .map(|(name, value)| {
                        let key = if lowercase_keys {
                            name.to_lowercase()
                        } else {
                            name.to_string()
                        };
                        (key, Self::field_to_json(value))
                    })
                    .collect()
            })
            .collect();

        debug!(
            "记录转换完成，耗时{:?}，生成{}条记录",
            start.elapsed(),
            dicts.len()
        );
        dicts
    }

    /// 字段值统一为字符串或字符串数组
    fn field_to_json(value: &FieldValue) -> Value {
        match value {
            FieldValue::Scalar(s) => Value::String(s.clone()),
            FieldValue::List(items) => {
                Value::Array(items.iter().cloned().map(Value::String).collect())
            }
        }
    }

    /// 格式化JSON输出
    pub fn to_json_pretty(records: &[Record], lowercase_keys: bool) -> RstResult<String> {
        Ok(serde_json::to_string_pretty(&Self::to_dicts(
            records,
            lowercase_keys,
        ))?)
    }

    /// 紧凑JSON输出
    pub fn to_json_compact(records: &[Record], lowercase_keys: bool) -> RstResult<String> {
        Ok(serde_json::to_string(&Self::to_dicts(records, lowercase_keys))?)
    }

    /// 生成样例文件内容（YAML，显式文档起始标记）
    pub fn to_parsed_sample_yaml(records: &[Record], lowercase_keys: bool) -> RstResult<String> {
        let sample = ParsedSample {
            parsed_sample: Self::to_dicts(records, lowercase_keys),
        };
        let body = serde_yaml::to_string(&sample)?;
        Ok(format!("---\n{}", body))
    }
}
