//! 输出记录模型

use std::fmt;
use std::sync::Arc;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// 单个字段值：标量或列表
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Scalar(String),
    List(Vec<String>),
}

impl FieldValue {
    /// 空字符串或空列表视为空
    #[inline]
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Scalar(s) => s.is_empty(),
            FieldValue::List(items) => items.is_empty(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Scalar(s) => Some(s),
            FieldValue::List(_) => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            FieldValue::Scalar(_) => None,
            FieldValue::List(items) => Some(items),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Scalar(value.to_string())
    }
}

impl From<Vec<&str>> for FieldValue {
    fn from(items: Vec<&str>) -> Self {
        FieldValue::List(items.into_iter().map(String::from).collect())
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Scalar(s) => write!(f, "{}", s),
            FieldValue::List(items) => write!(f, "[{}]", items.join(", ")),
        }
    }
}

/// 一条输出记录
/// 列名与模板共享（Arc），字段按 Value 声明顺序排列
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    header: Arc<[String]>,
    values: Vec<FieldValue>,
}

impl Record {
    pub(crate) fn new(header: Arc<[String]>, values: Vec<FieldValue>) -> Self {
        debug_assert_eq!(header.len(), values.len());
        Self { header, values }
    }

    /// 按名称取值
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.header
            .iter()
            .position(|h| h == name)
            .map(|idx| &self.values[idx])
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn values(&self) -> &[FieldValue] {
        &self.values
    }

    pub(crate) fn values_mut(&mut self) -> &mut [FieldValue] {
        &mut self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// (列名, 值) 迭代器，保持声明顺序
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.header
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (name, value) in self.iter() {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Record {
        let header: Arc<[String]> = vec!["NAME".to_string(), "ITEMS".to_string()].into();
        Record::new(
            header,
            vec![FieldValue::from("eth0"), FieldValue::from(vec!["a", "b"])],
        )
    }

    #[test]
    fn test_record_lookup_and_order() {
        let record = sample();
        assert_eq!(record.get("NAME"), Some(&FieldValue::from("eth0")));
        assert_eq!(record.get("MISSING"), None);
        let names: Vec<&str> = record.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["NAME", "ITEMS"]);
    }

    #[test]
    fn test_record_serializes_as_ordered_object() {
        let json = serde_json::to_string(&sample()).unwrap();
        assert_eq!(json, r#"{"NAME":"eth0","ITEMS":["a","b"]}"#);
    }

    #[test]
    fn test_field_value_emptiness() {
        assert!(FieldValue::Scalar(String::new()).is_empty());
        assert!(FieldValue::List(Vec::new()).is_empty());
        assert!(!FieldValue::from("x").is_empty());
    }
}
