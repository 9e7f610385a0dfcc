//! 记录组装器
//! 维护进行中的槽位，按 List/Filldown/Fillup/Required 语义生成输出记录

use std::sync::Arc;

use log::trace;

use crate::core::{FieldValue, Record, ValueDescriptor};

pub(crate) struct RecordAssembler<'t> {
    values: &'t [ValueDescriptor],
    header: Arc<[String]>,
    /// 与 values 一一对应的进行中槽位
    slots: Vec<FieldValue>,
    records: Vec<Record>,
    /// Fillup 回填窗口起点（最近一次 Clearall 时的记录数）
    window_start: usize,
}

impl<'t> RecordAssembler<'t> {
    pub(crate) fn new(values: &'t [ValueDescriptor], header: Arc<[String]>) -> Self {
        let slots = values.iter().map(empty_slot).collect();
        Self {
            values,
            header,
            slots,
            records: Vec::new(),
            window_start: 0,
        }
    }

    /// 写入一次捕获：List 追加，标量覆盖
    pub(crate) fn assign(&mut self, idx: usize, text: &str) {
        match &mut self.slots[idx] {
            FieldValue::List(items) => items.push(text.to_string()),
            FieldValue::Scalar(current) => {
                current.clear();
                current.push_str(text);
            }
        }
        if self.values[idx].is_fillup() && !self.slots[idx].is_empty() {
            self.fill_up(idx);
        }
    }

    /// 向上回填窗口内已输出记录的同名空列，遇到非空即停止
    fn fill_up(&mut self, idx: usize) {
        let value = &self.slots[idx];
        for record in self.records[self.window_start..].iter_mut().rev() {
            let field = &mut record.values_mut()[idx];
            if !field.is_empty() {
                break;
            }
            *field = value.clone();
        }
    }

    /// 输出当前记录
    /// Required 未满足时丢弃并清空；所有槽位为空时不输出
    pub(crate) fn record(&mut self) -> bool {
        if let Some(missing) = self
            .values
            .iter()
            .zip(&self.slots)
            .find(|(value, slot)| value.is_required() && slot.is_empty())
        {
            trace!("Required值{}为空，跳过本条记录", missing.0.name);
            self.clear();
            return false;
        }
        if self.slots.iter().all(FieldValue::is_empty) {
            return false;
        }

        self.records
            .push(Record::new(self.header.clone(), self.slots.clone()));
        self.clear();
        true
    }

    /// 清空非 Filldown 槽位
    pub(crate) fn clear(&mut self) {
        for (value, slot) in self.values.iter().zip(self.slots.iter_mut()) {
            if !value.is_filldown() {
                *slot = empty_slot(value);
            }
        }
    }

    /// 清空全部槽位，并开启新的 Fillup 回填窗口
    pub(crate) fn clear_all(&mut self) {
        for (value, slot) in self.values.iter().zip(self.slots.iter_mut()) {
            *slot = empty_slot(value);
        }
        self.window_start = self.records.len();
    }

    pub(crate) fn records_len(&self) -> usize {
        self.records.len()
    }

    pub(crate) fn into_records(self) -> Vec<Record> {
        self.records
    }
}

fn empty_slot(value: &ValueDescriptor) -> FieldValue {
    if value.is_list() {
        FieldValue::List(Vec::new())
    } else {
        FieldValue::Scalar(String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(lines: &[&str]) -> (Vec<ValueDescriptor>, Arc<[String]>) {
        let values: Vec<ValueDescriptor> = lines
            .iter()
            .enumerate()
            .map(|(i, line)| ValueDescriptor::parse(line, i + 1).unwrap())
            .collect();
        let header = values.iter().map(|v| v.name.clone()).collect();
        (values, header)
    }

    #[test]
    fn test_required_suppresses_and_clears() {
        let (values, header) = values(&[r"Value Required ID (\d+)", r"Value NAME (\w+)"]);
        let mut assembler = RecordAssembler::new(&values, header);
        assembler.assign(1, "orphan");
        assert!(!assembler.record());
        assembler.assign(0, "7");
        assert!(assembler.record());
        let records = assembler.into_records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("NAME"), Some(&FieldValue::from("")));
    }

    #[test]
    fn test_filldown_survives_clear_but_not_clear_all() {
        let (values, header) = values(&[r"Value Filldown SITE (\S+)", r"Value HOST (\S+)"]);
        let mut assembler = RecordAssembler::new(&values, header);
        assembler.assign(0, "nyc");
        assembler.assign(1, "a");
        assembler.clear();
        assembler.assign(1, "b");
        assert!(assembler.record());
        assembler.clear_all();
        assembler.assign(1, "c");
        assert!(assembler.record());

        let records = assembler.into_records();
        assert_eq!(records[0].get("SITE"), Some(&FieldValue::from("nyc")));
        assert_eq!(records[1].get("SITE"), Some(&FieldValue::from("")));
    }

    #[test]
    fn test_all_empty_record_is_not_emitted() {
        let (values, header) = values(&[r"Value List ITEMS (\S+)", r"Value NAME (\S+)"]);
        let mut assembler = RecordAssembler::new(&values, header);
        assert!(!assembler.record());
        assert_eq!(assembler.records_len(), 0);
    }

    #[test]
    fn test_fill_up_stops_at_first_non_empty() {
        let (values, header) = values(&[r"Value Fillup DEV (\S+)", r"Value PORT (\S+)"]);
        let mut assembler = RecordAssembler::new(&values, header);
        assembler.assign(0, "a");
        assembler.assign(1, "1");
        assembler.record();
        assembler.assign(1, "2");
        assembler.record();
        assembler.assign(1, "3");
        assembler.record();
        assembler.assign(0, "b");

        let records = assembler.into_records();
        let devs: Vec<&str> = records
            .iter()
            .map(|r| r.get("DEV").and_then(FieldValue::as_str).unwrap())
            .collect();
        assert_eq!(devs, vec!["a", "b", "b"]);
    }
}
