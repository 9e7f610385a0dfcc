//! 解析器核心：按平台+命令定位模板，执行内核并输出结构化结果
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use log::{info, log, Level};
use rstextfsm_engine::{Record, RunOutput, Template};
use serde_json::{Map, Value};

use crate::config::GlobalConfig;
use crate::error::{RstResult, RstextfsmError};
use crate::template::{TemplateCache, TemplateLoader};
use crate::utils::sample_layout::EXPECTED_EXTENSION;
use crate::utils::{RecordConverter, SampleLayout};

/// 文本解析器
#[derive(Debug)]
pub struct TextParser {
    config: GlobalConfig,
    cache: TemplateCache,
}

impl TextParser {
    pub fn new(config: GlobalConfig) -> Self {
        Self {
            config,
            cache: TemplateCache::new(),
        }
    }

    pub fn config(&self) -> &GlobalConfig {
        &self.config
    }

    pub fn cache(&self) -> &TemplateCache {
        &self.cache
    }

    /// 单次解析摘要的日志级别：verbose 时提升到 info
    fn summary_level(&self) -> Level {
        if self.config.verbose {
            Level::Info
        } else {
            Level::Debug
        }
    }

    /// 获取（缓存的）平台+命令模板
    pub fn template(&self, platform: &str, command: &str) -> RstResult<Arc<Template>> {
        let path = TemplateLoader::template_path(&self.config, platform, command)?;
        self.cache.get_or_load(&path)
    }

    /// 执行模板，返回内核原始结果（含部分结果与运行期错误）
    pub fn run(&self, platform: &str, command: &str, raw: &str) -> RstResult<RunOutput> {
        let template = self.template(platform, command)?;
        let start = Instant::now();
        let output = template.run(raw);
        log!(
            self.summary_level(),
            "{} / {} 解析完成，耗时{:?}，输出{}条记录",
            platform,
            command,
            start.elapsed(),
            output.records.len()
        );
        Ok(output)
    }

    /// 解析为记录，运行期错误直接返回
    pub fn parse_records(
        &self,
        platform: &str,
        command: &str,
        raw: &str,
    ) -> RstResult<Vec<Record>> {
        Ok(self.run(platform, command, raw)?.into_result()?)
    }

    /// 解析为字典列表（列名大小写由配置决定）
    pub fn parse(
        &self,
        platform: &str,
        command: &str,
        raw: &str,
    ) -> RstResult<Vec<Map<String, Value>>> {
        let records = self.parse_records(platform, command, raw)?;
        Ok(RecordConverter::to_dicts(&records, self.config.lowercase_keys))
    }

    /// 使用指定模板文件解析
    pub fn parse_with_template_file(
        &self,
        template_file: &Path,
        raw: &str,
    ) -> RstResult<Vec<Map<String, Value>>> {
        let template = self.cache.get_or_load(template_file)?;
        let records = template.run(raw).into_result()?;
        Ok(RecordConverter::to_dicts(&records, self.config.lowercase_keys))
    }

    /// 重新生成某个平台+命令的全部期望输出样例
    /// 先删除旧的 `.yml`，再逐个解析 raw 样例写入新的 `.yml`
    pub fn regenerate_samples(&self, platform: &str, command: &str) -> RstResult<Vec<PathBuf>> {
        let layout = SampleLayout::new(&self.config);
        let dir = layout.sample_dir(platform, command)?;
        if !dir.is_dir() {
            return Err(RstextfsmError::InvalidInput(format!(
                "样例目录不存在：{}",
                dir.display()
            )));
        }

        for entry in fs::read_dir(&dir)?.filter_map(Result::ok) {
            let path = entry.path();
            if path.extension().map_or(false, |ext| ext == EXPECTED_EXTENSION) {
                fs::remove_file(&path)?;
            }
        }

        let mut written = Vec::new();
        for raw_file in layout.raw_files(platform, command)? {
            let raw = fs::read_to_string(&raw_file)?;
            let records = self.parse_records(platform, command, &raw)?;
            let expected = SampleLayout::expected_file(&raw_file);
            fs::write(
                &expected,
                RecordConverter::to_parsed_sample_yaml(&records, self.config.lowercase_keys)?,
            )?;
            info!("generate yml file: {}", expected.display());
            written.push(expected);
        }
        Ok(written)
    }
}
