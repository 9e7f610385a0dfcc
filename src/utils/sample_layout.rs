//! 样例文件布局
//! raw 样例：`<tests>/<平台>/<命令_>/<平台>_<命令_>[序号].raw`，序号从2开始才出现在文件名中
//! 期望输出：同目录同名 `.yml`

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use crate::config::GlobalConfig;
use crate::error::{RstResult, RstextfsmError};
use crate::template::TemplateLoader;

pub const RAW_EXTENSION: &str = "raw";
pub const EXPECTED_EXTENSION: &str = "yml";

/// 样例文件布局
#[derive(Debug, Clone)]
pub struct SampleLayout<'a> {
    config: &'a GlobalConfig,
}

impl<'a> SampleLayout<'a> {
    pub fn new(config: &'a GlobalConfig) -> Self {
        Self { config }
    }

    /// 某个平台+命令的样例目录
    pub fn sample_dir(&self, platform: &str, command: &str) -> RstResult<PathBuf> {
        Self::check_platform(platform)?;
        let command_dir = command.split_whitespace().collect::<Vec<_>>().join("_");
        Ok(self.config.tests_dir.join(platform.trim()).join(command_dir))
    }

    /// 第 `index` 个 raw 样例路径（index 从1开始）
    pub fn raw_file(&self, platform: &str, command: &str, index: usize) -> RstResult<PathBuf> {
        if index == 0 {
            return Err(RstextfsmError::InvalidInput("样例序号从1开始".to_string()));
        }
        let base = TemplateLoader::base_name(platform, command)?;
        let file_name = if index > 1 {
            format!("{}{}.{}", base, index, RAW_EXTENSION)
        } else {
            format!("{}.{}", base, RAW_EXTENSION)
        };
        Ok(self.sample_dir(platform, command)?.join(file_name))
    }

    /// raw 样例对应的期望输出路径
    pub fn expected_file(raw_file: &Path) -> PathBuf {
        raw_file.with_extension(EXPECTED_EXTENSION)
    }

    pub fn template_file(&self, platform: &str, command: &str) -> RstResult<PathBuf> {
        TemplateLoader::template_path(self.config, platform, command)
    }

    /// 按序号列出已存在的 raw 样例
    pub fn raw_files(&self, platform: &str, command: &str) -> RstResult<Vec<PathBuf>> {
        let dir = self.sample_dir(platform, command)?;
        if !dir.is_dir() {
            return Ok(Vec::new());
        }
        let count = fs::read_dir(&dir)?
            .filter_map(Result::ok)
            .filter(|entry| entry.path().extension().map_or(false, |ext| ext == RAW_EXTENSION))
            .count();

        (1..=count)
            .map(|index| self.raw_file(platform, command, index))
            .filter(|path| path.as_ref().map_or(true, |p| p.is_file()))
            .collect()
    }

    /// 创建缺失的空 raw 样例与空模板文件
    /// 返回 (raw 路径, 模板路径)
    pub fn scaffold(
        &self,
        platform: &str,
        command: &str,
        index: usize,
    ) -> RstResult<(PathBuf, PathBuf)> {
        let raw_file = self.raw_file(platform, command, index)?;
        let template_file = self.template_file(platform, command)?;

        for path in [&raw_file, &template_file] {
            if path.exists() {
                continue;
            }
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, "")?;
            debug!("已创建空文件 {}", path.display());
        }
        Ok((raw_file, template_file))
    }

    fn check_platform(platform: &str) -> RstResult<()> {
        if platform.trim().is_empty() {
            return Err(RstextfsmError::InvalidInput("平台不能为空".to_string()));
        }
        Ok(())
    }
}
