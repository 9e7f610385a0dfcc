//! 模板加载器
//! 按 `<平台>_<命令>.textfsm` 的约定定位模板文件并编译

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use log::debug;
use rstextfsm_engine::Template;

use crate::config::GlobalConfig;
use crate::error::{RstResult, RstextfsmError};

/// 模板加载器
pub struct TemplateLoader;

impl TemplateLoader {
    /// 平台+命令 -> 模板基础名，如 `cisco_ios_show_version`
    pub fn base_name(platform: &str, command: &str) -> RstResult<String> {
        let platform = platform.trim();
        let command = command.split_whitespace().collect::<Vec<_>>().join("_");
        if platform.is_empty() || command.is_empty() {
            return Err(RstextfsmError::InvalidInput(format!(
                "平台与命令均不能为空：platform={:?} command={:?}",
                platform, command
            )));
        }
        Ok(format!("{}_{}", platform, command))
    }

    /// 模板文件路径
    pub fn template_path(
        config: &GlobalConfig,
        platform: &str,
        command: &str,
    ) -> RstResult<PathBuf> {
        let file_name = format!(
            "{}.{}",
            Self::base_name(platform, command)?,
            config.template_extension
        );
        Ok(config.templates_dir.join(file_name))
    }

    /// 按平台+命令加载模板
    pub fn load(config: &GlobalConfig, platform: &str, command: &str) -> RstResult<Template> {
        let path = Self::template_path(config, platform, command)?;
        Self::load_file(&path)
    }

    /// 读取并编译模板文件
    pub fn load_file(path: &Path) -> RstResult<Template> {
        let start = Instant::now();
        let text = fs::read_to_string(path).map_err(|e| {
            let reason = format!("读取模板 {} 失败：{}", path.display(), e);
            RstextfsmError::TemplateLoadError(reason)
        })?;
        let template = Self::load_str(&text).map_err(|source| RstextfsmError::TemplateCompileError {
            path: path.display().to_string(),
            source,
        })?;
        debug!(
            "模板 {} 加载完成，耗时{:?}，列：{:?}",
            path.display(),
            start.elapsed(),
            template.header()
        );
        Ok(template)
    }

    /// 编译模板文本
    pub fn load_str(text: &str) -> Result<Template, rstextfsm_engine::CompileError> {
        Template::compile(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigManager;

    const TEMPLATE: &str = "Value Required ID (\\d+)\n\nStart\n  ^ID: ${ID} -> Record\n";

    #[test]
    fn test_base_name_and_path() {
        assert_eq!(
            TemplateLoader::base_name("cisco_ios", "show  ip interface brief").unwrap(),
            "cisco_ios_show_ip_interface_brief"
        );
        let config = ConfigManager::custom().templates_dir("tpl").build();
        assert_eq!(
            TemplateLoader::template_path(&config, "huawei_vrp", "display version").unwrap(),
            PathBuf::from("tpl/huawei_vrp_display_version.textfsm")
        );
        assert!(TemplateLoader::base_name("", "show version").is_err());
    }

    #[test]
    fn test_load_by_platform_and_command() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("acme_show_ids.textfsm"), TEMPLATE).unwrap();
        let config = ConfigManager::custom().templates_dir(dir.path()).build();

        let template = TemplateLoader::load(&config, "acme", "show ids").unwrap();
        assert_eq!(template.header(), &["ID"]);
    }

    #[test]
    fn test_load_errors_carry_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = TemplateLoader::load_file(&dir.path().join("missing.textfsm")).unwrap_err();
        assert!(matches!(missing, RstextfsmError::TemplateLoadError(_)));

        let broken = dir.path().join("broken.textfsm");
        fs::write(&broken, "Value ID (\\d+)\n\nStart\n  ^${NOPE}\n").unwrap();
        match TemplateLoader::load_file(&broken).unwrap_err() {
            RstextfsmError::TemplateCompileError { path, source } => {
                assert!(path.ends_with("broken.textfsm"));
                assert_eq!(source.issues.len(), 1);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
