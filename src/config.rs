//! 全局配置管理，存储所有可配置项

use std::path::PathBuf;

/// 全局配置
#[derive(Debug, Clone)]
pub struct GlobalConfig {
    // 模板目录
    pub templates_dir: PathBuf,
    // 样例（raw/yml）根目录
    pub tests_dir: PathBuf,
    // 模板文件扩展名
    pub template_extension: String,
    // 输出字典时列名是否转小写
    pub lowercase_keys: bool,
    // 是否启用详细日志
    pub verbose: bool,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            templates_dir: PathBuf::from("ntc_templates/templates"),
            tests_dir: PathBuf::from("tests"),
            template_extension: "textfsm".to_string(),
            lowercase_keys: true,
            verbose: false,
        }
    }
}

/// 配置管理器
pub struct ConfigManager;

impl ConfigManager {
    /// 获取默认配置
    pub fn get_default() -> GlobalConfig {
        GlobalConfig::default()
    }

    /// 自定义配置
    pub fn custom() -> CustomConfigBuilder {
        CustomConfigBuilder::new()
    }
}

/// 配置构建器
#[derive(Debug, Clone, Default)]
pub struct CustomConfigBuilder {
    config: GlobalConfig,
}

impl CustomConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn templates_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.templates_dir = dir.into();
        self
    }

    pub fn tests_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.tests_dir = dir.into();
        self
    }

    pub fn template_extension(mut self, extension: impl Into<String>) -> Self {
        self.config.template_extension = extension.into();
        self
    }

    pub fn lowercase_keys(mut self, lowercase: bool) -> Self {
        self.config.lowercase_keys = lowercase;
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.config.verbose = verbose;
        self
    }

    pub fn build(self) -> GlobalConfig {
        self.config
    }
}
