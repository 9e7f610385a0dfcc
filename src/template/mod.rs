//! 模板模块：负责模板文件的定位、加载与缓存
pub mod cache;
pub mod loader;

// 导出核心接口
pub use self::cache::TemplateCache;
pub use self::loader::TemplateLoader;
