//! 核心类型与页面处理入口
//!
//! 定义导航树处理的统一错误类型、配置选项，以及
//! 字节流进字节流出的 `process_page` 入口。

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::manager::{NavTreeManager, ScanReport};
use crate::parsers::html_to_dom;
use crate::parsers::serializer::serialize_document;

/// 导航树错误类型
#[derive(Error, Debug, Clone)]
pub enum NavTreeError {
    /// 列表结构不符合导航树文法
    #[error("结构无效: {0}")]
    InvalidStructure(String),

    /// 验证通过但解析结果为空
    #[error("导航树为空")]
    EmptyTree,

    /// 页面中找不到指定容器
    #[error("找不到容器元素: {0}")]
    ContainerNotFound(String),

    /// 当前位置无法解析为 URL
    #[error("无效的位置: {0}")]
    InvalidLocation(String),

    /// 配置错误
    #[error("配置错误: {0}")]
    ConfigError(String),
}

/// 导航树处理配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavTreeOptions {
    /// 侧栏导航容器的元素 id
    pub container_id: String,
    /// 面包屑容器的元素 id
    pub breadcrumb_id: String,
    /// 解析相对链接时使用的基准 URL
    pub base_url: Option<String>,
    /// 导航后自动展开当前路径
    pub auto_expand_current_path: bool,
    /// URL 匹配失败时回退到面包屑文本路径
    pub enable_breadcrumb_fallback: bool,
    /// 使用宽松的 markdown 解析器代替严格验证
    pub markdown: bool,
}

impl Default for NavTreeOptions {
    fn default() -> Self {
        Self {
            container_id: "sidebar-nav-tree".to_string(),
            breadcrumb_id: "breadcrumb".to_string(),
            base_url: None,
            auto_expand_current_path: true,
            enable_breadcrumb_fallback: true,
            markdown: false,
        }
    }
}

/// 处理一个完整的 HTML 页面
///
/// 解析页面、扫描并转换容器内的导航列表，按 `location`
/// 同步激活状态，再序列化回字节流。返回序列化结果和扫描报告。
pub fn process_page(
    data: &[u8],
    document_encoding: String,
    location: Option<&str>,
    options: &NavTreeOptions,
) -> Result<(Vec<u8>, ScanReport), NavTreeError> {
    let dom = html_to_dom(data, document_encoding.clone());

    let mut manager = NavTreeManager::new(&dom, options.clone())?;
    let report = match location {
        Some(location) => manager.on_navigated(location)?,
        None => manager.scan()?,
    };

    Ok((serialize_document(dom, document_encoding), report))
}
