//! # NavTree Library
//!
//! 静态博客侧栏导航树处理库。把页面里符合文法的 ul/ol 列表
//! 转换为可展开折叠的导航树视图，并按当前位置同步高亮和展开路径。
//!
//! ## 模块组织
//!
//! - `core` - 错误类型、配置和页面处理入口
//! - `parsers` - DOM 工具、列表验证器与树解析器
//! - `state` - 导航树状态（展开、激活、路径查找）
//! - `builders` - 树视图 HTML 构建
//! - `manager` - 扫描、转换与导航同步的管理器
//! - `breadcrumb` - 面包屑文本路径提取
//! - `utils` - URL 解析与匹配工具

pub mod breadcrumb;
pub mod builders;
pub mod core;
pub mod manager;
pub mod parsers;
pub mod state;
pub mod utils;

// Re-export commonly used items for convenience
pub use core::{process_page, NavTreeError, NavTreeOptions};
pub use manager::{NavTreeManager, ScanReport};
pub use state::{NavItem, NavTreeState, NodeId};
