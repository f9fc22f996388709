//! # 工具模块
//!
//! 这个模块包含各种工具函数和实用程序：
//!
//! - URL 解析与规范化
//! - 当前位置与候选链接的路径匹配
//!
//! # 模块组织
//!
//! - `url` - URL 处理、路径精确/前缀匹配等工具函数

pub mod url;

// Re-export commonly used items for convenience
pub use url::{
    clean_url, is_exact_location, is_exact_match, is_prefix_match, parse_locator,
    prefix_target_len, Url,
};
