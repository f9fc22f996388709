//! 解析器模块集合
//!
//! 包含 DOM 操作工具、导航列表验证器、严格树解析器、
//! markdown 宽松解析器以及文档序列化。

pub mod dom;
pub mod markdown;
pub mod nav;
pub mod serializer;
pub mod validator;

// Re-export commonly used items for convenience
pub use dom::{find_element_by_id, get_node_attr, get_node_name, html_to_dom, set_node_attr};
pub use markdown::{MarkdownParseRule, MarkdownTreeParser};
pub use nav::parse_nav_items;
pub use serializer::{serialize_document, serialize_node};
pub use validator::{is_valid_tree_structure, validate_tree_structure};
