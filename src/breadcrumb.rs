//! 面包屑文本路径提取
//!
//! URL 匹配不到导航节点时，从页面的面包屑元素里取出文本路径，
//! 再按文本逐级定位树节点。

use markup5ever_rcdom::Handle;

use crate::parsers::dom::{find_element_by_id, find_elements_with_attr, get_clean_text};

/// 从面包屑容器提取文本路径
///
/// 只收集带 `data-nav-title` 标记的元素，按文档顺序排列，
/// 空白文本被丢弃。容器不存在时返回空路径。
pub fn breadcrumb_path(document: &Handle, breadcrumb_id: &str) -> Vec<String> {
    let Some(container) = find_element_by_id(document, breadcrumb_id) else {
        return Vec::new();
    };

    find_elements_with_attr(&container, "data-nav-title")
        .iter()
        .map(get_clean_text)
        .filter(|text| !text.is_empty())
        .collect()
}
