//! DOM 树解析器
//!
//! 将已通过验证的 ul/ol 子树解析为 [`NavItem`] 序列。
//! 解析不再做结构校验，假定验证器已经运行过；
//! 即便如此，标题为空的项仍会被静默丢弃。

use markup5ever_rcdom::Handle;
use url::Url;

use crate::parsers::dom::{
    child_nodes, element_children, get_clean_text, get_node_attr, is_element_named,
    text_node_content,
};
use crate::state::NavItem;

const LIST_TAGS: &[&str] = &["ul", "ol"];

/// 解析 ul/ol 元素为 NavItem 树
///
/// 传入 `base` 时链接解析为绝对地址，否则保留原始 href；
/// 匹配阶段无论哪种形式都会在当前位置上重新解析。
pub fn parse_nav_items(element: &Handle, base: Option<&Url>) -> Vec<NavItem> {
    element_children(element)
        .iter()
        .filter(|child| is_element_named(child, &["li"]))
        .filter_map(|li| parse_list_item(li, base))
        .collect()
}

fn parse_list_item(li: &Handle, base: Option<&Url>) -> Option<NavItem> {
    if let Some(link) = find_link(li) {
        // 叶子节点：标题与目标取自链接
        let title = get_clean_text(&link);
        if title.is_empty() {
            return None;
        }
        let href = get_node_attr(&link, "href").unwrap_or_default();
        let url = resolve_href(&href, base);
        let new_window = get_node_attr(&link, "target").as_deref() == Some("_blank");
        return Some(NavItem::leaf(title, url, new_window));
    }

    let sub_list = element_children(li)
        .into_iter()
        .find(|el| is_element_named(el, LIST_TAGS))?;

    // 分支节点：标题来自前导文本
    let title = branch_label(li)?;
    let children = parse_nav_items(&sub_list, base);
    if children.is_empty() {
        // 递归结果为空的分支没有存在意义，整项丢弃
        return None;
    }
    Some(NavItem::branch(title, children))
}

/// 查找 li 的链接：直接的 a，或包裹单个 a 的 p
fn find_link(li: &Handle) -> Option<Handle> {
    for element in element_children(li) {
        if is_element_named(&element, &["a"]) {
            return Some(element);
        }
        if is_element_named(&element, &["p"]) {
            let inner = element_children(&element);
            if inner.len() == 1 && is_element_named(&inner[0], &["a"]) {
                return Some(inner[0].clone());
            }
        }
    }
    None
}

/// 分支标签：首个非空文本节点或纯文本 p
fn branch_label(li: &Handle) -> Option<String> {
    for node in child_nodes(li) {
        if let Some(text) = text_node_content(&node) {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                continue;
            }
            return Some(trimmed.to_string());
        }
        if is_element_named(&node, &["p"]) && element_children(&node).is_empty() {
            let label = get_clean_text(&node);
            if !label.is_empty() {
                return Some(label);
            }
        }
        break;
    }
    None
}

fn resolve_href(href: &str, base: Option<&Url>) -> String {
    match base {
        Some(base) => base
            .join(href)
            .map(|url| url.to_string())
            .unwrap_or_else(|_| href.to_string()),
        None => href.to_string(),
    }
}
