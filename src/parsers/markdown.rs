//! Markdown HTML 树解析器
//!
//! markdown 渲染出来的摘要文档结构比严格文法松散：链接可能被
//! 段落包裹，带链接的项下面还可以直接挂子列表。这里按可配置的
//! 提取规则宽松解析，不经过严格验证器。

use markup5ever_rcdom::Handle;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::core::NavTreeError;
use crate::parsers::dom::{
    child_nodes, element_children, get_clean_text, get_node_attr, get_node_name,
    is_element_named, text_node_content,
};
use crate::state::{NavItem, NodeId};

/// Markdown HTML 树解析规则
///
/// 定义如何从 markdown 转换的 HTML 中提取导航树结构。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkdownParseRule {
    /// 支持的根元素标签
    pub root_tags: Vec<String>,
    /// 列表项标签
    pub item_tag: String,
    /// 链接标签
    pub link_tag: String,
    /// 段落标签（可能包含链接或文本）
    pub paragraph_tag: String,
    /// 子列表标签
    pub list_tags: Vec<String>,
}

impl Default for MarkdownParseRule {
    fn default() -> Self {
        Self {
            root_tags: vec!["ul".to_string(), "ol".to_string()],
            item_tag: "li".to_string(),
            link_tag: "a".to_string(),
            paragraph_tag: "p".to_string(),
            list_tags: vec!["ul".to_string(), "ol".to_string()],
        }
    }
}

impl MarkdownParseRule {
    fn is_root(&self, node: &Handle) -> bool {
        matches_any(node, &self.root_tags)
    }

    fn is_list(&self, node: &Handle) -> bool {
        matches_any(node, &self.list_tags)
    }
}

fn matches_any(node: &Handle, tags: &[String]) -> bool {
    get_node_name(node).is_some_and(|name| tags.iter().any(|tag| tag == name))
}

/// Markdown HTML 树解析器
pub struct MarkdownTreeParser {
    rule: MarkdownParseRule,
}

impl Default for MarkdownTreeParser {
    fn default() -> Self {
        Self::new(MarkdownParseRule::default())
    }
}

impl MarkdownTreeParser {
    pub fn new(rule: MarkdownParseRule) -> Self {
        Self { rule }
    }

    /// 解析 ul/ol 元素为 NavItem 树
    pub fn parse(&self, element: &Handle, base: Option<&Url>) -> Result<Vec<NavItem>, NavTreeError> {
        if !self.rule.is_root(element) {
            return Err(NavTreeError::InvalidStructure(format!(
                "元素必须是{}",
                self.rule.root_tags.join("或")
            )));
        }
        Ok(self.parse_items(element, base))
    }

    fn parse_items(&self, element: &Handle, base: Option<&Url>) -> Vec<NavItem> {
        element_children(element)
            .iter()
            .filter(|el| matches_any(el, std::slice::from_ref(&self.rule.item_tag)))
            .filter_map(|li| self.parse_list_item(li, base))
            .collect()
    }

    fn parse_list_item(&self, li: &Handle, base: Option<&Url>) -> Option<NavItem> {
        let link = self.extract_link(li);
        let title = self.extract_title(li, link.as_ref())?;

        let url = link.as_ref().and_then(|l| get_node_attr(l, "href")).map(|href| {
            match base {
                Some(base) => base
                    .join(&href)
                    .map(|u| u.to_string())
                    .unwrap_or_else(|_| href.clone()),
                None => href,
            }
        });
        let new_window = link
            .as_ref()
            .and_then(|l| get_node_attr(l, "target"))
            .as_deref()
            == Some("_blank");

        let children = self
            .extract_sub_list(li)
            .map(|sub| self.parse_items(&sub, base))
            .filter(|items| !items.is_empty());

        if url.is_none() && children.is_none() {
            return None;
        }

        Some(NavItem {
            node_id: NodeId::next(),
            title,
            url,
            new_window,
            children,
        })
    }

    /// 提取标题文本，优先级：链接文本 > 段落文本 > 第一个文本节点
    fn extract_title(&self, li: &Handle, link: Option<&Handle>) -> Option<String> {
        if let Some(link) = link {
            let title = get_clean_text(link);
            if !title.is_empty() {
                return Some(title);
            }
        }

        let paragraph = element_children(li)
            .into_iter()
            .find(|el| matches_any(el, std::slice::from_ref(&self.rule.paragraph_tag)));
        if let Some(paragraph) = paragraph {
            let title = get_clean_text(&paragraph);
            if !title.is_empty() {
                return Some(title);
            }
        }

        for node in child_nodes(li) {
            if let Some(text) = text_node_content(&node) {
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    return Some(trimmed.to_string());
                }
            }
        }
        None
    }

    /// 提取链接：直接的 a 标签，或段落内的第一个 a 标签
    fn extract_link(&self, li: &Handle) -> Option<Handle> {
        let link_tag = std::slice::from_ref(&self.rule.link_tag);
        for element in element_children(li) {
            if matches_any(&element, link_tag) {
                return Some(element);
            }
            if matches_any(&element, std::slice::from_ref(&self.rule.paragraph_tag)) {
                if let Some(inner) = element_children(&element)
                    .into_iter()
                    .find(|el| matches_any(el, link_tag))
                {
                    return Some(inner);
                }
            }
        }
        None
    }

    fn extract_sub_list(&self, li: &Handle) -> Option<Handle> {
        element_children(li).into_iter().find(|el| self.rule.is_list(el))
    }

    /// 快速验证：只做最基本的形状检查，不做深度验证
    pub fn quick_validate(element: &Handle) -> bool {
        let rule = MarkdownParseRule::default();
        if !rule.is_root(element) {
            return false;
        }
        let children = element_children(element);
        !children.is_empty()
            && children
                .iter()
                .all(|el| is_element_named(el, &["li"]))
    }
}
