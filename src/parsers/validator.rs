//! 树结构验证器
//!
//! 在转换前验证 ul/ol 子树是否符合导航树要求的严格文法。
//! 自上而下检查，首个失败即返回，并带上出错列表项的序号。
//! 验证通过后解析器可以假定结构良构，无需回溯。
//!
//! 文法规则：
//! 1. 根必须是非空的 ul/ol；
//! 2. 根的直接子元素必须全部是 li；
//! 3. li 内只允许链接（a，或包裹单个 a 的 p）与嵌套列表，
//!    其他元素使整个子树无效；纯文本 p 仅在同项存在嵌套列表时
//!    作为分组标签；
//! 4. 每个 li 恰好包含链接与嵌套列表二者之一；
//! 5. 含嵌套列表的 li，首个有效子节点必须是非空文本（或纯文本 p）；
//! 6. 嵌套列表按同样规则递归验证。
//!
//! 被拒绝的子树保持原样渲染，只是失去交互行为。

use markup5ever_rcdom::Handle;

use crate::core::NavTreeError;
use crate::parsers::dom::{
    child_nodes, element_children, get_clean_text, get_node_name, is_element_named,
    text_node_content,
};

const LIST_TAGS: &[&str] = &["ul", "ol"];

/// li 直接子元素的分类结果
enum ItemChild {
    Link,
    List(Handle),
    LabelParagraph,
    Other,
}

/// 验证元素是否符合树结构要求
///
/// 通过时返回 `Ok(())`，不通过时返回带原因的
/// [`NavTreeError::InvalidStructure`]。
pub fn validate_tree_structure(element: &Handle) -> Result<(), NavTreeError> {
    // 必须是ul或ol元素
    if !is_element_named(element, LIST_TAGS) {
        let tag = get_node_name(element).unwrap_or("非元素节点").to_string();
        return Err(NavTreeError::InvalidStructure(format!(
            "元素必须是ul或ol，当前是{tag}"
        )));
    }

    let children = element_children(element);
    if children.is_empty() {
        return Err(NavTreeError::InvalidStructure(
            "列表元素不能为空".to_string(),
        ));
    }

    for (index, child) in children.iter().enumerate() {
        let position = index + 1;
        if get_node_name(child) != Some("li") {
            let tag = get_node_name(child).unwrap_or("非元素节点").to_string();
            return Err(NavTreeError::InvalidStructure(format!(
                "第{position}个子元素必须是li，当前是{tag}"
            )));
        }
        validate_li_structure(child, position)?;
    }

    Ok(())
}

/// 兼容性方法：检查元素是否符合树结构要求
pub fn is_valid_tree_structure(element: &Handle) -> bool {
    validate_tree_structure(element).is_ok()
}

fn validate_li_structure(li: &Handle, position: usize) -> Result<(), NavTreeError> {
    let nodes = child_nodes(li);
    if nodes.is_empty() {
        return Err(NavTreeError::InvalidStructure(format!(
            "第{position}个li元素不能为空"
        )));
    }

    let elements = element_children(li);
    let has_list = elements.iter().any(|el| is_element_named(el, LIST_TAGS));

    let mut link_count = 0;
    let mut list_count = 0;
    let mut sub_list: Option<Handle> = None;

    for element in &elements {
        match classify_item_child(element, has_list) {
            ItemChild::Link => link_count += 1,
            ItemChild::List(handle) => {
                list_count += 1;
                sub_list = Some(handle);
            }
            ItemChild::LabelParagraph => {}
            ItemChild::Other => {
                return Err(NavTreeError::InvalidStructure(format!(
                    "第{position}个li元素包含不允许的元素，只能包含a、ul或ol"
                )));
            }
        }
    }

    if link_count + list_count == 0 {
        return Err(NavTreeError::InvalidStructure(format!(
            "第{position}个li元素必须包含a、ul或ol中的至少一个"
        )));
    }
    if link_count + list_count > 1 {
        return Err(NavTreeError::InvalidStructure(format!(
            "第{position}个li元素只能包含一个a、ul或ol元素"
        )));
    }

    if let Some(sub_list) = sub_list {
        validate_branch_label(&nodes, position)?;
        validate_tree_structure(&sub_list).map_err(|err| {
            NavTreeError::InvalidStructure(format!(
                "第{position}个li元素的子列表验证失败: {err}"
            ))
        })?;
    }

    Ok(())
}

/// 分类 li 的直接子元素
///
/// p 有两种豁免：包裹单个 a 时视作链接本身；只含文本且同项
/// 存在嵌套列表时视作分支标签。
fn classify_item_child(element: &Handle, item_has_list: bool) -> ItemChild {
    if is_element_named(element, &["a"]) {
        return ItemChild::Link;
    }
    if is_element_named(element, LIST_TAGS) {
        return ItemChild::List(element.clone());
    }
    if is_element_named(element, &["p"]) {
        let inner = element_children(element);
        if inner.len() == 1 && is_element_named(&inner[0], &["a"]) {
            return ItemChild::Link;
        }
        if inner.is_empty() && item_has_list && !get_clean_text(element).is_empty() {
            return ItemChild::LabelParagraph;
        }
    }
    ItemChild::Other
}

/// 规则5：含嵌套列表的 li，首个有效子节点必须携带非空标签文本
fn validate_branch_label(nodes: &[Handle], position: usize) -> Result<(), NavTreeError> {
    for node in nodes {
        if let Some(text) = text_node_content(node) {
            if text.trim().is_empty() {
                // 标记缩进产生的纯空白文本节点，跳过
                continue;
            }
            return Ok(());
        }
        // 纯文本 p 作为标签同样可接受
        if is_element_named(node, &["p"])
            && element_children(node).is_empty()
            && !get_clean_text(node).is_empty()
        {
            return Ok(());
        }
        return Err(NavTreeError::InvalidStructure(format!(
            "第{position}个li元素包含ul/ol时，第一个子节点必须是文本节点"
        )));
    }
    Err(NavTreeError::InvalidStructure(format!(
        "第{position}个li元素包含ul/ol时，第一个文本节点不能为空"
    )))
}
