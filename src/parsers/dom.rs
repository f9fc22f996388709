//! 基础 DOM 操作
//!
//! 对 `markup5ever_rcdom` 节点的读取、构造与替换封装。
//! 解析只在转换边界发生一次，核心树逻辑之后不再接触原始标记。

use std::cell::RefCell;
use std::rc::Rc;

use encoding_rs::Encoding;
use html5ever::interface::{Attribute, QualName};
use html5ever::parse_document;
use html5ever::tendril::{format_tendril, TendrilSink};
use html5ever::{namespace_url, ns, LocalName};
use markup5ever_rcdom::{Handle, Node, NodeData, RcDom};

/// 将 HTML 字节转换为 DOM
pub fn html_to_dom(data: &[u8], document_encoding: String) -> RcDom {
    let s: String;

    if let Some(encoding) = Encoding::for_label(document_encoding.as_bytes()) {
        let (string, _, _) = encoding.decode(data);
        s = string.to_string();
    } else {
        s = String::from_utf8_lossy(data).to_string();
    }

    parse_document(RcDom::default(), Default::default())
        .from_utf8()
        .read_from(&mut s.as_bytes())
        .unwrap()
}

/// 获取元素节点的标签名
pub fn get_node_name(node: &Handle) -> Option<&'_ str> {
    match &node.data {
        NodeData::Element { name, .. } => Some(name.local.as_ref()),
        _ => None,
    }
}

/// 获取节点属性值
pub fn get_node_attr(node: &Handle, attr_name: &str) -> Option<String> {
    match &node.data {
        NodeData::Element { attrs, .. } => attrs
            .borrow()
            .iter()
            .find(|attr| &*attr.name.local == attr_name)
            .map(|attr| attr.value.to_string()),
        _ => None,
    }
}

/// 设置节点属性，已存在则覆盖
pub fn set_node_attr(node: &Handle, attr_name: &str, attr_value: &str) {
    if let NodeData::Element { attrs, .. } = &node.data {
        let attrs_mut = &mut attrs.borrow_mut();
        if let Some(attr) = attrs_mut.iter_mut().find(|a| &*a.name.local == attr_name) {
            attr.value.clear();
            attr.value.push_slice(attr_value);
        } else {
            attrs_mut.push(Attribute {
                name: QualName::new(None, ns!(), LocalName::from(attr_name)),
                value: format_tendril!("{}", attr_value),
            });
        }
    }
}

/// 收集直接子节点中的元素
pub fn element_children(node: &Handle) -> Vec<Handle> {
    node.children
        .borrow()
        .iter()
        .filter(|child| matches!(child.data, NodeData::Element { .. }))
        .cloned()
        .collect()
}

/// 收集全部直接子节点（含文本节点）
pub fn child_nodes(node: &Handle) -> Vec<Handle> {
    node.children.borrow().clone()
}

/// 节点是否为指定标签的元素
pub fn is_element_named(node: &Handle, names: &[&str]) -> bool {
    get_node_name(node).is_some_and(|name| names.contains(&name))
}

/// 文本节点的内容，其他节点返回 None
pub fn text_node_content(node: &Handle) -> Option<String> {
    match &node.data {
        NodeData::Text { contents } => Some(contents.borrow().to_string()),
        _ => None,
    }
}

/// 递归拼接节点的全部文本内容
pub fn text_content(node: &Handle) -> String {
    let mut out = String::new();
    collect_text(node, &mut out);
    out
}

fn collect_text(node: &Handle, out: &mut String) {
    if let NodeData::Text { contents } = &node.data {
        out.push_str(&contents.borrow());
    }
    for child in node.children.borrow().iter() {
        collect_text(child, out);
    }
}

/// 获取元素的文本内容（去除空白）
pub fn get_clean_text(node: &Handle) -> String {
    text_content(node).trim().to_string()
}

/// 按 id 属性查找元素
pub fn find_element_by_id(node: &Handle, id: &str) -> Option<Handle> {
    if get_node_attr(node, "id").as_deref() == Some(id) {
        return Some(node.clone());
    }
    for child in node.children.borrow().iter() {
        if let Some(found) = find_element_by_id(child, id) {
            return Some(found);
        }
    }
    None
}

/// 收集携带指定属性的所有后代元素（文档顺序）
pub fn find_elements_with_attr(node: &Handle, attr_name: &str) -> Vec<Handle> {
    let mut found = Vec::new();
    collect_elements_with_attr(node, attr_name, &mut found);
    found
}

fn collect_elements_with_attr(node: &Handle, attr_name: &str, found: &mut Vec<Handle>) {
    if get_node_attr(node, attr_name).is_some() {
        found.push(node.clone());
    }
    for child in node.children.borrow().iter() {
        collect_elements_with_attr(child, attr_name, found);
    }
}

/// 创建脱离文档的元素节点
pub fn new_element(tag: &str, attrs: &[(&str, &str)]) -> Handle {
    Node::new(NodeData::Element {
        name: QualName::new(None, ns!(), LocalName::from(tag)),
        attrs: RefCell::new(
            attrs
                .iter()
                .map(|(name, value)| Attribute {
                    name: QualName::new(None, ns!(), LocalName::from(*name)),
                    value: format_tendril!("{}", value),
                })
                .collect(),
        ),
        template_contents: RefCell::new(None),
        mathml_annotation_xml_integration_point: false,
    })
}

/// 创建文本节点
pub fn new_text(text: &str) -> Handle {
    Node::new(NodeData::Text {
        contents: RefCell::new(format_tendril!("{}", text)),
    })
}

/// 追加子节点并维护父指针
pub fn append_child(parent: &Handle, child: &Handle) {
    child.parent.set(Some(Rc::downgrade(parent)));
    parent.children.borrow_mut().push(child.clone());
}

/// 原地替换节点
///
/// 替换子树必须在替换前构建完整，这里只做一次指针交换，
/// 失败时 DOM 保持原样。
pub fn replace_node(old: &Handle, new: &Handle) -> bool {
    let parent = match old.parent.take() {
        Some(weak) => match weak.upgrade() {
            Some(parent) => {
                // take() 清掉了弱引用，先恢复再继续
                old.parent.set(Some(Rc::downgrade(&parent)));
                parent
            }
            None => return false,
        },
        None => return false,
    };

    let mut children = parent.children.borrow_mut();
    match children.iter().position(|c| Rc::ptr_eq(c, old)) {
        Some(index) => {
            children[index] = new.clone();
            new.parent.set(Some(Rc::downgrade(&parent)));
            old.parent.set(None);
            true
        }
        None => false,
    }
}

/// 清空节点的子节点并挂入新的子节点
pub fn set_children(parent: &Handle, new_children: Vec<Handle>) {
    let mut children = parent.children.borrow_mut();
    for child in children.iter() {
        child.parent.set(None);
    }
    children.clear();
    for child in new_children {
        child.parent.set(Some(Rc::downgrade(parent)));
        children.push(child);
    }
}
