//! 导航树视图构建
//!
//! 把 `NavTreeState` 渲染成静态 HTML 结构。整棵树离屏构建完成后
//! 才由调用方一次性换入页面，页面上不会出现半成品状态。
//!
//! 生成的结构：
//!
//! ```text
//! div.nav-tree-container
//!   nav.nav-tree
//!     ul
//!       li.tree-node-leaf|tree-node-branch[.active]
//!         div.node-content[.with-toggle][.expanded]
//!           a[href]|span[.active-link]
//!         ul[.hidden]   (仅分支节点)
//! ```

use markup5ever_rcdom::Handle;

use crate::parsers::dom::{append_child, new_element, new_text, set_node_attr};
use crate::state::{NavItem, NavTreeState};

/// 渲染整棵导航树，返回容器元素
pub fn render_tree(state: &NavTreeState) -> Handle {
    let container = new_element("div", &[("class", "nav-tree-container")]);
    let nav = new_element("nav", &[("class", "nav-tree")]);
    append_child(&nav, &render_level(state, state.get_root_nodes(), 0));
    append_child(&container, &nav);
    container
}

/// 渲染一层节点为 ul 元素
fn render_level(state: &NavTreeState, items: &[NavItem], depth: usize) -> Handle {
    let ul = new_element("ul", &[]);
    // 同层只要有一个分支节点，整层都保留切换按钮的缩进位
    let level_has_toggle = items.iter().any(|item| item.has_children());
    for item in items {
        append_child(&ul, &render_node(state, item, depth, level_has_toggle));
    }
    ul
}

fn render_node(state: &NavTreeState, item: &NavItem, depth: usize, has_toggle: bool) -> Handle {
    let is_branch = item.has_children();
    let is_active = state.is_active(item.node_id);
    let is_expanded = is_branch && state.is_expanded(item.node_id);

    let mut li_classes = vec![if is_branch {
        "tree-node-branch"
    } else {
        "tree-node-leaf"
    }];
    if is_active {
        li_classes.push("active");
    }

    let depth_attr = depth.to_string();
    let node_id_attr = item.node_id.to_string();
    let style_attr = format!("--depth: {depth}");
    let li = new_element(
        "li",
        &[
            ("class", &li_classes.join(" ")),
            ("data-depth", &depth_attr),
            ("data-node-id", &node_id_attr),
            ("style", &style_attr),
        ],
    );

    let mut content_classes = vec!["node-content"];
    if has_toggle {
        content_classes.push("with-toggle");
    }
    if is_expanded {
        content_classes.push("expanded");
    }
    let content = new_element("div", &[("class", &content_classes.join(" "))]);
    append_child(&content, &render_label(item, is_active));
    append_child(&li, &content);

    if let Some(children) = &item.children {
        let child_list = render_level(state, children, depth + 1);
        if !is_expanded {
            set_node_attr(&child_list, "class", "hidden");
        }
        append_child(&li, &child_list);
    }

    li
}

/// 渲染节点的标签：有链接用 a，没有用 span
fn render_label(item: &NavItem, is_active: bool) -> Handle {
    let label = match &item.url {
        Some(url) => {
            let mut attrs: Vec<(&str, &str)> = vec![("href", url.as_str())];
            if item.new_window {
                attrs.push(("target", "_blank"));
            }
            if is_active {
                attrs.push(("class", "active-link"));
            }
            new_element("a", &attrs)
        }
        None => {
            if is_active {
                new_element("span", &[("class", "active-link")])
            } else {
                new_element("span", &[])
            }
        }
    };
    append_child(&label, &new_text(&item.title));
    label
}
