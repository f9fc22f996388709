//! 导航树状态管理
//!
//! `NavTreeState` 持有规范化的节点树以及展开/活动两类节点集合，
//! 是导航树子系统的核心数据结构。树结构在构造后不再变化，
//! 所有交互（展开、折叠、高亮）只改动节点 ID 集合。

use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);

/// 节点唯一标识符
///
/// 进程内唯一，构造时分配，永不复用。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NodeId(u64);

impl NodeId {
    /// 分配一个新的节点 ID
    pub fn next() -> NodeId {
        NodeId(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node_{}", self.0)
    }
}

/// 导航树节点
///
/// 叶子节点带链接，分支节点带子节点；两者兼有也是合法的
/// （markdown 解析器会产生这种节点）。两者皆无的节点非法，
/// 解析阶段直接丢弃。
#[derive(Debug, Clone, Serialize)]
pub struct NavItem {
    pub node_id: NodeId,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub new_window: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<NavItem>>,
}

impl NavItem {
    /// 创建叶子节点
    pub fn leaf(title: impl Into<String>, url: impl Into<String>, new_window: bool) -> NavItem {
        NavItem {
            node_id: NodeId::next(),
            title: title.into(),
            url: Some(url.into()),
            new_window,
            children: None,
        }
    }

    /// 创建分支节点
    pub fn branch(title: impl Into<String>, children: Vec<NavItem>) -> NavItem {
        NavItem {
            node_id: NodeId::next(),
            title: title.into(),
            url: None,
            new_window: false,
            children: Some(children),
        }
    }

    pub fn has_children(&self) -> bool {
        self.children.as_ref().is_some_and(|c| !c.is_empty())
    }

    pub fn child_items(&self) -> &[NavItem] {
        self.children.as_deref().unwrap_or(&[])
    }
}

/// 导航树状态
///
/// 展开状态分两个集合维护：`expanded_ids` 记录用户手动展开的节点，
/// `auto_expanded_ids` 记录路径高亮自动展开的节点。
/// `update_active_state` 只清除自动集合，手动展开得以跨页面切换保留。
pub struct NavTreeState {
    tree: Vec<NavItem>,
    expanded_ids: HashSet<NodeId>,
    auto_expanded_ids: HashSet<NodeId>,
    active_ids: HashSet<NodeId>,
}

impl NavTreeState {
    pub fn new(tree: Vec<NavItem>) -> NavTreeState {
        NavTreeState {
            tree,
            expanded_ids: HashSet::new(),
            auto_expanded_ids: HashSet::new(),
            active_ids: HashSet::new(),
        }
    }

    /// 获取根节点列表
    pub fn get_root_nodes(&self) -> &[NavItem] {
        &self.tree
    }

    /// 根据 ID 获取节点
    pub fn get_node(&self, node_id: NodeId) -> Option<&NavItem> {
        find_node_by_id(&self.tree, node_id)
    }

    /// 获取子节点列表，未知 ID 返回空
    pub fn get_child_nodes(&self, node_id: NodeId) -> &[NavItem] {
        self.get_node(node_id).map_or(&[], NavItem::child_items)
    }

    /// 获取从根到该节点的 ID 路径
    pub fn get_node_path(&self, node_id: NodeId) -> Option<Vec<NodeId>> {
        find_node_path(&self.tree, node_id, &mut Vec::new())
    }

    /// 检查节点是否展开（手动或自动）
    pub fn is_expanded(&self, node_id: NodeId) -> bool {
        self.expanded_ids.contains(&node_id) || self.auto_expanded_ids.contains(&node_id)
    }

    /// 检查节点是否处于活动路径上
    pub fn is_active(&self, node_id: NodeId) -> bool {
        self.active_ids.contains(&node_id)
    }

    /// 切换节点展开状态
    ///
    /// 展开时把根到该节点路径上的所有 ID 原子地放入手动集合，
    /// 保证可见性；折叠时只移除该节点自身。子孙节点的展开位
    /// 保留不动：再次展开时之前展开过的子树仍是展开的，这是
    /// 有意保留的"子树展开记忆"约定。
    pub fn toggle_expanded(&mut self, node_id: NodeId) {
        self.set_expanded(node_id, !self.is_expanded(node_id));
    }

    /// 设置节点展开状态
    pub fn set_expanded(&mut self, node_id: NodeId, expanded: bool) {
        if expanded {
            // 展开时，需要确保所有祖先节点也展开
            if let Some(path) = self.get_node_path(node_id) {
                self.expanded_ids.extend(path);
            }
        } else {
            // 折叠时，只移除当前节点
            self.expanded_ids.remove(&node_id);
            self.auto_expanded_ids.remove(&node_id);
        }
    }

    /// 设置单个节点的活动状态，不做级联
    pub fn set_active(&mut self, node_id: NodeId, active: bool) {
        if active {
            if self.get_node(node_id).is_some() {
                self.active_ids.insert(node_id);
            }
        } else {
            self.active_ids.remove(&node_id);
        }
    }

    /// 按文档顺序（深度优先，先父后子）查找第一个匹配当前位置的带链接节点
    pub fn find_active_node<F>(&self, locator: &str, match_fn: F) -> Option<NodeId>
    where
        F: Fn(&str, &str) -> bool,
    {
        find_active_node_recursive(&self.tree, locator, &match_fn)
    }

    /// 查找标题序列与 `text_path` 完全一致（长度与内容）的节点
    pub fn find_node_by_text_path(&self, text_path: &[String]) -> Option<&NavItem> {
        if text_path.is_empty() {
            return None;
        }
        find_node_by_text_path_recursive(&self.tree, text_path, 0)
    }

    /// 按文本路径切换节点展开状态
    pub fn toggle_by_text_path(&mut self, text_path: &[String]) {
        if let Some(node_id) = self.find_node_by_text_path(text_path).map(|n| n.node_id) {
            self.toggle_expanded(node_id);
        }
    }

    /// 把某个节点设为当前活动节点
    ///
    /// 清除上一轮自动产生的活动/展开标记，把根到该节点路径上的
    /// 所有节点标记为活动；`auto_expand` 为真时再自动展开除节点
    /// 自身外的整条路径。手动展开的节点不受影响。
    pub fn set_active_path(&mut self, node_id: NodeId, auto_expand: bool) -> bool {
        let Some(path) = self.get_node_path(node_id) else {
            return false;
        };

        self.active_ids.clear();
        self.auto_expanded_ids.clear();

        for id in &path {
            self.active_ids.insert(*id);
        }
        if auto_expand {
            // 展开包含活动项的路径（除了最后一个节点）
            for id in &path[..path.len() - 1] {
                self.auto_expanded_ids.insert(*id);
            }
        }

        true
    }

    /// 根据当前位置更新活动状态
    ///
    /// 先清除自动标记，再通过 `find_active_node` 解析活动节点；
    /// 未命中时返回 `None`，此时树上没有活动路径。
    pub fn update_active_state<F>(
        &mut self,
        locator: &str,
        auto_expand: bool,
        match_fn: F,
    ) -> Option<NodeId>
    where
        F: Fn(&str, &str) -> bool,
    {
        self.active_ids.clear();
        self.auto_expanded_ids.clear();

        let node_id = self.find_active_node(locator, match_fn)?;
        self.set_active_path(node_id, auto_expand);
        Some(node_id)
    }
}

fn find_node_by_id(items: &[NavItem], node_id: NodeId) -> Option<&NavItem> {
    for item in items {
        if item.node_id == node_id {
            return Some(item);
        }
        if let Some(found) = find_node_by_id(item.child_items(), node_id) {
            return Some(found);
        }
    }
    None
}

fn find_node_path(
    items: &[NavItem],
    node_id: NodeId,
    current: &mut Vec<NodeId>,
) -> Option<Vec<NodeId>> {
    for item in items {
        current.push(item.node_id);
        if item.node_id == node_id {
            return Some(current.clone());
        }
        if let Some(path) = find_node_path(item.child_items(), node_id, current) {
            return Some(path);
        }
        current.pop();
    }
    None
}

fn find_active_node_recursive<F>(items: &[NavItem], locator: &str, match_fn: &F) -> Option<NodeId>
where
    F: Fn(&str, &str) -> bool,
{
    for item in items {
        if let Some(url) = &item.url {
            if match_fn(locator, url) {
                return Some(item.node_id);
            }
        }
        if let Some(found) = find_active_node_recursive(item.child_items(), locator, match_fn) {
            return Some(found);
        }
    }
    None
}

fn find_node_by_text_path_recursive<'a>(
    items: &'a [NavItem],
    text_path: &[String],
    depth: usize,
) -> Option<&'a NavItem> {
    for item in items {
        if item.title != text_path[depth] {
            continue;
        }
        if depth + 1 == text_path.len() {
            return Some(item);
        }
        if let Some(found) =
            find_node_by_text_path_recursive(item.child_items(), text_path, depth + 1)
        {
            return Some(found);
        }
    }
    None
}
