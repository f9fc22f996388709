//! 导航树管理器
//!
//! 持有页面 DOM、配置和所有已转换的树，负责扫描容器内的
//! 候选列表、转换为树视图、在导航后同步活动状态并重渲染。

use markup5ever_rcdom::{Handle, RcDom};
use tracing::{debug, warn};
use url::Url;

use crate::breadcrumb::breadcrumb_path;
use crate::builders::render_tree;
use crate::core::{NavTreeError, NavTreeOptions};
use crate::parsers::dom::{
    element_children, find_element_by_id, get_node_attr, is_element_named, replace_node,
    set_children, set_node_attr,
};
use crate::parsers::markdown::MarkdownTreeParser;
use crate::parsers::nav::parse_nav_items;
use crate::parsers::validator::validate_tree_structure;
use crate::state::{NavItem, NavTreeState, NodeId};
use crate::utils::url::{is_exact_location, parse_locator, prefix_target_len};

/// 标记属性，扫描时跳过带此标记的列表
const REJECTED_MARKER: &str = "data-navtree";

/// 单次扫描的统计结果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanReport {
    /// 成功转换的列表数
    pub converted: usize,
    /// 本次被拒绝并打上标记的列表数
    pub rejected: usize,
    /// 已带拒绝标记而被跳过的列表数
    pub skipped: usize,
}

/// 一棵已转换的导航树
struct RegisteredTree {
    /// 页面中的 div.nav-tree-container 元素
    container: Handle,
    state: NavTreeState,
}

/// 导航树管理器
pub struct NavTreeManager {
    document: Handle,
    options: NavTreeOptions,
    base: Option<Url>,
    trees: Vec<RegisteredTree>,
}

impl NavTreeManager {
    /// 基于已解析的页面创建管理器
    ///
    /// 容器元素不存在或 base_url 无法解析时返回错误。
    pub fn new(dom: &RcDom, options: NavTreeOptions) -> Result<NavTreeManager, NavTreeError> {
        if find_element_by_id(&dom.document, &options.container_id).is_none() {
            return Err(NavTreeError::ContainerNotFound(options.container_id.clone()));
        }

        let base = match &options.base_url {
            Some(raw) => Some(
                Url::parse(raw)
                    .map_err(|e| NavTreeError::ConfigError(format!("base_url 无效: {e}")))?,
            ),
            None => None,
        };

        Ok(NavTreeManager {
            document: dom.document.clone(),
            options,
            base,
            trees: Vec::new(),
        })
    }

    /// 扫描容器并转换所有候选列表
    ///
    /// 已转换的树和带拒绝标记的列表都不会被重复处理，
    /// 重复调用是幂等的。
    pub fn scan(&mut self) -> Result<ScanReport, NavTreeError> {
        let container = find_element_by_id(&self.document, &self.options.container_id)
            .ok_or_else(|| NavTreeError::ContainerNotFound(self.options.container_id.clone()))?;

        let mut report = ScanReport::default();
        for list in collect_candidate_lists(&container) {
            if get_node_attr(&list, REJECTED_MARKER).as_deref() == Some("rejected") {
                report.skipped += 1;
                continue;
            }

            match self.parse_list(&list) {
                Ok(items) => {
                    let state = NavTreeState::new(items);
                    let rendered = render_tree(&state);
                    // 整棵树离屏构建完毕后一次性换入
                    if !replace_node(&list, &rendered) {
                        warn!("列表节点已脱离文档，跳过换入");
                        continue;
                    }
                    self.trees.push(RegisteredTree {
                        container: rendered,
                        state,
                    });
                    report.converted += 1;
                }
                Err(err) => {
                    debug!("列表转换被拒绝: {err}");
                    set_node_attr(&list, REJECTED_MARKER, "rejected");
                    report.rejected += 1;
                }
            }
        }

        Ok(report)
    }

    fn parse_list(&self, list: &Handle) -> Result<Vec<NavItem>, NavTreeError> {
        let items = if self.options.markdown {
            MarkdownTreeParser::default().parse(list, self.base.as_ref())?
        } else {
            validate_tree_structure(list)?;
            parse_nav_items(list, self.base.as_ref())
        };
        if items.is_empty() {
            return Err(NavTreeError::EmptyTree);
        }
        Ok(items)
    }

    /// 页面导航后的统一入口
    ///
    /// 先扫描未转换的列表，再按新位置更新每棵树的活动状态。
    /// 匹配分三档：整棵树先找精确命中，落空后取目录前缀最长的
    /// 命中，再落空才回退到面包屑文本路径。所有状态更新完成后
    /// 重渲染受影响的树。
    pub fn on_navigated(&mut self, location: &str) -> Result<ScanReport, NavTreeError> {
        let report = self.scan()?;

        let current = parse_locator(location)
            .ok_or_else(|| NavTreeError::InvalidLocation(location.to_string()))?;

        let crumbs = breadcrumb_path(&self.document, &self.options.breadcrumb_id);
        let auto_expand = self.options.auto_expand_current_path;

        for tree in &mut self.trees {
            let mut found = tree
                .state
                .update_active_state(location, auto_expand, |_, href| {
                    is_exact_location(&current, href)
                });

            if found.is_none() {
                if let Some(node_id) = best_prefix_match(&tree.state, &current) {
                    tree.state.set_active_path(node_id, auto_expand);
                    found = Some(node_id);
                }
            }

            if found.is_none() && self.options.enable_breadcrumb_fallback && !crumbs.is_empty() {
                activate_by_breadcrumb(&mut tree.state, &crumbs, auto_expand);
            }

            rerender(tree);
        }

        Ok(report)
    }

    /// 按文本路径切换某棵树的节点展开状态并重渲染
    pub fn toggle_by_text_path(&mut self, text_path: &[String]) {
        for tree in &mut self.trees {
            tree.state.toggle_by_text_path(text_path);
            rerender(tree);
        }
    }

    /// 所有已转换树的状态，按转换顺序排列
    pub fn states(&self) -> Vec<&NavTreeState> {
        self.trees.iter().map(|tree| &tree.state).collect()
    }
}

/// 用面包屑文本路径定位并激活节点
///
/// 先试完整路径，失败则逐级去掉末尾段再试，直到只剩一段。
fn activate_by_breadcrumb(state: &mut NavTreeState, crumbs: &[String], auto_expand: bool) -> bool {
    for len in (1..=crumbs.len()).rev() {
        if let Some(node_id) = state.find_node_by_text_path(&crumbs[..len]).map(|n| n.node_id) {
            return state.set_active_path(node_id, auto_expand);
        }
    }
    false
}

/// 在整棵树里找目录前缀覆盖当前位置的最佳节点
///
/// 取重写后目标路径最长的命中，长度相同时文档顺序靠前的优先。
fn best_prefix_match(state: &NavTreeState, current: &Url) -> Option<NodeId> {
    let mut best: Option<(usize, NodeId)> = None;
    collect_best_prefix(state.get_root_nodes(), current, &mut best);
    best.map(|(_, node_id)| node_id)
}

fn collect_best_prefix(items: &[NavItem], current: &Url, best: &mut Option<(usize, NodeId)>) {
    for item in items {
        if let Some(href) = &item.url {
            if let Some(len) = prefix_target_len(current, href) {
                if best.map_or(true, |(best_len, _)| len > best_len) {
                    *best = Some((len, item.node_id));
                }
            }
        }
        collect_best_prefix(item.child_items(), current, best);
    }
}

/// 用当前状态重新渲染一棵树，替换容器内容
fn rerender(tree: &mut RegisteredTree) {
    let fresh = render_tree(&tree.state);
    // 把子节点从临时容器里搬走再丢弃它；rcdom 节点析构时
    // 会迭代取走整个子树的 children，留在里面会被一并清空
    let children = std::mem::take(&mut *fresh.children.borrow_mut());
    set_children(&tree.container, children);
}

/// 收集容器直接子元素里的候选 ul/ol 列表
///
/// 只看直接子元素，包在别的元素里的列表不参与转换。
pub fn collect_candidate_lists(container: &Handle) -> Vec<Handle> {
    element_children(container)
        .into_iter()
        .filter(|child| is_element_named(child, &["ul", "ol"]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::dom::html_to_dom;
    use crate::parsers::serializer::serialize_node;

    fn page(sidebar: &str) -> RcDom {
        let html = format!(
            r#"<html><body><div id="sidebar-nav-tree">{sidebar}</div></body></html>"#
        );
        html_to_dom(html.as_bytes(), "utf-8".to_string())
    }

    fn sidebar_html(dom: &RcDom) -> String {
        let container = find_element_by_id(&dom.document, "sidebar-nav-tree").unwrap();
        serialize_node(&container)
    }

    #[test]
    fn scan_converts_valid_lists_in_place() {
        let dom = page(r#"<ul><li><a href="/a">页面A</a></li></ul>"#);
        let mut manager = NavTreeManager::new(&dom, NavTreeOptions::default()).unwrap();

        let report = manager.scan().unwrap();
        assert_eq!(report, ScanReport { converted: 1, rejected: 0, skipped: 0 });

        let html = sidebar_html(&dom);
        assert!(html.contains("nav-tree-container"));
        assert!(html.contains("页面A"));
        assert!(!html.contains(r#"<ul><li><a href="/a">"#));
    }

    #[test]
    fn invalid_lists_are_marked_and_skipped_afterwards() {
        let dom = page(r#"<ul><li><div>非法</div></li></ul>"#);
        let mut manager = NavTreeManager::new(&dom, NavTreeOptions::default()).unwrap();

        let first = manager.scan().unwrap();
        assert_eq!(first.rejected, 1);
        assert!(sidebar_html(&dom).contains(r#"data-navtree="rejected""#));

        let second = manager.scan().unwrap();
        assert_eq!(second, ScanReport { converted: 0, rejected: 0, skipped: 1 });
    }

    #[test]
    fn rescan_is_idempotent_for_converted_trees() {
        let dom = page(r#"<ul><li><a href="/a">页面A</a></li></ul>"#);
        let mut manager = NavTreeManager::new(&dom, NavTreeOptions::default()).unwrap();

        manager.scan().unwrap();
        let report = manager.scan().unwrap();
        assert_eq!(report, ScanReport::default());
        assert_eq!(manager.states().len(), 1);
    }

    #[test]
    fn missing_container_is_an_error() {
        let dom = html_to_dom(b"<html><body></body></html>", "utf-8".to_string());
        assert!(matches!(
            NavTreeManager::new(&dom, NavTreeOptions::default()),
            Err(NavTreeError::ContainerNotFound(_))
        ));
    }

    #[test]
    fn on_navigated_activates_matching_node_and_expands_path() {
        let dom = page(
            r#"<ul>
                 <li><a href="/a">页面A</a></li>
                 <li>分组<ul><li><a href="/b">页面B</a></li></ul></li>
               </ul>"#,
        );
        let mut manager = NavTreeManager::new(&dom, NavTreeOptions::default()).unwrap();
        manager.on_navigated("http://localhost/b").unwrap();

        let state = manager.states()[0];
        let group = &state.get_root_nodes()[1];
        let leaf = &group.child_items()[0];
        assert!(state.is_active(group.node_id));
        assert!(state.is_active(leaf.node_id));
        assert!(state.is_expanded(group.node_id));
        assert!(!state.is_active(state.get_root_nodes()[0].node_id));

        let html = sidebar_html(&dom);
        assert!(html.contains("active"));
        assert!(!html.contains(r#"<ul class="hidden">"#));
    }

    #[test]
    fn manual_expansion_survives_navigation() {
        let dom = page(
            r#"<ul>
                 <li>分组<ul><li><a href="/b">页面B</a></li></ul></li>
                 <li><a href="/a">页面A</a></li>
               </ul>"#,
        );
        let mut manager = NavTreeManager::new(&dom, NavTreeOptions::default()).unwrap();
        manager.scan().unwrap();

        manager.toggle_by_text_path(&["分组".to_string()]);
        manager.on_navigated("http://localhost/a").unwrap();

        let state = manager.states()[0];
        let group = &state.get_root_nodes()[0];
        assert!(state.is_expanded(group.node_id));
        assert!(!state.is_active(group.node_id));
    }

    #[test]
    fn breadcrumb_fallback_activates_text_path() {
        let html = r#"<html><body>
            <nav id="breadcrumb">
              <span data-nav-title>分组</span>
              <span data-nav-title>不存在的页</span>
            </nav>
            <div id="sidebar-nav-tree">
              <ul><li>分组<ul><li><a href="/b">页面B</a></li></ul></li></ul>
            </div>
          </body></html>"#;
        let dom = html_to_dom(html.as_bytes(), "utf-8".to_string());
        let mut manager = NavTreeManager::new(&dom, NavTreeOptions::default()).unwrap();
        manager.on_navigated("http://localhost/elsewhere").unwrap();

        let state = manager.states()[0];
        let group = &state.get_root_nodes()[0];
        assert!(state.is_active(group.node_id));
    }

    #[test]
    fn rerender_keeps_tree_markup_intact() {
        let dom = page(
            r#"<ul>
                 <li><a href="/a">页面A</a></li>
                 <li>分组<ul><li><a href="/b">页面B</a></li></ul></li>
               </ul>"#,
        );
        let mut manager = NavTreeManager::new(&dom, NavTreeOptions::default()).unwrap();
        manager.on_navigated("http://localhost/b").unwrap();

        let html = sidebar_html(&dom);
        assert!(html.contains("页面A"));
        assert!(html.contains("页面B"));
        assert!(html.contains("node-content"));

        // 交互后的重渲染同样不能丢内容
        manager.toggle_by_text_path(&["分组".to_string()]);
        let html = sidebar_html(&dom);
        assert!(html.contains("页面A"));
        assert!(html.contains("页面B"));
    }

    #[test]
    fn exact_match_beats_earlier_prefix_match() {
        let dom = page(
            r#"<ul>
                 <li><a href="/docs.html">文档</a></li>
                 <li><a href="/docs/intro.html">介绍</a></li>
               </ul>"#,
        );
        let mut manager = NavTreeManager::new(&dom, NavTreeOptions::default()).unwrap();
        manager.on_navigated("http://localhost/docs/intro.html").unwrap();

        let state = manager.states()[0];
        let docs = state.get_root_nodes()[0].node_id;
        let intro = state.get_root_nodes()[1].node_id;
        assert!(!state.is_active(docs));
        assert!(state.is_active(intro));
    }

    #[test]
    fn longest_prefix_wins_when_no_exact_match() {
        let dom = page(
            r#"<ul>
                 <li><a href="/docs/">文档</a></li>
                 <li><a href="/docs/guide/">指南</a></li>
               </ul>"#,
        );
        let mut manager = NavTreeManager::new(&dom, NavTreeOptions::default()).unwrap();
        manager.on_navigated("http://localhost/docs/guide/deep/").unwrap();

        let state = manager.states()[0];
        let docs = state.get_root_nodes()[0].node_id;
        let guide = state.get_root_nodes()[1].node_id;
        assert!(!state.is_active(docs));
        assert!(state.is_active(guide));
    }

    #[test]
    fn auto_expansion_can_be_disabled() {
        let dom = page(r#"<ul><li>分组<ul><li><a href="/b">页面B</a></li></ul></li></ul>"#);
        let options = NavTreeOptions {
            auto_expand_current_path: false,
            ..NavTreeOptions::default()
        };
        let mut manager = NavTreeManager::new(&dom, options).unwrap();
        manager.on_navigated("http://localhost/b").unwrap();

        let state = manager.states()[0];
        let group = &state.get_root_nodes()[0];
        // 活动路径照常高亮，但分组保持折叠
        assert!(state.is_active(group.node_id));
        assert!(state.is_active(group.child_items()[0].node_id));
        assert!(!state.is_expanded(group.node_id));
        assert!(sidebar_html(&dom).contains(r#"<ul class="hidden">"#));
    }

    #[test]
    fn wrapped_lists_are_not_candidates() {
        let dom = page(
            r#"<div class="widget"><ul><li><a href="/w">挂件</a></li></ul></div>
               <ul><li><a href="/a">页面A</a></li></ul>"#,
        );
        let mut manager = NavTreeManager::new(&dom, NavTreeOptions::default()).unwrap();
        let report = manager.scan().unwrap();

        assert_eq!(report, ScanReport { converted: 1, rejected: 0, skipped: 0 });
        let html = sidebar_html(&dom);
        // 挂件里的列表原样保留
        assert!(html.contains(r#"<a href="/w">挂件</a>"#));
    }

    #[test]
    fn markdown_mode_accepts_loose_lists() {
        let dom = page(
            r#"<ul><li><p><a href="/a">页面A</a></p>
                 <ul><li><p><a href="/a/b">子页</a></p></li></ul>
               </li></ul>"#,
        );
        let options = NavTreeOptions {
            markdown: true,
            ..NavTreeOptions::default()
        };
        let mut manager = NavTreeManager::new(&dom, options).unwrap();
        let report = manager.scan().unwrap();
        assert_eq!(report.converted, 1);

        let state = manager.states()[0];
        assert_eq!(state.get_root_nodes()[0].child_items().len(), 1);
    }
}
