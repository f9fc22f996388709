// 集成测试公共模块
//
// 提供构建测试页面和检查结果的辅助工具

use markup5ever_rcdom::RcDom;

use navtree::parsers::dom::find_element_by_id;
use navtree::parsers::serializer::serialize_node;
use navtree::parsers::html_to_dom;

/// 构建一个带侧栏容器的标准测试页面
pub fn page_with_sidebar(sidebar: &str) -> RcDom {
    let html = format!(
        r#"<html><head><title>测试页</title></head><body>
             <div id="sidebar-nav-tree">{sidebar}</div>
             <main>正文</main>
           </body></html>"#
    );
    html_to_dom(html.as_bytes(), "utf-8".to_string())
}

/// 构建同时带面包屑的测试页面
pub fn page_with_breadcrumb(breadcrumb: &str, sidebar: &str) -> RcDom {
    let html = format!(
        r#"<html><body>
             <nav id="breadcrumb">{breadcrumb}</nav>
             <div id="sidebar-nav-tree">{sidebar}</div>
           </body></html>"#
    );
    html_to_dom(html.as_bytes(), "utf-8".to_string())
}

/// 序列化侧栏容器，便于对渲染结果做断言
pub fn sidebar_html(dom: &RcDom) -> String {
    let container = find_element_by_id(&dom.document, "sidebar-nav-tree")
        .expect("测试页面必须包含侧栏容器");
    serialize_node(&container)
}
