//! URL 规范化与路径匹配
//!
//! 当前页面位置（locator）和导航树里的候选链接都先解析为绝对 URL，
//! 再按解码后的路径做精确/前缀比较。匹配只看 origin 和 path，
//! 查询参数与锚点一律忽略。

use percent_encoding::percent_decode_str;
use regex::Regex;
pub use url::Url;

/// 无协议位置（如 "/docs/a.html"）解析时使用的基准
const DEFAULT_BASE: &str = "http://localhost/";

/// 移除 URL 中的查询参数和锚点
pub fn clean_url(url: &str) -> &str {
    url.split(['?', '#']).next().unwrap_or(url)
}

/// 把页面位置解析为绝对 URL
///
/// 接受完整 URL 或以 `/` 开头的路径；路径形式挂到默认基准上，
/// 这样相对链接解析后 origin 自然一致。
pub fn parse_locator(location: &str) -> Option<Url> {
    match Url::parse(location) {
        Ok(url) => Some(url),
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            Url::parse(DEFAULT_BASE).ok()?.join(location).ok()
        }
        Err(_) => None,
    }
}

/// 检查两个路径是否精确匹配
///
/// 容忍恰好一个尾部斜杠的差异。
pub fn is_exact_match(current_path: &str, target_path: &str) -> bool {
    if current_path == target_path {
        return true;
    }
    if let Some(stripped) = current_path.strip_suffix('/') {
        return stripped == target_path;
    }
    format!("{current_path}/") == target_path
}

/// 检查目标路径是否是当前路径的目录前缀
///
/// 目标路径先经 [`prefix_rewrite`] 转成目录形式再比较。
pub fn is_prefix_match(current_path: &str, target_path: &str) -> bool {
    current_path.starts_with(&prefix_rewrite(target_path))
}

/// 把目标路径重写为目录形式
///
/// `…/index.html` 去掉文件名（必须落在段边界上），其余
/// `….html` 换成 `…/`，没有后缀的补一个 `/`。
fn prefix_rewrite(target_path: &str) -> String {
    if target_path.ends_with('/') {
        return target_path.to_string();
    }
    if let Some(stripped) = target_path.strip_suffix("/index.html") {
        return format!("{stripped}/");
    }
    let html_suffix = Regex::new(r"\.html?$").unwrap();
    if html_suffix.is_match(target_path) {
        format!("{}/", html_suffix.replace(target_path, ""))
    } else {
        format!("{target_path}/")
    }
}

/// 把候选链接解析到当前位置上，origin 不一致则丢弃
fn resolve_same_origin(current: &Url, href: &str) -> Option<Url> {
    let target = current.join(clean_url(href)).ok()?;
    if target.origin() != current.origin() {
        return None;
    }
    Some(target)
}

/// 判断候选链接是否与当前页面精确匹配
///
/// 路径解码后按 [`is_exact_match`] 比较。这是管理器精确匹配
/// 阶段喂给
/// [`NavTreeState::find_active_node`](crate::state::NavTreeState::find_active_node)
/// 的匹配函数。
pub fn is_exact_location(current: &Url, href: &str) -> bool {
    let Some(target) = resolve_same_origin(current, href) else {
        return false;
    };
    is_exact_match(&decode_path(current.path()), &decode_path(target.path()))
}

/// 候选链接作为目录前缀覆盖当前页面时，返回重写后目标
/// 路径的长度
///
/// 长度用于在多个前缀命中中选出最长（最具体）的那个，
/// 不命中返回 `None`。
pub fn prefix_target_len(current: &Url, href: &str) -> Option<usize> {
    let target = resolve_same_origin(current, href)?;
    let current_path = decode_path(current.path());
    let rewritten = prefix_rewrite(&decode_path(target.path()));
    current_path.starts_with(&rewritten).then(|| rewritten.len())
}

fn decode_path(path: &str) -> String {
    percent_decode_str(path).decode_utf8_lossy().into_owned()
}
