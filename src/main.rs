//! navtree 命令行入口
//!
//! 读取一个 HTML 页面，转换侧栏导航列表，按给定位置同步
//! 活动状态后输出处理结果。

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use navtree::core::{process_page, NavTreeOptions};
use navtree::parsers::{html_to_dom, parse_nav_items};
use navtree::parsers::dom::find_element_by_id;
use navtree::parsers::validator::validate_tree_structure;
use navtree::manager::collect_candidate_lists;

#[derive(Parser)]
#[command(name = "navtree")]
#[command(version)]
#[command(about = "把 HTML 页面中的导航列表转换为侧栏导航树")]
struct Cli {
    /// 输入的 HTML 文件
    input: PathBuf,

    /// 当前页面位置，用于高亮活动节点
    #[arg(short, long)]
    location: Option<String>,

    /// 导航容器元素的 id
    #[arg(long, default_value = "sidebar-nav-tree")]
    container_id: String,

    /// 面包屑容器元素的 id
    #[arg(long, default_value = "breadcrumb")]
    breadcrumb_id: String,

    /// 解析相对链接时的基准 URL
    #[arg(long)]
    base_url: Option<String>,

    /// 用宽松的 markdown 解析器代替严格验证
    #[arg(long)]
    markdown: bool,

    /// 只输出解析出的树结构（JSON），不做页面转换
    #[arg(long)]
    dump_tree: bool,

    /// 输出文件，缺省写到标准输出
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            error!("{message}");
            eprintln!("错误: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), String> {
    let data = fs::read(&cli.input)
        .map_err(|e| format!("无法读取 {}: {e}", cli.input.display()))?;

    let options = NavTreeOptions {
        container_id: cli.container_id.clone(),
        breadcrumb_id: cli.breadcrumb_id.clone(),
        base_url: cli.base_url.clone(),
        markdown: cli.markdown,
        ..NavTreeOptions::default()
    };

    let output = if cli.dump_tree {
        dump_tree(&data, &options)?
    } else {
        let (bytes, report) = process_page(&data, "utf-8".to_string(), cli.location.as_deref(), &options)
            .map_err(|e| e.to_string())?;
        info!(
            converted = report.converted,
            rejected = report.rejected,
            skipped = report.skipped,
            "页面处理完成"
        );
        bytes
    };

    match &cli.output {
        Some(path) => {
            fs::write(path, output).map_err(|e| format!("无法写入 {}: {e}", path.display()))?
        }
        None => io::stdout()
            .write_all(&output)
            .map_err(|e| format!("无法写入标准输出: {e}"))?,
    }

    Ok(())
}

/// 解析容器内的所有列表并输出 JSON 树
fn dump_tree(data: &[u8], options: &NavTreeOptions) -> Result<Vec<u8>, String> {
    let dom = html_to_dom(data, "utf-8".to_string());
    let container = find_element_by_id(&dom.document, &options.container_id)
        .ok_or_else(|| format!("找不到容器元素: {}", options.container_id))?;

    let base = options
        .base_url
        .as_deref()
        .map(url::Url::parse)
        .transpose()
        .map_err(|e| format!("base_url 无效: {e}"))?;

    let mut forest = Vec::new();
    for list in collect_candidate_lists(&container) {
        validate_tree_structure(&list).map_err(|e| e.to_string())?;
        forest.extend(parse_nav_items(&list, base.as_ref()));
    }

    let mut json = serde_json::to_vec_pretty(&forest).map_err(|e| e.to_string())?;
    json.push(b'\n');
    Ok(json)
}
