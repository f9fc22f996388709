//! 视图构建模块

pub mod tree_view;

pub use tree_view::render_tree;
