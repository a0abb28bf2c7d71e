use std::fmt::Debug;

use serde::{Deserialize, Serialize};

use super::super::bounds::Bounds;
use super::super::node::{Node, NodeType};
use super::super::omnitree::Omnitree;
use crate::config::TreeConfig;

/// 用于JSON序列化的简化树结构
#[derive(Debug, Serialize, Deserialize)]
pub struct TreeVisualization<M> {
    pub dimensions: usize,
    /// 元素总数
    pub count: usize,
    /// 树的配置参数
    pub config: TreeConfig,
    pub root: NodeVisualization<M>,
}

/// 用于JSON序列化的节点结构
#[derive(Debug, Serialize, Deserialize)]
pub struct NodeVisualization<M> {
    pub node_type: NodeType,
    /// 节点层级（根为 0）
    pub level: usize,
    pub bounds: Bounds<M>,
    /// 分裂值（仅分支节点）
    pub splits: Option<Vec<M>>,
    /// 子树中的元素个数
    pub item_count: usize,
    /// 子节点（仅分支节点，按卦限编码排列）
    pub child_nodes: Vec<NodeVisualization<M>>,
}

/// Omnitree调试功能实现
impl<T, M: Clone> Omnitree<T, M> {
    /// 打印完整的树结构用于调试
    ///
    /// 递归打印每个节点的类型、层级、边界、分裂值和元素数量。
    /// 空的分支子节点只打印一行摘要。
    pub fn print_tree_structure_debug(&self)
    where
        M: Debug,
    {
        fn print_node_recursive<T, M: Clone + Debug>(node: &Node<T, M>, level: usize, path: String) {
            let indent = "  ".repeat(level);
            let bounds = node.bounds();
            match node {
                Node::Leaf { items, .. } => {
                    println!(
                        "{}Leaf{} (level={}, min={:?}, max={:?}, {} items)",
                        indent,
                        path,
                        level,
                        bounds.min(),
                        bounds.max(),
                        items.len()
                    );
                }
                Node::Branch {
                    splits,
                    children,
                    count,
                    ..
                } => {
                    println!(
                        "{}Branch{} (level={}, min={:?}, max={:?}, splits={:?}, {} items):",
                        indent,
                        path,
                        level,
                        bounds.min(),
                        bounds.max(),
                        splits,
                        count
                    );
                    for (orthant, child) in children.iter().enumerate() {
                        let child_path = format!("{}[{:b}]", path, orthant);
                        if child.is_leaf() && child.is_empty() {
                            println!("{}  Leaf{} (empty)", indent, child_path);
                        } else {
                            print_node_recursive(child, level + 1, child_path);
                        }
                    }
                }
            }
        }

        println!("=== Omnitree Structure Debug ===");
        println!(
            "dimensions={}, count={}, depth={}, nodes={}, leaves={}",
            self.dimensions(),
            self.count(),
            self.depth(),
            self.node_count(),
            self.leaf_count()
        );
        print_node_recursive(self.root(), 0, String::new());
        println!("=== End Debug ===");
    }

    /// 导出树结构为JSON格式
    ///
    /// 只包含节点结构（边界、分裂值、元素数量），不包含元素本身。
    pub fn export_structure_json(&self) -> crate::Result<String>
    where
        M: Serialize,
    {
        let visualization = self.structure();
        Ok(serde_json::to_string_pretty(&visualization)?)
    }

    /// 创建用于可视化的树结构
    pub fn structure(&self) -> TreeVisualization<M> {
        TreeVisualization {
            dimensions: self.dimensions(),
            count: self.count(),
            config: TreeConfig {
                leaf_capacity: self.leaf_capacity(),
                max_depth: self.max_depth(),
            },
            root: node_visualization(self.root(), 0),
        }
    }
}

/// 递归创建节点的可视化结构
fn node_visualization<T, M: Clone>(node: &Node<T, M>, level: usize) -> NodeVisualization<M> {
    let (splits, child_nodes) = match node {
        Node::Leaf { .. } => (None, Vec::new()),
        Node::Branch {
            splits, children, ..
        } => (
            Some(splits.clone()),
            children
                .iter()
                .map(|child| node_visualization(child, level + 1))
                .collect(),
        ),
    };

    NodeVisualization {
        node_type: node.node_type(),
        level,
        bounds: node.bounds().clone(),
        splits,
        item_count: node.len(),
        child_nodes,
    }
}
