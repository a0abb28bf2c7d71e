use std::cmp::Ordering;

use derive_more::Display;
use serde::{Deserialize, Serialize};

use super::axis::{AxisOps, Locator};
use super::bounds::Bounds;

/// Omnitree 节点类型
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeType {
    /// 叶子节点：直接存放元素
    Leaf,
    /// 分支节点：只存放 2^D 个子节点
    Branch,
}

/// Omnitree 节点
///
/// - Leaf：元素的无序多重集合，所有元素的坐标都在 `bounds` 内
/// - Branch：每个轴一个分裂值，以及按卦限编码索引的 2^D 个子节点；
///   子节点的边界恰好划分父节点的边界
#[derive(Debug, Clone)]
pub enum Node<T, M> {
    Leaf {
        bounds: Bounds<M>,
        items: Vec<T>,
    },
    Branch {
        bounds: Bounds<M>,
        /// 每个轴的分裂值，坐标等于分裂值时归入小侧
        splits: Vec<M>,
        /// 长度为 2^D，下标即卦限编码
        children: Vec<Node<T, M>>,
        /// 子树中的元素总数
        count: usize,
    },
}

/// 节点算法共用的只读上下文
pub(crate) struct Context<'a, T, M> {
    pub axis: &'a AxisOps<M>,
    pub locator: &'a Locator<T, M>,
    pub leaf_capacity: usize,
    pub max_depth: usize,
}

impl<T, M> Node<T, M> {
    /// 创建空叶子节点
    pub fn new_leaf(bounds: Bounds<M>) -> Self {
        Node::Leaf {
            bounds,
            items: Vec::new(),
        }
    }

    pub fn bounds(&self) -> &Bounds<M> {
        match self {
            Node::Leaf { bounds, .. } => bounds,
            Node::Branch { bounds, .. } => bounds,
        }
    }

    pub fn node_type(&self) -> NodeType {
        match self {
            Node::Leaf { .. } => NodeType::Leaf,
            Node::Branch { .. } => NodeType::Branch,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf { .. })
    }

    /// 子树中的元素个数
    pub fn len(&self) -> usize {
        match self {
            Node::Leaf { items, .. } => items.len(),
            Node::Branch { count, .. } => *count,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 分支节点的子节点（叶子节点返回空切片）
    pub fn children(&self) -> &[Node<T, M>] {
        match self {
            Node::Leaf { .. } => &[],
            Node::Branch { children, .. } => children,
        }
    }

    /// 子树深度（单个叶子为 1）
    pub fn depth(&self) -> usize {
        1 + self.children().iter().map(Node::depth).max().unwrap_or(0)
    }

    /// 子树中的节点总数
    pub fn node_count(&self) -> usize {
        1 + self.children().iter().map(Node::node_count).sum::<usize>()
    }

    /// 子树中的叶子节点总数
    pub fn leaf_count(&self) -> usize {
        match self {
            Node::Leaf { .. } => 1,
            Node::Branch { children, .. } => children.iter().map(Node::leaf_count).sum(),
        }
    }

    /// 把子树中的所有元素按深度优先顺序移入 `out`
    pub(crate) fn drain_into(self, out: &mut Vec<T>) {
        match self {
            Node::Leaf { items, .. } => out.extend(items),
            Node::Branch { children, .. } => {
                for child in children {
                    child.drain_into(out);
                }
            }
        }
    }
}

/// 计算坐标所属的卦限编码
///
/// 第 i 轴坐标严格大于分裂值时置第 i 位；相等归入小侧。插入、分裂、
/// 定点删除与更新都必须经由这一个函数选路，否则元素会变得查不到。
pub(crate) fn orthant_of<M>(splits: &[M], coordinate: &[M], axis: &AxisOps<M>) -> usize {
    splits
        .iter()
        .zip(coordinate)
        .enumerate()
        .filter(|(_, (split, value))| axis.compare(value, split) == Ordering::Greater)
        .fold(0, |orthant, (i, _)| orthant | (1 << i))
}

/// 判断叶子节点是否"拥有"某个坐标
///
/// 叶子边界是闭区间，但在 `open_min` 置位的轴上，叶子位于某个祖先分裂的
/// 大侧，坐标等于下边界时按选路规则属于兄弟节点，因此下边界是开的。
pub(crate) fn owns<M: Clone>(
    bounds: &Bounds<M>,
    open_min: usize,
    coordinate: &[M],
    axis: &AxisOps<M>,
) -> bool {
    bounds.contains(coordinate, axis)
        && bounds
            .min()
            .iter()
            .zip(coordinate)
            .enumerate()
            .all(|(i, (low, value))| {
                open_min & (1 << i) == 0 || axis.compare(value, low) == Ordering::Greater
            })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_square() -> Bounds<i64> {
        Bounds::new(vec![0, 0], vec![10, 10], &AxisOps::integer()).unwrap()
    }

    #[test]
    fn test_node_creation() {
        let leaf: Node<u32, i64> = Node::new_leaf(unit_square());
        assert!(leaf.is_leaf());
        assert_eq!(leaf.node_type(), NodeType::Leaf);
        assert_eq!(leaf.node_type().to_string(), "Leaf");
        assert!(leaf.is_empty());
        assert_eq!(leaf.depth(), 1);
        assert_eq!(leaf.node_count(), 1);
        assert_eq!(leaf.leaf_count(), 1);
    }

    #[test]
    fn test_orthant_ties_go_less() {
        let ops = AxisOps::integer();
        let splits = [5, 5];
        assert_eq!(orthant_of(&splits, &[1, 1], &ops), 0);
        assert_eq!(orthant_of(&splits, &[6, 1], &ops), 1);
        assert_eq!(orthant_of(&splits, &[1, 6], &ops), 2);
        assert_eq!(orthant_of(&splits, &[6, 6], &ops), 3);
        assert_eq!(orthant_of(&splits, &[5, 5], &ops), 0);
        assert_eq!(orthant_of(&splits, &[5, 6], &ops), 2);
    }

    #[test]
    fn test_owns_respects_open_lower_edge() {
        let ops = AxisOps::integer();
        let bounds = Bounds::new(vec![5, 0], vec![10, 5], &ops).unwrap();
        // 第 0 轴位于大侧：x == 5 属于小侧兄弟
        assert!(!owns(&bounds, 0b01, &[5, 3], &ops));
        assert!(owns(&bounds, 0b01, &[6, 3], &ops));
        // 第 1 轴位于小侧：y == 5 仍然属于本节点
        assert!(owns(&bounds, 0b01, &[6, 5], &ops));
        assert!(owns(&bounds, 0b00, &[5, 0], &ops));
        assert!(!owns(&bounds, 0b00, &[11, 0], &ops));
    }

    #[test]
    fn test_drain_into_collects_all() {
        let bounds = unit_square();
        let splits = vec![5, 5];
        let children = (0..4)
            .map(|o| Node::Leaf {
                bounds: bounds.orthant(o, &splits),
                items: vec![o as u32],
            })
            .collect();
        let branch = Node::Branch {
            bounds,
            splits,
            children,
            count: 4,
        };
        assert_eq!(branch.depth(), 2);
        assert_eq!(branch.node_count(), 5);
        assert_eq!(branch.leaf_count(), 4);

        let mut out = Vec::new();
        branch.drain_into(&mut out);
        out.sort();
        assert_eq!(out, vec![0, 1, 2, 3]);
    }
}
