use tracing::trace;

use super::super::error::OmnitreeError;
use super::super::node::{orthant_of, Context, Node};
use super::super::omnitree::Omnitree;

/// 插入操作相关算法
impl<T, M: Clone> Omnitree<T, M> {
    /// 添加元素
    ///
    /// # 错误
    /// - `DimensionMismatch` - 定位函数返回的坐标维度与树不一致
    /// - `OutOfBounds` - 坐标不在全局边界内；树保持不变，边界不会扩张
    pub fn add(&mut self, item: T) -> crate::Result<()> {
        let coordinate = self.locator().locate_checked(&item, self.dimensions())?;
        if !self.bounds().contains(&coordinate, self.axis_ops()) {
            return Err(OmnitreeError::OutOfBounds);
        }

        self.insert_located(item, &coordinate);
        trace!(count = self.count(), "item added");
        Ok(())
    }

    /// 从根节点插入一个已经定位并检查过边界的元素
    pub(crate) fn insert_located(&mut self, item: T, coordinate: &[M]) {
        let (root, ctx) = self.root_and_context();
        root.insert(item, coordinate, 0, &ctx);
        *self.count_mut() += 1;
    }
}

impl<T, M: Clone> Node<T, M> {
    /// 插入元素 - 按分裂值逐层选路到叶子，叶子超出容量时分裂
    pub(crate) fn insert(
        &mut self,
        item: T,
        coordinate: &[M],
        depth: usize,
        ctx: &Context<'_, T, M>,
    ) {
        match self {
            Node::Leaf { items, .. } => {
                items.push(item);
                if self.should_split(depth, ctx) {
                    self.split(depth, ctx);
                }
            }
            Node::Branch {
                splits,
                children,
                count,
                ..
            } => {
                let orthant = orthant_of(splits, coordinate, ctx.axis);
                *count += 1;
                children[orthant].insert(item, coordinate, depth + 1, ctx);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::super::axis::AxisOps;
    use super::*;
    use crate::config::TreeConfig;

    fn small_tree() -> Omnitree<(i64, i64), i64> {
        let config = TreeConfig {
            leaf_capacity: 2,
            max_depth: 8,
        };
        Omnitree::with_config(
            vec![0, 0],
            vec![100, 100],
            |p: &(i64, i64)| vec![p.0, p.1],
            AxisOps::integer(),
            &config,
        )
        .unwrap()
    }

    #[test]
    fn test_add_basic() {
        let mut tree = small_tree();
        assert!(tree.is_empty());

        tree.add((1, 1)).unwrap();
        assert_eq!(tree.count(), 1);
        assert!(!tree.is_empty());

        tree.add((50, 50)).unwrap();
        tree.add((99, 1)).unwrap();
        assert_eq!(tree.count(), 3);
        // 超过容量 2 之后根节点分裂
        assert!(!tree.root().is_leaf());
        assert_eq!(tree.root().children().len(), 4);
    }

    #[test]
    fn test_add_on_bounds_edge() {
        let mut tree = small_tree();
        tree.add((0, 0)).unwrap();
        tree.add((100, 100)).unwrap();
        tree.add((0, 100)).unwrap();
        assert_eq!(tree.count(), 3);
    }

    #[test]
    fn test_add_out_of_bounds() {
        let mut tree = small_tree();
        tree.add((5, 5)).unwrap();

        assert!(matches!(tree.add((101, 5)), Err(OmnitreeError::OutOfBounds)));
        assert!(matches!(tree.add((-1, 5)), Err(OmnitreeError::OutOfBounds)));
        // 树保持不变
        assert_eq!(tree.count(), 1);
        assert_eq!(tree.max(0), Some(&100));
    }

    #[test]
    fn test_add_dimension_mismatch() {
        let mut tree: Omnitree<Vec<i64>, i64> = Omnitree::new(
            vec![0, 0],
            vec![10, 10],
            |p: &Vec<i64>| p.clone(),
            AxisOps::integer(),
        )
        .unwrap();

        assert!(matches!(
            tree.add(vec![1, 2, 3]),
            Err(OmnitreeError::DimensionMismatch { expected: 2, actual: 3 })
        ));
        assert!(tree.is_empty());
    }

    #[test]
    fn test_add_negative_zero_on_lower_edge() {
        let mut tree: Omnitree<[f64; 2], f64> = Omnitree::new(
            vec![0.0, 0.0],
            vec![1.0, 1.0],
            |p: &[f64; 2]| p.to_vec(),
            AxisOps::float(),
        )
        .unwrap();

        tree.add([-0.0, 0.5]).unwrap();
        tree.add([0.5, -0.0]).unwrap();
        assert!(matches!(tree.add([-0.25, 0.5]), Err(OmnitreeError::OutOfBounds)));
        assert_eq!(tree.count(), 2);

        let edge = tree.region(vec![0.0, 0.0], vec![0.0, 1.0]).unwrap();
        assert_eq!(tree.query(&edge), vec![&[-0.0, 0.5]]);
        assert!(tree.try_remove_item(&[0.0, 0.5], |a, b| a == b));
        assert_eq!(tree.count(), 1);
    }

    #[test]
    fn test_branch_counts_track_inserts() {
        let mut tree = small_tree();
        for i in 0..20 {
            tree.add((i * 5, 100 - i * 5)).unwrap();
        }
        assert_eq!(tree.count(), 20);
        assert_eq!(tree.root().len(), 20);
        fn check(node: &Node<(i64, i64), i64>) -> usize {
            match node {
                Node::Leaf { items, .. } => items.len(),
                Node::Branch {
                    children, count, ..
                } => {
                    let sum: usize = children.iter().map(check).sum();
                    assert_eq!(sum, *count);
                    sum
                }
            }
        }
        assert_eq!(check(tree.root()), 20);
    }
}
