use super::super::bounds::Bounds;
use super::super::node::{Context, Node};
use super::super::omnitree::{Omnitree, StepStatus};

/// 遍历与区域查询算法
impl<T, M: Clone> Omnitree<T, M> {
    /// 访问树中的每个元素，顺序不作保证
    pub fn stepper<F>(&self, mut visit: F)
    where
        F: FnMut(&T),
    {
        self.root().traverse(&mut visit);
    }

    /// 可提前结束的遍历：回调返回 `StepStatus::Break` 时立即停止
    pub fn stepper_break<F>(&self, mut visit: F) -> StepStatus
    where
        F: FnMut(&T) -> StepStatus,
    {
        self.root().traverse_break(&mut visit)
    }

    /// 可变遍历
    ///
    /// 回调可以修改元素，包括改变元素的坐标；坐标改变后必须调用
    /// `update` 才能让树重新反映元素的位置。
    pub fn stepper_mut<F>(&mut self, mut visit: F)
    where
        F: FnMut(&mut T),
    {
        let (root, _) = self.root_and_context();
        root.traverse_mut(&mut visit);
    }

    /// 可提前结束的可变遍历
    pub fn stepper_mut_break<F>(&mut self, mut visit: F) -> StepStatus
    where
        F: FnMut(&mut T) -> StepStatus,
    {
        let (root, _) = self.root_and_context();
        root.traverse_mut_break(&mut visit)
    }

    /// 访问坐标落在 `region`（闭区间）内的每个元素
    ///
    /// 与区域不相交的子树整体跳过，叶子中的元素逐个重新定位后判断。
    pub fn stepper_in<F>(&self, region: &Bounds<M>, mut visit: F)
    where
        F: FnMut(&T),
    {
        let ctx = self.context();
        let root = self.root();
        if root.bounds().intersects(region, ctx.axis) {
            root.traverse_in(region, &ctx, &mut visit);
        }
    }

    /// 区域内可提前结束的遍历
    pub fn stepper_in_break<F>(&self, region: &Bounds<M>, mut visit: F) -> StepStatus
    where
        F: FnMut(&T) -> StepStatus,
    {
        let ctx = self.context();
        let root = self.root();
        if !root.bounds().intersects(region, ctx.axis) {
            return StepStatus::Continue;
        }
        root.traverse_in_break(region, &ctx, &mut visit)
    }

    /// 区域内的可变遍历
    ///
    /// 是否落在区域内按回调之前的坐标判断。回调改变了坐标的元素需要
    /// `update_in` 或 `update` 才会被移动到新的位置。
    pub fn stepper_mut_in<F>(&mut self, region: &Bounds<M>, mut visit: F)
    where
        F: FnMut(&mut T),
    {
        self.stepper_mut_in_break(region, |item| {
            visit(item);
            StepStatus::Continue
        });
    }

    /// 区域内可提前结束的可变遍历
    pub fn stepper_mut_in_break<F>(&mut self, region: &Bounds<M>, mut visit: F) -> StepStatus
    where
        F: FnMut(&mut T) -> StepStatus,
    {
        let (root, ctx) = self.root_and_context();
        if !root.bounds().intersects(region, ctx.axis) {
            return StepStatus::Continue;
        }
        root.traverse_in_mut_break(region, &ctx, &mut visit)
    }

    /// 收集区域内所有元素的引用
    pub fn query(&self, region: &Bounds<M>) -> Vec<&T> {
        let mut results = Vec::new();
        let ctx = self.context();
        let root = self.root();
        if root.bounds().intersects(region, ctx.axis) {
            root.traverse_in(region, &ctx, &mut |item| results.push(item));
        }
        results
    }

    /// 复制出所有元素
    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        let mut items = Vec::with_capacity(self.count());
        self.stepper(|item| items.push(item.clone()));
        items
    }
}

impl<T, M: Clone> Node<T, M> {
    pub(crate) fn traverse<'a, F>(&'a self, visit: &mut F)
    where
        F: FnMut(&'a T),
    {
        match self {
            Node::Leaf { items, .. } => items.iter().for_each(|item| visit(item)),
            Node::Branch { children, .. } => {
                for child in children {
                    child.traverse(visit);
                }
            }
        }
    }

    pub(crate) fn traverse_mut<F>(&mut self, visit: &mut F)
    where
        F: FnMut(&mut T),
    {
        match self {
            Node::Leaf { items, .. } => items.iter_mut().for_each(|item| visit(item)),
            Node::Branch { children, .. } => {
                for child in children.iter_mut() {
                    child.traverse_mut(visit);
                }
            }
        }
    }

    pub(crate) fn traverse_break<F>(&self, visit: &mut F) -> StepStatus
    where
        F: FnMut(&T) -> StepStatus,
    {
        match self {
            Node::Leaf { items, .. } => {
                for item in items {
                    if visit(item) == StepStatus::Break {
                        return StepStatus::Break;
                    }
                }
            }
            Node::Branch { children, .. } => {
                for child in children {
                    if child.traverse_break(visit) == StepStatus::Break {
                        return StepStatus::Break;
                    }
                }
            }
        }
        StepStatus::Continue
    }

    pub(crate) fn traverse_mut_break<F>(&mut self, visit: &mut F) -> StepStatus
    where
        F: FnMut(&mut T) -> StepStatus,
    {
        match self {
            Node::Leaf { items, .. } => {
                for item in items.iter_mut() {
                    if visit(item) == StepStatus::Break {
                        return StepStatus::Break;
                    }
                }
            }
            Node::Branch { children, .. } => {
                for child in children.iter_mut() {
                    if child.traverse_mut_break(visit) == StepStatus::Break {
                        return StepStatus::Break;
                    }
                }
            }
        }
        StepStatus::Continue
    }

    /// 区域遍历：剪掉不相交的子节点，叶子中按新鲜坐标过滤
    pub(crate) fn traverse_in<'a, F>(
        &'a self,
        region: &Bounds<M>,
        ctx: &Context<'_, T, M>,
        visit: &mut F,
    ) where
        F: FnMut(&'a T),
    {
        match self {
            Node::Leaf { items, .. } => {
                for item in items {
                    if region.contains(&ctx.locator.locate(item), ctx.axis) {
                        visit(item);
                    }
                }
            }
            Node::Branch { children, .. } => {
                for child in children {
                    if child.bounds().intersects(region, ctx.axis) {
                        child.traverse_in(region, ctx, visit);
                    }
                }
            }
        }
    }

    pub(crate) fn traverse_in_break<F>(
        &self,
        region: &Bounds<M>,
        ctx: &Context<'_, T, M>,
        visit: &mut F,
    ) -> StepStatus
    where
        F: FnMut(&T) -> StepStatus,
    {
        match self {
            Node::Leaf { items, .. } => {
                for item in items {
                    if region.contains(&ctx.locator.locate(item), ctx.axis)
                        && visit(item) == StepStatus::Break
                    {
                        return StepStatus::Break;
                    }
                }
            }
            Node::Branch { children, .. } => {
                for child in children {
                    if child.bounds().intersects(region, ctx.axis)
                        && child.traverse_in_break(region, ctx, visit) == StepStatus::Break
                    {
                        return StepStatus::Break;
                    }
                }
            }
        }
        StepStatus::Continue
    }

    pub(crate) fn traverse_in_mut_break<F>(
        &mut self,
        region: &Bounds<M>,
        ctx: &Context<'_, T, M>,
        visit: &mut F,
    ) -> StepStatus
    where
        F: FnMut(&mut T) -> StepStatus,
    {
        match self {
            Node::Leaf { items, .. } => {
                for item in items.iter_mut() {
                    if region.contains(&ctx.locator.locate(item), ctx.axis)
                        && visit(item) == StepStatus::Break
                    {
                        return StepStatus::Break;
                    }
                }
            }
            Node::Branch { children, .. } => {
                for child in children.iter_mut() {
                    if child.bounds().intersects(region, ctx.axis)
                        && child.traverse_in_mut_break(region, ctx, visit) == StepStatus::Break
                    {
                        return StepStatus::Break;
                    }
                }
            }
        }
        StepStatus::Continue
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::super::super::axis::AxisOps;
    use super::*;
    use crate::config::TreeConfig;

    fn grid_tree() -> Omnitree<(i64, i64), i64> {
        let config = TreeConfig {
            leaf_capacity: 3,
            max_depth: 10,
        };
        let mut tree = Omnitree::with_config(
            vec![0, 0],
            vec![9, 9],
            |p: &(i64, i64)| vec![p.0, p.1],
            AxisOps::integer(),
            &config,
        )
        .unwrap();
        for x in 0..10 {
            for y in 0..10 {
                tree.add((x, y)).unwrap();
            }
        }
        tree
    }

    #[test]
    fn test_stepper_visits_everything() {
        let tree = grid_tree();
        let mut seen = 0;
        tree.stepper(|_| seen += 1);
        assert_eq!(seen, 100);
        assert_eq!(tree.to_vec().len(), 100);
    }

    #[test]
    fn test_stepper_in_region() {
        let tree = grid_tree();
        let region = tree.region(vec![2, 3], vec![4, 5]).unwrap();

        let mut found = tree.query(&region).into_iter().copied().collect::<Vec<_>>();
        found.sort();
        let expected: Vec<(i64, i64)> = (2..=4)
            .flat_map(|x| (3..=5).map(move |y| (x, y)))
            .collect();
        assert_eq!(found, expected);

        let mut visited = 0;
        tree.stepper_in(&region, |_| visited += 1);
        assert_eq!(visited, 9);
    }

    #[test]
    fn test_stepper_in_single_point_and_outside() {
        let tree = grid_tree();
        let point = tree.region(vec![9, 0], vec![9, 0]).unwrap();
        assert_eq!(tree.query(&point), vec![&(9, 0)]);

        let outside = Bounds::new(vec![20, 20], vec![30, 30], tree.axis_ops()).unwrap();
        assert!(tree.query(&outside).is_empty());
    }

    #[test]
    fn test_stepper_break() {
        let tree = grid_tree();
        let mut visited = 0;
        let status = tree.stepper_break(|_| {
            visited += 1;
            if visited == 7 {
                StepStatus::Break
            } else {
                StepStatus::Continue
            }
        });
        assert_eq!(status, StepStatus::Break);
        assert_eq!(visited, 7);

        let region = tree.region(vec![0, 0], vec![1, 1]).unwrap();
        let mut inside = 0;
        let status = tree.stepper_in_break(&region, |_| {
            inside += 1;
            StepStatus::Continue
        });
        assert_eq!(status, StepStatus::Continue);
        assert_eq!(inside, 4);
    }

    #[test]
    fn test_stepper_mut_then_query_uses_fresh_coordinates() {
        let mut tree = grid_tree();
        tree.stepper_mut(|p| {
            if *p == (0, 0) {
                p.1 = 1;
            }
        });
        // 叶子中按新鲜坐标过滤：(0,0) 已经不在原位置
        let origin = tree.region(vec![0, 0], vec![0, 0]).unwrap();
        assert!(tree.query(&origin).is_empty());
        assert_eq!(tree.count(), 100);
    }

    #[test]
    fn test_stepper_mut_in_region() {
        let mut tree = grid_tree();
        let region = tree.region(vec![0, 0], vec![2, 2]).unwrap();
        let mut visited = 0;
        tree.stepper_mut_in(&region, |p| {
            visited += 1;
            p.0 += 7;
        });
        assert_eq!(visited, 9);

        // 修改后的元素在 update_in 之后出现在新位置
        assert!(tree.update_in(&region).is_empty());
        assert!(tree.query(&region).is_empty());
        let moved = tree.region(vec![7, 0], vec![9, 2]).unwrap();
        assert_eq!(tree.query(&moved).len(), 18);
        assert_eq!(tree.count(), 100);

        let outside = Bounds::new(vec![20, 20], vec![30, 30], tree.axis_ops()).unwrap();
        tree.stepper_mut_in(&outside, |_| panic!("nothing lies outside the tree"));
    }

    #[test]
    fn test_stepper_mut_break() {
        let mut tree = grid_tree();
        let mut visited = 0;
        let status = tree.stepper_mut_break(|p| {
            visited += 1;
            p.1 = 100;
            if visited == 5 {
                StepStatus::Break
            } else {
                StepStatus::Continue
            }
        });
        assert_eq!(status, StepStatus::Break);
        assert_eq!(visited, 5);
        assert_eq!(tree.to_vec().iter().filter(|p| p.1 == 100).count(), 5);

        let region = tree.region(vec![5, 5], vec![9, 9]).unwrap();
        let mut inside = 0;
        let status = tree.stepper_mut_in_break(&region, |_| {
            inside += 1;
            if inside == 3 {
                StepStatus::Break
            } else {
                StepStatus::Continue
            }
        });
        assert_eq!(status, StepStatus::Break);
        assert_eq!(inside, 3);

        let status = tree.stepper_mut_in_break(&region, |_| StepStatus::Continue);
        assert_eq!(status, StepStatus::Continue);
    }

    /// 与区域相交的叶子中的元素个数
    fn items_in_intersecting_leaves(
        node: &Node<(i64, i64), i64>,
        region: &Bounds<i64>,
        axis: &AxisOps<i64>,
    ) -> usize {
        if !node.bounds().intersects(region, axis) {
            return 0;
        }
        match node {
            Node::Leaf { items, .. } => items.len(),
            Node::Branch { children, .. } => children
                .iter()
                .map(|child| items_in_intersecting_leaves(child, region, axis))
                .sum(),
        }
    }

    #[test]
    fn test_region_traversal_skips_disjoint_subtrees() {
        let calls = Rc::new(Cell::new(0usize));
        let counter = Rc::clone(&calls);
        let config = TreeConfig {
            leaf_capacity: 3,
            max_depth: 10,
        };
        let mut tree = Omnitree::with_config(
            vec![0, 0],
            vec![9, 9],
            move |p: &(i64, i64)| {
                counter.set(counter.get() + 1);
                vec![p.0, p.1]
            },
            AxisOps::integer(),
            &config,
        )
        .unwrap();
        // 先插入四个角上的点，根节点在 (4, 4) 处分裂
        let corners = [(1, 1), (8, 8), (1, 8), (8, 1)];
        for corner in corners {
            tree.add(corner).unwrap();
        }
        for x in 0..10 {
            for y in 0..10 {
                if !corners.contains(&(x, y)) {
                    tree.add((x, y)).unwrap();
                }
            }
        }

        // 区域完全落在第 0 个子节点内部，不接触兄弟节点的边界
        let region = tree.region(vec![0, 0], vec![2, 2]).unwrap();
        let Node::Branch {
            splits, children, ..
        } = tree.root()
        else {
            panic!("expected branch");
        };
        assert_eq!(splits, &vec![4, 4]);
        assert!(children[0].bounds().encloses(&region, tree.axis_ops()));
        for sibling in &children[1..] {
            assert!(!sibling.bounds().intersects(&region, tree.axis_ops()));
        }
        let first_child = children[0].len();
        assert_eq!(first_child, 25);
        let expected = items_in_intersecting_leaves(tree.root(), &region, tree.axis_ops());
        assert!((9..=first_child).contains(&expected));

        calls.set(0);
        assert_eq!(tree.query(&region).len(), 9);
        assert_eq!(calls.get(), expected);

        calls.set(0);
        tree.stepper_in(&region, |_| {});
        assert_eq!(calls.get(), expected);

        calls.set(0);
        tree.stepper_mut_in(&region, |_| {});
        assert_eq!(calls.get(), expected);

        calls.set(0);
        let status = tree.stepper_in_break(&region, |_| StepStatus::Continue);
        assert_eq!(status, StepStatus::Continue);
        assert_eq!(calls.get(), expected);
    }
}
