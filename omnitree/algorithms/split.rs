use tracing::debug;

use super::super::axis::{AxisOps, Coordinate};
use super::super::bounds::Bounds;
use super::super::node::{orthant_of, Context, Node};

/// 节点分裂与折叠算法
impl<T, M: Clone> Node<T, M> {
    /// 叶子是否需要分裂：元素数超过容量，分裂后的子节点不超过深度上限，
    /// 且元素坐标不全相同
    ///
    /// 坐标全部重合的元素任何分裂值都分不开，这样的叶子允许超出容量。
    pub(crate) fn should_split(&self, depth: usize, ctx: &Context<'_, T, M>) -> bool {
        let Node::Leaf { items, .. } = self else {
            return false;
        };
        items.len() > ctx.leaf_capacity && depth + 1 < ctx.max_depth && !coincident(items, ctx)
    }

    /// 分裂叶子节点（Leaf -> Branch）
    ///
    /// 1. 每个轴上对元素坐标做近似平均，得到分裂值
    /// 2. 分裂值把所有元素分到同一个卦限时，改用边界中心
    /// 3. 按卦限划分出 2^D 个子叶子，元素按同一选路规则分配
    /// 4. 仍然超出容量的子叶子继续分裂
    pub(crate) fn split(&mut self, depth: usize, ctx: &Context<'_, T, M>) {
        let Node::Leaf { bounds, items } = self else {
            return;
        };
        let bounds = bounds.clone();
        let items = std::mem::take(items);
        let coordinates: Vec<Coordinate<M>> =
            items.iter().map(|item| ctx.locator.locate(item)).collect();

        let mut splits = choose_splits(&bounds, &coordinates, ctx.axis);
        if single_orthant(&splits, &coordinates, ctx.axis) {
            splits = center_splits(&bounds, ctx.axis);
        }

        let orthants = 1usize << bounds.dimensions();
        let mut buckets: Vec<Vec<T>> = (0..orthants).map(|_| Vec::new()).collect();
        let count = items.len();
        for (item, coordinate) in items.into_iter().zip(&coordinates) {
            buckets[orthant_of(&splits, coordinate, ctx.axis)].push(item);
        }

        let mut children: Vec<Node<T, M>> = buckets
            .into_iter()
            .enumerate()
            .map(|(orthant, items)| Node::Leaf {
                bounds: bounds.orthant(orthant, &splits),
                items,
            })
            .collect();
        for child in &mut children {
            if child.should_split(depth + 1, ctx) {
                child.split(depth + 1, ctx);
            }
        }

        debug!(depth, count, orthants, "leaf split into branch");
        *self = Node::Branch {
            bounds,
            splits,
            children,
            count,
        };
    }

    /// 折叠稀疏的分支节点（Branch -> Leaf）
    ///
    /// 子树元素数不超过叶子容量时，把所有元素收回到一个覆盖相同边界的
    /// 叶子中。返回是否发生了折叠。
    pub(crate) fn collapse_if_sparse(&mut self, ctx: &Context<'_, T, M>) -> bool {
        let Node::Branch {
            bounds,
            children,
            count,
            ..
        } = self
        else {
            return false;
        };
        if *count > ctx.leaf_capacity {
            return false;
        }

        let bounds = bounds.clone();
        let mut items = Vec::with_capacity(*count);
        for child in std::mem::take(children) {
            child.drain_into(&mut items);
        }

        debug!(count = items.len(), "branch collapsed into leaf");
        *self = Node::Leaf { bounds, items };
        true
    }
}

/// 所有元素的坐标是否全部相同
fn coincident<T, M>(items: &[T], ctx: &Context<'_, T, M>) -> bool {
    let mut coordinates = items.iter().map(|item| ctx.locator.locate(item));
    match coordinates.next() {
        Some(first) => coordinates.all(|c| ctx.axis.coincide(&first, &c)),
        None => true,
    }
}

/// 每个轴上的分裂值：元素坐标的近似平均，落在边界外时退回边界中点
fn choose_splits<M: Clone>(
    bounds: &Bounds<M>,
    coordinates: &[Coordinate<M>],
    axis: &AxisOps<M>,
) -> Vec<M> {
    (0..bounds.dimensions())
        .map(|i| {
            let (low, high) = (&bounds.min()[i], &bounds.max()[i]);
            axis.average_all(coordinates.iter().filter_map(|c| c.get(i)))
                .filter(|value| axis.within(value, low, high))
                .unwrap_or_else(|| midpoint(low, high, axis))
        })
        .collect()
}

fn center_splits<M: Clone>(bounds: &Bounds<M>, axis: &AxisOps<M>) -> Vec<M> {
    bounds
        .min()
        .iter()
        .zip(bounds.max())
        .map(|(low, high)| midpoint(low, high, axis))
        .collect()
}

fn midpoint<M: Clone>(low: &M, high: &M, axis: &AxisOps<M>) -> M {
    let mid = axis.average(low, high);
    if axis.within(&mid, low, high) {
        mid
    } else {
        low.clone()
    }
}

/// 所有坐标是否都落在同一个卦限
fn single_orthant<M>(splits: &[M], coordinates: &[Coordinate<M>], axis: &AxisOps<M>) -> bool {
    let mut orthants = coordinates.iter().map(|c| orthant_of(splits, c, axis));
    match orthants.next() {
        Some(first) => orthants.all(|o| o == first),
        None => true,
    }
}
