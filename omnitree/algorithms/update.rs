use tracing::{debug, warn};

use super::super::bounds::Bounds;
use super::super::node::{owns, Context, Node};
use super::super::omnitree::Omnitree;

/// 更新（重新定位）算法
///
/// 元素在树外被修改后坐标可能已经变化。更新分两步：
/// 1. 从叶子中取出不再属于该叶子的元素（按选路规则判断归属）
/// 2. 从根节点重新插入这些元素；已经离开全局边界的元素被移出树并返回
impl<T, M: Clone> Omnitree<T, M> {
    /// 重新定位所有元素
    ///
    /// 返回坐标已经移出全局边界（或维度不再匹配）而被移出树的元素。
    pub fn update(&mut self) -> Vec<T> {
        self.relocate(None)
    }

    /// 只重新定位与 `region` 相交的叶子中的元素
    ///
    /// 元素当前所在的叶子必须与区域相交才会被检查；被移到区域外的元素
    /// 同样会重新插入到正确的位置。
    pub fn update_in(&mut self, region: &Bounds<M>) -> Vec<T> {
        self.relocate(Some(region))
    }

    fn relocate(&mut self, region: Option<&Bounds<M>>) -> Vec<T> {
        let mut displaced = Vec::new();
        let (root, ctx) = self.root_and_context();
        if region.map_or(true, |r| root.bounds().intersects(r, ctx.axis)) {
            root.extract_displaced(0, region, &mut displaced, &ctx);
        }
        *self.count_mut() -= displaced.len();

        let moved = displaced.len();
        let mut evicted = Vec::new();
        for item in displaced {
            let located = self.locator().locate_checked(&item, self.dimensions());
            match located {
                Ok(coordinate) if self.bounds().contains(&coordinate, self.axis_ops()) => {
                    self.insert_located(item, &coordinate);
                }
                _ => evicted.push(item),
            }
        }

        if !evicted.is_empty() {
            warn!(
                evicted = evicted.len(),
                "items moved outside the tree bounds and were removed"
            );
        }
        debug!(moved, evicted = evicted.len(), count = self.count(), "update finished");
        evicted
    }
}

impl<T, M: Clone> Node<T, M> {
    /// 取出不再属于所在叶子的元素，追加到 `out`，返回取出数量
    ///
    /// `open_min` 记录哪些轴上本节点位于祖先分裂的大侧（下边界为开区间）。
    /// 取出后元素数不超过叶子容量的分支会被折叠。
    pub(crate) fn extract_displaced(
        &mut self,
        open_min: usize,
        region: Option<&Bounds<M>>,
        out: &mut Vec<T>,
        ctx: &Context<'_, T, M>,
    ) -> usize {
        let displaced = match self {
            Node::Leaf { bounds, items } => {
                let (kept, moved): (Vec<T>, Vec<T>) = std::mem::take(items)
                    .into_iter()
                    .partition(|item| owns(bounds, open_min, &ctx.locator.locate(item), ctx.axis));
                *items = kept;
                let displaced = moved.len();
                out.extend(moved);
                displaced
            }
            Node::Branch {
                children, count, ..
            } => {
                let mut displaced = 0;
                for (orthant, child) in children.iter_mut().enumerate() {
                    if region.map_or(true, |r| child.bounds().intersects(r, ctx.axis)) {
                        displaced += child.extract_displaced(open_min | orthant, region, out, ctx);
                    }
                }
                *count -= displaced;
                displaced
            }
        };
        if displaced > 0 {
            self.collapse_if_sparse(ctx);
        }
        displaced
    }
}
