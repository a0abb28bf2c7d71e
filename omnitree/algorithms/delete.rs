use tracing::debug;

use super::super::bounds::Bounds;
use super::super::error::OmnitreeError;
use super::super::node::{orthant_of, Context, Node};
use super::super::omnitree::Omnitree;

/// 删除操作相关算法
impl<T, M: Clone> Omnitree<T, M> {
    /// 删除坐标落在 `region` 内的所有元素，返回删除数量
    pub fn remove_region(&mut self, region: &Bounds<M>) -> usize {
        self.remove_region_where(region, |_| true)
    }

    /// 删除坐标落在 `region` 内且满足谓词的元素
    pub fn remove_region_where<P>(&mut self, region: &Bounds<M>, mut predicate: P) -> usize
    where
        P: FnMut(&T) -> bool,
    {
        let (root, ctx) = self.root_and_context();
        if !root.bounds().intersects(region, ctx.axis) {
            return 0;
        }
        let removed = root.remove_matching(Some(region), &mut predicate, &ctx);
        *self.count_mut() -= removed;
        debug!(removed, remaining = self.count(), "region removal");
        removed
    }

    /// 删除所有满足谓词的元素
    pub fn remove_where<P>(&mut self, mut predicate: P) -> usize
    where
        P: FnMut(&T) -> bool,
    {
        let (root, ctx) = self.root_and_context();
        let removed = root.remove_matching(None, &mut predicate, &ctx);
        *self.count_mut() -= removed;
        debug!(removed, remaining = self.count(), "predicate removal");
        removed
    }

    /// 删除与 `item` 坐标相同且 `equate` 判定相等的所有元素
    ///
    /// 按 `item` 的坐标直接选路到唯一可能的叶子。多个匹配元素会一起被删除。
    ///
    /// # 错误
    /// - `DimensionMismatch` - `item` 的坐标维度与树不一致
    /// - `NotFound` - 没有任何元素被删除
    pub fn remove_item<E>(&mut self, item: &T, mut equate: E) -> crate::Result<()>
    where
        E: FnMut(&T, &T) -> bool,
    {
        let coordinate = self.locator().locate_checked(item, self.dimensions())?;
        if !self.bounds().contains(&coordinate, self.axis_ops()) {
            return Err(OmnitreeError::NotFound);
        }

        let (root, ctx) = self.root_and_context();
        let removed = root.remove_at(&coordinate, &mut |candidate: &T| equate(candidate, item), &ctx);
        if removed == 0 {
            return Err(OmnitreeError::NotFound);
        }
        *self.count_mut() -= removed;
        debug!(removed, remaining = self.count(), "item removal");
        Ok(())
    }

    /// 不返回错误的 `remove_item`：返回是否删除了元素
    pub fn try_remove_item<E>(&mut self, item: &T, equate: E) -> bool
    where
        E: FnMut(&T, &T) -> bool,
    {
        self.remove_item(item, equate).is_ok()
    }

    /// 使用 `PartialEq` 判等的 `remove_item`
    pub fn remove_item_eq(&mut self, item: &T) -> crate::Result<()>
    where
        T: PartialEq,
    {
        self.remove_item(item, |candidate, target| candidate == target)
    }
}

impl<T, M: Clone> Node<T, M> {
    /// 删除 `region`（为 `None` 时不限区域）内满足谓词的元素
    ///
    /// 返回删除数量；删除后元素数不超过叶子容量的分支会被折叠。
    pub(crate) fn remove_matching<P>(
        &mut self,
        region: Option<&Bounds<M>>,
        predicate: &mut P,
        ctx: &Context<'_, T, M>,
    ) -> usize
    where
        P: FnMut(&T) -> bool,
    {
        let removed = match self {
            Node::Leaf { items, .. } => {
                let before = items.len();
                items.retain(|item| {
                    let inside = region
                        .map_or(true, |r| r.contains(&ctx.locator.locate(item), ctx.axis));
                    !(inside && predicate(item))
                });
                before - items.len()
            }
            Node::Branch {
                children, count, ..
            } => {
                let mut removed = 0;
                for child in children.iter_mut() {
                    if region.map_or(true, |r| child.bounds().intersects(r, ctx.axis)) {
                        removed += child.remove_matching(region, predicate, ctx);
                    }
                }
                *count -= removed;
                removed
            }
        };
        if removed > 0 {
            self.collapse_if_sparse(ctx);
        }
        removed
    }

    /// 沿坐标选路，删除坐标完全相同且 `equate` 成立的元素
    pub(crate) fn remove_at<E>(
        &mut self,
        coordinate: &[M],
        equate: &mut E,
        ctx: &Context<'_, T, M>,
    ) -> usize
    where
        E: FnMut(&T) -> bool,
    {
        let removed = match self {
            Node::Leaf { items, .. } => {
                let before = items.len();
                items.retain(|item| {
                    let same = ctx.axis.coincide(&ctx.locator.locate(item), coordinate);
                    !(same && equate(item))
                });
                before - items.len()
            }
            Node::Branch {
                splits,
                children,
                count,
                ..
            } => {
                let orthant = orthant_of(splits, coordinate, ctx.axis);
                let removed = children[orthant].remove_at(coordinate, equate, ctx);
                *count -= removed;
                removed
            }
        };
        if removed > 0 {
            self.collapse_if_sparse(ctx);
        }
        removed
    }
}
