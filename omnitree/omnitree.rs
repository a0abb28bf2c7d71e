use super::axis::{AxisOps, Coordinate, Locator};
use super::bounds::Bounds;
use super::error::OmnitreeError;
use super::node::{Context, Node};
use super::MAX_DIMENSIONS;
use crate::config::TreeConfig;

/// 遍历回调的返回状态，用于提前结束遍历
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    Continue,
    Break,
}

/// Omnitree 主结构 - 维度无关的空间索引
///
/// 把一个固定的 D 维超矩形递归划分为 2^D 个子区域。元素的坐标由定位函数
/// 按需计算，轴值的比较与求平均由调用方提供。
///
/// 树不是线程安全的，所有修改和遍历都需要调用方串行化。
#[derive(Debug, Clone)]
pub struct Omnitree<T, M> {
    /// 根节点（初始为空叶子）
    root: Node<T, M>,
    /// 全局边界，构造后固定，不会自动扩张
    bounds: Bounds<M>,
    /// 每个轴上 `average(min, max)`
    origin: Vec<M>,
    dimensions: usize,
    count: usize,
    axis: AxisOps<M>,
    locator: Locator<T, M>,
    /// 分裂阈值：叶子元素数超过该值时分裂；分支元素数不超过该值时折叠
    leaf_capacity: usize,
    /// 深度上限，达到上限的叶子不再分裂
    max_depth: usize,
}

impl<T, M: Clone> Omnitree<T, M> {
    /// 使用默认参数创建 Omnitree
    ///
    /// # 参数
    /// * `min` / `max` - 全局边界，每个轴上 `min <= max`
    /// * `locate` - 把元素映射到 D 维坐标的函数
    /// * `axis` - 轴值的比较与求平均函数
    ///
    /// # 示例
    /// ```
    /// use omnitree::{AxisOps, Omnitree};
    ///
    /// let tree: Omnitree<[f64; 2], f64> = Omnitree::new(
    ///     vec![0.0, 0.0],
    ///     vec![100.0, 100.0],
    ///     |p: &[f64; 2]| p.to_vec(),
    ///     AxisOps::float(),
    /// )
    /// .unwrap();
    /// assert!(tree.is_empty());
    /// assert_eq!(tree.dimensions(), 2);
    /// ```
    pub fn new<F>(min: Vec<M>, max: Vec<M>, locate: F, axis: AxisOps<M>) -> crate::Result<Self>
    where
        F: Fn(&T) -> Coordinate<M> + 'static,
    {
        Self::with_config(min, max, locate, axis, &TreeConfig::default())
    }

    /// 使用指定的树参数创建 Omnitree
    pub fn with_config<F>(
        min: Vec<M>,
        max: Vec<M>,
        locate: F,
        axis: AxisOps<M>,
        config: &TreeConfig,
    ) -> crate::Result<Self>
    where
        F: Fn(&T) -> Coordinate<M> + 'static,
    {
        config.validate()?;

        let dimensions = min.len();
        if dimensions == 0 || dimensions > MAX_DIMENSIONS {
            return Err(OmnitreeError::InvalidDimensions { dimensions });
        }
        let bounds = Bounds::new(min, max, &axis)?;

        // 求平均函数必须把中点落在区间内，否则分裂出的子区域无法划分父区域
        let origin = bounds.center(&axis);
        for (i, center) in origin.iter().enumerate() {
            if !axis.within(center, &bounds.min()[i], &bounds.max()[i]) {
                return Err(OmnitreeError::InvalidAverage { axis: i });
            }
        }

        Ok(Omnitree {
            root: Node::new_leaf(bounds.clone()),
            bounds,
            origin,
            dimensions,
            count: 0,
            axis,
            locator: Locator::new(locate),
            leaf_capacity: config.leaf_capacity,
            max_depth: config.max_depth,
        })
    }

    /// 用树的轴操作构造一个查询区域
    ///
    /// # 错误
    /// 维度与树不一致返回 `DimensionMismatch`，某轴 `min > max` 返回 `InvalidBounds`
    pub fn region(&self, min: Vec<M>, max: Vec<M>) -> crate::Result<Bounds<M>> {
        let actual = if min.len() != self.dimensions { min.len() } else { max.len() };
        if actual != self.dimensions {
            return Err(OmnitreeError::DimensionMismatch {
                expected: self.dimensions,
                actual,
            });
        }
        Bounds::new(min, max, &self.axis)
    }

    /// 元素个数
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// 全局边界的中心在 `axis` 轴上的值
    pub fn origin(&self, axis: usize) -> Option<&M> {
        self.origin.get(axis)
    }

    pub fn min(&self, axis: usize) -> Option<&M> {
        self.bounds.min().get(axis)
    }

    pub fn max(&self, axis: usize) -> Option<&M> {
        self.bounds.max().get(axis)
    }

    pub fn bounds(&self) -> &Bounds<M> {
        &self.bounds
    }

    pub fn axis_ops(&self) -> &AxisOps<M> {
        &self.axis
    }

    pub fn locator(&self) -> &Locator<T, M> {
        &self.locator
    }

    pub fn leaf_capacity(&self) -> usize {
        self.leaf_capacity
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// 树的深度（只有根叶子时为 1）
    pub fn depth(&self) -> usize {
        self.root.depth()
    }

    pub fn node_count(&self) -> usize {
        self.root.node_count()
    }

    pub fn leaf_count(&self) -> usize {
        self.root.leaf_count()
    }

    /// 清空树：回到一个覆盖原全局边界的空叶子
    pub fn clear(&mut self) {
        self.root = Node::new_leaf(self.bounds.clone());
        self.count = 0;
    }

    /// 根节点（只读，用于检查树结构）
    pub fn root(&self) -> &Node<T, M> {
        &self.root
    }

    /// 内部方法：同时借出根节点（可变）与算法上下文
    pub(crate) fn root_and_context(&mut self) -> (&mut Node<T, M>, Context<'_, T, M>) {
        (
            &mut self.root,
            Context {
                axis: &self.axis,
                locator: &self.locator,
                leaf_capacity: self.leaf_capacity,
                max_depth: self.max_depth,
            },
        )
    }

    /// 内部方法：获取只读算法上下文
    pub(crate) fn context(&self) -> Context<'_, T, M> {
        Context {
            axis: &self.axis,
            locator: &self.locator,
            leaf_capacity: self.leaf_capacity,
            max_depth: self.max_depth,
        }
    }

    pub(crate) fn count_mut(&mut self) -> &mut usize {
        &mut self.count
    }
}
