use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::axis::AxisOps;
use super::error::OmnitreeError;

/// 轴对齐的超矩形边界 - 每个轴上都是闭区间 `[min, max]`
///
/// 任何构造出来的 `Bounds` 都满足 `min[axis] <= max[axis]`。
/// 轴值类型本身不要求有序，比较统一交给调用方的 [`AxisOps`]。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bounds<M> {
    min: Vec<M>,
    max: Vec<M>,
}

impl<M: Clone> Bounds<M> {
    /// 创建新的边界，检查维度一致以及每个轴上 `min <= max`
    pub fn new(min: Vec<M>, max: Vec<M>, axis: &AxisOps<M>) -> crate::Result<Self> {
        if min.len() != max.len() {
            return Err(OmnitreeError::BoundsLengthMismatch {
                min: min.len(),
                max: max.len(),
            });
        }
        for (index, (low, high)) in min.iter().zip(&max).enumerate() {
            if axis.compare(low, high) == Ordering::Greater {
                return Err(OmnitreeError::InvalidBounds { axis: index });
            }
        }
        Ok(Bounds { min, max })
    }

    pub fn dimensions(&self) -> usize {
        self.min.len()
    }

    pub fn min(&self) -> &[M] {
        &self.min
    }

    pub fn max(&self) -> &[M] {
        &self.max
    }

    /// 判断点是否在边界内（每个轴都是闭区间）
    ///
    /// 维度不一致的点一律视为不在边界内。
    pub fn contains(&self, point: &[M], axis: &AxisOps<M>) -> bool {
        point.len() == self.dimensions()
            && point
                .iter()
                .zip(self.min.iter().zip(&self.max))
                .all(|(value, (low, high))| axis.within(value, low, high))
    }

    /// 判断两个边界是否相交（每个轴上的区间都有重叠）
    pub fn intersects(&self, other: &Bounds<M>, axis: &AxisOps<M>) -> bool {
        self.dimensions() == other.dimensions()
            && (0..self.dimensions()).all(|i| {
                axis.compare(&self.min[i], &other.max[i]) != Ordering::Greater
                    && axis.compare(&self.max[i], &other.min[i]) != Ordering::Less
            })
    }

    /// 判断当前边界是否完整包含另一个边界
    pub fn encloses(&self, other: &Bounds<M>, axis: &AxisOps<M>) -> bool {
        self.dimensions() == other.dimensions()
            && (0..self.dimensions()).all(|i| {
                axis.compare(&self.min[i], &other.min[i]) != Ordering::Greater
                    && axis.compare(&self.max[i], &other.max[i]) != Ordering::Less
            })
    }

    /// 在 `axis_index` 轴上以 `value` 切开，返回 (小侧, 大侧)
    ///
    /// 要求 `min[axis_index] <= value <= max[axis_index]`。
    pub fn split(
        &self,
        axis_index: usize,
        value: &M,
        axis: &AxisOps<M>,
    ) -> crate::Result<(Bounds<M>, Bounds<M>)> {
        let (Some(low), Some(high)) = (self.min.get(axis_index), self.max.get(axis_index)) else {
            return Err(OmnitreeError::DimensionMismatch {
                expected: self.dimensions(),
                actual: axis_index + 1,
            });
        };
        if !axis.within(value, low, high) {
            return Err(OmnitreeError::InvalidBounds { axis: axis_index });
        }

        let mut less = self.clone();
        let mut greater = self.clone();
        less.max[axis_index] = value.clone();
        greater.min[axis_index] = value.clone();
        Ok((less, greater))
    }

    /// 计算某个卦限（orthant）子节点的边界
    ///
    /// 卦限编码的第 i 位为 1 表示第 i 轴取大侧 `[split, max]`，为 0 表示
    /// 取小侧 `[min, split]`。调用方保证 `splits` 每个值都在对应区间内。
    pub fn orthant(&self, orthant: usize, splits: &[M]) -> Bounds<M> {
        let mut child = self.clone();
        for (i, split) in splits.iter().enumerate().take(self.dimensions()) {
            if orthant & (1 << i) != 0 {
                child.min[i] = split.clone();
            } else {
                child.max[i] = split.clone();
            }
        }
        child
    }

    /// 计算中心点：每个轴上 `average(min, max)`
    pub fn center(&self, axis: &AxisOps<M>) -> Vec<M> {
        self.min
            .iter()
            .zip(&self.max)
            .map(|(low, high)| axis.average(low, high))
            .collect()
    }
}
