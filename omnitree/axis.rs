use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;

use super::error::OmnitreeError;

/// 坐标：长度为 D 的轴值向量
///
/// 坐标由定位函数按需计算，不会跨操作缓存，因此元素在树外移动后
/// 只能通过重新定位（`update`）被发现。
pub type Coordinate<M> = Vec<M>;

type CompareFn<M> = Rc<dyn Fn(&M, &M) -> Ordering>;
type AverageFn<M> = Rc<dyn Fn(&M, &M) -> M>;
type LocateFn<T, M> = Rc<dyn Fn(&T) -> Coordinate<M>>;

/// 单轴操作：比较函数与求平均函数
///
/// 两个函数都必须是确定性的纯函数；这一前提不做检查，违反时
/// 表现为查询结果错误而不是崩溃。
#[derive(Clone)]
pub struct AxisOps<M> {
    compare: CompareFn<M>,
    average: AverageFn<M>,
}

impl<M> AxisOps<M> {
    /// 使用调用方提供的比较函数和求平均函数创建
    pub fn new<C, A>(compare: C, average: A) -> Self
    where
        C: Fn(&M, &M) -> Ordering + 'static,
        A: Fn(&M, &M) -> M + 'static,
    {
        AxisOps {
            compare: Rc::new(compare),
            average: Rc::new(average),
        }
    }

    pub fn compare(&self, left: &M, right: &M) -> Ordering {
        (self.compare)(left, right)
    }

    pub fn average(&self, left: &M, right: &M) -> M {
        (self.average)(left, right)
    }

    /// 判断 `value` 是否落在闭区间 `[min, max]` 内
    pub fn within(&self, value: &M, min: &M, max: &M) -> bool {
        self.compare(value, min) != Ordering::Less && self.compare(value, max) != Ordering::Greater
    }

    /// 两个坐标是否在每个轴上都比较相等
    pub fn coincide(&self, left: &[M], right: &[M]) -> bool {
        left.len() == right.len()
            && left
                .iter()
                .zip(right)
                .all(|(a, b)| self.compare(a, b) == Ordering::Equal)
    }

    /// 用二元求平均函数对一组值做两两折半归约
    ///
    /// 元素个数为 2 的幂时，数值类型上得到的正好是算术平均；否则落单的
    /// 元素直接进入下一轮，结果是近似值。分裂只需要一个近似的中位点。
    pub fn average_all<'a, I>(&self, values: I) -> Option<M>
    where
        I: IntoIterator<Item = &'a M>,
        M: Clone + 'a,
    {
        let mut layer: Vec<M> = values.into_iter().cloned().collect();
        while layer.len() > 1 {
            let mut next = Vec::with_capacity(layer.len() / 2 + 1);
            for pair in layer.chunks(2) {
                if let [left, right] = pair {
                    next.push(self.average(left, right));
                } else {
                    next.push(pair[0].clone());
                }
            }
            layer = next;
        }
        layer.pop()
    }
}

impl AxisOps<f64> {
    /// `f64` 轴：`total_cmp` 比较，溢出安全的中点
    ///
    /// 比较前先加 `0.0` 把 `-0.0` 规范为 `0.0`，两者视为相等，因此下界为
    /// `0.0` 的树可以接受 `-0.0` 坐标。NaN 按 `total_cmp` 排在两端，
    /// 总是落在有限边界之外。
    pub fn float() -> Self {
        AxisOps::new(
            |a: &f64, b: &f64| (a + 0.0).total_cmp(&(b + 0.0)),
            |a: &f64, b: &f64| a / 2.0 + b / 2.0,
        )
    }
}

impl AxisOps<i64> {
    /// `i64` 轴：向下取整的中点，不会溢出
    pub fn integer() -> Self {
        AxisOps::new(
            |a: &i64, b: &i64| a.cmp(b),
            |a: &i64, b: &i64| (a >> 1) + (b >> 1) + (a & b & 1),
        )
    }
}

impl<M> fmt::Debug for AxisOps<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AxisOps").finish_non_exhaustive()
    }
}

/// 定位函数：把元素映射到它的 D 维坐标
#[derive(Clone)]
pub struct Locator<T, M> {
    locate: LocateFn<T, M>,
}

impl<T, M> Locator<T, M> {
    pub fn new<F>(locate: F) -> Self
    where
        F: Fn(&T) -> Coordinate<M> + 'static,
    {
        Locator {
            locate: Rc::new(locate),
        }
    }

    pub fn locate(&self, item: &T) -> Coordinate<M> {
        (self.locate)(item)
    }

    /// 定位并检查坐标维度
    pub fn locate_checked(&self, item: &T, dimensions: usize) -> crate::Result<Coordinate<M>> {
        let coordinate = self.locate(item);
        if coordinate.len() != dimensions {
            return Err(OmnitreeError::DimensionMismatch {
                expected: dimensions,
                actual: coordinate.len(),
            });
        }
        Ok(coordinate)
    }
}

impl<T, M> fmt::Debug for Locator<T, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Locator").finish_non_exhaustive()
    }
}
