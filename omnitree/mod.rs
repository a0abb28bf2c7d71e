pub mod algorithms;
pub mod axis;
pub mod bounds;
pub mod error;
pub mod node;
#[allow(clippy::module_inception)]
pub mod omnitree;

/// 维度上限：每次分裂都会分配 2^D 个子节点
pub const MAX_DIMENSIONS: usize = 16;

// 重新导出主要类型
pub use algorithms::debug::{NodeVisualization, TreeVisualization};
pub use axis::{AxisOps, Coordinate, Locator};
pub use bounds::Bounds;
pub use error::OmnitreeError;
pub use node::{Node, NodeType};
pub use omnitree::{Omnitree, StepStatus};
