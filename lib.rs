pub mod config;
pub mod omnitree;

// 重新导出主要的公共接口
pub use omnitree::{
    AxisOps, Bounds, Coordinate, Locator, Node, NodeType, Omnitree, OmnitreeError, StepStatus,
    MAX_DIMENSIONS,
};

// 重新导出配置类型，便于二进制文件使用
pub use config::{LoggingConfig, OmnitreeConfig, TreeConfig};

pub type Result<T> = std::result::Result<T, OmnitreeError>;
