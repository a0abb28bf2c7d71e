use serde::{Deserialize, Serialize};

use crate::omnitree::OmnitreeError;

/// Omnitree 配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OmnitreeConfig {
    /// 树结构参数
    #[serde(default)]
    pub tree: TreeConfig,

    /// 日志配置
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// 树结构参数
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeConfig {
    /// 叶子容量：叶子元素数超过该值时分裂，分支元素数不超过该值时折叠
    #[serde(default = "default_leaf_capacity")]
    pub leaf_capacity: usize,

    /// 深度上限（根为第 1 层），到达上限的叶子不再分裂
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// 日志级别：trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

// ============================================================================
// 默认值函数
// ============================================================================

fn default_leaf_capacity() -> usize {
    16
}

fn default_max_depth() -> usize {
    24
}

fn default_log_level() -> String {
    "info".to_string()
}

// ============================================================================
// 实现
// ============================================================================

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            leaf_capacity: default_leaf_capacity(),
            max_depth: default_max_depth(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl TreeConfig {
    /// 验证树参数：叶子容量与深度上限都至少为 1
    pub fn validate(&self) -> crate::Result<()> {
        if self.leaf_capacity < 1 {
            return Err(OmnitreeError::InvalidConfig(
                "leaf_capacity must be at least 1".to_string(),
            ));
        }
        if self.max_depth < 1 {
            return Err(OmnitreeError::InvalidConfig(
                "max_depth must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl OmnitreeConfig {
    /// 从文件加载配置
    ///
    /// 配置加载顺序（优先级从低到高）：
    /// 1. 默认配置（内嵌的 default.toml）
    /// 2. 用户配置文件（可选，TOML 格式）
    /// 3. 环境变量（OMNITREE__ 前缀，使用双下划线分隔嵌套）
    ///
    /// # 示例
    ///
    /// ```no_run
    /// use omnitree::config::OmnitreeConfig;
    ///
    /// // 加载配置（如果文件不存在，使用默认配置）
    /// let config = OmnitreeConfig::from_file("omnitree.toml").unwrap();
    /// ```
    pub fn from_file(path: &str) -> crate::Result<Self> {
        let settings = config::Config::builder()
            // 1. 加载默认配置（内嵌）
            .add_source(config::File::from_str(
                include_str!("default.toml"),
                config::FileFormat::Toml,
            ))
            // 2. 加载用户配置（可选，不存在不报错）
            .add_source(config::File::new(path, config::FileFormat::Toml).required(false))
            // 3. 加载环境变量（OMNITREE__TREE__LEAF_CAPACITY=32）
            .add_source(
                config::Environment::with_prefix("OMNITREE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// 保存配置到文件
    ///
    /// # 示例
    ///
    /// ```no_run
    /// use omnitree::config::OmnitreeConfig;
    ///
    /// let config = OmnitreeConfig::default();
    /// config.save_to_file("omnitree.toml").unwrap();
    /// ```
    pub fn save_to_file(&self, path: &str) -> crate::Result<()> {
        let toml_string = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_string)?;
        Ok(())
    }

    /// 验证配置
    ///
    /// 检查树参数与日志级别
    pub fn validate(&self) -> crate::Result<()> {
        self.tree.validate()?;

        match self.logging.level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(OmnitreeError::InvalidConfig(format!(
                    "Invalid log level: '{}'. Must be one of: trace, debug, info, warn, error",
                    self.logging.level
                )))
            }
        }

        Ok(())
    }

    /// 打印配置摘要
    pub fn print_summary(&self) {
        println!("📋 Omnitree Configuration:");
        println!("   Leaf Capacity: {}", self.tree.leaf_capacity);
        println!("   Max Depth:     {}", self.tree.max_depth);
        println!();
        println!("   Log Level:     {}", self.logging.level);
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = OmnitreeConfig::default();
        assert_eq!(config.tree.leaf_capacity, 16);
        assert_eq!(config.tree.max_depth, 24);
        assert_eq!(config.logging.level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = OmnitreeConfig::default();

        // 无效叶子容量
        config.tree.leaf_capacity = 0;
        assert!(matches!(
            config.validate(),
            Err(OmnitreeError::InvalidConfig(_))
        ));
        config.tree.leaf_capacity = 4;

        // 无效深度上限
        config.tree.max_depth = 0;
        assert!(config.validate().is_err());
        config.tree.max_depth = 1;
        assert!(config.validate().is_ok());

        // 无效日志级别
        config.logging.level = "invalid".to_string();
        assert!(config.validate().is_err());
        config.logging.level = "DEBUG".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_save_and_load() {
        let mut config = OmnitreeConfig::default();
        config.tree.leaf_capacity = 7;
        config.tree.max_depth = 5;
        config.logging.level = "debug".to_string();

        let temp_file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        let path = temp_file.path().to_str().unwrap();

        // 保存
        config.save_to_file(path).unwrap();

        // 加载
        let loaded = OmnitreeConfig::from_file(path).unwrap();
        assert_eq!(loaded.tree, config.tree);
        assert_eq!(loaded.logging.level, "debug");
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let loaded = OmnitreeConfig::from_file(path.to_str().unwrap()).unwrap();
        assert_eq!(loaded.tree, TreeConfig::default());
    }
}
