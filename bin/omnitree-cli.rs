use std::time::Instant;

use clap::Parser;
use colored::*;
use omnitree::{AxisOps, Omnitree, OmnitreeConfig, OmnitreeError, Result, MAX_DIMENSIONS};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{info, Level};

const EXTENT: f64 = 1000.0;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// 配置文件路径
    #[arg(short, long, default_value = "omnitree.toml")]
    config: String,

    /// 生成默认配置文件并退出
    #[arg(long)]
    generate_config: bool,

    /// 维度数
    #[arg(short, long, default_value_t = 2)]
    dimensions: usize,

    /// 随机生成的元素个数
    #[arg(short = 'n', long, default_value_t = 10_000)]
    items: usize,

    /// 随机种子
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// 查询区域占全局体积的百分比
    #[arg(long, default_value_t = 5.0)]
    coverage: f64,

    /// 每个元素每轮移动的最大距离
    #[arg(long, default_value_t = 25.0)]
    jitter: f64,

    /// Leaf capacity (overrides config file)
    #[arg(long)]
    leaf_capacity: Option<usize>,

    /// Max depth (overrides config file)
    #[arg(long)]
    max_depth: Option<usize>,

    /// Log level (overrides config file)
    #[arg(long)]
    log_level: Option<String>,

    /// 打印最终的树结构
    #[arg(long)]
    print_tree: bool,

    /// 把最终的树结构导出为 JSON 文件
    #[arg(long)]
    export_json: Option<String>,
}

/// 演示用的粒子：坐标保存在元素内部，由定位函数读取
#[derive(Debug, Clone)]
struct Particle {
    id: usize,
    position: Vec<f64>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // 生成默认配置文件
    if args.generate_config {
        let config = OmnitreeConfig::default();
        config.save_to_file(&args.config)?;
        println!("✅ Generated default configuration: {}", args.config);
        return Ok(());
    }

    // 加载配置
    let mut config = OmnitreeConfig::from_file(&args.config)?;

    // 命令行参数覆盖配置文件
    if let Some(leaf_capacity) = args.leaf_capacity {
        config.tree.leaf_capacity = leaf_capacity;
    }
    if let Some(max_depth) = args.max_depth {
        config.tree.max_depth = max_depth;
    }
    if let Some(log_level) = args.log_level.clone() {
        config.logging.level = log_level;
    }

    // 验证配置
    config.validate()?;
    validate_args(&args)?;

    // 初始化日志系统
    init_logging(&config.logging);

    info!("🚀 Starting Omnitree workload...");
    info!("📦 Version: {}", env!("CARGO_PKG_VERSION"));
    println!();
    config.print_summary();

    let dimensions = args.dimensions;
    let mut tree: Omnitree<Particle, f64> = Omnitree::with_config(
        vec![0.0; dimensions],
        vec![EXTENT; dimensions],
        |p: &Particle| p.position.clone(),
        AxisOps::float(),
        &config.tree,
    )?;

    let mut rng = StdRng::seed_from_u64(args.seed);

    // 插入
    let start = Instant::now();
    for id in 0..args.items {
        let position = (0..dimensions).map(|_| rng.gen_range(0.0..=EXTENT)).collect();
        tree.add(Particle { id, position })?;
    }
    report("insert", args.items, start);
    print_stats(&tree);

    // 区域查询
    let side = EXTENT * (args.coverage / 100.0).clamp(0.0, 1.0).powf(1.0 / dimensions as f64);
    let low: Vec<f64> = (0..dimensions)
        .map(|_| rng.gen_range(0.0..=(EXTENT - side)))
        .collect();
    let high: Vec<f64> = low.iter().map(|l| l + side).collect();
    let region = tree.region(low, high)?;

    let start = Instant::now();
    let found = tree.query(&region).len();
    report("query", found, start);
    println!(
        "   {} items inside a {:.1}% region",
        found.to_string().cyan(),
        args.coverage
    );

    // 在树外移动元素，然后重新定位
    let jitter = args.jitter;
    tree.stepper_mut(|p| {
        for value in p.position.iter_mut() {
            *value += rng.gen_range(-jitter..=jitter);
        }
    });
    let start = Instant::now();
    let evicted = tree.update();
    report("update", tree.count(), start);
    if !evicted.is_empty() {
        let sample: Vec<usize> = evicted.iter().take(5).map(|p| p.id).collect();
        println!(
            "   {} items left the bounds (first ids: {:?})",
            evicted.len().to_string().yellow(),
            sample
        );
    }

    // 区域删除
    let start = Instant::now();
    let removed = tree.remove_region(&region);
    report("remove_region", removed, start);
    print_stats(&tree);

    if args.print_tree {
        tree.print_tree_structure_debug();
    }
    if let Some(path) = args.export_json {
        std::fs::write(&path, tree.export_structure_json()?)?;
        info!("💾 Tree structure exported to {}", path);
    }

    info!("✅ Done");
    Ok(())
}

/// 检查配置文件之外的命令行参数
fn validate_args(args: &Args) -> Result<()> {
    if args.dimensions == 0 || args.dimensions > MAX_DIMENSIONS {
        return Err(OmnitreeError::InvalidDimensions {
            dimensions: args.dimensions,
        });
    }
    if !args.jitter.is_finite() || args.jitter < 0.0 {
        return Err(OmnitreeError::InvalidConfig(format!(
            "jitter must be a non-negative finite number, got {}",
            args.jitter
        )));
    }
    if !args.coverage.is_finite() {
        return Err(OmnitreeError::InvalidConfig(format!(
            "coverage must be a finite percentage, got {}",
            args.coverage
        )));
    }
    Ok(())
}

fn report(operation: &str, items: usize, start: Instant) {
    println!(
        "{} {:<14} {:>8} items in {:?}",
        "▶".green(),
        operation.bold(),
        items,
        start.elapsed()
    );
}

fn print_stats<T>(tree: &Omnitree<T, f64>) {
    println!(
        "   count={} depth={} nodes={} leaves={}",
        tree.count().to_string().cyan(),
        tree.depth().to_string().cyan(),
        tree.node_count().to_string().cyan(),
        tree.leaf_count().to_string().cyan()
    );
}

/// 初始化日志系统
fn init_logging(config: &omnitree::LoggingConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let filter = match config.level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(tracing_subscriber::filter::LevelFilter::from_level(filter))
        .init();
}
