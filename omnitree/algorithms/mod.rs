// Omnitree算法模块
//
// 这个模块包含Omnitree的所有核心算法实现，按功能分解为不同的子模块：
// - insert: 插入和选路
// - split: 叶子分裂与分支折叠
// - search: 遍历和区域查询
// - delete: 区域删除、谓词删除与定点删除
// - update: 元素移动后的重新定位
// - debug: 调试和可视化工具

pub mod debug;
pub mod delete;
pub mod insert;
pub mod search;
pub mod split;
pub mod update;
