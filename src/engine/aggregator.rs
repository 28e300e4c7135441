// ==========================================
// 配棉计算引擎 - 汇总报表引擎
// ==========================================
// 职责: 各车间分配结果 → 品种汇总 + 分组汇总 + 总计
// 输入: 车间计划清单 + 品种目录
// 输出: BlendReport / UnitDetail
// ==========================================
// 口径:
//   品种占比   = 品种重量 / 总重量 × 100      (重量口径)
//   组内占比   = 品种包数 / 所在分组包数 × 100 (包数口径)
//   分组占比   = 分组重量 / 总重量 × 100
// 排序: 分组名含 "import" (忽略大小写) 的排在最后,
//       其余按分组名、品种名字母序
// 红线: 每次全量重算,不保留跨次状态
// ==========================================

mod core;
mod ordering;
mod report;


pub use self::core::{BlendAggregator, DEFAULT_FALLBACK_GROUP};
pub use ordering::{compare_group_then_variety, is_import_group, DEFAULT_IMPORT_KEYWORD};
pub use report::{
    BlendReport, GroupSummaryRow, UnitDetail, UnitDetailRow, VarietySummaryRow,
    GRAND_TOTAL_LABEL,
};
