// ==========================================
// 汇总报表排序规则
// ==========================================
// 国产分组在前,进口分组 (名称含关键字) 在后;
// 同一分区内按分组名、品种名字母序 (忽略大小写,原文兜底)
// ==========================================

use std::cmp::Ordering;

/// 进口分组关键字缺省值
pub const DEFAULT_IMPORT_KEYWORD: &str = "import";

/// 分组名是否包含进口关键字 (忽略大小写的子串匹配)
pub fn is_import_group(group_name: &str, keyword: &str) -> bool {
    group_name
        .to_lowercase()
        .contains(&keyword.to_lowercase())
}

/// 字母序比较: 先忽略大小写,相同时按原文
fn compare_alpha(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// 报表行排序比较
///
/// # 参数
/// - `a`, `b`: (分组名, 品种名); 分组汇总时品种名传空串
/// - `keyword`: 进口分组关键字
pub fn compare_group_then_variety(a: (&str, &str), b: (&str, &str), keyword: &str) -> Ordering {
    let a_import = is_import_group(a.0, keyword);
    let b_import = is_import_group(b.0, keyword);

    a_import
        .cmp(&b_import)
        .then_with(|| compare_alpha(a.0, b.0))
        .then_with(|| compare_alpha(a.1, b.1))
}
