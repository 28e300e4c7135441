// ==========================================
// 国际化 (i18n) 模块
// ==========================================
// 使用 rust-i18n 库
// 支持中文（默认）和英文
// ==========================================
// 注意: rust_i18n::i18n! 宏已在 lib.rs 中初始化
// ==========================================

/// 获取当前语言
pub fn current_locale() -> String {
    rust_i18n::locale().to_string()
}

/// 设置语言
///
/// # 参数
/// - locale: 语言代码（"zh-CN" 或 "en"）
pub fn set_locale(locale: &str) {
    rust_i18n::set_locale(locale);
}

/// 替换 `%{name}` 占位符
fn fill_args(template: String, args: &[(&str, &str)]) -> String {
    let mut result = template;
    for (k, v) in args {
        let placeholder = format!("%{{{}}}", k);
        result = result.replace(&placeholder, v);
    }
    result
}

/// 翻译消息（带参数,指定语言,不修改全局语言）
///
/// # 示例
/// ```no_run
/// use cotton_blend::i18n::t_in_locale;
/// let msg = t_in_locale("en", "validation.sum_mismatch", &[("unit", "RF-3"), ("sum", "97.00")]);
/// ```
pub fn t_in_locale(locale: &str, key: &str, args: &[(&str, &str)]) -> String {
    fill_args(rust_i18n::t!(key, locale = locale).to_string(), args)
}
