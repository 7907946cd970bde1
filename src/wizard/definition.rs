//! 向导定义：每一步声明哪些字段、每个字段用什么规则校验

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;

/// 已收集的字段：字段名 -> 原始文本
pub type Fields = BTreeMap<String, String>;

/// 字段校验规则
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRule {
    /// 去掉首尾空白后非空
    Required,
    /// 合法邮箱
    Email,
    /// 至少 n 个字符
    MinLength(usize),
    /// 数字且 > 0
    Positive,
    /// 取值必须在给定集合内
    OneOf(&'static [&'static str]),
    /// 仅当兄弟字段等于哨兵值时必填（如「其他，请注明」）
    RequiredWhen {
        sibling: &'static str,
        equals: &'static str,
    },
    /// 小写字母、数字与单个连字符组成的短名
    Slug,
    /// 逗号分隔的邮箱列表，可为空
    EmailList,
    /// 可选，任意内容
    Optional,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub rule: FieldRule,
}

impl FieldSpec {
    pub const fn new(name: &'static str, label: &'static str, rule: FieldRule) -> Self {
        Self { name, label, rule }
    }
}

/// 一个具体向导：步数是编译期常量，步号从 1 开始
pub trait WizardDefinition {
    const TOTAL_STEPS: usize;

    /// 第 `step` 步需要收集的字段；越界返回空切片
    fn step_fields(step: usize) -> &'static [FieldSpec];

    fn step_title(step: usize) -> &'static str;
}

fn email_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9-]+(\.[A-Za-z0-9-]+)*\.[A-Za-z]{2,}$")
            .expect("email regex is valid")
    })
}

fn slug_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[a-z0-9]+(-[a-z0-9]+)*$").expect("slug regex is valid")
    })
}

impl FieldRule {
    /// 用本规则校验 `fields` 中的 `name` 字段；`fields` 用于条件必填查看兄弟字段
    pub fn check(&self, name: &str, fields: &Fields) -> bool {
        let value = fields.get(name).map(|v| v.trim()).unwrap_or("");
        match *self {
            FieldRule::Optional => true,
            FieldRule::Required => !value.is_empty(),
            FieldRule::Email => email_re().is_match(value),
            FieldRule::MinLength(n) => value.chars().count() >= n,
            FieldRule::Positive => value
                .parse::<f64>()
                .map(|n| n.is_finite() && n > 0.0)
                .unwrap_or(false),
            FieldRule::OneOf(allowed) => allowed.contains(&value),
            FieldRule::RequiredWhen { sibling, equals } => {
                let sibling_value = fields.get(sibling).map(|v| v.trim()).unwrap_or("");
                sibling_value != equals || !value.is_empty()
            }
            FieldRule::Slug => slug_re().is_match(value),
            FieldRule::EmailList => split_list(value).all(|e| email_re().is_match(e)),
        }
    }
}

/// 拆分逗号分隔列表，忽略空项
pub fn split_list(value: &str) -> impl Iterator<Item = &str> {
    value.split(',').map(str::trim).filter(|s| !s.is_empty())
}
