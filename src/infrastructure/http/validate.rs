//! 请求体字段校验
//!
//! `optional` 下的函数返回 `Option`；顶层同名函数把缺失或非法值转换为 422。

use serde_json::{Map, Value};

use super::error::ErrorSignal;

pub const PASSWORD_MIN_CHARS: usize = 10;
pub const PASSWORD_MAX_CHARS: usize = 256;

pub mod optional {
    use super::*;

    /// 去除首尾空白，不接受空串
    pub fn string(value: Option<&Value>) -> Option<String> {
        let s = value?.as_str()?.trim();
        (!s.is_empty()).then(|| s.to_string())
    }

    /// 数字或可解析为有限数字的字符串
    pub fn number(value: Option<&Value>) -> Option<f64> {
        match value? {
            Value::Number(n) => n.as_f64().filter(|n| n.is_finite()),
            Value::String(s) if !s.trim().is_empty() => {
                s.trim().parse::<f64>().ok().filter(|n| n.is_finite())
            }
            _ => None,
        }
    }

    /// 接受 true/"true"/1/"1"/"on" 及对应的假值
    pub fn boolean(value: Option<&Value>) -> Option<bool> {
        match value? {
            Value::Bool(b) => Some(*b),
            Value::Number(n) if n.as_i64() == Some(1) => Some(true),
            Value::Number(n) if n.as_i64() == Some(0) => Some(false),
            Value::String(s) => match s.as_str() {
                "true" | "1" | "on" => Some(true),
                "false" | "0" | "off" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn object(value: Option<&Value>) -> Option<&Map<String, Value>> {
        value?.as_object()
    }

    /// 转为小写，形如 `local@domain.tld`
    pub fn email(value: Option<&Value>) -> Option<String> {
        let s = string(value)?.to_lowercase();
        let (local, domain) = s.split_once('@')?;
        if local.is_empty() || domain.contains('@') {
            return None;
        }
        let has_inner_dot = domain
            .char_indices()
            .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len());
        has_inner_dot.then_some(s)
    }

    /// 10 到 256 个字符，至少包含一个小写字母、一个大写字母和一个数字
    pub fn password(value: Option<&Value>) -> Option<String> {
        let s = value?.as_str()?;
        let len = s.chars().count();
        if !(PASSWORD_MIN_CHARS..=PASSWORD_MAX_CHARS).contains(&len) {
            return None;
        }
        let strong = s.chars().any(|c| c.is_ascii_lowercase())
            && s.chars().any(|c| c.is_ascii_uppercase())
            && s.chars().any(|c| c.is_ascii_digit());
        strong.then(|| s.to_string())
    }
}

fn required<T>(value: Option<T>, message: &str) -> Result<T, ErrorSignal> {
    value.ok_or_else(|| ErrorSignal::unprocessable(message))
}

pub fn string(value: Option<&Value>) -> Result<String, ErrorSignal> {
    required(optional::string(value), "expected string")
}

pub fn number(value: Option<&Value>) -> Result<f64, ErrorSignal> {
    required(optional::number(value), "invalid number")
}

pub fn boolean(value: Option<&Value>) -> Result<bool, ErrorSignal> {
    required(optional::boolean(value), "invalid boolean")
}

pub fn object(value: Option<&Value>) -> Result<&Map<String, Value>, ErrorSignal> {
    required(optional::object(value), "invalid object")
}

pub fn email(value: Option<&Value>) -> Result<String, ErrorSignal> {
    required(optional::email(value), "invalid email")
}

pub fn password(value: Option<&Value>) -> Result<String, ErrorSignal> {
    required(optional::password(value), "invalid password")
}
