//! User-visible strings for the picker surface, selected per language.
//!
//! The language setting lives in the rule store and is threaded through as
//! a value; nothing reads or writes it through process-global state.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Language {
    #[default]
    #[serde(rename = "en")]
    En,
    #[serde(rename = "zh_CN")]
    ZhCn,
}

impl Language {
    /// Parse a stored language tag, falling back to English for anything
    /// unrecognized.
    pub fn parse(tag: &str) -> Self {
        match tag {
            "zh_CN" | "zh-CN" | "zh" => Language::ZhCn,
            _ => Language::En,
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::ZhCn => "zh_CN",
        }
    }

    pub fn messages(self) -> Messages {
        match self {
            Language::En => Messages {
                select_instruction: "Click on any element to hide it. Press Esc to cancel.",
                element_hidden: "Element hidden!",
                element_already_hidden: "Element already hidden",
            },
            Language::ZhCn => Messages {
                select_instruction: "点击任意元素进行隐藏。按 Esc 键取消。",
                element_hidden: "元素已隐藏！",
                element_already_hidden: "元素已被隐藏",
            },
        }
    }
}

/// Picker banner and feedback strings.
#[derive(Debug, Clone, Copy)]
pub struct Messages {
    pub select_instruction: &'static str,
    pub element_hidden: &'static str,
    pub element_already_hidden: &'static str,
}
