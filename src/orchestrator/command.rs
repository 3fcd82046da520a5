//! 控制台命令解析
//!
//! 一行一条命令；题目位置从 1 开始，选项用字母 A、B、C… 表示

use crate::models::{Difficulty, QuestionId, QuestionPatch};
use crate::services::field_coercion::DraftField;
use std::collections::BTreeSet;

pub const HELP: &str = "\
命令:
  set <字段> <值>            字段: name subject duration difficulty tags description
  rule <规则> <值>           规则: strictness threshold rules(逗号分隔)
  add <题型>                 题型: choice multiple fill short essay composition
  types                      列出当前学科可添加的题型
  edit <ID> k=v; k=v ...     键: content score difficulty explanation options(用|分隔) answers(如 B 或 A,C)
  copy <ID> | delete <ID> | move <从> <到>
  option add <ID> | option set <ID> <字母> <文字> | option remove <ID> <字母>
  select <ID> | select all | select none
  score <分值>               为勾选的题目批量设置分值
  remove-selected            删除勾选的题目
  template <名称> | templates
  show | preview | validate | save | publish | help | quit";

/// 控制台命令
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Show,
    Preview,
    Types,
    Validate,
    Set { field: DraftField, value: String },
    Rule { kind: String, value: String },
    Add(String),
    Edit { id: QuestionId, patch: QuestionPatch },
    Copy(QuestionId),
    Delete(QuestionId),
    /// 位置已转换为从 0 开始
    Move { from: usize, to: usize },
    OptionAdd(QuestionId),
    OptionSet { id: QuestionId, index: usize, text: String },
    OptionRemove { id: QuestionId, index: usize },
    Select(QuestionId),
    SelectAll(bool),
    BatchScore(u32),
    BatchDelete,
    Template(String),
    Templates,
    Save,
    Publish,
    Quit,
}

impl Command {
    /// 解析一行输入；空行返回 `Ok(None)`
    pub fn parse(line: &str) -> Result<Option<Self>, String> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        let (verb, rest) = split_word(line);
        let command = match verb {
            "help" | "?" => Command::Help,
            "show" | "list" => Command::Show,
            "preview" => Command::Preview,
            "types" => Command::Types,
            "validate" => Command::Validate,
            "save" => Command::Save,
            "publish" => Command::Publish,
            "quit" | "exit" => Command::Quit,
            "templates" => Command::Templates,
            "remove-selected" => Command::BatchDelete,
            "set" => {
                let (name, value) = split_word(rest);
                let field = DraftField::parse(name).ok_or_else(|| format!("未知字段: {}", name))?;
                Command::Set {
                    field,
                    value: value.to_string(),
                }
            }
            "rule" => {
                let (kind, value) = split_word(rest);
                if kind.is_empty() {
                    return Err("用法: rule <规则> <值>".to_string());
                }
                Command::Rule {
                    kind: kind.to_string(),
                    value: value.to_string(),
                }
            }
            "add" => Command::Add(rest.to_string()),
            "edit" => {
                let (id, fields) = split_word(rest);
                Command::Edit {
                    id: parse_id(id)?,
                    patch: parse_patch(fields)?,
                }
            }
            "copy" => Command::Copy(parse_id(rest)?),
            "delete" => Command::Delete(parse_id(rest)?),
            "move" => {
                let (from, to) = split_word(rest);
                Command::Move {
                    from: parse_position(from)?,
                    to: parse_position(to)?,
                }
            }
            "option" => parse_option(rest)?,
            "select" => match rest {
                "all" => Command::SelectAll(true),
                "none" => Command::SelectAll(false),
                id => Command::Select(parse_id(id)?),
            },
            "score" => Command::BatchScore(
                rest.parse()
                    .map_err(|_| format!("分值必须是整数: {}", rest))?,
            ),
            "template" => Command::Template(rest.to_string()),
            other => return Err(format!("未知命令: {} (输入 help 查看帮助)", other)),
        };

        Ok(Some(command))
    }
}

fn split_word(s: &str) -> (&str, &str) {
    let s = s.trim();
    match s.split_once(char::is_whitespace) {
        Some((head, tail)) => (head, tail.trim()),
        None => (s, ""),
    }
}

fn parse_id(s: &str) -> Result<QuestionId, String> {
    s.trim()
        .trim_start_matches('#')
        .parse()
        .map_err(|_| format!("题目ID必须是整数: {}", s))
}

fn parse_position(s: &str) -> Result<usize, String> {
    match s.trim().parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n - 1),
        _ => Err(format!("位置必须是从 1 开始的整数: {}", s)),
    }
}

/// 选项标签转序号：`A` → 0，也接受从 1 开始的数字
fn parse_option_index(s: &str) -> Result<usize, String> {
    let s = s.trim();
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_alphabetic() => {
            Ok((c.to_ascii_uppercase() as u8 - b'A') as usize)
        }
        _ => parse_position(s).map_err(|_| format!("选项必须是字母或从 1 开始的数字: {}", s)),
    }
}

fn parse_option(rest: &str) -> Result<Command, String> {
    let (action, rest) = split_word(rest);
    let (id, rest) = split_word(rest);
    let id = parse_id(id)?;
    match action {
        "add" => Ok(Command::OptionAdd(id)),
        "set" => {
            let (index, text) = split_word(rest);
            Ok(Command::OptionSet {
                id,
                index: parse_option_index(index)?,
                text: text.to_string(),
            })
        }
        "remove" => Ok(Command::OptionRemove {
            id,
            index: parse_option_index(rest)?,
        }),
        other => Err(format!("未知选项操作: {}", other)),
    }
}

/// 解析 `content=...; score=5; options=a|b; answers=B`
fn parse_patch(s: &str) -> Result<QuestionPatch, String> {
    let mut patch = QuestionPatch::default();

    for part in s.split(';').map(str::trim).filter(|p| !p.is_empty()) {
        let (key, value) = part
            .split_once('=')
            .ok_or_else(|| format!("字段格式应为 键=值: {}", part))?;
        let value = value.trim();
        match key.trim() {
            "content" => patch.content = Some(value.to_string()),
            "explanation" => patch.explanation = Some(value.to_string()),
            "score" => {
                patch.score = Some(
                    value
                        .parse()
                        .map_err(|_| format!("分值必须是非负整数: {}", value))?,
                )
            }
            "difficulty" => {
                patch.difficulty = Some(
                    Difficulty::parse(value).ok_or_else(|| format!("未知难度: {}", value))?,
                )
            }
            "options" => patch.options = Some(value.split('|').map(str::to_string).collect()),
            "answers" => {
                let answers = value
                    .split(',')
                    .map(str::trim)
                    .filter(|a| !a.is_empty())
                    .map(parse_option_index)
                    .collect::<Result<BTreeSet<_>, _>>()?;
                patch.correct_answers = Some(answers);
            }
            other => return Err(format!("未知题目字段: {}", other)),
        }
    }

    if patch.is_empty() {
        return Err("至少需要提供一个要修改的字段".to_string());
    }
    Ok(patch)
}
