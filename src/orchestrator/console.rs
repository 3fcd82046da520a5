use crate::config::Config;
use crate::error::DraftResult;
use crate::infrastructure::{sleep_until_deadline, FileStorage};
use crate::models::{load_all_templates, PaperDraft, PaperTemplate, QuestionId};
use crate::orchestrator::command::{Command, HELP};
use crate::services::autosave::{AutosaveSettings, SaveReport, StoredDraft};
use crate::services::field_coercion::ScoringRule;
use crate::services::preview::render_question_list;
use crate::utils::logging::log_startup;
use crate::workflow::{DraftEditor, RecoveryOutcome};
use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::path::Path;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::time::Instant;
use tracing::{info, warn};

/// 应用主结构
pub struct App {
    config: Config,
    editor: DraftEditor<FileStorage>,
    templates: Vec<PaperTemplate>,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        log_startup(
            &config.storage_dir,
            config.autosave_debounce_ms,
            config.autosave_interval_secs,
        );

        let storage = FileStorage::open(&config.storage_dir)
            .with_context(|| format!("无法打开草稿目录: {}", config.storage_dir))?;

        let verbose = config.verbose_logging;
        let editor = DraftEditor::new(storage, AutosaveSettings::from(&config)).with_notifier(
            move |draft: &PaperDraft, selection: &BTreeSet<QuestionId>| {
                if verbose {
                    println!("{}", render_question_list(draft, selection));
                }
            },
        );

        let templates = load_templates(&config.template_folder).await;

        Ok(Self {
            config,
            editor,
            templates,
        })
    }

    /// 运行应用主逻辑
    pub async fn run(mut self) -> Result<()> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        self.recover(&mut lines).await?;
        println!("{}", HELP);

        let mut periodic = self.editor.autosave().periodic_timer();

        loop {
            let deadline = self.editor.autosave().debounce_deadline();

            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line.context("读取输入失败")? else {
                        break;
                    };
                    if !self.handle_line(&line) {
                        break;
                    }
                }
                _ = sleep_until_deadline(deadline) => {
                    if let Some(report) = self.editor.flush_due(Instant::now()) {
                        print_report(&report);
                    }
                }
                _ = periodic.tick() => {
                    if let Some(report) = self.editor.save_periodic() {
                        print_report(&report);
                    }
                }
            }
        }

        self.shutdown();
        Ok(())
    }

    /// 启动时检测已保存的草稿并询问是否恢复
    async fn recover(&mut self, lines: &mut Lines<BufReader<Stdin>>) -> Result<()> {
        let accept = match self.editor.autosave().load() {
            StoredDraft::Found(draft) => {
                println!(
                    "检测到未完成的草稿「{}」({} 道题目，总分 {})，是否恢复？[y/N]",
                    if draft.name.is_empty() { "未命名" } else { draft.name.as_str() },
                    draft.questions.len(),
                    draft.total_score
                );
                let answer = lines.next_line().await.context("读取输入失败")?;
                matches!(
                    answer.as_deref().map(str::trim),
                    Some("y" | "Y" | "yes" | "是")
                )
            }
            _ => false,
        };

        match self.editor.offer_recovery(&mut |_: &PaperDraft| accept) {
            RecoveryOutcome::Restored { questions } => {
                println!("✓ 草稿已恢复 ({} 道题目)", questions);
            }
            RecoveryOutcome::Unreadable { warning } => {
                warn!("⚠️ 保存的草稿无法读取，已忽略: {}", warning);
            }
            RecoveryOutcome::NoDraft | RecoveryOutcome::Declined => {}
        }
        Ok(())
    }

    /// 处理一行输入，返回 false 表示退出
    fn handle_line(&mut self, line: &str) -> bool {
        let command = match Command::parse(line) {
            Ok(Some(command)) => command,
            Ok(None) => return true,
            Err(message) => {
                println!("✗ {}", message);
                return true;
            }
        };

        if command == Command::Quit {
            return false;
        }
        self.execute(command);
        true
    }

    fn execute(&mut self, command: Command) {
        let editor = &mut self.editor;
        let result: DraftResult<()> = match command {
            Command::Help => {
                println!("{}", HELP);
                Ok(())
            }
            Command::Show => {
                println!("{}", render_question_list(editor.draft(), editor.selection()));
                Ok(())
            }
            Command::Preview => editor.preview().map(|text| println!("{}", text)),
            Command::Types => {
                let names: Vec<&str> = editor
                    .allowed_question_types()
                    .iter()
                    .map(|kind| kind.name())
                    .collect();
                println!("当前学科可添加: {}", names.join("、"));
                Ok(())
            }
            Command::Validate => {
                let errors = editor.validate_publish();
                if errors.is_empty() {
                    println!("✓ 校验通过，可以发布");
                } else {
                    print_messages(&errors);
                }
                Ok(())
            }
            Command::Set { field, value } => editor.set_field(field, &value).map(drop),
            Command::Rule { kind, value } => ScoringRule::parse(&kind, &value)
                .and_then(|rule| editor.set_scoring_rule(rule).map(drop)),
            Command::Add(kind) => editor.add_question(&kind).map(|draft| {
                if let Some(q) = draft.questions.last() {
                    println!("已添加 #{} {}", q.id, q.kind.name());
                }
            }),
            Command::Edit { id, patch } => editor.edit_question(id, &patch).map(drop),
            Command::Copy(id) => editor.duplicate_question(id).map(drop),
            Command::Delete(id) => editor.delete_question(id).map(drop),
            Command::Move { from, to } => editor.reorder_question(from, to).map(drop),
            Command::OptionAdd(id) => editor.add_option(id).map(drop),
            Command::OptionSet { id, index, text } => {
                editor.update_option(id, index, &text).map(drop)
            }
            Command::OptionRemove { id, index } => editor.remove_option(id, index).map(drop),
            Command::Select(id) => editor.toggle_select(id).map(drop),
            Command::SelectAll(selected) => {
                editor.select_all(selected);
                Ok(())
            }
            Command::BatchScore(score) => editor.batch_set_score(score).map(drop),
            Command::BatchDelete => editor.batch_delete().map(drop),
            Command::Templates => {
                for key in PaperTemplate::BUILTIN_KEYS {
                    println!("  {} (内置)", key);
                }
                for template in &self.templates {
                    println!("  {} - {}", template.key, template.name);
                }
                Ok(())
            }
            Command::Template(key) => {
                match find_template(&self.templates, &key) {
                    Some(template) => editor.load_template(template).map(drop),
                    None => {
                        println!("✗ 未知模板: {}", key);
                        Ok(())
                    }
                }
            }
            Command::Save => editor.save_draft().map(|report| print_report(&report)),
            Command::Publish => editor.publish().map(|receipt| {
                println!(
                    "✅ 试卷「{}」已发布 ({} 道题目, 总分 {})",
                    receipt.paper.name,
                    receipt.paper.questions.len(),
                    receipt.paper.total_score
                );
                if let Some(warning) = receipt.storage_warning {
                    println!("⚠️ {}", warning);
                }
            }),
            Command::Quit => Ok(()),
        };

        match result {
            Ok(()) => println!(
                "当前共 {} 道题目，总分 {}",
                self.editor.draft().questions.len(),
                self.editor.draft().total_score
            ),
            Err(e) => print_messages(&e.messages()),
        }
    }

    /// 退出前写入等待中的自动保存
    fn shutdown(&mut self) {
        if let Some(deadline) = self.editor.autosave().debounce_deadline() {
            if let Some(report) = self.editor.flush_due(deadline) {
                print_report(&report);
            }
        }
        if self.editor.has_unsaved_content() {
            info!(
                "草稿保留在 {}，下次启动可恢复",
                Path::new(&self.config.storage_dir).display()
            );
        }
        info!("👋 试卷编辑器已退出");
    }
}

/// 加载自定义模板；目录不存在时只使用内置模板
async fn load_templates(folder: &str) -> Vec<PaperTemplate> {
    match load_all_templates(folder).await {
        Ok(templates) => {
            info!("📋 已加载 {} 个自定义模板", templates.len());
            templates
        }
        Err(e) => {
            warn!("⚠️ {:#}，仅使用内置模板", e);
            Vec::new()
        }
    }
}

/// 自定义模板优先，其次内置模板
fn find_template(templates: &[PaperTemplate], key: &str) -> Option<PaperTemplate> {
    let key = key.trim();
    templates
        .iter()
        .find(|t| t.key == key)
        .cloned()
        .or_else(|| {
            PaperTemplate::BUILTIN_KEYS
                .contains(&key)
                .then(|| PaperTemplate::builtin(key))
        })
}

fn print_report(report: &SaveReport) {
    if report.is_saved() {
        println!("💾 {}", report);
    } else {
        println!("⚠️ {}", report);
    }
}

fn print_messages(messages: &[String]) {
    for message in messages {
        println!("✗ {}", message);
    }
}
