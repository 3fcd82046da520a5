use crate::models::template::PaperTemplate;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;

/// 从 TOML 文件加载试卷模板
///
/// 文件中缺省 `key` 时使用文件名（不含扩展名）
pub async fn load_template_file(toml_file_path: &Path) -> Result<PaperTemplate> {
    let content = fs::read_to_string(toml_file_path)
        .await
        .with_context(|| format!("无法读取模板文件: {}", toml_file_path.display()))?;

    let mut value: toml::Table = toml::from_str(&content)
        .with_context(|| format!("无法解析模板文件: {}", toml_file_path.display()))?;

    if !value.contains_key("key") {
        let stem = toml_file_path
            .file_stem()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
        value.insert("key".to_string(), toml::Value::String(stem));
    }

    let template: PaperTemplate = toml::Value::Table(value)
        .try_into()
        .with_context(|| format!("模板字段不合法: {}", toml_file_path.display()))?;

    template
        .validate()
        .with_context(|| format!("模板内容不一致: {}", toml_file_path.display()))?;

    Ok(template)
}

/// 从文件夹中加载所有 TOML 模板
///
/// 单个文件加载失败只记录警告，不影响其它模板
pub async fn load_all_templates(folder_path: &str) -> Result<Vec<PaperTemplate>> {
    let folder = PathBuf::from(folder_path);

    if !folder.exists() {
        anyhow::bail!("模板文件夹不存在: {}", folder_path);
    }

    let mut templates = Vec::new();
    let mut entries = fs::read_dir(&folder)
        .await
        .with_context(|| format!("无法读取文件夹: {}", folder_path))?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) == Some("toml") {
            tracing::info!(
                "正在加载模板: {}",
                path.file_name().unwrap_or_default().to_string_lossy()
            );

            match load_template_file(&path).await {
                Ok(template) => {
                    tracing::info!(
                        "成功加载模板 {} ({} 个题目)",
                        template.key,
                        template.questions.len()
                    );
                    templates.push(template);
                }
                Err(e) => {
                    tracing::warn!("加载模板失败 {}: {:#}", path.display(), e);
                }
            }
        }
    }

    templates.sort_by(|a, b| a.key.cmp(&b.key));
    Ok(templates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{QuestionType, Subject};

    const ENGLISH_READING: &str = r#"
name = "英语阅读模板"
subject = "english"
duration = 60
description = "阅读理解专项"

[[questions]]
type = "choice"
content = "What is the main idea of the passage?"
score = 4
options = ["A", "B", "C", "D"]
correct_answers = [1]

[[questions]]
type = "composition"
content = "Summarize the passage in 50 words."
"#;

    #[tokio::test]
    async fn test_load_template_uses_file_stem_as_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("english-reading.toml");
        std::fs::write(&path, ENGLISH_READING).unwrap();

        let template = load_template_file(&path).await.unwrap();
        assert_eq!(template.key, "english-reading");
        assert_eq!(template.subject, Subject::English);
        assert_eq!(template.questions.len(), 2);
        assert_eq!(template.questions[1].kind, QuestionType::Composition);
        assert_eq!(template.questions[1].score, None);
    }

    #[tokio::test]
    async fn test_load_all_skips_invalid_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("good.toml"), ENGLISH_READING).unwrap();
        std::fs::write(dir.path().join("broken.toml"), "name = [").unwrap();
        std::fs::write(
            dir.path().join("bad-answer.toml"),
            "subject = \"math\"\n[[questions]]\ntype = \"choice\"\ncontent = \"1+1\"\noptions = [\"1\", \"2\"]\ncorrect_answers = [5]\n",
        )
        .unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let templates = load_all_templates(dir.path().to_str().unwrap()).await.unwrap();
        assert_eq!(templates.len(), 1);
        assert_eq!(templates[0].key, "good");
    }

    #[tokio::test]
    async fn test_missing_folder_is_an_error() {
        assert!(load_all_templates("/definitely/not/here").await.is_err());
    }
}
