/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 草稿文件存放目录
    pub storage_dir: String,
    /// 草稿在存储中的键名
    pub storage_key: String,
    /// 防抖保存的静默期（毫秒）
    pub autosave_debounce_ms: u64,
    /// 周期保存间隔（秒）
    pub autosave_interval_secs: u64,
    /// 自定义模板目录
    pub template_folder: String,
    /// 是否在每次变更后打印题目列表和预览
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage_dir: ".paper_drafts".to_string(),
            storage_key: "paperDraft".to_string(),
            autosave_debounce_ms: 2000,
            autosave_interval_secs: 30,
            template_folder: "templates".to_string(),
            verbose_logging: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            storage_dir: std::env::var("DRAFT_STORAGE_DIR").unwrap_or(default.storage_dir),
            storage_key: std::env::var("DRAFT_STORAGE_KEY").unwrap_or(default.storage_key),
            autosave_debounce_ms: std::env::var("AUTOSAVE_DEBOUNCE_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.autosave_debounce_ms),
            autosave_interval_secs: std::env::var("AUTOSAVE_INTERVAL_SECS").ok().and_then(|v| v.parse().ok()).filter(|secs| *secs > 0).unwrap_or(default.autosave_interval_secs),
            template_folder: std::env::var("TEMPLATE_FOLDER").unwrap_or(default.template_folder),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
        }
    }
}
