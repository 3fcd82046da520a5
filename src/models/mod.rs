pub mod loaders;
pub mod paper;
pub mod question;
pub mod subject;
pub mod template;

pub use loaders::{load_all_templates, load_template_file};
pub use paper::{PaperDraft, ScoringRules, Strictness};
pub use question::{Difficulty, Question, QuestionId, QuestionPatch, QuestionType};
pub use subject::Subject;
pub use template::{PaperTemplate, TemplateQuestion};
