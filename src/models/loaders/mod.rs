pub mod toml_loader;

pub use toml_loader::{load_all_templates, load_template_file};
