pub mod toml_loader;

pub use toml_loader::{load_bank_from_folder, load_questions_from_file};
