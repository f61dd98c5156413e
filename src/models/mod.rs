pub mod bank;
pub mod level;
pub mod loaders;
pub mod question;

pub use bank::QuestionBank;
pub use level::Level;
pub use loaders::{load_bank_from_folder, load_questions_from_file};
pub use question::{Question, UserResponse};
