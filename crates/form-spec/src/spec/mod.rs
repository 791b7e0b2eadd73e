pub mod form;
pub mod lint;
pub mod question;

pub use form::FormSpec;
pub use lint::{LintIssue, lint};
pub use question::{QuestionSpec, QuestionType};
