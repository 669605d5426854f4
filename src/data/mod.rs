mod model;

pub use model::AnswerSheet;
