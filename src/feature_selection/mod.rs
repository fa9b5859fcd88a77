pub mod univariate_selection;

pub use univariate_selection::{f_classif, SelectKBest};
