mod estimate;
mod level;
mod loader;
pub mod parser;
mod store;

pub use estimate::{
    classify, current_exam_year, estimate_grade, generic_fallback_table, has_subject_cutoff_data,
    resolve_boundaries, BoundarySource, ResolvedBoundaries, GENERIC_CUTOFFS,
};
pub use level::{sort_canonical, BoundaryRow, Estimate, GradeLevel, ParseLevelError};
pub use loader::{
    load_cutoff_data, CutoffLoader, DocumentLocations, DocumentSource, FetchError,
    FileSystemSource, LoadedCutoffs, StaticSource,
};
pub use parser::DocumentFormat;
pub use store::{CutoffStore, SubjectBoundaryTable, LEGACY_YEAR};
