//! Release orchestration
//!
//! `pipeline` runs the stages and owns rollback; `notes` renders the text
//! that ends up in tags, releases and the final recap.

mod notes;
mod pipeline;

pub use notes::{DATE_FORMAT, build_release_body, recap, release_name, tag_message};
pub use pipeline::{
    ReleaseContext, ReleasePipeline, ReleaseSummary, RollbackReport, RunOutcome, Stage,
};
