pub mod entry;
pub mod query;

pub use entry::{
    Comment, CommentReq, Entry, GlossaryWord, RelatedEntry, Relation, Stats, Status, Submission,
    SubmittedEntry, SubmittedRelation,
};
pub use query::{GlossaryPage, Pagination, Query, SearchResults, ANY_LANG};
