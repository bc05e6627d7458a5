pub mod backend;
pub mod drafts;
pub mod editor;
pub mod input;
pub mod matcher;
pub mod model;
pub mod queue;
pub mod session;
pub mod view;

pub use backend::{
    ClientError, CommitOutcome, CommitRequest, ErrorPayload, ReviewBackend, Snapshot,
    TransactionEnvelope,
};
pub use drafts::DraftStore;
pub use editor::{EditorKey, EditorOutput, FieldEditor, FieldPhase, Suggestions};
pub use matcher::{Catalog, filter};
pub use model::{Amount, Draft, DraftPatch, Field, Item, ItemId, Posting};
pub use queue::Queue;
pub use session::{Completion, Effect, Intent, Notice, Phase, Session, SessionError};
pub use input::LineInput;
pub use view::{Segment, Tone, ViewLine, render_item};
