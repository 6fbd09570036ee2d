mod attachment;
mod field;
mod payload;
mod schema;
mod value;

pub use attachment::{
    Attachment, AttachmentId, CandidateFile, DroppedFile, PickedFile, mime_from_extension,
};
pub use field::{FieldKind, FieldSpec, ShownWhen};
pub use payload::{PayloadFile, SubmissionPayload};
pub use schema::{FormSchema, SchemaError, StepSpec};
pub use value::{CHECKED_VALUE, FieldValue, InputValue};
