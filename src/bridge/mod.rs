//! Bridge adapters synthesizing MCP registrations from application classes.
//!
//! Each bridge is an explicit descriptor trait an adapter implements (field
//! table, action table, data operations) instead of runtime reflection. The
//! `register_*` functions in the submodules turn one adapter into a fixed
//! set of tool/resource registrations.
//!
//! Error policy for every generated tool: lookups that find nothing return a
//! structured not-found payload, validation failures return field-level
//! error maps, and unexpected failures surface as error-flagged tool results
//! instead of tearing down the session.

pub mod admin;
pub mod api;
pub mod model;

pub use admin::{register_admin, ActionOutcome, AdminAction, AdminBridge};
pub use api::{register_api, ApiActionMapping, ApiBridge};
pub use model::{
    register_model, CreateOutcome, FieldDescriptor, FieldKind, ModelBridge, RelatedPreview,
    RELATED_PREVIEW_CAP,
};
