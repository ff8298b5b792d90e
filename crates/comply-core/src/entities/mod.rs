//! Entity structs for all Comply domain objects.
//!
//! Each entity maps to a table in the libSQL store. All structs derive
//! `Serialize`, `Deserialize`, and `JsonSchema`; their JSON form is the
//! snapshot recorded in audit diffs.

mod article;
mod audit;
mod mapping;
mod obligation;
mod organization;
mod regulation;
mod system;

pub use article::Article;
pub use audit::AuditLogEntry;
pub use mapping::ObligationSystemMapping;
pub use obligation::Obligation;
pub use organization::Organization;
pub use regulation::Regulation;
pub use system::System;
