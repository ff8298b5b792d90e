mod article;
mod audit;
mod obligation;
mod org;
mod regulation;
mod system;

pub use article::ArticleCommands;
pub use audit::AuditCommands;
pub use obligation::ObligationCommands;
pub use org::OrgCommands;
pub use regulation::RegulationCommands;
pub use system::SystemCommands;
