//! JSONL export of a tenant's audit log.
//!
//! One `AuditLogEntry` per line, oldest first, written with
//! `serde_jsonlines::write_json_lines`. The file is replaced on every export.

use std::path::Path;

use comply_core::entities::AuditLogEntry;

use crate::error::DatabaseError;
use crate::service::ComplyService;

impl ComplyService {
    /// Write the organization's full audit log to `path`.
    ///
    /// Returns the number of entries written.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails or the file cannot be written.
    pub async fn export_audit_log(
        &self,
        organization_id: &str,
        path: &Path,
    ) -> Result<usize, DatabaseError> {
        let entries = self.full_audit_log(organization_id).await?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        serde_jsonlines::write_json_lines(path, &entries)?;

        tracing::info!(
            organization_id,
            entries = entries.len(),
            path = %path.display(),
            "audit log exported"
        );
        Ok(entries.len())
    }
}

/// Read back an export produced by [`ComplyService::export_audit_log`].
///
/// # Errors
///
/// Returns `DatabaseError` if the file cannot be read or a line is not an
/// audit entry.
pub fn read_audit_export(path: &Path) -> Result<Vec<AuditLogEntry>, DatabaseError> {
    serde_jsonlines::json_lines(path)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(DatabaseError::from)
}
