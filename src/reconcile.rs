//! Schema reconciliation against the remote server.
//!
//! The strategy is drop-and-recreate, not a field-level diff: the server
//! cannot mutate a live schema for this feature set, so any schema change
//! costs a full reindex anyway. Between the delete and the end of the
//! following bulk import the collection is unavailable to searches; that
//! window is an accepted limitation of this strategy, not a bug.

use tracing::info;

use crate::remote::{IndexError, RemoteIndex};
use crate::schema::{Collection, Field};

/// Make the remote collection's schema match the desired one.
///
/// An existing remote collection is dropped first, then the new schema is
/// created. A create that races another creator (`AlreadyExists`) is
/// benign: logged and treated as success. Everything else propagates.
pub async fn reconcile(
    remote: &dyn RemoteIndex,
    collection: &Collection,
    fields: &[Field],
) -> Result<(), IndexError> {
    let schema = collection.schema(fields);

    if remote.exists(&collection.name).await? {
        remote.delete(&collection.name).await?;
        info!(collection = %collection.name, "dropped remote collection for recreate");
    }

    match remote.create(&schema).await {
        Ok(()) => {
            info!(
                collection = %collection.name,
                fields = schema.fields.len(),
                "created remote collection"
            );
            Ok(())
        }
        Err(IndexError::AlreadyExists(name)) => {
            info!(collection = %name, "remote collection already exists, leaving it in place");
            Ok(())
        }
        Err(e) => Err(e),
    }
}

/// Delete the remote collection, tolerating every failure.
///
/// Absence of the remote collection is not an error for delete intent, so
/// nothing here propagates; failures are logged and swallowed.
pub async fn reconcile_delete(remote: &dyn RemoteIndex, collection: &Collection) {
    match remote.delete(&collection.name).await {
        Ok(()) => info!(collection = %collection.name, "deleted remote collection"),
        Err(e) => {
            info!(collection = %collection.name, error = %e, "remote collection delete skipped");
        }
    }
}
