use crate::{Capabilities, FieldValue, Stamps};
use repokit_types::RecordId;

/// A record managed by the data layer.
///
/// Implementors expose their store identifier, their value-like business
/// properties and an embedded [`Stamps`] block. Which stamps the data layer
/// maintains is declared once per type through [`Entity::CAPABILITIES`].
pub trait Entity: Clone + PartialEq + Send + Sync + 'static {
    /// Type name used in logs, notifications and conflict reports.
    const ENTITY_TYPE: &'static str;

    /// Lifecycle traits this type supports.
    const CAPABILITIES: Capabilities;

    /// Store-local identifier.
    fn id(&self) -> RecordId;

    /// Replaces the store-local identifier.
    fn set_id(&mut self, id: RecordId);

    /// Lifecycle stamps.
    fn stamps(&self) -> &Stamps;

    /// Mutable lifecycle stamps.
    fn stamps_mut(&mut self) -> &mut Stamps;

    /// Value-like business properties, excluding identity and lifecycle stamps.
    fn properties(&self) -> Vec<(&'static str, FieldValue)>;

    /// True if this type carries every capability in `capability`.
    fn supports(capability: Capabilities) -> bool {
        Self::CAPABILITIES.contains(capability)
    }
}

/// Name-based read access to an entity's fields.
///
/// Implemented for every [`Entity`]: business properties come first, then
/// the identifier and whichever lifecycle stamps the type supports
/// (`id`, `correlation_id`, `created_at`, `updated_at`, `is_deleted`,
/// `deleted_at`). Object safe, so closure predicates can take `&dyn Fields`.
pub trait Fields {
    /// Returns the named field, or `None` if the entity has no such field.
    fn field(&self, name: &str) -> Option<FieldValue>;
}

impl<T: Entity> Fields for T {
    fn field(&self, name: &str) -> Option<FieldValue> {
        if let Some((_, value)) = self.properties().into_iter().find(|(n, _)| *n == name) {
            return Some(value);
        }

        let caps = T::CAPABILITIES;
        let stamps = self.stamps();
        match name {
            "id" => Some(self.id().into()),
            "correlation_id" if caps.contains(Capabilities::CREATE_STAMP) => {
                Some(stamps.correlation_id.into())
            }
            "created_at" if caps.contains(Capabilities::TIMESTAMPS) => {
                Some(stamps.created_at.into())
            }
            "updated_at" if caps.contains(Capabilities::TIMESTAMPS) => {
                Some(stamps.updated_at.into())
            }
            "is_deleted" if caps.contains(Capabilities::DELETED_FLAG) => {
                Some(stamps.is_deleted.into())
            }
            "deleted_at" if caps.contains(Capabilities::DELETE_TIMESTAMP) => {
                Some(stamps.deleted_at.into())
            }
            _ => None,
        }
    }
}
