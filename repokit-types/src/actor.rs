use crate::ActorId;

/// Identity of whoever is performing the current unit of work.
pub trait ActorContext: Send + Sync {
    /// The acting user's id, if one is known.
    fn current_user_id(&self) -> Option<ActorId>;

    /// The acting user's display name, if one is known.
    fn current_user_name(&self) -> Option<String> {
        None
    }
}

/// No acting user. Identity stamps are left untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct Anonymous;

impl ActorContext for Anonymous {
    fn current_user_id(&self) -> Option<ActorId> {
        None
    }
}

/// A fixed acting user.
#[derive(Debug, Clone)]
pub struct StaticActor {
    id: ActorId,
    name: Option<String>,
}

impl StaticActor {
    pub fn new(id: impl Into<ActorId>) -> Self {
        Self {
            id: id.into(),
            name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

impl ActorContext for StaticActor {
    fn current_user_id(&self) -> Option<ActorId> {
        Some(self.id.clone())
    }

    fn current_user_name(&self) -> Option<String> {
        self.name.clone()
    }
}
