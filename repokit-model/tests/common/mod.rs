#![allow(dead_code)]

use repokit_model::{Capabilities, Entity, FieldValue, Stamps};
use repokit_types::RecordId;

/// Fully audited entity: every capability.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Customer {
    pub id: RecordId,
    pub name: String,
    pub age: i64,
    pub email: Option<String>,
    pub stamps: Stamps,
}

impl Customer {
    pub fn new(name: &str, age: i64) -> Self {
        Self {
            name: name.to_string(),
            age,
            ..Default::default()
        }
    }
}

impl Entity for Customer {
    const ENTITY_TYPE: &'static str = "customer";
    const CAPABILITIES: Capabilities = Capabilities::AUDITED;

    fn id(&self) -> RecordId {
        self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }

    fn stamps(&self) -> &Stamps {
        &self.stamps
    }

    fn stamps_mut(&mut self) -> &mut Stamps {
        &mut self.stamps
    }

    fn properties(&self) -> Vec<(&'static str, FieldValue)> {
        vec![
            ("name", self.name.clone().into()),
            ("age", self.age.into()),
            ("email", self.email.clone().into()),
        ]
    }
}

/// Bare entity: identity only, no lifecycle capabilities.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Tag {
    pub id: RecordId,
    pub label: String,
    pub stamps: Stamps,
}

impl Entity for Tag {
    const ENTITY_TYPE: &'static str = "tag";
    const CAPABILITIES: Capabilities = Capabilities::empty();

    fn id(&self) -> RecordId {
        self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }

    fn stamps(&self) -> &Stamps {
        &self.stamps
    }

    fn stamps_mut(&mut self) -> &mut Stamps {
        &mut self.stamps
    }

    fn properties(&self) -> Vec<(&'static str, FieldValue)> {
        vec![("label", self.label.clone().into())]
    }
}
