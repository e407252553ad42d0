#![allow(dead_code)]

use repokit_model::{Capabilities, Entity, FieldValue, Stamps};
use repokit_types::RecordId;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Note {
    pub id: RecordId,
    pub title: String,
    pub pinned: bool,
    pub stamps: Stamps,
}

impl Entity for Note {
    const ENTITY_TYPE: &'static str = "note";
    const CAPABILITIES: Capabilities = Capabilities::CREATE_STAMP
        .union(Capabilities::TIMESTAMPS)
        .union(Capabilities::CONCURRENCY_STAMP);

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
            ("title", self.title.clone().into()),
            ("pinned", self.pinned.into()),
        ]
    }
}

pub fn note(title: &str) -> Note {
    Note {
        title: title.to_string(),
        ..Default::default()
    }
}

pub fn note_with_id(id: u64, title: &str) -> Note {
    Note {
        id: RecordId::new(id),
        ..note(title)
    }
}
