#![allow(dead_code)]

use repokit_model::{Capabilities, Entity, FieldValue, Stamps};
use repokit_types::RecordId;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Person {
    pub id: RecordId,
    pub name: String,
    pub age: i64,
    pub city: Option<String>,
    pub stamps: Stamps,
}

impl Entity for Person {
    const ENTITY_TYPE: &'static str = "person";
    const CAPABILITIES: Capabilities = Capabilities::TIMESTAMPS.union(Capabilities::CREATE_STAMP);

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
            ("city", self.city.clone().into()),
        ]
    }
}

pub fn person(id: u64, name: &str, age: i64) -> Person {
    Person {
        id: RecordId::new(id),
        name: name.to_string(),
        age,
        ..Default::default()
    }
}

pub fn person_in(id: u64, name: &str, age: i64, city: &str) -> Person {
    Person {
        city: Some(city.to_string()),
        ..person(id, name, age)
    }
}

pub fn people() -> Vec<Person> {
    vec![
        person_in(1, "Doe", 40, "Oslo"),
        person_in(2, "Lo", 25, "Lima"),
        person(3, "Smith", 33),
        person_in(4, "Adams", 25, "Oslo"),
        person_in(5, "Baker", 61, "   "),
    ]
}

pub fn ids(people: &[Person]) -> Vec<u64> {
    people.iter().map(|p| p.id.get()).collect()
}
