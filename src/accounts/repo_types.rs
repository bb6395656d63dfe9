use mongodb::bson::{oid::ObjectId, serde_helpers::serialize_object_id_as_hex_string};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Closed set of permitted gender values, stored as their string form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl FromStr for Gender {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Male" => Ok(Gender::Male),
            "Female" => Ok(Gender::Female),
            "Other" => Ok(Gender::Other),
            _ => Err(()),
        }
    }
}

/// User document as persisted in the `users` collection. The id is absent
/// until the store assigns one on insert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub contact: String,
    pub address: Option<String>,
    pub gender: Gender,
    pub country: Option<String>,
}

impl User {
    /// Public view of a stored record; `None` when the record has no id yet.
    pub fn into_public(self) -> Option<PublicUser> {
        let id = self.id?;
        Some(PublicUser {
            id,
            name: self.name,
            email: self.email,
            contact: self.contact,
            address: self.address,
            gender: self.gender,
            country: self.country,
        })
    }
}

/// Projection the store returns for searches and the shape embedded in
/// responses. Carries no password field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicUser {
    #[serde(rename = "_id", serialize_with = "serialize_object_id_as_hex_string")]
    pub id: ObjectId,
    pub name: String,
    pub email: String,
    pub contact: String,
    pub address: Option<String>,
    pub gender: Gender,
    pub country: Option<String>,
}
