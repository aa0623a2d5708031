mod attendance;
mod candidate;
mod department;
mod employee;
mod holiday;
mod job;
mod leave;
mod notification;
mod payroll;

pub use attendance::*;
pub use candidate::*;
pub use department::*;
pub use employee::*;
pub use holiday::*;
pub use job::*;
pub use leave::*;
pub use notification::*;
pub use payroll::*;

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identifier for records that may come from the remote API.
///
/// The demo API hands out numeric ids for some resources and string tokens
/// for others, so both shapes are accepted on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Number(i64),
    Text(String),
}

impl RecordId {
    /// Fresh id for a record created without a server round trip
    pub fn new_local() -> Self {
        Self::Text(Uuid::new_v4().to_string())
    }

    /// Parse user input: digits become a numeric id, anything else a token
    pub fn parse(s: &str) -> Self {
        let s = s.trim();
        match s.parse::<i64>() {
            Ok(n) => Self::Number(n),
            Err(_) => Self::Text(s.to_string()),
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Something with a stable identity inside a collection.
pub trait Record: Clone {
    type Id: PartialEq + Clone + fmt::Display;

    fn id(&self) -> &Self::Id;
}

/// A record persisted as one JSON array under a fixed store key.
pub trait Stored: Record + Serialize + for<'de> Deserialize<'de> {
    const KEY: &'static str;
}

/// Fields matched by free-text search in list views.
pub trait Searchable {
    fn search_fields(&self) -> Vec<&str>;
}

/// A record listed with the name of the employee it belongs to.
/// Search covers the record's own fields and the name.
#[derive(Debug, Clone)]
pub struct WithEmployee<T> {
    pub record: T,
    pub employee: String,
}

impl<T: Searchable> Searchable for WithEmployee<T> {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = self.record.search_fields();
        fields.push(self.employee.as_str());
        fields
    }
}

/// Pair each record with its employee's name; "(unknown)" once the
/// employee has been deleted
pub fn with_employee_names<T, F>(records: Vec<T>, employees: &[Employee], employee_id: F) -> Vec<WithEmployee<T>>
where
    F: Fn(&T) -> Uuid,
{
    records
        .into_iter()
        .map(|record| {
            let id = employee_id(&record);
            let employee = employees
                .iter()
                .find(|e| e.id == id)
                .map(Employee::display_name)
                .unwrap_or_else(|| "(unknown)".to_string());
            WithEmployee { record, employee }
        })
        .collect()
}
