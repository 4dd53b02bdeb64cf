//! Keys identifying one (initialization, member) forecast.

use std::fmt;

use chrono::NaiveDate;
use miso_calendar::init_tag;

/// Identifies one forecast run: an initialization date and a member name.
///
/// Keys order by initialization, then member.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MemberKey {
    init: NaiveDate,
    member: String,
}

impl MemberKey {
    pub fn new(init: NaiveDate, member: impl Into<String>) -> Self {
        Self {
            init,
            member: member.into(),
        }
    }

    pub fn init(&self) -> NaiveDate {
        self.init
    }

    pub fn member(&self) -> &str {
        &self.member
    }

    /// Unique label, e.g. `20240609T0000Z_mem1`.
    pub fn label(&self) -> String {
        format!("{}_{}", init_tag(self.init), self.member)
    }
}

impl fmt::Display for MemberKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}
