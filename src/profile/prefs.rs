//! Notification preferences.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// The fixed set of notification categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationLabel {
    OrderStatuses,
    PasswordChanges,
    SpecialOffers,
    Newsletter,
}

impl NotificationLabel {
    pub const ALL: [NotificationLabel; 4] = [
        Self::OrderStatuses,
        Self::PasswordChanges,
        Self::SpecialOffers,
        Self::Newsletter,
    ];

    /// The label as shown to the user and stored in `checkboxes`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OrderStatuses => "Order statuses",
            Self::PasswordChanges => "Password changes",
            Self::SpecialOffers => "Special offers",
            Self::Newsletter => "Newsletter",
        }
    }

    fn index(&self) -> usize {
        match self {
            Self::OrderStatuses => 0,
            Self::PasswordChanges => 1,
            Self::SpecialOffers => 2,
            Self::Newsletter => 3,
        }
    }
}

impl std::fmt::Display for NotificationLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotificationLabel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|label| label.as_str() == s)
            .ok_or_else(|| Error::UnknownPreference(s.to_string()))
    }
}

/// Opt-in flag per notification category. Missing labels read as `false`.
///
/// Stored as a JSON object keyed by label. Unknown labels are ignored on
/// read and dropped on the next write.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, bool>", into = "BTreeMap<String, bool>")]
pub struct NotificationPrefs {
    flags: [bool; 4],
}

impl NotificationPrefs {
    pub fn get(&self, label: NotificationLabel) -> bool {
        self.flags[label.index()]
    }

    pub fn set(&mut self, label: NotificationLabel, value: bool) {
        self.flags[label.index()] = value;
    }

    /// All labels with their current values, in display order.
    pub fn iter(&self) -> impl Iterator<Item = (NotificationLabel, bool)> + '_ {
        NotificationLabel::ALL
            .into_iter()
            .map(|label| (label, self.get(label)))
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

impl From<BTreeMap<String, bool>> for NotificationPrefs {
    fn from(map: BTreeMap<String, bool>) -> Self {
        let mut prefs = Self::default();
        for label in NotificationLabel::ALL {
            if let Some(value) = map.get(label.as_str()) {
                prefs.set(label, *value);
            }
        }
        prefs
    }
}

impl From<NotificationPrefs> for BTreeMap<String, bool> {
    fn from(prefs: NotificationPrefs) -> Self {
        prefs
            .iter()
            .map(|(label, value)| (label.as_str().to_string(), value))
            .collect()
    }
}
