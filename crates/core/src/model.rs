//! Wire-level data model: pending transactions and the user's edits to them.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Stable identifier the server assigns to a pending transaction.  Drafts are
/// keyed by this, never by queue position.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Decimal amounts travel as text so nothing is lost to floating point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Amount {
    pub value: String,
    pub currency: String,
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.currency)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    pub account: String,
    #[serde(default)]
    pub amount: Option<Amount>,
    #[serde(default)]
    pub cost: Option<String>,
    #[serde(default)]
    pub price: Option<String>,
}

/// One pending transaction awaiting categorization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub date: NaiveDate,
    #[serde(default = "default_flag")]
    pub flag: String,
    #[serde(default)]
    pub payee: Option<String>,
    #[serde(default)]
    pub narration: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub links: Vec<String>,
    #[serde(default)]
    pub postings: Vec<Posting>,
}

fn default_flag() -> String {
    "*".to_string()
}

/// The editable regions of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Account,
    Payee,
    Narration,
}

impl Field {
    pub const ALL: [Field; 3] = [Field::Account, Field::Payee, Field::Narration];

    /// Single key that jumps focus to this field while nothing is focused.
    pub fn mnemonic(self) -> char {
        match self {
            Field::Account => 'a',
            Field::Payee => 'p',
            Field::Narration => 'n',
        }
    }

    pub fn from_mnemonic(key: char) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.mnemonic() == key)
    }

    pub fn label(self) -> &'static str {
        match self {
            Field::Account => "account",
            Field::Payee => "payee",
            Field::Narration => "narration",
        }
    }
}

/// In-progress, uncommitted edit for one item.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Draft {
    pub account: String,
    pub payee: Option<String>,
    pub narration: Option<String>,
}

impl Draft {
    pub fn can_commit(&self) -> bool {
        !self.account.trim().is_empty()
    }

    pub fn apply(&mut self, patch: DraftPatch) {
        if let Some(account) = patch.account {
            self.account = account;
        }
        if patch.payee.is_some() {
            self.payee = patch.payee;
        }
        if patch.narration.is_some() {
            self.narration = patch.narration;
        }
    }

    /// Current text of `field` as the user would see it: the draft value if
    /// one was entered, otherwise whatever the item carries.
    pub fn field_value(draft: Option<&Draft>, item: &Item, field: Field) -> String {
        match field {
            Field::Account => draft.map(|d| d.account.clone()).unwrap_or_default(),
            Field::Payee => draft
                .and_then(|d| d.payee.clone())
                .or_else(|| item.payee.clone())
                .unwrap_or_default(),
            Field::Narration => draft
                .and_then(|d| d.narration.clone())
                .or_else(|| item.narration.clone())
                .unwrap_or_default(),
        }
    }
}

/// Partial update merged into a [`Draft`]; absent fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DraftPatch {
    pub account: Option<String>,
    pub payee: Option<String>,
    pub narration: Option<String>,
}

impl DraftPatch {
    pub fn field(field: Field, value: impl Into<String>) -> Self {
        let value = Some(value.into());
        match field {
            Field::Account => Self {
                account: value,
                ..Self::default()
            },
            Field::Payee => Self {
                payee: value,
                ..Self::default()
            },
            Field::Narration => Self {
                narration: value,
                ..Self::default()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item() -> Item {
        Item {
            id: ItemId::new("tx-1"),
            date: NaiveDate::from_ymd_opt(2024, 1, 20).unwrap(),
            flag: "!".to_string(),
            payee: Some("Corner Shop".to_string()),
            narration: None,
            tags: vec![],
            links: vec![],
            postings: vec![],
        }
    }

    #[test]
    fn item_deserializes_with_optional_fields_missing() {
        let raw = r#"{
            "id": "abc",
            "date": "2024-01-20",
            "postings": [
                { "account": "Assets:Checking", "amount": { "value": "-25.00", "currency": "USD" } }
            ]
        }"#;
        let item: Item = serde_json::from_str(raw).unwrap();
        assert_eq!(item.id.as_str(), "abc");
        assert_eq!(item.flag, "*");
        assert!(item.payee.is_none());
        assert!(item.tags.is_empty());
        assert_eq!(item.postings.len(), 1);
        assert_eq!(
            item.postings[0].amount.as_ref().unwrap().to_string(),
            "-25.00 USD"
        );
    }

    #[test]
    fn mnemonics_map_back_to_fields() {
        for field in Field::ALL {
            assert_eq!(Field::from_mnemonic(field.mnemonic()), Some(field));
        }
        assert_eq!(Field::from_mnemonic('x'), None);
    }

    #[test]
    fn whitespace_account_cannot_commit() {
        let mut draft = Draft::default();
        assert!(!draft.can_commit());
        draft.account = "   ".to_string();
        assert!(!draft.can_commit());
        draft.account = " Expenses:Food ".to_string();
        assert!(draft.can_commit());
    }

    #[test]
    fn patch_merges_only_present_fields() {
        let mut draft = Draft {
            account: "Expenses:Food".to_string(),
            payee: Some("Old".to_string()),
            narration: None,
        };
        draft.apply(DraftPatch::field(Field::Narration, "lunch"));
        assert_eq!(draft.account, "Expenses:Food");
        assert_eq!(draft.payee.as_deref(), Some("Old"));
        assert_eq!(draft.narration.as_deref(), Some("lunch"));
    }

    #[test]
    fn field_value_falls_back_to_item() {
        let item = item();
        assert_eq!(Draft::field_value(None, &item, Field::Payee), "Corner Shop");
        assert_eq!(Draft::field_value(None, &item, Field::Account), "");

        let draft = Draft {
            account: "Expenses:Food".to_string(),
            payee: Some("Bakery".to_string()),
            narration: None,
        };
        assert_eq!(Draft::field_value(Some(&draft), &item, Field::Payee), "Bakery");
        assert_eq!(
            Draft::field_value(Some(&draft), &item, Field::Account),
            "Expenses:Food"
        );
        assert_eq!(Draft::field_value(Some(&draft), &item, Field::Narration), "");
    }
}
