//! Declarative rendering of an item into styled segments.
//!
//! Output is display-independent; the terminal layer maps [`Tone`] to
//! colours and uses `region` for hit-testing and cursor placement.

use crate::model::{Draft, Field, Item};
use crate::input::LineInput;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Date,
    Flag,
    Payee,
    Narration,
    Tag,
    Link,
    Account,
    Amount,
    Placeholder,
    Plain,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    pub tone: Tone,
    /// Editable field this segment shows, if any.
    pub region: Option<Field>,
    /// Value differs from what the server sent.
    pub edited: bool,
    pub focused: bool,
    /// Whole value is selected and will be replaced by typing.
    pub selected: bool,
    /// Cursor position in characters when focused.
    pub cursor: Option<usize>,
}

impl Segment {
    fn plain(text: impl Into<String>) -> Self {
        Self::toned(text, Tone::Plain)
    }

    fn toned(text: impl Into<String>, tone: Tone) -> Self {
        Self {
            text: text.into(),
            tone,
            region: None,
            edited: false,
            focused: false,
            selected: false,
            cursor: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewLine {
    pub segments: Vec<Segment>,
}

impl ViewLine {
    pub fn text(&self) -> String {
        self.segments.iter().map(|s| s.text.as_str()).collect()
    }
}

const INDENT: &str = "  ";

pub fn render_item(
    item: &Item,
    draft: Option<&Draft>,
    active: Option<(Field, &LineInput)>,
) -> Vec<ViewLine> {
    let mut lines = Vec::with_capacity(item.postings.len() + 2);

    let mut header = vec![
        Segment::toned(item.date.format("%Y-%m-%d").to_string(), Tone::Date),
        Segment::plain(" "),
        Segment::toned(item.flag.clone(), Tone::Flag),
        Segment::plain(" \""),
        editable(item, draft, active, Field::Payee),
        Segment::plain("\" \""),
        editable(item, draft, active, Field::Narration),
        Segment::plain("\""),
    ];
    for tag in &item.tags {
        header.push(Segment::plain(" "));
        header.push(Segment::toned(format!("#{tag}"), Tone::Tag));
    }
    for link in &item.links {
        header.push(Segment::plain(" "));
        header.push(Segment::toned(format!("^{link}"), Tone::Link));
    }
    lines.push(ViewLine { segments: header });

    for posting in &item.postings {
        let mut segments = vec![
            Segment::plain(INDENT),
            Segment::toned(posting.account.clone(), Tone::Account),
        ];
        if let Some(amount) = &posting.amount {
            segments.push(Segment::plain(INDENT));
            segments.push(Segment::toned(amount.to_string(), Tone::Amount));
        }
        if let Some(cost) = &posting.cost {
            segments.push(Segment::plain(" "));
            segments.push(Segment::toned(format!("{{{cost}}}"), Tone::Amount));
        }
        if let Some(price) = &posting.price {
            segments.push(Segment::plain(" @ "));
            segments.push(Segment::toned(price.clone(), Tone::Amount));
        }
        lines.push(ViewLine { segments });
    }

    lines.push(ViewLine {
        segments: vec![
            Segment::plain(INDENT),
            editable(item, draft, active, Field::Account),
        ],
    });
    lines
}

fn editable(
    item: &Item,
    draft: Option<&Draft>,
    active: Option<(Field, &LineInput)>,
    field: Field,
) -> Segment {
    let original = match field {
        Field::Account => "",
        Field::Payee => item.payee.as_deref().unwrap_or_default(),
        Field::Narration => item.narration.as_deref().unwrap_or_default(),
    };

    let (value, focused, selected, cursor) = match active {
        Some((active_field, text)) if active_field == field => (
            text.value().to_string(),
            true,
            text.is_selected_all(),
            Some(text.cursor()),
        ),
        _ => (Draft::field_value(draft, item, field), false, false, None),
    };

    let edited = value != original;
    let tone = match field {
        Field::Account => Tone::Account,
        Field::Payee => Tone::Payee,
        Field::Narration => Tone::Narration,
    };

    let (text, tone) = if value.is_empty() && !focused {
        (placeholder(field).to_string(), Tone::Placeholder)
    } else {
        (value, tone)
    };

    Segment {
        text,
        tone,
        region: Some(field),
        edited,
        focused,
        selected,
        cursor,
    }
}

fn placeholder(field: Field) -> &'static str {
    match field {
        Field::Account => "<account>",
        Field::Payee => "<payee>",
        Field::Narration => "<narration>",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Amount, ItemId, Posting};
    use chrono::NaiveDate;

    fn item() -> Item {
        Item {
            id: ItemId::new("t1"),
            date: NaiveDate::from_ymd_opt(2024, 1, 20).unwrap(),
            flag: "!".to_string(),
            payee: Some("Corner Shop".to_string()),
            narration: None,
            tags: vec!["trip".to_string()],
            links: vec!["inv-7".to_string()],
            postings: vec![Posting {
                account: "Assets:Checking".to_string(),
                amount: Some(Amount {
                    value: "-12.50".to_string(),
                    currency: "EUR".to_string(),
                }),
                cost: None,
                price: None,
            }],
        }
    }

    fn region(lines: &[ViewLine], field: Field) -> &Segment {
        lines
            .iter()
            .flat_map(|line| &line.segments)
            .find(|s| s.region == Some(field))
            .unwrap()
    }

    #[test]
    fn renders_header_postings_and_account_line() {
        let lines = render_item(&item(), None, None);
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0].text(),
            "2024-01-20 ! \"Corner Shop\" \"<narration>\" #trip ^inv-7"
        );
        assert_eq!(lines[1].text(), "  Assets:Checking  -12.50 EUR");
        assert_eq!(lines[2].text(), "  <account>");
        assert_eq!(region(&lines, Field::Account).tone, Tone::Placeholder);
    }

    #[test]
    fn draft_values_are_shown_and_marked_edited() {
        let draft = Draft {
            account: "Expenses:Food".to_string(),
            payee: Some("Corner Shop".to_string()),
            narration: Some("milk".to_string()),
        };
        let lines = render_item(&item(), Some(&draft), None);
        let account = region(&lines, Field::Account);
        assert_eq!(account.text, "Expenses:Food");
        assert!(account.edited);
        assert!(!region(&lines, Field::Payee).edited);
        assert!(region(&lines, Field::Narration).edited);
    }

    #[test]
    fn active_field_shows_live_text_and_cursor() {
        let text = LineInput::selecting_all("Corner Shop");
        let lines = render_item(&item(), None, Some((Field::Payee, &text)));
        let payee = region(&lines, Field::Payee);
        assert!(payee.focused);
        assert!(payee.selected);
        assert_eq!(payee.cursor, Some(11));

        let empty = LineInput::new("");
        let lines = render_item(&item(), None, Some((Field::Account, &empty)));
        let account = region(&lines, Field::Account);
        assert_eq!(account.text, "");
        assert_eq!(account.tone, Tone::Account);
    }
}
