use chrono::NaiveDate;

/// Date format accepted in commands and used in summaries.
pub const DATE_FORMAT: &str = "%Y.%m.%d";

/// A parsed ledger command.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Nothing usable was given
    Usage,
    /// `label amount`: record an entry for today
    Record { label: String, amount: i64 },
    /// `YYYY.MM.DD`: show that day's entries
    Report(NaiveDate),
}

impl Command {
    /// Parses the text of a mention. Mention tokens are ignored wherever they appear.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let text = strip_mentions(text);
        let tokens: Vec<&str> = text.split_whitespace().collect();

        match tokens.as_slice() {
            [label, amount] => match amount.parse::<i64>() {
                Ok(amount) => Self::Record {
                    label: (*label).to_owned(),
                    amount,
                },
                Err(_) => Self::Usage,
            },
            [date] => NaiveDate::parse_from_str(date, DATE_FORMAT)
                .map_or(Self::Usage, Self::Report),
            _ => Self::Usage,
        }
    }
}

/// Removes every `<@!id>` token from `text`.
fn strip_mentions(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some((before, after)) = rest.split_once("<@!") {
        out.push_str(before);
        match after.split_once('>') {
            Some((_, tail)) => rest = tail,
            None => {
                out.push_str("<@!");
                rest = after;
                break;
            }
        }
    }
    out.push_str(rest);
    out
}
