//! A bookkeeping bot: users mention it with `label amount` to record income or expenses and
//! with a date to see that day's entries.
//!
//! Entries live in memory only, keyed by user and local calendar day.

pub mod command;

use std::collections::BTreeMap;
use std::fmt::Write as _;

use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use dashmap::DashMap;

pub use self::command::Command;
use self::command::DATE_FORMAT;
use crate::gateway::EventHandler;

/// Reply to a mention that is not a command.
pub const USAGE: &str = "\nMention me with a command:\n\n\
> 'label amount' (e.g. dinner -15) records an entry; negative amounts are expenses, positive amounts are income\n\n\
> 'date' (e.g. 2022.05.01) shows the entries of that day";

const RULE: &str = "----------\n";

/// One recorded amount.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub label: String,
    pub amount: i64,
}

/// Per-user, per-day ledger.
#[derive(Debug)]
pub struct Ledger {
    books: DashMap<String, BTreeMap<NaiveDate, Vec<Entry>>>,
    today: fn() -> NaiveDate,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

impl Ledger {
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(local_today)
    }

    /// Creates a ledger whose notion of "today" comes from `today`.
    #[must_use]
    pub fn with_clock(today: fn() -> NaiveDate) -> Self {
        Self {
            books: DashMap::new(),
            today,
        }
    }

    /// Records `amount` under `label` for `user_id`, dated today.
    pub fn record(&self, user_id: &str, label: &str, amount: i64) {
        let today = (self.today)();

        #[cfg(feature = "tracing")]
        tracing::debug!(%user_id, %label, amount, date = %today, "Recording ledger entry");

        self.books
            .entry(user_id.to_owned())
            .or_default()
            .entry(today)
            .or_default()
            .push(Entry {
                label: label.to_owned(),
                amount,
            });
    }

    /// Returns the entries of `user_id` on `date`, in recording order.
    #[must_use]
    pub fn entries(&self, user_id: &str, date: NaiveDate) -> Vec<Entry> {
        self.books
            .get(user_id)
            .and_then(|book| book.get(&date).cloned())
            .unwrap_or_default()
    }

    /// Renders the entries of `user_id` on `date` with their totals.
    #[must_use]
    pub fn summary(&self, user_id: &str, date: NaiveDate) -> String {
        let entries = self.entries(user_id, date);

        let mut out = format!("{} details:\n{RULE}", date.format(DATE_FORMAT));
        let (mut income, mut expense) = (0_i64, 0_i64);
        for entry in &entries {
            _ = writeln!(out, "{} : {}", entry.label, entry.amount);
            if entry.amount < 0 {
                expense = expense.saturating_sub(entry.amount);
            } else {
                income = income.saturating_add(entry.amount);
            }
        }
        out.push_str(RULE);
        _ = write!(
            out,
            "net: {}, income: {income}, expense: {expense}",
            income.saturating_sub(expense)
        );
        out
    }

    /// Executes the command in `text` on behalf of `user_id` and returns the reply.
    #[must_use]
    pub fn handle(&self, user_id: &str, text: &str) -> String {
        match Command::parse(text) {
            Command::Usage => USAGE.to_owned(),
            Command::Record { label, amount } => {
                self.record(user_id, &label, amount);
                self.summary(user_id, (self.today)())
            }
            Command::Report(date) => self.summary(user_id, date),
        }
    }
}

#[async_trait]
impl EventHandler for Ledger {
    async fn on_mention(&self, user_id: &str, text: &str) -> String {
        self.handle(user_id, text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn may_day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2022, 5, 1).unwrap_or_default()
    }

    #[test]
    fn default_clock_should_use_local_date() {
        let ledger = Ledger::new();
        let before = Local::now().date_naive();

        ledger.record("u1", "lunch", -15);

        let after = Local::now().date_naive();
        let recorded = ledger.entries("u1", before).len() + ledger.entries("u1", after).len();
        assert!(recorded >= 1, "entry should land on the local date");
    }

    #[test]
    fn record_should_reply_with_todays_summary() {
        let ledger = Ledger::with_clock(may_day);

        ledger.handle("u1", "<@!424268190167377645> salary 100");
        let reply = ledger.handle("u1", "<@!424268190167377645> lunch -15");

        assert_eq!(
            reply,
            "2022.05.01 details:\n----------\nsalary : 100\nlunch : -15\n----------\nnet: 85, income: 100, expense: 15"
        );
    }

    #[test]
    fn report_should_show_requested_day() {
        let ledger = Ledger::with_clock(may_day);
        ledger.record("u1", "lunch", -15);

        assert_eq!(
            ledger.handle("u1", "2022.04.30"),
            "2022.04.30 details:\n----------\n----------\nnet: 0, income: 0, expense: 0"
        );
        assert!(ledger.handle("u1", "2022.05.01").contains("lunch : -15"));
    }

    #[test]
    fn users_should_not_share_entries() {
        let ledger = Ledger::with_clock(may_day);
        ledger.record("u1", "lunch", -15);

        assert!(ledger.entries("u2", may_day()).is_empty());
        assert_eq!(ledger.entries("u1", may_day()).len(), 1);
    }

    #[test]
    fn bad_input_should_reply_with_usage() {
        let ledger = Ledger::with_clock(may_day);

        assert_eq!(ledger.handle("u1", "<@!424268190167377645>"), USAGE);
        assert_eq!(ledger.handle("u1", "lunch fifteen"), USAGE);
        assert!(ledger.entries("u1", may_day()).is_empty());
    }

    #[test]
    fn zero_should_count_as_income() {
        let ledger = Ledger::with_clock(may_day);
        ledger.record("u1", "nothing", 0);

        assert!(ledger.summary("u1", may_day()).ends_with("net: 0, income: 0, expense: 0"));
    }
}
