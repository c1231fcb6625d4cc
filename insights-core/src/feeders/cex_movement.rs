use super::{FeedError, Feeder};
use crate::events::CexMovementInfo;
use async_trait::async_trait;
use insights_sdk::client::{Upstream, fetch_dune};
use insights_sdk::objects::dune::CexMovementRow;
use std::sync::Arc;
use time::{Date, OffsetDateTime};
use tracing::warn;

/// First day of the year that is ever announced on a fresh install.
const SEED_DAY_OF_YEAR: u16 = 32;

pub(super) fn utc_today() -> Date {
    OffsetDateTime::now_utc().date()
}

/// Announces daily FLIP flows to and from centralised exchanges.
///
/// Rows come from a saved Dune query and only carry a day of the year. A day
/// below today's ordinal is this year, one above it is last year's, and
/// today itself is still accumulating so it is held back. Events are keyed
/// by the resolved date, which keeps the cursor moving past new year.
pub struct CexMovementFeeder {
    upstream: Arc<dyn Upstream>,
    query_id: String,
    today: fn() -> Date,
}

impl CexMovementFeeder {
    pub fn new(upstream: Arc<dyn Upstream>, query_id: impl Into<String>) -> Self {
        Self {
            upstream,
            query_id: query_id.into(),
            today: utc_today,
        }
    }

    /// Replace the UTC clock.
    pub fn with_clock(mut self, today: fn() -> Date) -> Self {
        self.today = today;
        self
    }
}

/// The calendar date of `day_of_year` as seen from `today`, or `None` for
/// today and for days that do not exist in the resolved year.
fn resolve_day(day_of_year: u32, today: Date) -> Option<Date> {
    let ordinal = u16::try_from(day_of_year).ok()?;
    let year = match ordinal.cmp(&today.ordinal()) {
        std::cmp::Ordering::Less => today.year(),
        std::cmp::Ordering::Equal => return None,
        std::cmp::Ordering::Greater => today.year() - 1,
    };
    Date::from_ordinal_date(year, ordinal).ok()
}

fn to_event(row: CexMovementRow, date: Date) -> CexMovementInfo {
    CexMovementInfo {
        day_of_year: row.day_of_year,
        date,
        flip_to_cex: row.flip_to_cex,
        flip_from_cex: row.flip_from_cex,
    }
}

#[async_trait]
impl Feeder for CexMovementFeeder {
    type Event = CexMovementInfo;

    fn name(&self) -> &'static str {
        "cex_movement"
    }

    fn default_cursor(&self) -> Date {
        let today = (self.today)();
        Date::from_ordinal_date(today.year(), SEED_DAY_OF_YEAR).unwrap_or(today)
    }

    async fn fetch(&self, _cursor: &Date) -> Result<Vec<CexMovementInfo>, FeedError> {
        let today = (self.today)();
        let rows: Vec<CexMovementRow> = fetch_dune(self.upstream.as_ref(), &self.query_id).await?;
        Ok(rows
            .into_iter()
            .filter_map(|row| {
                if u32::from(today.ordinal()) == row.day_of_year {
                    return None;
                }
                match resolve_day(row.day_of_year, today) {
                    Some(date) => Some(to_event(row, date)),
                    None => {
                        warn!(
                            day_of_year = row.day_of_year,
                            %today,
                            "Skipping row with an impossible day"
                        );
                        None
                    }
                }
            })
            .collect())
    }
}
