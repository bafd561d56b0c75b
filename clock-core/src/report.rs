use std::fmt;

use chrono::{DateTime, TimeZone, Utc};

use crate::{
    countdown::Countdown,
    error::DataShapeError,
    model::{
        ClockSnapshot, DeadlineInfo, GREEN_CLIMATE_FUND, INDIGENOUS_LAND, NewsFeed, RenewablesInfo,
        StaticStat,
    },
};

const WIDTH: usize = 80;

/// Everything one rendering of the clock needs, already computed.
#[derive(Debug, Clone, PartialEq)]
pub struct ClockReport {
    /// Banner date in the caller's time zone, e.g. `Mon 19 Oct 2026`.
    pub date: String,
    pub deadline: DeadlineInfo,
    pub countdown: Countdown,
    pub renewables: RenewablesInfo,
    pub renewables_percent: f64,
    pub initiative_30x30: StaticStat,
    pub indigenous_land: StaticStat,
    pub news: NewsFeed,
}

/// Derive the report for `snapshot` as of `now`.
///
/// The banner date is taken in `now`'s own time zone; every computation uses
/// its UTC instant.
pub fn render<Tz>(
    snapshot: &ClockSnapshot,
    now: &DateTime<Tz>,
    headline_limit: usize,
) -> Result<ClockReport, DataShapeError>
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let now_utc = now.with_timezone(&Utc);

    let deadline = snapshot.carbon_deadline.deadline_info()?;
    let countdown = Countdown::until(now_utc, deadline.timestamp)?;

    let renewables = snapshot.renewables.renewables_info()?;
    let renewables_percent = renewables.percent_at(now_utc);

    Ok(ClockReport {
        date: now.format("%a %d %b %Y").to_string(),
        deadline,
        countdown,
        renewables,
        renewables_percent,
        initiative_30x30: snapshot.green_climate_fund.static_stat(GREEN_CLIMATE_FUND)?,
        indigenous_land: snapshot.indigenous_land.static_stat(INDIGENOUS_LAND)?,
        news: snapshot.newsfeed.news_feed(headline_limit)?,
    })
}

impl fmt::Display for ClockReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let heavy = "=".repeat(WIDTH);
        let light = "-".repeat(WIDTH);

        writeln!(f)?;
        writeln!(f, "{heavy}")?;
        writeln!(f, "  🌍 CLIMATE CLOCK  |  {}", self.date)?;
        writeln!(f, "{heavy}")?;

        writeln!(f, "  ⏳ {}", self.deadline.label)?;
        writeln!(
            f,
            "     {} YRS  {} DAYS  {}",
            self.countdown.years,
            self.countdown.days,
            self.countdown.clock()
        )?;
        writeln!(f, "{light}")?;

        writeln!(f, "  ⚡ {}: {:.4}%", self.renewables.label, self.renewables_percent)?;
        writeln!(f, "{light}")?;

        writeln!(
            f,
            "  🌱 {}: {}",
            self.initiative_30x30.label,
            self.initiative_30x30.value_with_unit()
        )?;
        writeln!(f, "{light}")?;

        // the mountain emoji renders narrow in most terminals, hence the extra space
        writeln!(
            f,
            "  🏔️  {}: {}",
            self.indigenous_land.label,
            self.indigenous_land.value_with_unit()
        )?;
        writeln!(f, "{light}")?;

        writeln!(f, "  📰 Climate News:")?;
        for (i, headline) in self.news.headlines.iter().enumerate() {
            writeln!(f, "     {}. {}", i + 1, headline)?;
        }
        writeln!(f, "{heavy}")?;
        writeln!(f)
    }
}
