use crate::{api::dashboard::*, money::Money};
use async_trait::async_trait;
use chrono::{DateTime, Datelike, TimeZone, Utc};
use hopewell_status::{invalid_argument, Status};
use hopewell_storage::{
    database::{
        client::DatabaseClient,
        store::{OnDemandStore, TransactionalStore},
    },
    models::donation::{DonationRow, DonationStatus},
    stores::donation::DonationStore,
};
use iso_currency::Currency;
use log::warn;
use std::{marker::PhantomData, ops::RangeInclusive, sync::Arc};

const YEARS: RangeInclusive<i32> = 2000..=9999;

pub struct DashboardServiceImpl<Client, Store, TStore> {
    database: Arc<Client>,
    currency: Currency,
    _marker: PhantomData<fn() -> (Store, TStore)>,
}

impl<Client, Store, TStore> DashboardServiceImpl<Client, Store, TStore> {
    pub fn new(database: Arc<Client>, currency: Currency) -> Self {
        Self {
            database,
            currency,
            _marker: PhantomData,
        }
    }
}

fn start_of_year(year: i32) -> Result<DateTime<Utc>, Status> {
    Utc.with_ymd_and_hms(year, 1, 1, 0, 0, 0)
        .single()
        .ok_or_else(|| invalid_argument!("'year' is out of range: {}", year))
}

/// Sums donations into one bucket per calendar month. Rows in a currency
/// other than `currency` are skipped.
fn monthly_totals(rows: &[DonationRow], currency: Currency) -> Vec<MonthlyTotal> {
    let mut counts = [0i64; 12];
    let mut minor_totals = [0i64; 12];
    for row in rows {
        if row.currency != currency.code() {
            warn!(
                "Donation {} is in {} and was left out of the {} dashboard",
                row.donation_id,
                row.currency,
                currency.code()
            );
            continue;
        }
        let month = row.create_time.month0() as usize;
        counts[month] += 1;
        minor_totals[month] += row.amount_minor;
    }

    (0..12)
        .map(|month| MonthlyTotal {
            month: month as u32 + 1,
            donation_count: counts[month],
            total_amount: Money::from_minor(currency, minor_totals[month]).major_units(),
        })
        .collect()
}

#[async_trait]
impl<Client, Store, TStore> DashboardService for DashboardServiceImpl<Client, Store, TStore>
where
    Client: DatabaseClient<Store, TStore> + 'static,
    Store: DonationStore + OnDemandStore + 'static,
    TStore: DonationStore + TransactionalStore + 'static,
{
    async fn donation_dashboard(
        &self,
        request: DonationDashboardRequest,
    ) -> Result<DonationDashboard, Status> {
        if !YEARS.contains(&request.year) {
            return Err(invalid_argument!(
                "'year' must be between {} and {}",
                YEARS.start(),
                YEARS.end()
            ));
        }
        let start = start_of_year(request.year)?;
        let end = start_of_year(request.year + 1)?;

        let rows = self
            .database
            .on_demand()
            .list_donations_between(start, end, DonationStatus::Completed)
            .await?;

        let months = monthly_totals(&rows, self.currency);
        let donation_count = months.iter().map(|m| m.donation_count).sum();
        let total_minor = rows
            .iter()
            .filter(|row| row.currency == self.currency.code())
            .map(|row| row.amount_minor)
            .sum();

        Ok(DonationDashboard {
            year: request.year,
            currency: self.currency.code().to_string(),
            months,
            donation_count,
            total_amount: Money::from_minor(self.currency, total_minor).major_units(),
        })
    }
}
