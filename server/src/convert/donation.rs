use crate::{
    api::donation::{Donation, DonationStatus},
    convert::from::{ApiFrom, FromApi},
    money::Money,
};
use hopewell_status::{internal, Status};
use hopewell_storage::models::donation::{DonationRow, DonationStatus as StoreDonationStatus};
use iso_currency::Currency;

impl ApiFrom<StoreDonationStatus> for DonationStatus {
    fn api_from(value: StoreDonationStatus) -> Result<Self, Status> {
        Ok(match value {
            StoreDonationStatus::Completed => DonationStatus::Completed,
            StoreDonationStatus::Pending => DonationStatus::Pending,
            StoreDonationStatus::Failed => DonationStatus::Failed,
        })
    }
}

impl FromApi<DonationStatus> for StoreDonationStatus {
    fn from_api(api: DonationStatus) -> Result<Self, Status> {
        Ok(match api {
            DonationStatus::Completed => StoreDonationStatus::Completed,
            DonationStatus::Pending => StoreDonationStatus::Pending,
            DonationStatus::Failed => StoreDonationStatus::Failed,
        })
    }
}

impl ApiFrom<DonationRow> for Donation {
    fn api_from(row: DonationRow) -> Result<Self, Status> {
        let currency = Currency::from_code(&row.currency).ok_or_else(|| {
            internal!(
                "donation {} has unknown currency '{}'",
                row.donation_id,
                row.currency
            )
        })?;
        Ok(Donation {
            amount: Money::from_minor(currency, row.amount_minor).major_units(),
            status: DonationStatus::api_from(row.status)?,
            id: row.donation_id,
            order_id: row.order_id,
            donor_name: row.donor_name,
            donor_email: row.donor_email,
            currency: row.currency,
            date: row.create_time,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::into::IntoApi;
    use chrono::{TimeZone, Utc};
    use hopewell_status::Code;

    fn row(currency: &str) -> DonationRow {
        DonationRow {
            donation_id: "pay_1".to_string(),
            create_time: Utc.with_ymd_and_hms(2024, 3, 2, 10, 0, 0).unwrap(),
            order_id: "order_1".to_string(),
            donor_name: "Asha Rao".to_string(),
            donor_email: "asha@example.org".to_string(),
            amount_minor: 100_000,
            currency: currency.to_string(),
            status: StoreDonationStatus::Completed,
        }
    }

    #[test]
    pub fn row_amount_is_in_major_units() {
        let donation: Donation = row("INR").into_api().unwrap();
        assert_eq!(donation.id, "pay_1");
        assert_eq!(donation.amount, 1000.0);
        assert_eq!(donation.status, DonationStatus::Completed);
    }

    #[test]
    pub fn unknown_currency_is_internal() {
        let result: Result<Donation, Status> = row("???").into_api();
        assert_eq!(result.unwrap_err().code(), Code::Internal);
    }
}
