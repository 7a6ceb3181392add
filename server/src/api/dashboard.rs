use async_trait::async_trait;
use hopewell_status::Status;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Deserialize)]
pub struct DonationDashboardRequest {
    pub year: i32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MonthlyTotal {
    /// 1 = January.
    pub month: u32,
    pub donation_count: i64,
    pub total_amount: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DonationDashboard {
    pub year: i32,
    pub currency: String,
    pub months: Vec<MonthlyTotal>,
    pub donation_count: i64,
    pub total_amount: f64,
}

#[async_trait]
pub trait DashboardService: Send + Sync + 'static {
    /// Completed donations bucketed by UTC calendar month.
    async fn donation_dashboard(
        &self,
        request: DonationDashboardRequest,
    ) -> Result<DonationDashboard, Status>;
}
