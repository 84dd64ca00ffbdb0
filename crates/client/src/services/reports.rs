use chrono::{Duration, NaiveDate};
use serde_json::Value;

use crate::{
    error::Result,
    http::ApiClient,
    models::{AdminDashboard, Granularity, MemberDashboard, TaskStatistics},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatisticsQuery {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub granularity: Granularity,
}

impl StatisticsQuery {
    /// The last 30 days up to and including `today`, bucketed per day.
    pub fn last_30_days(today: NaiveDate) -> Self {
        Self {
            start_date: today - Duration::days(30),
            end_date: today,
            granularity: Granularity::Day,
        }
    }

    pub fn params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("start_date", self.start_date.format("%Y-%m-%d").to_string()),
            ("end_date", self.end_date.format("%Y-%m-%d").to_string()),
            ("granularity", self.granularity.as_str().to_string()),
        ]
    }
}

#[derive(Clone)]
pub struct ReportService {
    api: ApiClient,
}

impl ReportService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn admin_dashboard(&self) -> Result<AdminDashboard> {
        let value: Value = self.api.get("/dashbord/admin/").await?;
        Ok(AdminDashboard::from_value(&value))
    }

    pub async fn member_dashboard(&self, user_id: i64) -> Result<MemberDashboard> {
        self.api.get(&format!("/dashbord/member/{user_id}/")).await
    }

    pub async fn statistics(&self, query: &StatisticsQuery) -> Result<TaskStatistics> {
        self.api
            .get_query("/tasks/statistics/", &query.params())
            .await
    }
}
