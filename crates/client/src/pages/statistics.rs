use chrono::NaiveDate;
use tokio::sync::RwLock;

use super::Notices;
use crate::{
    error::Result,
    models::{Granularity, TaskStatistics},
    services::{ReportService, StatisticsQuery},
};

const CSV_HEADER: &str = "period,tasks_created,tasks_completed,avg_progress";

pub struct StatisticsView {
    reports: ReportService,
    query: RwLock<StatisticsQuery>,
    data: RwLock<Option<TaskStatistics>>,
    pub notices: Notices,
}

impl StatisticsView {
    pub fn new(reports: ReportService, today: NaiveDate) -> Self {
        Self {
            reports,
            query: RwLock::new(StatisticsQuery::last_30_days(today)),
            data: RwLock::new(None),
            notices: Notices::default(),
        }
    }

    pub async fn query(&self) -> StatisticsQuery {
        *self.query.read().await
    }

    /// Changing the range or granularity refetches.
    pub async fn set_range(&self, start: NaiveDate, end: NaiveDate) -> Result<()> {
        {
            let mut query = self.query.write().await;
            query.start_date = start;
            query.end_date = end;
        }
        self.load().await
    }

    pub async fn set_granularity(&self, granularity: Granularity) -> Result<()> {
        self.query.write().await.granularity = granularity;
        self.load().await
    }

    pub async fn load(&self) -> Result<()> {
        let query = self.query().await;
        match self.reports.statistics(&query).await {
            Ok(stats) => {
                *self.data.write().await = Some(stats);
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Failed to load statistics: {}", e);
                Err(e)
            }
        }
    }

    pub async fn data(&self) -> Option<TaskStatistics> {
        self.data.read().await.clone()
    }

    /// The series as CSV, or `None` before the first load.
    pub async fn csv(&self) -> Option<String> {
        self.data.read().await.as_ref().map(series_csv)
    }

    pub async fn csv_file_name(&self) -> String {
        let query = self.query().await;
        format!(
            "task-stats_{}_{}.csv",
            query.start_date.format("%Y%m%d"),
            query.end_date.format("%Y%m%d")
        )
    }
}

pub fn series_csv(stats: &TaskStatistics) -> String {
    let mut lines = vec![CSV_HEADER.to_string()];
    for point in &stats.series {
        let cells = [
            point.period.clone().unwrap_or_default(),
            point.tasks_created.to_string(),
            point.tasks_completed.to_string(),
            point.avg_progress.map(|p| p.to_string()).unwrap_or_default(),
        ];
        let row: Vec<String> = cells
            .iter()
            .map(|c| format!("\"{}\"", c.replace('"', "\"\"")))
            .collect();
        lines.push(row.join(","));
    }
    lines.join("\n")
}
