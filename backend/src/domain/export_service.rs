//! Sales report export.
//!
//! Builds the `sales_reports` rows for a reporting window, writes a
//! timestamped report file into the reports directory, and appends the
//! same rows to the export log in the data directory. Report files are
//! write-only; nothing in the system reads them back.

use crate::domain::models::{Order, OrderStatus};
use crate::domain::sales_service;
use crate::error::{Error, Result};
use crate::storage::csv::CsvConnection;
use chrono::{DateTime, Utc};
use csv::Writer;
use log::info;
use shared::{ExportRequest, ExportResponse};
use std::fs;
use std::path::PathBuf;

const TABLE: &str = "sales_reports";
const HEADER: [&str; 9] = [
    "date",
    "order_id",
    "customer_name",
    "order_type",
    "status",
    "subtotal",
    "tax",
    "total",
    "items_count",
];

#[derive(Clone)]
pub struct ExportService {
    connection: CsvConnection,
    reports_dir: PathBuf,
}

impl ExportService {
    pub fn new(connection: CsvConnection, reports_dir: PathBuf) -> Self {
        Self {
            connection,
            reports_dir,
        }
    }

    /// Export completed orders for the requested period. Only CSV is
    /// supported; any other format is rejected up front.
    pub fn export_report(
        &self,
        orders: &[Order],
        request: &ExportRequest,
        now: DateTime<Utc>,
    ) -> Result<ExportResponse> {
        if request.format != "csv" {
            return Err(Error::validation(
                "format",
                format!("unsupported export format '{}', only csv is available", request.format),
            ));
        }

        let (start, end) = sales_service::resolve_period(&request.period, now)?;
        let mut completed: Vec<&Order> = orders
            .iter()
            .filter(|o| o.status == OrderStatus::Completed)
            .filter(|o| o.created_at >= start && o.created_at <= end)
            .collect();
        completed.sort_by(|a, b| a.created_at.cmp(&b.created_at));

        let rows = render_rows(&completed)?;

        fs::create_dir_all(&self.reports_dir)?;
        let filename = format!("sales_report_{}.csv", now.format("%Y%m%d_%H%M%S"));
        let path = self.reports_dir.join(&filename);
        fs::write(&path, format!("{}\n{}", HEADER.join(","), rows))?;

        self.append_to_log(&rows)?;

        info!(
            "exported {} order(s) to {}",
            completed.len(),
            path.display()
        );
        Ok(ExportResponse {
            filename,
            path: path.to_string_lossy().into_owned(),
            record_count: completed.len() as u64,
        })
    }

    /// The running export log lives beside the live tables and only ever
    /// grows; it is never read back as a source of truth.
    fn append_to_log(&self, rows: &str) -> Result<()> {
        self.connection
            .ensure_table_exists(TABLE, &HEADER.join(","))?;
        let mut contents = fs::read_to_string(self.connection.table_path(TABLE))?;
        contents.push_str(rows);
        self.connection.atomic_replace(TABLE, contents.as_bytes())
    }
}

fn render_rows(completed: &[&Order]) -> Result<String> {
    let mut writer = Writer::from_writer(Vec::new());
    for order in completed {
        let date = order.created_at.format("%Y-%m-%d %H:%M:%S").to_string();
        writer
            .write_record(&[
                date.as_str(),
                order.id.as_str(),
                order.customer.name.as_str(),
                order.customer.order_type.as_str(),
                order.status.as_str(),
                &order.subtotal.to_string(),
                &order.tax.to_string(),
                &order.total.to_string(),
                &order.item_count().to_string(),
            ])
            .map_err(|e| Error::corruption(TABLE, e.to_string()))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| Error::corruption(TABLE, e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| Error::corruption(TABLE, e.to_string()))
}
