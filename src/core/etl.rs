use crate::core::table::RecordTable;
use crate::domain::model::{FetchOutcome, FormatOutcome, PersistReport, TreeOutcome};
use crate::domain::ports::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

const SAMPLE_ROWS: usize = 5;

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub rows: usize,
    pub columns: usize,
    pub fetch_outcome: FetchOutcome,
    pub persist: PersistReport,
}

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<RunSummary> {
        println!("Starting review ETL...");

        println!("Fetching reviews...");
        let report = self.pipeline.extract().await?;
        let fetch_outcome = report.outcome.clone();
        match &fetch_outcome {
            FetchOutcome::Completed => {}
            FetchOutcome::Exhausted => {
                println!("Source ran out of reviews before the target was reached")
            }
            FetchOutcome::Stalled => {
                println!("Source stopped making progress, keeping what was fetched")
            }
            FetchOutcome::TruncatedByError(reason) => {
                println!("Fetch stopped early ({}), keeping partial data", reason)
            }
        }
        println!("Fetched {} reviews", report.reviews.len());
        self.monitor.log_stats("Fetch");

        println!("Normalizing records...");
        let table = self.pipeline.transform(report).await?;
        println!(
            "Normalized into {} rows x {} columns",
            table.row_count(),
            table.column_count()
        );
        self.monitor.log_stats("Normalize");

        print_summary(&table);

        println!("Writing output files...");
        let persist = self.pipeline.load(&table).await?;
        report_persistence(&persist);
        self.monitor.log_stats("Persist");
        self.monitor.log_final_stats();

        Ok(RunSummary {
            rows: table.row_count(),
            columns: table.column_count(),
            fetch_outcome,
            persist,
        })
    }
}

fn print_summary(table: &RecordTable) {
    println!("\nDataset: {} rows x {} columns", table.row_count(), table.column_count());
    println!("Columns: {}", table.columns().join(", "));

    if !table.is_empty() {
        println!("\nSample rows:");
        for row in table.head(SAMPLE_ROWS) {
            if let Ok(line) = serde_json::to_string(row) {
                println!("  {}", line);
            }
        }
    }

    let distribution = table.score_distribution();
    if !distribution.is_empty() {
        println!("\nScore distribution:");
        for (score, count) in distribution {
            println!("  {}: {}", score, count);
        }
    }
    println!();
}

fn report_persistence(report: &PersistReport) {
    match &report.delimited {
        FormatOutcome::Written { path } => println!("Saved delimited output to {}", path),
        FormatOutcome::Failed { reason } => {
            println!("Failed to save delimited output: {}", reason)
        }
    }

    match &report.tree {
        TreeOutcome::Pretty { path } => println!("Saved JSON output to {}", path),
        TreeOutcome::LineDelimited {
            path,
            primary_reason,
        } => println!(
            "Saved JSON output to {} as one record per line (pretty output failed: {})",
            path, primary_reason
        ),
        TreeOutcome::Failed {
            primary_reason,
            fallback_reason,
        } => println!(
            "Failed to save JSON output (pretty: {}; fallback: {})",
            primary_reason, fallback_reason
        ),
    }
}
