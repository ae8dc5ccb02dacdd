use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use health_watch_data::models::{AlertQuery, ReportQuery};
use health_watch_data::repository::{
    AlertRepository, AlertRepositoryTrait, ReportRepository, ReportRepositoryTrait,
};

use crate::config::EngineConfig;
use crate::engine::report::{self, SeveritySummary};
use crate::engine::AlertFactory;
use crate::entities::alert::Alert;
use crate::entities::conversions;
use crate::entities::report::{NewReport, Report, ReportData, ReportStatus, ReportType};
use crate::errors::{map_repo_error, ServiceError};
use crate::services::{corrupt_record, parse_id, Pagination};

const DEFAULT_PAGE_SIZE: usize = 10;

#[derive(Debug, Clone, Default)]
pub struct ReportFilter {
    pub status: Option<ReportStatus>,
    pub report_type: Option<ReportType>,
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "with-api", derive(utoipa::ToSchema))]
pub struct ReportPage {
    pub reports: Vec<Report>,
    pub pagination: Pagination,
}

/// Result of classifying an extraction payload
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "with-api", derive(utoipa::ToSchema))]
pub struct ExtractionOutcome {
    pub report: Report,
    pub summary: SeveritySummary,
    pub alerts: Vec<Alert>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "with-api", derive(utoipa::ToSchema))]
pub struct StatusCounts {
    pub uploaded: usize,
    pub processing: usize,
    pub completed: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "with-api", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ReportStats {
    pub total: usize,
    pub by_status: StatusCounts,
    pub total_findings: usize,
    /// Report count per report type
    pub by_type: HashMap<String, usize>,
}

/// Trait for report service operations
#[async_trait]
pub trait ReportServiceTrait: Send + Sync {
    /// Register an uploaded document, status `uploaded`
    async fn register_report(&self, patient_id: &str, input: NewReport) -> Result<Report, ServiceError>;

    async fn get_report(&self, id: &str) -> Result<Report, ServiceError>;

    async fn list_reports(&self, patient_id: &str, filter: ReportFilter) -> Result<ReportPage, ServiceError>;

    async fn mark_processing(&self, id: &str) -> Result<Report, ServiceError>;

    /// Classify an extraction payload: findings are replaced, alerts from any
    /// earlier pass are dropped and new ones emitted
    async fn apply_extraction(
        &self,
        id: &str,
        payload: &Value,
        processing_time_ms: Option<u64>,
    ) -> Result<ExtractionOutcome, ServiceError>;

    async fn mark_failed(&self, id: &str, message: &str) -> Result<Report, ServiceError>;

    async fn delete_report(&self, patient_id: &str, id: &str) -> Result<(), ServiceError>;

    async fn report_stats(&self, patient_id: &str) -> Result<ReportStats, ServiceError>;
}

/// Report service for domain logic
pub struct ReportService<P: ReportRepositoryTrait, A: AlertRepositoryTrait> {
    reports: P,
    alerts: A,
    factory: AlertFactory,
}

impl<P: ReportRepositoryTrait, A: AlertRepositoryTrait> ReportService<P, A> {
    pub fn new(reports: P, alerts: A, config: &EngineConfig) -> Self {
        Self {
            reports,
            alerts,
            factory: AlertFactory::new(config.alert_ttl),
        }
    }

    async fn save(&self, report: &Report) -> Result<(), ServiceError> {
        let record = conversions::convert_to_data_report(report).map_err(corrupt_record)?;
        self.reports.update(record).await.map_err(map_repo_error)?;
        Ok(())
    }

    /// Drop alerts emitted by an earlier classification of the same report
    async fn drop_report_alerts(&self, report: &Report) -> Result<usize, ServiceError> {
        let query = AlertQuery::for_patient(report.patient_id.to_string());
        let (records, _) = self.alerts.query(&query).await.map_err(map_repo_error)?;
        let report_id = report.id.to_string();

        let mut dropped = 0;
        for record in records.iter().filter(|r| r.report_id.as_deref() == Some(report_id.as_str())) {
            if self.alerts.delete(&record.id).await.map_err(map_repo_error)? {
                dropped += 1;
            }
        }
        Ok(dropped)
    }
}

#[async_trait]
impl<P: ReportRepositoryTrait, A: AlertRepositoryTrait> ReportServiceTrait for ReportService<P, A> {
    #[instrument(skip(self, input))]
    async fn register_report(&self, patient_id: &str, input: NewReport) -> Result<Report, ServiceError> {
        let patient = parse_id(patient_id)?;
        let report = Report {
            id: Uuid::new_v4(),
            patient_id: patient,
            report_type: input.report_type,
            file_url: input.file_url,
            file_name: input.file_name,
            file_type: input.file_type,
            status: ReportStatus::Uploaded,
            data: ReportData::default(),
            findings: Vec::new(),
            ocr_confidence: None,
            processing_time_ms: None,
            error_message: None,
            uploaded_at: Utc::now(),
            processed_at: None,
            notes: input.notes,
        };

        let record = conversions::convert_to_data_report(&report).map_err(corrupt_record)?;
        self.reports.insert(record).await.map_err(map_repo_error)?;

        info!(report_id = %report.id, report_type = %report.report_type.as_str(), "Report registered");
        Ok(report)
    }

    #[instrument(skip(self))]
    async fn get_report(&self, id: &str) -> Result<Report, ServiceError> {
        parse_id(id)?;
        let record = self.reports
            .get_by_id(id)
            .await
            .map_err(map_repo_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Report with ID {} not found", id)))?;
        conversions::convert_to_domain_report(record).map_err(corrupt_record)
    }

    #[instrument(skip(self, filter))]
    async fn list_reports(&self, patient_id: &str, filter: ReportFilter) -> Result<ReportPage, ServiceError> {
        parse_id(patient_id)?;
        let (page, limit) = Pagination::request(filter.page, filter.limit, DEFAULT_PAGE_SIZE);
        let query = ReportQuery {
            status: filter.status.map(|s| s.as_str().to_string()),
            report_type: filter.report_type.map(|t| t.as_str().to_string()),
            limit: Some(limit),
            offset: Some(Pagination::offset(page, limit)),
            ..ReportQuery::for_patient(patient_id)
        };

        let (records, total) = self.reports.query(&query).await.map_err(map_repo_error)?;
        let reports = records
            .into_iter()
            .map(conversions::convert_to_domain_report)
            .collect::<Result<Vec<_>, _>>()
            .map_err(corrupt_record)?;

        Ok(ReportPage {
            reports,
            pagination: Pagination::new(total, page, limit),
        })
    }

    #[instrument(skip(self))]
    async fn mark_processing(&self, id: &str) -> Result<Report, ServiceError> {
        let mut report = self.get_report(id).await?;
        if report.status == ReportStatus::Processing {
            return Err(ServiceError::InvalidState(format!("Report {} is already processing", id)));
        }
        report.status = ReportStatus::Processing;
        report.error_message = None;
        self.save(&report).await?;
        Ok(report)
    }

    #[instrument(skip(self, payload))]
    async fn apply_extraction(
        &self,
        id: &str,
        payload: &Value,
        processing_time_ms: Option<u64>,
    ) -> Result<ExtractionOutcome, ServiceError> {
        let mut report = self.get_report(id).await?;
        if report.status == ReportStatus::Failed {
            return Err(ServiceError::InvalidState(format!(
                "Report {} failed processing and must be re-submitted",
                id
            )));
        }

        let extraction = ReportData::from_extraction(payload);
        if extraction.data.is_empty() {
            warn!(report_id = %id, "Extraction payload carried no known parameter groups");
        }
        let findings = report::classify(&extraction.data);
        let summary = report::severity_summary(&findings);

        report.data = extraction.data;
        report.findings = findings;
        report.ocr_confidence = extraction.confidence;
        report.processing_time_ms = processing_time_ms;
        report.status = ReportStatus::Completed;
        report.error_message = None;
        report.processed_at = Some(Utc::now());
        self.save(&report).await?;

        let dropped = self.drop_report_alerts(&report).await?;
        let alerts = self.factory.for_report(report.patient_id, report.id, &report.findings);
        if !alerts.is_empty() {
            let records = alerts.iter().map(conversions::convert_to_data_alert).collect();
            self.alerts.insert_many(records).await.map_err(map_repo_error)?;
        }

        info!(
            report_id = %report.id,
            findings = report.findings.len(),
            alerts = alerts.len(),
            replaced_alerts = dropped,
            "Report classified"
        );
        Ok(ExtractionOutcome { report, summary, alerts })
    }

    #[instrument(skip(self))]
    async fn mark_failed(&self, id: &str, message: &str) -> Result<Report, ServiceError> {
        let mut report = self.get_report(id).await?;
        if report.status == ReportStatus::Completed {
            return Err(ServiceError::InvalidState(format!("Report {} is already completed", id)));
        }
        report.status = ReportStatus::Failed;
        report.error_message = Some(message.to_string());
        self.save(&report).await?;

        warn!(report_id = %id, "Report processing failed: {}", message);
        Ok(report)
    }

    #[instrument(skip(self))]
    async fn delete_report(&self, patient_id: &str, id: &str) -> Result<(), ServiceError> {
        let patient = parse_id(patient_id)?;
        let report = self.get_report(id).await?;
        if report.patient_id != patient {
            return Err(ServiceError::Forbidden("Not authorized to delete this report".to_string()));
        }
        self.reports.delete(id).await.map_err(map_repo_error)?;
        info!(report_id = %id, "Report deleted");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn report_stats(&self, patient_id: &str) -> Result<ReportStats, ServiceError> {
        parse_id(patient_id)?;
        let (records, total) = self.reports
            .query(&ReportQuery::for_patient(patient_id))
            .await
            .map_err(map_repo_error)?;

        let mut stats = ReportStats {
            total,
            by_status: StatusCounts::default(),
            total_findings: 0,
            by_type: HashMap::new(),
        };
        for record in &records {
            match ReportStatus::parse(&record.status) {
                Some(ReportStatus::Uploaded) => stats.by_status.uploaded += 1,
                Some(ReportStatus::Processing) => stats.by_status.processing += 1,
                Some(ReportStatus::Completed) => stats.by_status.completed += 1,
                Some(ReportStatus::Failed) => stats.by_status.failed += 1,
                None => return Err(corrupt_record(format!("Unknown report status: {}", record.status))),
            }
            stats.total_findings += record.findings.len();
            *stats.by_type.entry(record.report_type.clone()).or_insert(0) += 1;
        }
        Ok(stats)
    }
}

/// Create a default report service using the repositories from the data layer
pub fn create_default_report_service(config: &EngineConfig) -> impl ReportServiceTrait {
    ReportService::new(ReportRepository::new(), AlertRepository::new(), config)
}
