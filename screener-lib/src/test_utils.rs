// Test utilities available to both unit and integration tests
// Only compiled when testing

use rust_xlsxwriter::Workbook;
use std::cell::RefCell;
use std::collections::VecDeque;

use crate::config::CredentialProvider;
use crate::error::ServiceError;
use crate::ranking::{CompletionRequest, CompletionService};
use crate::record::{Record, RecordTable};

/// Build an in-memory xlsx workbook with one sheet.
/// Values that parse as numbers are written as numeric cells, empty strings are skipped.
#[allow(dead_code)]
pub fn build_xlsx(rows: &[Vec<&str>]) -> Vec<u8> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    for (row_index, row) in rows.iter().enumerate() {
        for (col_index, value) in row.iter().enumerate() {
            if value.is_empty() {
                continue;
            }
            let (r, c) = (row_index as u32, col_index as u16);
            let written = match value.parse::<f64>() {
                Ok(number) => worksheet.write_number(r, c, number).map(|_| ()),
                Err(_) => worksheet.write_string(r, c, *value).map(|_| ()),
            };
            written.unwrap();
        }
    }

    workbook.save_to_buffer().unwrap()
}

/// Ten sample firms used across ranking tests
#[allow(dead_code)]
pub fn sample_records() -> RecordTable {
    RecordTable::new(vec![
        Record::new(
            "TechCorp AI",
            "AI-powered analytics platform for enterprise clients",
            "Series A",
            "2M ARR",
            "Technology",
            "San Francisco",
        ),
        Record::new(
            "HealthVentures",
            "Telemedicine software for clinics",
            "Seed",
            "Pre-revenue",
            "Healthcare",
            "Boston",
        ),
        Record::new(
            "FinTech Solutions",
            "Payment processing for small businesses",
            "Series B",
            "5M ARR",
            "Fintech",
            "New York",
        ),
        Record::new(
            "DataAnalytics Co",
            "Visualization tools for big data teams",
            "Series A",
            "1.5M ARR",
            "Technology",
            "Austin",
        ),
        Record::new(
            "CloudServices Inc",
            "Managed hosting for startups",
            "Series C",
            "10M ARR",
            "Technology",
            "Seattle",
        ),
        Record::new(
            "AI Robotics",
            "Warehouse automation with machine learning",
            "Seed",
            "Pre-revenue",
            "AI/Robotics",
            "San Francisco",
        ),
        Record::new(
            "MedTech Innovations",
            "Diagnostic devices for hospitals",
            "Series A",
            "3M ARR",
            "Healthcare",
            "Boston",
        ),
        Record::new(
            "CryptoExchange",
            "Digital asset trading venue",
            "Series B",
            "8M ARR",
            "Fintech",
            "Miami",
        ),
        Record::new(
            "SmartDevices Ltd",
            "Connected home sensors",
            "Seed",
            "500K ARR",
            "IoT",
            "Los Angeles",
        ),
        Record::new(
            "BioTech Labs",
            "Drug discovery research",
            "Series A",
            "4M ARR",
            "Biotech",
            "San Diego",
        ),
    ])
}

/// Credential provider with fixed answers
#[derive(Debug, Clone)]
pub struct StaticCredentials {
    pub api_key: Option<String>,
    pub model: String,
}

impl StaticCredentials {
    #[allow(dead_code)]
    pub fn with_key(key: &str) -> Self {
        StaticCredentials {
            api_key: Some(key.to_string()),
            model: "test-model".to_string(),
        }
    }

    #[allow(dead_code)]
    pub fn without_key() -> Self {
        StaticCredentials {
            api_key: None,
            model: "test-model".to_string(),
        }
    }
}

impl CredentialProvider for StaticCredentials {
    fn api_key(&self) -> Option<String> {
        self.api_key.clone()
    }

    fn model(&self) -> String {
        self.model.clone()
    }
}

/// Completion service replaying queued replies and recording every request.
/// Once the queue is drained every call fails.
#[derive(Debug, Default)]
pub struct ScriptedService {
    replies: RefCell<VecDeque<Result<String, ServiceError>>>,
    requests: RefCell<Vec<CompletionRequest>>,
}

impl ScriptedService {
    #[allow(dead_code)]
    pub fn new(replies: Vec<Result<String, ServiceError>>) -> Self {
        ScriptedService {
            replies: RefCell::new(replies.into()),
            requests: RefCell::new(Vec::new()),
        }
    }

    #[allow(dead_code)]
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.borrow().clone()
    }

    #[allow(dead_code)]
    pub fn call_count(&self) -> usize {
        self.requests.borrow().len()
    }
}

impl CompletionService for ScriptedService {
    fn complete(&self, request: &CompletionRequest) -> Result<String, ServiceError> {
        self.requests.borrow_mut().push(request.clone());
        self.replies
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(ServiceError::Request("no scripted reply left".to_string())))
    }
}
