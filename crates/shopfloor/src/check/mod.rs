//! External dependency checks
//!
//! Stations may reference data outside the document: an input file, a
//! database table, a DDE workbook. These probes verify such references
//! and report every outcome as plain data. They never panic and never
//! return an error out of band; an unreachable database and a missing
//! file are results, not failures.
//!
//! The probes are synchronous and assumed short; callers decide whether
//! to run them off the interactive thread.

use std::path::Path;

use tracing::trace;

use crate::model::element::{DataSource, DbSettings, Element};

/// Outcome class of a dependency check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    /// The station references no external data
    NoCheckNeeded,
    /// The referenced data is reachable
    Ok,
    /// The referenced data is missing or misconfigured
    Error,
}

/// Which kind of external data was checked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckedDataType {
    None,
    File,
    Db,
    Dde,
}

/// Result of probing one station's external data reference
///
/// `source_label` is present exactly when a check ran; `error_message`
/// exactly when it failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataCheckResult {
    pub status: CheckStatus,
    pub data_type: CheckedDataType,
    pub source_label: Option<String>,
    pub error_message: Option<String>,
}

impl DataCheckResult {
    pub fn no_check_needed() -> Self {
        Self {
            status: CheckStatus::NoCheckNeeded,
            data_type: CheckedDataType::None,
            source_label: None,
            error_message: None,
        }
    }

    pub fn ok(data_type: CheckedDataType, label: impl Into<String>) -> Self {
        Self {
            status: CheckStatus::Ok,
            data_type,
            source_label: Some(label.into()),
            error_message: None,
        }
    }

    pub fn error(
        data_type: CheckedDataType,
        label: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            status: CheckStatus::Error,
            data_type,
            source_label: Some(label.into()),
            error_message: Some(message.into()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.status == CheckStatus::Error
    }
}

/// Supplies the initialization outcome of a database connection
///
/// The actual driver lives outside the document model; the checker only
/// needs to know whether opening the connection reported an error.
pub trait DatabaseProbe {
    /// `None` when the connection initializes cleanly
    fn init_error(&self, settings: &DbSettings) -> Option<String>;
}

/// Access to the DDE subsystem's workbook and table names
pub trait DdeConnect {
    /// Whether the DDE subsystem can be reached at all
    fn available(&self) -> bool;
    fn workbooks(&self) -> Vec<String>;
    fn tables(&self, workbook: &str) -> Vec<String>;
}

/// Bundle of the external connectors a check run may need
pub struct Connectors<'a> {
    pub db: &'a dyn DatabaseProbe,
    pub dde: &'a dyn DdeConnect,
}

/// Check that a file reference points at an existing regular file
pub fn check_file(path: &str) -> DataCheckResult {
    if path.trim().is_empty() {
        return DataCheckResult::error(CheckedDataType::File, path, "no input file");
    }
    if !Path::new(path).is_file() {
        return DataCheckResult::error(CheckedDataType::File, path, "file does not exist");
    }
    DataCheckResult::ok(CheckedDataType::File, path)
}

/// Check a database reference through the supplied probe
///
/// The label is always the settings' display form, whatever the outcome.
pub fn check_db(settings: &DbSettings, probe: &dyn DatabaseProbe) -> DataCheckResult {
    let label = settings.to_string();
    match probe.init_error(settings) {
        None => DataCheckResult::ok(CheckedDataType::Db, label),
        Some(message) => DataCheckResult::error(CheckedDataType::Db, label, message),
    }
}

fn contains_ignore_case(names: &[String], wanted: &str) -> bool {
    names.iter().any(|name| name.eq_ignore_ascii_case(wanted))
}

/// Check a DDE reference that requires a specific worksheet
pub fn check_dde_table(workbook: &str, table: &str, dde: &dyn DdeConnect) -> DataCheckResult {
    let label = format!("{}!{}", workbook, table);
    if workbook.trim().is_empty() {
        return DataCheckResult::error(CheckedDataType::Dde, label, "no workbook name set");
    }
    if table.trim().is_empty() {
        return DataCheckResult::error(CheckedDataType::Dde, label, "no table name set");
    }
    if !dde.available() {
        return DataCheckResult::error(CheckedDataType::Dde, label, "DDE connection not available");
    }
    if !contains_ignore_case(&dde.workbooks(), workbook) {
        return DataCheckResult::error(
            CheckedDataType::Dde,
            label,
            format!("unknown workbook \"{}\"", workbook),
        );
    }
    if !contains_ignore_case(&dde.tables(workbook), table) {
        return DataCheckResult::error(
            CheckedDataType::Dde,
            label,
            format!("unknown table \"{}\"", table),
        );
    }
    DataCheckResult::ok(CheckedDataType::Dde, label)
}

/// Check a DDE reference satisfied by any worksheet of the workbook
pub fn check_dde_workbook(workbook: &str, dde: &dyn DdeConnect) -> DataCheckResult {
    if workbook.trim().is_empty() {
        return DataCheckResult::error(CheckedDataType::Dde, workbook, "no workbook name set");
    }
    if !dde.available() {
        return DataCheckResult::error(
            CheckedDataType::Dde,
            workbook,
            "DDE connection not available",
        );
    }
    if !contains_ignore_case(&dde.workbooks(), workbook) {
        return DataCheckResult::error(
            CheckedDataType::Dde,
            workbook,
            format!("unknown workbook \"{}\"", workbook),
        );
    }
    DataCheckResult::ok(CheckedDataType::Dde, workbook)
}

/// Probe whatever external data the station references
pub fn check_external_data(element: &Element, connectors: &Connectors<'_>) -> DataCheckResult {
    trace!(element = element.id(), "checking external data");
    match element.data_source.as_ref() {
        None => DataCheckResult::no_check_needed(),
        Some(DataSource::File { path }) => check_file(path),
        Some(DataSource::Db(settings)) => check_db(settings, connectors.db),
        Some(DataSource::DdeTable { workbook, table }) => {
            check_dde_table(workbook, table, connectors.dde)
        }
        Some(DataSource::DdeWorkbook { workbook }) => check_dde_workbook(workbook, connectors.dde),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::kind::ElementKind;
    use std::io::Write;

    struct GoodDb;
    impl DatabaseProbe for GoodDb {
        fn init_error(&self, _settings: &DbSettings) -> Option<String> {
            None
        }
    }

    struct BadDb;
    impl DatabaseProbe for BadDb {
        fn init_error(&self, _settings: &DbSettings) -> Option<String> {
            Some("driver not found".to_string())
        }
    }

    struct FakeDde {
        available: bool,
    }

    impl DdeConnect for FakeDde {
        fn available(&self) -> bool {
            self.available
        }

        fn workbooks(&self) -> Vec<String> {
            vec!["Book1".to_string(), "Plan".to_string()]
        }

        fn tables(&self, workbook: &str) -> Vec<String> {
            if workbook.eq_ignore_ascii_case("Book1") {
                vec!["Sheet1".to_string()]
            } else {
                Vec::new()
            }
        }
    }

    #[test]
    fn test_check_file_empty_path() {
        let result = check_file("");
        assert_eq!(result.status, CheckStatus::Error);
        assert_eq!(result.data_type, CheckedDataType::File);
        assert_eq!(result.error_message.as_deref(), Some("no input file"));
    }

    #[test]
    fn test_check_file_existing_and_missing() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "a;b;c").unwrap();
        let path = file.path().to_string_lossy().to_string();

        let result = check_file(&path);
        assert_eq!(result.status, CheckStatus::Ok);
        assert_eq!(result.source_label.as_deref(), Some(path.as_str()));
        assert!(result.error_message.is_none());

        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.csv").to_string_lossy().to_string();
        let result = check_file(&missing);
        assert_eq!(result.status, CheckStatus::Error);
        assert_eq!(result.error_message.as_deref(), Some("file does not exist"));
    }

    #[test]
    fn test_check_file_rejects_directory() {
        let dir = tempfile::tempdir().unwrap();
        let result = check_file(&dir.path().to_string_lossy());
        assert_eq!(result.status, CheckStatus::Error);
        assert_eq!(result.error_message.as_deref(), Some("file does not exist"));
    }

    #[test]
    fn test_check_db_label_is_settings_form_either_way() {
        let settings = DbSettings {
            connector: "sqlite".to_string(),
            connection: "data.db".to_string(),
            table: "arrivals".to_string(),
        };

        let ok = check_db(&settings, &GoodDb);
        assert_eq!(ok.status, CheckStatus::Ok);
        assert_eq!(ok.source_label.as_deref(), Some("sqlite:data.db"));

        let bad = check_db(&settings, &BadDb);
        assert_eq!(bad.status, CheckStatus::Error);
        assert_eq!(bad.source_label.as_deref(), Some("sqlite:data.db"));
        assert_eq!(bad.error_message.as_deref(), Some("driver not found"));
    }

    #[test]
    fn test_dde_table_lookup_is_case_insensitive() {
        let dde = FakeDde { available: true };
        let result = check_dde_table("book1", "SHEET1", &dde);
        assert_eq!(result.status, CheckStatus::Ok);
    }

    #[test]
    fn test_dde_error_ordering() {
        let offline = FakeDde { available: false };

        // empty names win over availability
        let result = check_dde_table("", "Sheet1", &offline);
        assert_eq!(result.error_message.as_deref(), Some("no workbook name set"));
        let result = check_dde_table("Book1", "", &offline);
        assert_eq!(result.error_message.as_deref(), Some("no table name set"));

        let result = check_dde_table("Book1", "Sheet1", &offline);
        assert_eq!(
            result.error_message.as_deref(),
            Some("DDE connection not available")
        );

        let online = FakeDde { available: true };
        let result = check_dde_table("Ledger", "Sheet1", &online);
        assert!(result.error_message.unwrap().contains("unknown workbook"));
        let result = check_dde_table("Book1", "Totals", &online);
        assert!(result.error_message.unwrap().contains("unknown table"));
    }

    #[test]
    fn test_dde_workbook_variant_skips_table_checks() {
        let dde = FakeDde { available: true };
        let result = check_dde_workbook("plan", &dde);
        assert_eq!(result.status, CheckStatus::Ok);

        let result = check_dde_workbook("", &dde);
        assert_eq!(result.error_message.as_deref(), Some("no workbook name set"));
    }

    #[test]
    fn test_dispatch_on_data_source() {
        let dde = FakeDde { available: true };
        let connectors = Connectors {
            db: &GoodDb,
            dde: &dde,
        };

        let plain = Element::new(ElementKind::Process);
        let result = check_external_data(&plain, &connectors);
        assert_eq!(result.status, CheckStatus::NoCheckNeeded);
        assert!(result.source_label.is_none());
        assert!(result.error_message.is_none());

        let mut input = Element::new(ElementKind::Input);
        input.data_source = Some(DataSource::File {
            path: String::new(),
        });
        let result = check_external_data(&input, &connectors);
        assert_eq!(result.status, CheckStatus::Error);
        assert_eq!(result.data_type, CheckedDataType::File);

        let mut dde_input = Element::new(ElementKind::InputDde);
        dde_input.data_source = Some(DataSource::DdeTable {
            workbook: "Book1".to_string(),
            table: "Sheet1".to_string(),
        });
        let result = check_external_data(&dde_input, &connectors);
        assert_eq!(result.status, CheckStatus::Ok);
        assert_eq!(result.source_label.as_deref(), Some("Book1!Sheet1"));
    }
}
