//! Report type registry: the fixed set of report-type keys accepted on the
//! request channel, their upstream API endpoints and artifact name prefixes.

/// Base report kinds. Each kind has its own upstream endpoint and canonical
/// schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportKind {
    ServerPm,
    Cm,
    RtuPm,
}

/// A report-type key as it appears in request topics.
///
/// Signature variants share the base kind's fetch and normalization but
/// produce a `_FinalReport` artifact with a signature page appended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReportType {
    pub kind: ReportKind,
    pub signature: bool,
}

impl ReportType {
    pub const ALL: [ReportType; 6] = [
        ReportType { kind: ReportKind::ServerPm, signature: false },
        ReportType { kind: ReportKind::Cm, signature: false },
        ReportType { kind: ReportKind::RtuPm, signature: false },
        ReportType { kind: ReportKind::ServerPm, signature: true },
        ReportType { kind: ReportKind::Cm, signature: true },
        ReportType { kind: ReportKind::RtuPm, signature: true },
    ];

    /// Resolve a topic key (case-insensitive) to a known report type.
    pub fn from_key(key: &str) -> Option<Self> {
        let key = key.to_ascii_lowercase();
        Self::ALL.into_iter().find(|rt| rt.key() == key)
    }

    pub fn key(&self) -> &'static str {
        match (self.kind, self.signature) {
            (ReportKind::ServerPm, false) => "server_pm",
            (ReportKind::Cm, false) => "cm",
            (ReportKind::RtuPm, false) => "rtu_pm",
            (ReportKind::ServerPm, true) => "server_pm_signature",
            (ReportKind::Cm, true) => "cm_signature",
            (ReportKind::RtuPm, true) => "rtu_pm_signature",
        }
    }

    /// Upstream API path for one report's raw payload.
    pub fn endpoint(&self, job_id: &str) -> String {
        match self.kind {
            ReportKind::ServerPm => format!("/api/PMReportFormServer/{job_id}"),
            ReportKind::Cm => format!("/api/ReportForm/CMReportForm/{job_id}"),
            ReportKind::RtuPm => format!("/api/ReportForm/RTUPMReportForm/{job_id}"),
        }
    }

    /// Prefix for generated artifact file names.
    pub fn file_prefix(&self) -> &'static str {
        match (self.kind, self.signature) {
            (ReportKind::ServerPm, false) => "Server_PM",
            (ReportKind::Cm, false) => "CM",
            (ReportKind::RtuPm, false) => "RTU_PM",
            (ReportKind::ServerPm, true) => "Server_PM_FinalReport",
            (ReportKind::Cm, true) => "CM_FinalReport",
            (ReportKind::RtuPm, true) => "RTU_PM_FinalReport",
        }
    }

    /// Human-readable report title used when the payload carries none.
    pub fn default_title(&self) -> &'static str {
        match self.kind {
            ReportKind::ServerPm => "Server Preventive Maintenance Report",
            ReportKind::Cm => "Corrective Maintenance Report",
            ReportKind::RtuPm => "RTU Preventative Maintenance Report",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_key_known_types() {
        let rt = ReportType::from_key("server_pm").unwrap();
        assert_eq!(rt.kind, ReportKind::ServerPm);
        assert!(!rt.signature);

        let rt = ReportType::from_key("cm_signature").unwrap();
        assert_eq!(rt.kind, ReportKind::Cm);
        assert!(rt.signature);
    }

    #[test]
    fn test_from_key_case_insensitive() {
        assert!(ReportType::from_key("RTU_PM").is_some());
        assert!(ReportType::from_key("Server_PM_Signature").is_some());
    }

    #[test]
    fn test_from_key_unknown() {
        assert!(ReportType::from_key("bogus").is_none());
        assert!(ReportType::from_key("").is_none());
    }

    #[test]
    fn test_endpoints() {
        let rt = ReportType::from_key("cm").unwrap();
        assert_eq!(rt.endpoint("J-1"), "/api/ReportForm/CMReportForm/J-1");
        // Signature variants fetch from the same endpoint as the base kind.
        let sig = ReportType::from_key("cm_signature").unwrap();
        assert_eq!(sig.endpoint("J-1"), rt.endpoint("J-1"));
    }

    #[test]
    fn test_file_prefixes() {
        assert_eq!(
            ReportType::from_key("rtu_pm_signature").unwrap().file_prefix(),
            "RTU_PM_FinalReport"
        );
        assert_eq!(ReportType::from_key("server_pm").unwrap().file_prefix(), "Server_PM");
    }
}
