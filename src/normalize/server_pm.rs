//! Server PM report normalization.
//!
//! The server PM payload is the widest of the three: eighteen tabular check
//! sections plus four photo galleries. The sections are uniform enough that
//! they are driven from a declarative table of column specs.

use serde_json::Value;

use super::record::{CanonicalRecord, CellValue, Field, Section, SectionBody};
use super::{
    date_field, datetime_field, detail_rows, images, lookup, percent, status_cell, text, text_opt,
};
use crate::report::ReportType;

#[derive(Clone, Copy)]
enum ColumnKind {
    Text,
    Status,
    Percent,
    Date,
    DateTime,
}

struct ColumnSpec {
    heading: &'static str,
    aliases: &'static [&'static str],
    kind: ColumnKind,
}

struct TableSpec {
    title: &'static str,
    payload_aliases: &'static [&'static str],
    columns: &'static [ColumnSpec],
}

const fn col(
    heading: &'static str,
    aliases: &'static [&'static str],
    kind: ColumnKind,
) -> ColumnSpec {
    ColumnSpec {
        heading,
        aliases,
        kind,
    }
}

const TABLES: &[TableSpec] = &[
    TableSpec {
        title: "Server Health Check",
        payload_aliases: &["pmServerHealths"],
        columns: &[
            col("Server Name", &["serverName"], ColumnKind::Text),
            col("Result", &["result", "status"], ColumnKind::Status),
            col("Remarks", &["remarks"], ColumnKind::Text),
        ],
    },
    TableSpec {
        title: "Hard Drive Health Check",
        payload_aliases: &["pmServerHardDriveHealths"],
        columns: &[
            col("Server Name", &["serverName"], ColumnKind::Text),
            col("Hard Drive", &["hardDrive", "drive"], ColumnKind::Text),
            col("Status", &["status"], ColumnKind::Status),
            col("Remarks", &["remarks"], ColumnKind::Text),
        ],
    },
    TableSpec {
        title: "Disk Usage Check",
        payload_aliases: &["pmServerDiskUsageHealths"],
        columns: &[
            col("Server Name", &["serverName"], ColumnKind::Text),
            col("Disk", &["disk", "drive"], ColumnKind::Text),
            col("Total Size", &["totalSize"], ColumnKind::Text),
            col("Used Size", &["usedSize", "usedSpace"], ColumnKind::Text),
            col("Free Size", &["freeSize", "freeSpace"], ColumnKind::Text),
            col("Usage", &["usagePercentage"], ColumnKind::Percent),
            col("Status", &["status"], ColumnKind::Status),
        ],
    },
    TableSpec {
        title: "CPU and Memory Usage Check",
        payload_aliases: &["pmServerCPUAndMemoryUsages"],
        columns: &[
            col("Server Name", &["serverName"], ColumnKind::Text),
            col("CPU Usage", &["cpuUsage"], ColumnKind::Percent),
            col("RAM Usage", &["ramUsage", "memoryUsage"], ColumnKind::Percent),
            col("Remarks", &["remarks"], ColumnKind::Text),
        ],
    },
    TableSpec {
        title: "Network Health Check",
        payload_aliases: &["pmServerNetworkHealths"],
        columns: &[
            col("Server Name", &["serverName"], ColumnKind::Text),
            col(
                "Network Interface",
                &["networkInterface", "interface"],
                ColumnKind::Text,
            ),
            col("Status", &["status"], ColumnKind::Status),
            col("IP Address", &["ipAddress"], ColumnKind::Text),
            col("Remarks", &["remarks"], ColumnKind::Text),
        ],
    },
    TableSpec {
        title: "Willowlynx Process Status Check",
        payload_aliases: &["pmServerWillowlynxProcessStatuses"],
        columns: &[
            col("Process Name", &["processName"], ColumnKind::Text),
            col("Status", &["status"], ColumnKind::Status),
            col("Remarks", &["remarks"], ColumnKind::Text),
        ],
    },
    TableSpec {
        title: "Willowlynx Network Status Check",
        payload_aliases: &["pmServerWillowlynxNetworkStatuses"],
        columns: &[
            col(
                "Network Component",
                &["networkComponent"],
                ColumnKind::Text,
            ),
            col("Status", &["status"], ColumnKind::Status),
            col("Remarks", &["remarks"], ColumnKind::Text),
        ],
    },
    TableSpec {
        title: "Willowlynx RTU Status Check",
        payload_aliases: &["pmServerWillowlynxRTUStatuses"],
        columns: &[
            col("RTU Name", &["rtuName"], ColumnKind::Text),
            col("Status", &["status"], ColumnKind::Status),
            col("Remarks", &["remarks"], ColumnKind::Text),
        ],
    },
    TableSpec {
        title: "Willowlynx Historical Trend Check",
        payload_aliases: &["pmServerWillowlynxHistoricalTrends"],
        columns: &[
            col("Trend Name", &["trendName"], ColumnKind::Text),
            col("Status", &["status"], ColumnKind::Status),
            col("Remarks", &["remarks"], ColumnKind::Text),
        ],
    },
    TableSpec {
        title: "Willowlynx Historical Report Check",
        payload_aliases: &["pmServerWillowlynxHistoricalReports"],
        columns: &[
            col("Report Name", &["reportName"], ColumnKind::Text),
            col("Status", &["status"], ColumnKind::Status),
            col("Remarks", &["remarks"], ColumnKind::Text),
        ],
    },
    TableSpec {
        title: "Willowlynx Sump Pit CCTV Camera Check",
        payload_aliases: &["pmServerWillowlynxCCTVCameras"],
        columns: &[
            col("Camera Name", &["cameraName"], ColumnKind::Text),
            col("Status", &["status"], ColumnKind::Status),
            col("Remarks", &["remarks"], ColumnKind::Text),
        ],
    },
    TableSpec {
        title: "Monthly Database Creation Check",
        payload_aliases: &["pmServerMonthlyDatabaseCreations"],
        columns: &[
            col("Database Name", &["databaseName"], ColumnKind::Text),
            col("Creation Date", &["creationDate"], ColumnKind::Date),
            col("Status", &["status"], ColumnKind::Status),
            col("Remarks", &["remarks"], ColumnKind::Text),
        ],
    },
    TableSpec {
        title: "Database Backup Check",
        payload_aliases: &["pmServerDatabaseBackups"],
        columns: &[
            col("Database Name", &["databaseName"], ColumnKind::Text),
            col("Backup Date", &["backupDate"], ColumnKind::Date),
            col("Status", &["status"], ColumnKind::Status),
            col("Remarks", &["remarks"], ColumnKind::Text),
        ],
    },
    TableSpec {
        title: "Time Sync Check",
        payload_aliases: &["pmServerTimeSyncs"],
        columns: &[
            col("Server Name", &["serverName"], ColumnKind::Text),
            col("Time Sync Status", &["timeSyncStatus"], ColumnKind::Status),
            col("Last Sync Time", &["lastSyncTime"], ColumnKind::DateTime),
            col("Remarks", &["remarks"], ColumnKind::Text),
        ],
    },
    TableSpec {
        title: "Hot Fixes Check",
        payload_aliases: &["pmServerHotFixes"],
        columns: &[
            col("Hot Fix ID", &["hotFixID", "hotFixId"], ColumnKind::Text),
            col("Description", &["description"], ColumnKind::Text),
            col(
                "Installation Date",
                &["installationDate"],
                ColumnKind::Date,
            ),
            col("Status", &["status"], ColumnKind::Status),
            col("Remarks", &["remarks"], ColumnKind::Text),
        ],
    },
    TableSpec {
        title: "Auto Fail Over Check",
        payload_aliases: &["pmServerFailOvers"],
        columns: &[
            col("Component Name", &["componentName"], ColumnKind::Text),
            col("Fail Over Status", &["failOverStatus"], ColumnKind::Status),
            col("Last Test Date", &["lastTestDate"], ColumnKind::Date),
            col("Remarks", &["remarks"], ColumnKind::Text),
        ],
    },
    TableSpec {
        title: "ASA Firewall Check",
        payload_aliases: &["pmServerASAFirewalls"],
        columns: &[
            col("Firewall Name", &["firewallName"], ColumnKind::Text),
            col("Status", &["status"], ColumnKind::Status),
            col("Last Update Date", &["lastUpdateDate"], ColumnKind::Date),
            col("Remarks", &["remarks"], ColumnKind::Text),
        ],
    },
    TableSpec {
        title: "Software Patch Summary",
        payload_aliases: &["pmServerSoftwarePatchSummaries"],
        columns: &[
            col("Patch Name", &["patchName"], ColumnKind::Text),
            col(
                "Installation Date",
                &["installationDate"],
                ColumnKind::Date,
            ),
            col("Status", &["status"], ColumnKind::Status),
            col("Remarks", &["remarks"], ColumnKind::Text),
        ],
    },
];

const GALLERIES: &[(&str, &[&str])] = &[
    (
        "Willowlynx Process Status Images",
        &["pmServerWillowlynxProcessStatusImages"],
    ),
    (
        "Willowlynx Network Status Images",
        &["pmServerWillowlynxNetworkStatusImages"],
    ),
    (
        "Willowlynx RTU Status Images",
        &["pmServerWillowlynxRTUStatusImages"],
    ),
    (
        "Sump Pit CCTV Camera Images",
        &["pmServerWillowlynxCCTVCameraImages"],
    ),
];

pub fn normalize(report_type: ReportType, payload: &Value) -> CanonicalRecord {
    let empty = Value::Object(Default::default());
    let form = lookup(payload, &["reportForm"]).unwrap_or(payload);
    let pm_form = lookup(payload, &["pmReportFormServer"]).unwrap_or(&empty);

    let job_no = text_opt(form, &["jobNo"]).or_else(|| text_opt(payload, &["jobNo"]));

    let header = vec![
        Field::new("Job No", text(form, &["jobNo"])),
        Field::new("System Description", text(form, &["systemDescription"])),
        Field::new("Station Name", text(form, &["stationName"])),
        Field::new("Project No", text(form, &["projectNo"])),
        Field::new("Customer", text(form, &["customer"])),
        Field::new("Date of Service", date_field(form, &["dateOfService"])),
    ];

    let sign_off = vec![
        Field::new("Attended By", text(pm_form, &["attendedBy"])),
        Field::new("Witnessed By", text(pm_form, &["witnessedBy"])),
        Field::new("Start Date", datetime_field(pm_form, &["startDate"])),
        Field::new(
            "Completion Date",
            datetime_field(pm_form, &["completionDate"]),
        ),
        Field::new("Remarks", text(pm_form, &["remarks", "signOffRemarks"])),
    ];

    let mut sections: Vec<Section> = TABLES
        .iter()
        .map(|spec| build_table_section(spec, payload))
        .collect();

    for (title, aliases) in GALLERIES {
        sections.push(Section {
            title: (*title).to_string(),
            body: SectionBody::Gallery {
                images: images(payload, aliases),
            },
            remarks: None,
        });
    }

    let signatures = if report_type.signature {
        super::signatures(payload, pm_form)
    } else {
        Vec::new()
    };

    CanonicalRecord {
        report_type,
        title: report_type.default_title().to_string(),
        job_no,
        header,
        sign_off,
        sections,
        signatures,
    }
}

fn build_table_section(spec: &TableSpec, payload: &Value) -> Section {
    let rows = lookup(payload, spec.payload_aliases)
        .map(detail_rows)
        .unwrap_or_default();

    let cells: Vec<Vec<CellValue>> = rows
        .iter()
        .map(|row| spec.columns.iter().map(|c| build_cell(c, row)).collect())
        .collect();

    Section {
        title: spec.title.to_string(),
        body: SectionBody::Table {
            columns: spec.columns.iter().map(|c| c.heading.to_string()).collect(),
            rows: cells,
        },
        remarks: None,
    }
}

fn build_cell(spec: &ColumnSpec, row: &Value) -> CellValue {
    match spec.kind {
        ColumnKind::Text => CellValue::plain(text(row, spec.aliases)),
        ColumnKind::Status => status_cell(text(row, spec.aliases)),
        ColumnKind::Percent => CellValue::plain(percent(row, spec.aliases)),
        ColumnKind::Date => CellValue::plain(date_field(row, spec.aliases)),
        ColumnKind::DateTime => CellValue::plain(datetime_field(row, spec.aliases)),
    }
}
