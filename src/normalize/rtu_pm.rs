//! RTU PM report normalization.
//!
//! RTU payloads mix shapes: the cabinet and DVR checks are repeated groups of
//! label/value pairs (one group per physical unit), while chamber contacts
//! and cabinet cooling are plain tables. Each check section carries its own
//! photo gallery.

use serde_json::Value;

use super::record::{CanonicalRecord, CellValue, Field, ImageRef, Section, SectionBody};
use super::{datetime_field, hoist_remarks, images, lookup, status_cell, text, text_opt};
use crate::report::ReportType;

/// Label and payload aliases for one field of a grouped check entry.
type GroupField = (&'static str, &'static [&'static str]);

const CABINET_FIELDS: &[GroupField] = &[
    ("RTU Cabinet", &["rtuCabinet"]),
    ("Equipment Rack", &["equipmentRack"]),
    ("Monitor", &["monitor"]),
    ("Mouse / Keyboard", &["mouseKeyboard"]),
    ("CPU 6000 Card", &["cpU6000Card", "cpu6000Card"]),
    ("Input Card", &["inputCard"]),
    ("Megapop NTU", &["megapopNTU"]),
    ("Network Router", &["networkRouter"]),
    ("Network Switch", &["networkSwitch"]),
    ("Digital Video Recorder", &["digitalVideoRecorder"]),
    ("RTU Door Contact", &["rtuDoorContact"]),
    ("Power Supply Unit", &["powerSupplyUnit"]),
    ("UPS Taking Over Test", &["upsTakingOverTest"]),
    ("UPS Battery", &["upsBattery"]),
];

const DVR_FIELDS: &[GroupField] = &[
    ("DVR Communication", &["dvrComm"]),
    ("DVR RAID Communication", &["dvrraidComm", "dvrRAIDComm"]),
    ("Time Sync (NTP)", &["timeSyncNTPServer"]),
    ("Recording 24 x 7", &["recording24x7"]),
];

pub fn normalize(report_type: ReportType, payload: &Value) -> CanonicalRecord {
    let empty = Value::Object(Default::default());
    let form = lookup(payload, &["reportForm"]).unwrap_or(payload);
    let rtu_form = lookup(payload, &["pmReportFormRTU"]).unwrap_or(&empty);

    let job_no = text_opt(form, &["jobNo"]).or_else(|| text_opt(payload, &["jobNo"]));
    let title = text_opt(rtu_form, &["reportTitle"])
        .unwrap_or_else(|| report_type.default_title().to_string());

    let header = vec![
        Field::new("Job Number", text(form, &["jobNo"])),
        Field::new("Report Form Type", text(form, &["reportFormTypeName"])),
        Field::new(
            "System Description",
            text(form, &["systemName", "systemNameWarehouseName"]),
        ),
        Field::new(
            "Station Name",
            text(form, &["stationName", "stationNameWarehouseName"]),
        ),
        Field::new("Project No", text(rtu_form, &["projectNo"])),
        Field::new("Customer", text(rtu_form, &["customer"])),
        Field::new("Report Title", title.clone()),
    ];

    let sign_off = vec![
        Field::new(
            "Date of Service",
            datetime_field(rtu_form, &["dateOfService"]),
        ),
        Field::new(
            "Cleaning of Cabinet",
            text(rtu_form, &["cleaningOfCabinet"]),
        ),
        Field::new("Attended By", text(rtu_form, &["attendedBy"])),
        Field::new("Approved By", text(rtu_form, &["approvedBy"])),
        Field::new("Remarks", text(rtu_form, &["remarks"])),
    ];

    let sections = vec![
        group_section(
            "Main RTU Cabinet Checks",
            "Cabinet",
            CABINET_FIELDS,
            rows(payload, &["pmMainRtuCabinet"]),
        ),
        gallery(
            "RTU Cabinet Images",
            images(payload, &["pmMainRtuCabinetImages"]),
        ),
        chamber_section(payload),
        gallery(
            "Chamber Images",
            images(payload, &["pmChamberMagneticContactImages"]),
        ),
        cooling_section(payload),
        gallery(
            "Cabinet Cooling Images",
            images(payload, &["pmrtuCabinetCoolingImages"]),
        ),
        group_section(
            "DVR Equipment Checks",
            "DVR Set",
            DVR_FIELDS,
            rows(payload, &["pmDVREquipment", "pmdvrEquipment"]),
        ),
        gallery(
            "DVR Equipment Images",
            images(payload, &["pmdvrEquipmentImages"]),
        ),
    ];

    let signatures = if report_type.signature {
        super::signatures(payload, rtu_form)
    } else {
        Vec::new()
    };

    CanonicalRecord {
        report_type,
        title,
        job_no,
        header,
        sign_off,
        sections,
        signatures,
    }
}

fn rows(payload: &Value, aliases: &[&str]) -> Vec<Value> {
    match lookup(payload, aliases) {
        Some(Value::Array(items)) => items.clone(),
        _ => Vec::new(),
    }
}

fn group_section(
    title: &str,
    entry_label: &str,
    fields: &[GroupField],
    records: Vec<Value>,
) -> Section {
    let remarks = hoist_remarks(&records, &["remarks"]);
    let groups = records
        .iter()
        .map(|record| {
            fields
                .iter()
                .map(|(label, aliases)| Field::new(*label, text(record, aliases)))
                .collect()
        })
        .collect();

    Section {
        title: title.to_string(),
        body: SectionBody::Groups {
            entry_label: entry_label.to_string(),
            groups,
        },
        remarks,
    }
}

fn chamber_section(payload: &Value) -> Section {
    let records = rows(payload, &["pmChamberMagneticContact"]);
    let rows = records
        .iter()
        .map(|item| {
            vec![
                CellValue::plain(text(item, &["chamberNumber"])),
                CellValue::plain(text(item, &["chamberOGBox"])),
                CellValue::plain(text(item, &["chamberContact1"])),
                CellValue::plain(text(item, &["chamberContact2"])),
                CellValue::plain(text(item, &["chamberContact3"])),
                CellValue::plain(text(item, &["remarks"])),
            ]
        })
        .collect();

    Section {
        title: "Chamber Magnetic Contact".to_string(),
        body: SectionBody::Table {
            columns: vec![
                "Chamber No.".to_string(),
                "OG Box".to_string(),
                "Contact 1".to_string(),
                "Contact 2".to_string(),
                "Contact 3".to_string(),
                "Remarks".to_string(),
            ],
            rows,
        },
        remarks: None,
    }
}

fn cooling_section(payload: &Value) -> Section {
    let records = rows(payload, &["pmRTUCabinetCooling", "pmrtuCabinetCooling"]);
    let rows = records
        .iter()
        .map(|item| {
            vec![
                CellValue::plain(text(item, &["fanNumber"])),
                status_cell(text(item, &["functionalStatus"])),
                CellValue::plain(text(item, &["remarks"])),
            ]
        })
        .collect();

    Section {
        title: "RTU Cabinet Cooling".to_string(),
        body: SectionBody::Table {
            columns: vec![
                "Fan Number".to_string(),
                "Functional Status".to_string(),
                "Remarks".to_string(),
            ],
            rows,
        },
        remarks: None,
    }
}

fn gallery(title: &str, images: Vec<ImageRef>) -> Section {
    Section {
        title: title.to_string(),
        body: SectionBody::Gallery { images },
        remarks: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::UNSPECIFIED;
    use serde_json::json;

    fn rtu_type() -> ReportType {
        ReportType::from_key("rtu_pm").unwrap()
    }

    #[test]
    fn test_cabinet_groups_one_per_record() {
        let payload = json!({
            "pmMainRtuCabinet": [
                {"rtuCabinet": "Good", "upsBattery": "Replaced", "remarks": "fan noisy"},
                {"rtuCabinet": "Good"}
            ]
        });

        let record = normalize(rtu_type(), &payload);
        let cabinet = &record.sections[0];
        assert_eq!(cabinet.title, "Main RTU Cabinet Checks");
        let SectionBody::Groups { entry_label, groups } = &cabinet.body else {
            panic!("expected groups");
        };
        assert_eq!(entry_label, "Cabinet");
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].len(), CABINET_FIELDS.len());
        assert_eq!(groups[0][0].value, "Good");
        assert_eq!(groups[1][13].value, UNSPECIFIED);
        assert_eq!(cabinet.remarks.as_deref(), Some("fan noisy"));
    }

    #[test]
    fn test_cpu_card_casing_variants() {
        for key in ["cpU6000Card", "cpu6000Card", "CPU6000Card"] {
            let payload = json!({"pmMainRtuCabinet": [{(key): "OK"}]});
            let record = normalize(rtu_type(), &payload);
            let SectionBody::Groups { groups, .. } = &record.sections[0].body else {
                panic!("expected groups");
            };
            assert_eq!(groups[0][4].value, "OK", "key variant {key}");
        }
    }

    #[test]
    fn test_cooling_status_classified() {
        let payload = json!({
            "pmRTUCabinetCooling": [
                {"fanNumber": "1", "functionalStatus": "Faulty"}
            ]
        });
        let record = normalize(rtu_type(), &payload);
        let cooling = record
            .sections
            .iter()
            .find(|s| s.title == "RTU Cabinet Cooling")
            .unwrap();
        let SectionBody::Table { rows, .. } = &cooling.body else {
            panic!("expected table");
        };
        assert_eq!(
            rows[0][1].outcome,
            Some(crate::normalize::Outcome::Negative)
        );
    }

    #[test]
    fn test_galleries_follow_their_sections() {
        let record = normalize(rtu_type(), &json!({}));
        let titles: Vec<&str> = record.sections.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(
            titles,
            vec![
                "Main RTU Cabinet Checks",
                "RTU Cabinet Images",
                "Chamber Magnetic Contact",
                "Chamber Images",
                "RTU Cabinet Cooling",
                "Cabinet Cooling Images",
                "DVR Equipment Checks",
                "DVR Equipment Images",
            ]
        );
    }

    #[test]
    fn test_summary_from_rtu_form() {
        let payload = json!({
            "pmReportFormRTU": {
                "dateOfService": "2024-03-02T08:00:00Z",
                "cleaningOfCabinet": "Done",
                "attendedBy": "Ong",
                "approvedBy": "Lim",
                "remarks": "nil"
            }
        });
        let record = normalize(rtu_type(), &payload);
        assert_eq!(record.sign_off[0].value, "2024-03-02 08:00");
        assert_eq!(record.sign_off[2].value, "Ong");
    }
}
