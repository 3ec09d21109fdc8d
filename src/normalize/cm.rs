//! Corrective maintenance report normalization.
//!
//! CM payloads are narrative rather than tabular: a failure timeline, issue
//! and action descriptions with before/after photo galleries, a material
//! usage table with serial number galleries, and status information.

use serde_json::Value;

use super::record::{CanonicalRecord, CellValue, Field, ImageRef, Section, SectionBody};
use super::{datetime_field, images, lookup, text, text_opt};
use crate::report::ReportType;

pub fn normalize(report_type: ReportType, payload: &Value) -> CanonicalRecord {
    let empty = Value::Object(Default::default());
    let form = lookup(payload, &["reportForm"]).unwrap_or(payload);
    let cm_form = lookup(payload, &["cmReportForm"]).unwrap_or(&empty);

    let job_no = text_opt(payload, &["jobNo"]).or_else(|| text_opt(form, &["jobNo"]));
    let title = text_opt(cm_form, &["reportTitle"])
        .unwrap_or_else(|| report_type.default_title().to_string());

    let header = vec![
        Field::new("Job Number", text(payload, &["jobNo"])),
        Field::new("Customer", text(cm_form, &["customer"])),
        Field::new("Project No", text(cm_form, &["projectNo"])),
        Field::new(
            "Station Name",
            text(form, &["stationName", "stationNameWarehouseName"]),
        ),
        Field::new(
            "System Description",
            text(form, &["systemName", "systemNameWarehouseName"]),
        ),
        Field::new("Report Form Type", text(form, &["reportFormTypeName"])),
        Field::new("Report Title", title.clone()),
    ];

    let mut sign_off = vec![
        Field::new("Attended By", text(cm_form, &["attendedBy"])),
        Field::new("Approved By", text(cm_form, &["approvedBy"])),
    ];
    if let Some(remark) = text_opt(cm_form, &["remark", "remarks"]) {
        sign_off.push(Field::new("Remarks", remark));
    }

    let sections = vec![
        timeline_section(cm_form),
        issue_section(cm_form),
        gallery("Before Issue Images", images(payload, &["beforeIssueImages"])),
        action_section(cm_form),
        gallery("After Action Images", images(payload, &["afterActionImages"])),
        material_section(payload),
        gallery(
            "Old Serial No Images",
            images(payload, &["materialUsedOldSerialImages"]),
        ),
        gallery(
            "New Serial No Images",
            images(payload, &["materialUsedNewSerialImages"]),
        ),
        status_section(cm_form),
    ];

    let signatures = if report_type.signature {
        super::signatures(payload, cm_form)
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

fn timeline_section(cm_form: &Value) -> Section {
    let boxes = vec![
        Field::new(
            "Failure Detected Date",
            datetime_field(cm_form, &["failureDetectedDate"]),
        ),
        Field::new("Response Date", datetime_field(cm_form, &["responseDate"])),
        Field::new("Arrival Date", datetime_field(cm_form, &["arrivalDate"])),
        Field::new(
            "Completion Date",
            datetime_field(cm_form, &["completionDate"]),
        ),
    ];
    Section {
        title: "Timeline Information".to_string(),
        body: SectionBody::Text { boxes },
        remarks: None,
    }
}

fn issue_section(cm_form: &Value) -> Section {
    Section {
        title: "Issue Details".to_string(),
        body: SectionBody::Text {
            boxes: vec![
                Field::new(
                    "Issue Reported Description",
                    text(cm_form, &["issueReportedDescription"]),
                ),
                Field::new(
                    "Issue Found Description",
                    text(cm_form, &["issueFoundDescription"]),
                ),
            ],
        },
        remarks: None,
    }
}

fn action_section(cm_form: &Value) -> Section {
    Section {
        title: "Action Taken".to_string(),
        body: SectionBody::Text {
            boxes: vec![Field::new(
                "Action Taken Description",
                text(cm_form, &["actionTakenDescription"]),
            )],
        },
        remarks: None,
    }
}

fn material_section(payload: &Value) -> Section {
    let materials = match lookup(payload, &["materialUsed"]) {
        Some(Value::Array(items)) => items.clone(),
        _ => Vec::new(),
    };

    let rows: Vec<Vec<CellValue>> = materials
        .iter()
        .enumerate()
        .map(|(i, item)| {
            vec![
                CellValue::plain((i + 1).to_string()),
                CellValue::plain(text(item, &["materialDescription"])),
                CellValue::plain(text(item, &["oldSerialNo"])),
                CellValue::plain(text(item, &["newSerialNo"])),
                CellValue::plain(text(item, &["remarks"])),
            ]
        })
        .collect();

    Section {
        title: "Material Used Information".to_string(),
        body: SectionBody::Table {
            columns: vec![
                "#".to_string(),
                "Material Description".to_string(),
                "Old Serial No".to_string(),
                "New Serial No".to_string(),
                "Remarks".to_string(),
            ],
            rows,
        },
        remarks: None,
    }
}

fn status_section(cm_form: &Value) -> Section {
    Section {
        title: "Status Information".to_string(),
        body: SectionBody::Text {
            boxes: vec![
                Field::new(
                    "Further Action Taken",
                    text(cm_form, &["furtherActionTakenName"]),
                ),
                Field::new("Form Status", text(cm_form, &["formStatusName"])),
            ],
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

    fn cm_type() -> ReportType {
        ReportType::from_key("cm").unwrap()
    }

    #[test]
    fn test_title_falls_back_to_default() {
        let record = normalize(cm_type(), &json!({}));
        assert_eq!(record.title, "Corrective Maintenance Report");

        let record = normalize(
            cm_type(),
            &json!({"cmReportForm": {"reportTitle": "Pump Failure CM"}}),
        );
        assert_eq!(record.title, "Pump Failure CM");
    }

    #[test]
    fn test_station_name_alias_priority() {
        let record = normalize(
            cm_type(),
            &json!({"stationNameWarehouseName": "Warehouse 3"}),
        );
        let station = record
            .header
            .iter()
            .find(|f| f.label == "Station Name")
            .unwrap();
        assert_eq!(station.value, "Warehouse 3");
    }

    #[test]
    fn test_section_order() {
        let record = normalize(cm_type(), &json!({}));
        let titles: Vec<&str> = record.sections.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(
            titles,
            vec![
                "Timeline Information",
                "Issue Details",
                "Before Issue Images",
                "Action Taken",
                "After Action Images",
                "Material Used Information",
                "Old Serial No Images",
                "New Serial No Images",
                "Status Information",
            ]
        );
    }

    #[test]
    fn test_material_rows_numbered() {
        let payload = json!({
            "materialUsed": [
                {"materialDescription": "Fan", "oldSerialNo": "A1", "newSerialNo": "B2"},
                {"materialDescription": "PSU"}
            ]
        });
        let record = normalize(cm_type(), &payload);
        let material = record
            .sections
            .iter()
            .find(|s| s.title == "Material Used Information")
            .unwrap();
        let SectionBody::Table { rows, .. } = &material.body else {
            panic!("expected table");
        };
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][0].text, "1");
        assert_eq!(rows[1][0].text, "2");
        assert_eq!(rows[1][2].text, UNSPECIFIED);
    }

    #[test]
    fn test_sign_off_remarks_only_when_present() {
        let record = normalize(cm_type(), &json!({}));
        assert_eq!(record.sign_off.len(), 2);

        let record = normalize(
            cm_type(),
            &json!({"cmReportForm": {"remark": "follow up next visit"}}),
        );
        assert_eq!(record.sign_off.len(), 3);
        assert_eq!(record.sign_off[2].value, "follow up next visit");
    }
}
