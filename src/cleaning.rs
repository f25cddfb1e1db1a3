// Row validation and cleaning.
//
// `validate_row` reports every problem with a row; `clean_row` turns a valid
// row into a typed `CleanRecord`, applying defaults for optional fields once,
// here, so later stages never see a blank Contractor or TypeOfWork.
use crate::types::{CleanRecord, RawRow, ValidationResult, UNKNOWN};
use crate::util::{parse_date, parse_number, parse_year};

pub const MIN_FUNDING_YEAR: i32 = 2021;
pub const MAX_FUNDING_YEAR: i32 = 2023;

fn is_blank(field: &Option<String>) -> bool {
    field.as_deref().map_or(true, |s| s.trim().is_empty())
}

fn trimmed(field: Option<&str>) -> String {
    field.unwrap_or_default().trim().to_string()
}

fn or_unknown(field: Option<&str>) -> String {
    match field.map(str::trim) {
        Some(s) if !s.is_empty() => s.to_string(),
        _ => UNKNOWN.to_string(),
    }
}

/// Check the mandatory fields of a row. All checks run; failures are listed
/// in check order.
pub fn validate_row(row: &RawRow) -> ValidationResult {
    let mut errors = Vec::new();
    if is_blank(&row.region) {
        errors.push("Missing Region".to_string());
    }
    if is_blank(&row.main_island) {
        errors.push("Missing MainIsland".to_string());
    }
    match parse_year(row.funding_year.as_deref()) {
        Some(y) if (MIN_FUNDING_YEAR..=MAX_FUNDING_YEAR).contains(&y) => {}
        _ => errors.push(format!(
            "Invalid FundingYear: {}",
            row.funding_year.as_deref().unwrap_or("").trim()
        )),
    }
    if is_blank(&row.approved_budget_for_contract) {
        errors.push("Missing ApprovedBudgetForContract".to_string());
    }
    if is_blank(&row.contract_cost) {
        errors.push("Missing ContractCost".to_string());
    }
    ValidationResult::from_errors(errors)
}

/// Turn a raw row into a typed record, or `None` if the row is invalid.
///
/// A budget or cost that is present but not numeric (or negative) also
/// yields `None`; presence is checked by the validator, parseability here.
/// Optional dates and coordinates that fail to parse become `None` fields.
pub fn clean_row(row: &RawRow) -> Option<CleanRecord> {
    if !validate_row(row).is_valid {
        return None;
    }
    let funding_year = parse_year(row.funding_year.as_deref())?;
    let approved_budget = parse_number(row.approved_budget_for_contract.as_deref()).filter(|v| *v >= 0.0)?;
    let contract_cost = parse_number(row.contract_cost.as_deref()).filter(|v| *v >= 0.0)?;

    Some(CleanRecord {
        region: trimmed(row.region.as_deref()),
        main_island: trimmed(row.main_island.as_deref()),
        funding_year,
        approved_budget,
        contract_cost,
        start_date: parse_date(row.start_date.as_deref()),
        actual_completion_date: parse_date(row.actual_completion_date.as_deref()),
        lat: parse_number(row.project_latitude.as_deref()),
        lon: parse_number(row.project_longitude.as_deref()),
        province: trimmed(row.province.as_deref()),
        contractor: or_unknown(row.contractor.as_deref()),
        type_of_work: or_unknown(row.type_of_work.as_deref()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn row() -> RawRow {
        RawRow {
            region: Some("NCR".into()),
            main_island: Some("Luzon".into()),
            funding_year: Some("2021".into()),
            approved_budget_for_contract: Some("1,000,000".into()),
            contract_cost: Some("900000".into()),
            start_date: Some("2021-01-01".into()),
            actual_completion_date: Some("2021-02-15".into()),
            project_latitude: Some("14.6".into()),
            project_longitude: Some("121.0".into()),
            province: Some("Metro Manila".into()),
            contractor: Some("A".into()),
            type_of_work: Some("Flood Control".into()),
        }
    }

    #[test]
    fn test_valid_row_cleans_to_typed_record() {
        let rec = clean_row(&row()).unwrap();
        assert_eq!(rec.region, "NCR");
        assert_eq!(rec.funding_year, 2021);
        assert_eq!(rec.approved_budget, 1_000_000.0);
        assert_eq!(rec.contract_cost, 900_000.0);
        assert_eq!(rec.start_date, NaiveDate::from_ymd_opt(2021, 1, 1));
        assert_eq!(rec.lat, Some(14.6));
        assert_eq!(rec.contractor, "A");
    }

    #[test]
    fn test_validator_reports_all_failures_in_order() {
        let raw = RawRow {
            funding_year: Some("2019".into()),
            ..RawRow::default()
        };
        let result = validate_row(&raw);
        assert!(!result.is_valid);
        assert_eq!(
            result.errors,
            vec![
                "Missing Region",
                "Missing MainIsland",
                "Invalid FundingYear: 2019",
                "Missing ApprovedBudgetForContract",
                "Missing ContractCost",
            ]
        );
    }

    #[test]
    fn test_blank_required_fields_are_rejected() {
        let mut raw = row();
        raw.region = Some("   ".into());
        assert_eq!(clean_row(&raw), None);

        let mut raw = row();
        raw.main_island = None;
        assert_eq!(clean_row(&raw), None);

        let mut raw = row();
        raw.contract_cost = None;
        assert_eq!(clean_row(&raw), None);
    }

    #[test]
    fn test_out_of_range_year_is_rejected() {
        for year in ["2020", "2024", "abc", ""] {
            let mut raw = row();
            raw.funding_year = Some(year.into());
            assert_eq!(clean_row(&raw), None, "year {year:?}");
        }
    }

    #[test]
    fn test_present_but_unparseable_budget_is_dropped_silently() {
        let mut raw = row();
        raw.approved_budget_for_contract = Some("12abc".into());
        assert!(validate_row(&raw).is_valid);
        assert_eq!(clean_row(&raw), None);
    }

    #[test]
    fn test_optional_fields_default_or_become_none() {
        let mut raw = row();
        raw.start_date = Some("not a date".into());
        raw.project_latitude = Some("N/A".into());
        raw.province = None;
        raw.contractor = Some("  ".into());
        raw.type_of_work = None;
        let rec = clean_row(&raw).unwrap();
        assert_eq!(rec.start_date, None);
        assert_eq!(rec.lat, None);
        assert_eq!(rec.lon, Some(121.0));
        assert_eq!(rec.province, "");
        assert_eq!(rec.contractor, UNKNOWN);
        assert_eq!(rec.type_of_work, UNKNOWN);
    }
}
