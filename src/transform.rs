// Post-cleaning stages: derived metrics, coordinate imputation and the
// funding-year filter. Each stage takes ownership of its input and hands a
// new vector to the next one.
use crate::config::YearRange;
use crate::types::{CleanRecord, ProjectRecord};
use crate::util::days_diff;
use std::collections::HashMap;

/// Attach `cost_savings` and `completion_delay_days` to a cleaned record.
pub fn add_derived_fields(record: CleanRecord) -> ProjectRecord {
    let cost_savings = record.approved_budget - record.contract_cost;
    let completion_delay_days = match (record.start_date, record.actual_completion_date) {
        (Some(start), Some(done)) => Some(days_diff(start, done)),
        _ => None,
    };
    ProjectRecord {
        region: record.region,
        main_island: record.main_island,
        funding_year: record.funding_year,
        approved_budget: record.approved_budget,
        contract_cost: record.contract_cost,
        start_date: record.start_date,
        actual_completion_date: record.actual_completion_date,
        lat: record.lat,
        lon: record.lon,
        province: record.province,
        contractor: record.contractor,
        type_of_work: record.type_of_work,
        cost_savings,
        completion_delay_days,
    }
}

#[derive(Default)]
struct CoordAcc {
    lat_sum: f64,
    lat_count: usize,
    lon_sum: f64,
    lon_count: usize,
}

impl CoordAcc {
    fn mean_lat(&self) -> Option<f64> {
        (self.lat_count > 0).then(|| self.lat_sum / self.lat_count as f64)
    }

    fn mean_lon(&self) -> Option<f64> {
        (self.lon_count > 0).then(|| self.lon_sum / self.lon_count as f64)
    }
}

/// Fill missing coordinates with the mean of known coordinates in the same
/// province. Latitude and longitude are averaged independently; a present
/// value is never replaced. Records without a province pass through as-is.
pub fn impute_coordinates(mut records: Vec<ProjectRecord>) -> Vec<ProjectRecord> {
    let mut by_prov: HashMap<String, CoordAcc> = HashMap::new();
    for r in records.iter().filter(|r| !r.province.is_empty()) {
        let e = by_prov.entry(r.province.clone()).or_default();
        if let Some(lat) = r.lat {
            e.lat_sum += lat;
            e.lat_count += 1;
        }
        if let Some(lon) = r.lon {
            e.lon_sum += lon;
            e.lon_count += 1;
        }
    }

    for r in &mut records {
        if r.lat.is_some() && r.lon.is_some() {
            continue;
        }
        if let Some(acc) = by_prov.get(&r.province) {
            r.lat = r.lat.or_else(|| acc.mean_lat());
            r.lon = r.lon.or_else(|| acc.mean_lon());
        }
    }
    records
}

/// Keep records whose funding year falls inside `range`, in input order.
pub fn filter_by_year_range(records: Vec<ProjectRecord>, range: YearRange) -> Vec<ProjectRecord> {
    records
        .into_iter()
        .filter(|r| range.contains(r.funding_year))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn clean(province: &str, lat: Option<f64>, lon: Option<f64>) -> CleanRecord {
        CleanRecord {
            region: "Region VII".into(),
            main_island: "Visayas".into(),
            funding_year: 2022,
            approved_budget: 500.0,
            contract_cost: 650.5,
            start_date: None,
            actual_completion_date: None,
            lat,
            lon,
            province: province.into(),
            contractor: "B".into(),
            type_of_work: "Drainage".into(),
        }
    }

    #[test]
    fn test_cost_savings_is_exact_difference() {
        let rec = add_derived_fields(clean("Cebu", None, None));
        assert_eq!(rec.cost_savings, 500.0 - 650.5);
        assert_eq!(rec.completion_delay_days, None);
    }

    #[test]
    fn test_delay_requires_both_dates_and_may_be_negative() {
        let mut c = clean("Cebu", None, None);
        c.start_date = NaiveDate::from_ymd_opt(2022, 3, 10);
        assert_eq!(add_derived_fields(c.clone()).completion_delay_days, None);

        c.actual_completion_date = NaiveDate::from_ymd_opt(2022, 3, 1);
        assert_eq!(add_derived_fields(c.clone()).completion_delay_days, Some(-9));

        c.actual_completion_date = NaiveDate::from_ymd_opt(2022, 4, 10);
        assert_eq!(add_derived_fields(c).completion_delay_days, Some(31));
    }

    #[test]
    fn test_imputation_uses_province_mean_and_keeps_known_values() {
        let records: Vec<ProjectRecord> = vec![
            clean("Cebu", Some(10.0), Some(123.0)),
            clean("Cebu", Some(12.0), None),
            clean("Cebu", None, Some(125.0)),
            clean("Bohol", None, None),
            clean("", None, None),
        ]
        .into_iter()
        .map(add_derived_fields)
        .collect();

        let out = impute_coordinates(records);
        assert_eq!(out.len(), 5);
        assert_eq!((out[0].lat, out[0].lon), (Some(10.0), Some(123.0)));
        assert_eq!((out[1].lat, out[1].lon), (Some(12.0), Some(124.0)));
        assert_eq!((out[2].lat, out[2].lon), (Some(11.0), Some(125.0)));
        // No known coordinates in Bohol, and no province at all.
        assert_eq!((out[3].lat, out[3].lon), (None, None));
        assert_eq!((out[4].lat, out[4].lon), (None, None));
    }

    #[test]
    fn test_year_filter_preserves_order() {
        let records: Vec<ProjectRecord> = [2020, 2021, 2024, 2023, 2022]
            .into_iter()
            .map(|y| {
                let mut c = clean("Cebu", None, None);
                c.funding_year = y;
                add_derived_fields(c)
            })
            .collect();
        let years: Vec<i32> = filter_by_year_range(records, YearRange::new(2021, 2023))
            .iter()
            .map(|r| r.funding_year)
            .collect();
        assert_eq!(years, vec![2021, 2023, 2022]);
    }
}
