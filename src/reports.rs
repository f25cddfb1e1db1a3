use crate::types::{
    ContractorRankingRow, ProjectRecord, RegionSummaryRow, SummaryStats, TypeTrendRow, UNKNOWN,
};
use crate::util::{
    average, format_large_number, format_number, format_ratio, group_by, median, percentage,
    round_to,
};
use std::collections::{HashMap, HashSet};

/// Delays above this many days count toward `HighDelayPct`.
pub const HIGH_DELAY_DAYS: i64 = 30;
/// Contractors need at least this many projects to be ranked.
pub const MIN_CONTRACTOR_PROJECTS: usize = 5;
/// Ranking keeps this many contractors.
pub const TOP_CONTRACTORS: usize = 15;
/// An average delay of this many days zeroes the schedule factor.
pub const RELIABILITY_HORIZON_DAYS: f64 = 90.0;
/// Reliability below this is flagged as high risk.
pub const RISK_THRESHOLD: f64 = 50.0;
pub const BASELINE_YEAR: i32 = 2021;

pub const HIGH_RISK: &str = "High Risk";
pub const LOW_RISK: &str = "Low Risk";

fn delays(records: &[&ProjectRecord]) -> Vec<i64> {
    records.iter().filter_map(|r| r.completion_delay_days).collect()
}

fn average_delay(delays: &[i64]) -> f64 {
    average(&delays.iter().map(|d| *d as f64).collect::<Vec<_>>())
}

/// Report 1 figures for one region.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionEfficiency {
    pub region: String,
    pub main_island: String,
    pub total_budget: f64,
    pub median_savings: f64,
    pub avg_delay: f64,
    pub high_delay_pct: f64,
    pub efficiency_score: f64,
}

impl RegionEfficiency {
    pub fn to_row(&self) -> RegionSummaryRow {
        RegionSummaryRow {
            region: self.region.clone(),
            main_island: self.main_island.clone(),
            total_budget: format_large_number(self.total_budget),
            median_savings: format_number(self.median_savings, 2),
            avg_delay: format_ratio(self.avg_delay),
            high_delay_pct: format_ratio(self.high_delay_pct),
            efficiency_score: format_ratio(self.efficiency_score),
        }
    }
}

/// Regional efficiency, best score first. Equal scores fall back to region
/// name so the output is reproducible.
pub fn regional_efficiency(data: &[ProjectRecord]) -> Vec<RegionEfficiency> {
    let mut rows: Vec<RegionEfficiency> = group_by(data, |r| r.region.clone())
        .into_iter()
        .map(|(region, recs)| {
            // MainIsland is taken from the first project of the region.
            let main_island = recs[0].main_island.clone();
            let total_budget: f64 = recs.iter().map(|r| r.approved_budget).sum();
            let median_savings = median(recs.iter().map(|r| r.cost_savings).collect());
            let delays = delays(&recs);
            let avg_delay = average_delay(&delays);
            let high_delay_pct = percentage(
                delays.iter().filter(|d| **d > HIGH_DELAY_DAYS).count(),
                delays.len(),
            );
            let efficiency_score = if avg_delay > 0.0 {
                ((median_savings / avg_delay) * 100.0).clamp(0.0, 100.0)
            } else {
                0.0
            };
            RegionEfficiency {
                region,
                main_island,
                total_budget,
                median_savings,
                avg_delay,
                high_delay_pct,
                efficiency_score,
            }
        })
        .collect();

    rows.sort_by(|a, b| {
        b.efficiency_score
            .total_cmp(&a.efficiency_score)
            .then_with(|| a.region.cmp(&b.region))
    });
    rows
}

pub fn generate_report1(data: &[ProjectRecord]) -> Vec<RegionSummaryRow> {
    regional_efficiency(data).iter().map(RegionEfficiency::to_row).collect()
}

/// Report 2 figures for one contractor.
#[derive(Debug, Clone, PartialEq)]
pub struct ContractorPerformance {
    pub rank: usize,
    pub contractor: String,
    pub total_cost: f64,
    pub num_projects: usize,
    pub avg_delay: f64,
    pub total_savings: f64,
    pub reliability_index: f64,
}

impl ContractorPerformance {
    pub fn risk_flag(&self) -> &'static str {
        if self.reliability_index < RISK_THRESHOLD {
            HIGH_RISK
        } else {
            LOW_RISK
        }
    }

    pub fn to_row(&self) -> ContractorRankingRow {
        ContractorRankingRow {
            rank: self.rank,
            contractor: self.contractor.clone(),
            total_cost: format_large_number(self.total_cost),
            num_projects: self.num_projects,
            avg_delay: format_ratio(self.avg_delay),
            total_savings: format_large_number(self.total_savings),
            reliability_index: format_ratio(self.reliability_index),
            risk_flag: self.risk_flag().to_string(),
        }
    }
}

fn reliability_index(avg_delay: f64, total_savings: f64, total_cost: f64) -> f64 {
    if total_cost <= 0.0 {
        return 0.0;
    }
    let schedule = (1.0 - avg_delay / RELIABILITY_HORIZON_DAYS).max(0.0);
    let score = schedule * (total_savings / total_cost) * 100.0;
    if score.is_finite() {
        score.clamp(0.0, 100.0)
    } else {
        0.0
    }
}

/// Contractors with at least [`MIN_CONTRACTOR_PROJECTS`] projects, largest
/// total cost first, cut to [`TOP_CONTRACTORS`] and ranked from 1.
pub fn contractor_ranking(data: &[ProjectRecord]) -> Vec<ContractorPerformance> {
    let mut rows: Vec<ContractorPerformance> = group_by(data, |r| r.contractor.clone())
        .into_iter()
        .filter(|(_, recs)| recs.len() >= MIN_CONTRACTOR_PROJECTS)
        .map(|(contractor, recs)| {
            let total_cost: f64 = recs.iter().map(|r| r.contract_cost).sum();
            let total_savings: f64 = recs.iter().map(|r| r.cost_savings).sum();
            let avg_delay = average_delay(&delays(&recs));
            ContractorPerformance {
                rank: 0,
                contractor,
                total_cost,
                num_projects: recs.len(),
                avg_delay,
                total_savings,
                reliability_index: reliability_index(avg_delay, total_savings, total_cost),
            }
        })
        .collect();

    rows.sort_by(|a, b| {
        b.total_cost
            .total_cmp(&a.total_cost)
            .then_with(|| a.contractor.cmp(&b.contractor))
    });
    rows.truncate(TOP_CONTRACTORS);
    for (idx, row) in rows.iter_mut().enumerate() {
        row.rank = idx + 1;
    }
    rows
}

pub fn generate_report2(data: &[ProjectRecord]) -> Vec<ContractorRankingRow> {
    contractor_ranking(data).iter().map(ContractorPerformance::to_row).collect()
}

/// Report 3 figures for one (year, type of work) pair.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeTrend {
    pub funding_year: i32,
    pub type_of_work: String,
    pub total_projects: usize,
    pub avg_savings: f64,
    pub overrun_rate: f64,
    pub yoy_change: f64,
}

impl TypeTrend {
    pub fn to_row(&self) -> TypeTrendRow {
        TypeTrendRow {
            funding_year: self.funding_year,
            type_of_work: self.type_of_work.clone(),
            total_projects: self.total_projects,
            avg_savings: format_number(self.avg_savings, 2),
            overrun_rate: format_ratio(self.overrun_rate),
            yoy_change: format_ratio(self.yoy_change),
        }
    }
}

/// Savings trend per year and type of work. `yoy_change` compares each
/// group's average savings against the same type's baseline-year average;
/// it stays 0 for the baseline year itself, for types with no baseline
/// group, and when the baseline is 0.
pub fn annual_type_trends(data: &[ProjectRecord]) -> Vec<TypeTrend> {
    let mut rows: Vec<TypeTrend> = group_by(data, |r| (r.funding_year, r.type_of_work.clone()))
        .into_iter()
        .map(|((funding_year, type_of_work), recs)| {
            let savings: Vec<f64> = recs.iter().map(|r| r.cost_savings).collect();
            let overruns = savings.iter().filter(|s| **s < 0.0).count();
            TypeTrend {
                funding_year,
                type_of_work,
                total_projects: recs.len(),
                avg_savings: average(&savings),
                overrun_rate: percentage(overruns, savings.len()),
                yoy_change: 0.0,
            }
        })
        .collect();

    let baselines: HashMap<String, f64> = rows
        .iter()
        .filter(|r| r.funding_year == BASELINE_YEAR)
        .map(|r| (r.type_of_work.clone(), r.avg_savings))
        .collect();

    for row in rows.iter_mut().filter(|r| r.funding_year != BASELINE_YEAR) {
        if let Some(&baseline) = baselines.get(&row.type_of_work) {
            if baseline != 0.0 {
                row.yoy_change = (row.avg_savings - baseline) / baseline.abs() * 100.0;
            }
        }
    }

    rows.sort_by(|a, b| {
        a.funding_year
            .cmp(&b.funding_year)
            .then_with(|| b.avg_savings.total_cmp(&a.avg_savings))
            .then_with(|| a.type_of_work.cmp(&b.type_of_work))
    });
    rows
}

pub fn generate_report3(data: &[ProjectRecord]) -> Vec<TypeTrendRow> {
    annual_type_trends(data).iter().map(TypeTrend::to_row).collect()
}

pub fn generate_summary(data: &[ProjectRecord]) -> SummaryStats {
    let contractors: HashSet<&str> = data
        .iter()
        .map(|r| r.contractor.as_str())
        .filter(|c| !c.is_empty() && *c != UNKNOWN)
        .collect();
    let provinces: HashSet<&str> = data
        .iter()
        .map(|r| r.province.as_str())
        .filter(|p| !p.is_empty())
        .collect();
    let all: Vec<&ProjectRecord> = data.iter().collect();
    let global_avg_delay = round_to(average_delay(&delays(&all)), 1);
    let total_savings: f64 = data.iter().map(|r| r.cost_savings).sum();
    SummaryStats {
        total_projects: data.len(),
        total_contractors: contractors.len(),
        total_provinces: provinces.len(),
        global_avg_delay,
        total_savings: total_savings.round() as i64,
    }
}
