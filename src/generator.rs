use crate::dates::format_txn_date;
use chrono::{DateTime, TimeZone, Utc};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub struct GeneratorConfig {
    pub customers: usize,
    pub agencies: usize,
    pub internal_accounts: usize,
    pub null_agency_ratio: f64,
    pub second_agency_ratio: f64,
    pub year: i32,
}

/// A generated row, written with the same headers the spreadsheet export uses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedTransaction {
    #[serde(rename = "Transaction ID")]
    pub transaction_id: String,
    #[serde(rename = "Sender Name")]
    pub sender_name: String,
    #[serde(rename = "Amount")]
    pub amount: u64,
    #[serde(rename = "Agence")]
    pub agency: Option<String>,
    #[serde(rename = "TxnDate")]
    pub txn_date: String,
}

pub struct GeneratedDataset {
    pub records: Vec<GeneratedTransaction>,
    /// Operator accounts mixed into the data, for the exclusion list.
    pub internal_accounts: Vec<String>,
}

#[derive(Clone)]
struct ActivityProfile {
    label: &'static str,
    min_tx: usize,
    max_tx: usize,
    every_month: bool,
}

struct CustomerProfile {
    name: String,
    home_agency: String,
    second_agency: Option<String>,
    activity: ActivityProfile,
}

const LAST_NAMES: &[&str] = &[
    "KOUMBA", "MABIALA", "NGOMA", "MOUKALA", "BOUKAKA", "MAKAYA", "NKOUNKOU", "MBEMBA", "LOEMBA",
    "SAMBA", "MILANDOU", "NGOUABI", "MASSAMBA", "OKEMBA", "ITOUA", "ELENGA", "MOUANDA", "BATCHI",
    "NDINGA", "OSSEBI",
];

const FIRST_NAMES: &[&str] = &[
    "Alice", "Jean", "Grace", "Prince", "Merveille", "Chancel", "Exauce", "Divine", "Rodrigue",
    "Fortune", "Christelle", "Gloire", "Brice", "Nadege", "Herve", "Ornella", "Sylvain", "Josiane",
    "Arsene", "Precieuse",
];

const AGENCY_NAMES: &[&str] = &[
    "Poto-Poto",
    "Bacongo",
    "Moungali",
    "Ouenze",
    "Talangai",
    "Makelekele",
    "Mfilou",
    "Djiri",
    "Pointe-Noire Centre",
    "Loandjili",
    "Tie-Tie",
    "Mvou-Mvou",
];

pub fn generate_records(config: &GeneratorConfig, seed: u64) -> Result<GeneratedDataset, String> {
    validate_config(config)?;
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let agencies = build_agencies(config.agencies);
    let mut plans = build_activity_plans(config.customers);
    plans.shuffle(&mut rng);
    let customers = build_customers(
        &mut rng,
        plans,
        config.internal_accounts,
        &agencies,
        config.second_agency_ratio,
    );

    let (year_start, year_end) = period_bounds(config.year, 1, config.year + 1, 1)?;
    let mut records = Vec::new();
    for customer in &customers {
        let count = rng.gen_range(customer.activity.min_tx..=customer.activity.max_tx);
        let mut dates = Vec::with_capacity(count);
        if customer.activity.every_month {
            for month in 1..=12u32 {
                let (start, end) = month_bounds(config.year, month)?;
                dates.push(random_datetime(&mut rng, start, end));
            }
        }
        while dates.len() < count {
            dates.push(random_datetime(&mut rng, year_start, year_end));
        }

        for date in dates {
            let agency = match &customer.second_agency {
                Some(second) if rng.gen_bool(0.25) => second.clone(),
                _ => customer.home_agency.clone(),
            };
            let agency = if rng.gen_bool(config.null_agency_ratio) {
                None
            } else {
                Some(agency)
            };
            let (amount_min, amount_max) = amount_range(customer.activity.label);
            let bytes: [u8; 16] = rng.gen();
            records.push(GeneratedTransaction {
                transaction_id: uuid::Builder::from_random_bytes(bytes)
                    .into_uuid()
                    .to_string(),
                sender_name: customer.name.clone(),
                amount: rng.gen_range(amount_min..=amount_max) * 100,
                agency,
                txn_date: format_txn_date(&date.naive_utc()),
            });
        }
    }

    records.sort_by(|a, b| a.txn_date.cmp(&b.txn_date));
    let internal_accounts = customers
        .iter()
        .filter(|customer| customer.activity.label == "internal")
        .map(|customer| customer.name.clone())
        .collect();
    Ok(GeneratedDataset {
        records,
        internal_accounts,
    })
}

fn validate_config(config: &GeneratorConfig) -> Result<(), String> {
    if config.customers == 0 {
        return Err("customers must be greater than 0".to_string());
    }
    if config.agencies == 0 {
        return Err("agencies must be greater than 0".to_string());
    }
    if !(1..=9998).contains(&config.year) {
        return Err("year must be 1..9998".to_string());
    }
    if !(0.0..=1.0).contains(&config.null_agency_ratio) {
        return Err("null_agency_ratio must be 0..1".to_string());
    }
    if !(0.0..=1.0).contains(&config.second_agency_ratio) {
        return Err("second_agency_ratio must be 0..1".to_string());
    }
    Ok(())
}

fn build_agencies(count: usize) -> Vec<String> {
    (0..count)
        .map(|idx| match AGENCY_NAMES.get(idx) {
            Some(name) => name.to_string(),
            None => format!("Agence {}", idx + 1),
        })
        .collect()
}

/// Splits customers across activity tiers: 30% single, 25% rare, 12% regular,
/// 8% active every month, the rest occasional.
fn build_activity_plans(customers: usize) -> Vec<ActivityProfile> {
    let share = |ratio: f64| ((customers as f64) * ratio).round() as usize;
    let single = share(0.30);
    let rare = share(0.25).min(customers - single);
    let regular = share(0.12).min(customers - single - rare);
    let monthly = share(0.08).min(customers - single - rare - regular);
    let occasional = customers - single - rare - regular - monthly;

    let mut plans = Vec::with_capacity(customers);
    plans.extend(std::iter::repeat(profile_single()).take(single));
    plans.extend(std::iter::repeat(profile_rare()).take(rare));
    plans.extend(std::iter::repeat(profile_occasional()).take(occasional));
    plans.extend(std::iter::repeat(profile_regular()).take(regular));
    plans.extend(std::iter::repeat(profile_monthly()).take(monthly));
    plans
}

fn build_customers<R: Rng + ?Sized>(
    rng: &mut R,
    plans: Vec<ActivityProfile>,
    internal_accounts: usize,
    agencies: &[String],
    second_agency_ratio: f64,
) -> Vec<CustomerProfile> {
    let mut used_names = HashSet::new();
    let mut customers = Vec::with_capacity(plans.len() + internal_accounts);
    let activities = plans
        .into_iter()
        .chain(std::iter::repeat(profile_internal()).take(internal_accounts));

    for activity in activities {
        let name = unique_name(rng, &mut used_names);
        let home_agency = agencies
            .choose(rng)
            .cloned()
            .unwrap_or_else(|| "Agence 1".to_string());
        let second_agency = if agencies.len() > 1 && rng.gen_bool(second_agency_ratio) {
            agencies
                .iter()
                .filter(|agency| **agency != home_agency)
                .collect::<Vec<_>>()
                .choose(rng)
                .map(|agency| agency.to_string())
        } else {
            None
        };
        customers.push(CustomerProfile {
            name,
            home_agency,
            second_agency,
            activity,
        });
    }
    customers
}

fn unique_name<R: Rng + ?Sized>(rng: &mut R, used: &mut HashSet<String>) -> String {
    let last = LAST_NAMES.choose(rng).unwrap_or(&"KOUMBA");
    let first = FIRST_NAMES.choose(rng).unwrap_or(&"Alice");
    let mut name = format!("{last} {first}");
    let mut suffix = 2;
    while used.contains(&name) {
        name = format!("{last} {first} {suffix}");
        suffix += 1;
    }
    used.insert(name.clone());
    name
}

fn profile_single() -> ActivityProfile {
    ActivityProfile {
        label: "single",
        min_tx: 1,
        max_tx: 1,
        every_month: false,
    }
}

fn profile_rare() -> ActivityProfile {
    ActivityProfile {
        label: "rare",
        min_tx: 2,
        max_tx: 3,
        every_month: false,
    }
}

fn profile_occasional() -> ActivityProfile {
    ActivityProfile {
        label: "occasional",
        min_tx: 4,
        max_tx: 11,
        every_month: false,
    }
}

fn profile_regular() -> ActivityProfile {
    ActivityProfile {
        label: "regular",
        min_tx: 12,
        max_tx: 40,
        every_month: false,
    }
}

fn profile_monthly() -> ActivityProfile {
    ActivityProfile {
        label: "monthly",
        min_tx: 12,
        max_tx: 36,
        every_month: true,
    }
}

fn profile_internal() -> ActivityProfile {
    ActivityProfile {
        label: "internal",
        min_tx: 50,
        max_tx: 120,
        every_month: true,
    }
}

fn month_bounds(year: i32, month: u32) -> Result<(DateTime<Utc>, DateTime<Utc>), String> {
    if month == 12 {
        period_bounds(year, 12, year + 1, 1)
    } else {
        period_bounds(year, month, year, month + 1)
    }
}

fn period_bounds(
    year: i32,
    month: u32,
    next_year: i32,
    next_month: u32,
) -> Result<(DateTime<Utc>, DateTime<Utc>), String> {
    let start = Utc
        .with_ymd_and_hms(year, month, 1, 0, 0, 0)
        .single()
        .ok_or_else(|| "invalid period start date".to_string())?;
    let end = Utc
        .with_ymd_and_hms(next_year, next_month, 1, 0, 0, 0)
        .single()
        .ok_or_else(|| "invalid period end date".to_string())?;
    Ok((start, end))
}

fn random_datetime<R: Rng + ?Sized>(
    rng: &mut R,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> DateTime<Utc> {
    let secs = rng.gen_range(start.timestamp()..end.timestamp());
    Utc.timestamp_opt(secs, 0).single().unwrap_or(start)
}

/// Amount range in hundreds of francs.
fn amount_range(label: &str) -> (u64, u64) {
    match label {
        "single" | "rare" => (10, 1_500),
        "occasional" => (10, 3_000),
        "regular" | "monthly" => (20, 5_000),
        "internal" => (500, 20_000),
        _ => (10, 2_000),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> GeneratorConfig {
        GeneratorConfig {
            customers: 200,
            agencies: 4,
            internal_accounts: 2,
            null_agency_ratio: 0.02,
            second_agency_ratio: 0.1,
            year: 2025,
        }
    }

    #[test]
    fn same_seed_same_rows() {
        let first = generate_records(&config(), 7).unwrap().records;
        let second = generate_records(&config(), 7).unwrap().records;
        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!(a.transaction_id, b.transaction_id);
            assert_eq!(a.sender_name, b.sender_name);
            assert_eq!(a.txn_date, b.txn_date);
        }
    }

    #[test]
    fn rows_stay_inside_the_year() {
        let dataset = generate_records(&config(), 11).unwrap();
        let rows = &dataset.records;
        assert!(rows.iter().all(|row| row.txn_date.starts_with("2025-")));
        let senders: HashSet<_> = rows.iter().map(|row| row.sender_name.as_str()).collect();
        assert_eq!(senders.len(), 202);
        assert_eq!(dataset.internal_accounts.len(), 2);
        assert!(dataset
            .internal_accounts
            .iter()
            .all(|name| senders.contains(name.as_str())));
    }

    #[test]
    fn rejects_bad_config() {
        let mut bad = config();
        bad.customers = 0;
        assert!(generate_records(&bad, 1).is_err());
        let mut bad = config();
        bad.null_agency_ratio = 1.5;
        assert!(generate_records(&bad, 1).is_err());
    }

    #[test]
    fn plans_cover_every_customer() {
        for customers in [1, 2, 7, 100, 1234] {
            assert_eq!(build_activity_plans(customers).len(), customers);
        }
    }
}
