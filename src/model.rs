use std::collections::BTreeMap;

pub const NAME_COLUMN: &str = "Name";
pub const USD_COLUMN: &str = "MC_USD_Billion";
pub const GBP_COLUMN: &str = "MC_GBP_Billion";
pub const EUR_COLUMN: &str = "MC_EUR_Billion";
pub const INR_COLUMN: &str = "MC_INR_Billion";

pub const COLUMNS: [&str; 5] = [NAME_COLUMN, USD_COLUMN, GBP_COLUMN, EUR_COLUMN, INR_COLUMN];

pub const TARGET_CURRENCIES: [&str; 3] = ["GBP", "EUR", "INR"];

#[derive(Debug, Clone, PartialEq)]
pub struct BankRecord {
    pub name: String,
    pub mc_usd_billion: f64,
    pub mc_gbp_billion: Option<f64>,
    pub mc_eur_billion: Option<f64>,
    pub mc_inr_billion: Option<f64>,
}

impl BankRecord {
    pub fn new(name: impl Into<String>, mc_usd_billion: f64) -> Self {
        Self {
            name: name.into(),
            mc_usd_billion,
            mc_gbp_billion: None,
            mc_eur_billion: None,
            mc_inr_billion: None,
        }
    }

    pub fn derived_mut(&mut self, code: &str) -> Option<&mut Option<f64>> {
        match code {
            "GBP" => Some(&mut self.mc_gbp_billion),
            "EUR" => Some(&mut self.mc_eur_billion),
            "INR" => Some(&mut self.mc_inr_billion),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordSet {
    pub rows: Vec<BankRecord>,
}

impl RecordSet {
    pub fn new(rows: Vec<BankRecord>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BankRecord> {
        self.rows.iter()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RateTable {
    pub rates: BTreeMap<String, f64>,
}

impl RateTable {
    pub fn get(&self, code: &str) -> Option<f64> {
        self.rates.get(code).copied()
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

impl FromIterator<(String, f64)> for RateTable {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self {
            rates: iter.into_iter().collect(),
        }
    }
}
