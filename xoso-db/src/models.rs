use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// Highest two-digit number a draw can contain.
pub const MAX_NUMBER: u8 = 99;

/// A "xiên 3" ticket: three distinct numbers, ascending.
pub type Xien3 = [u8; 3];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DigitNote {
    #[serde(rename = "CÂM")]
    Cam,
    #[serde(rename = "Mạnh")]
    Manh,
    #[serde(rename = "Khá Mạnh")]
    KhaManh,
    #[serde(rename = "Yếu")]
    Yeu,
}

impl DigitNote {
    pub fn from_count(count: u32) -> Self {
        match count {
            0 => DigitNote::Cam,
            c if c >= 4 => DigitNote::Manh,
            c if c <= 2 => DigitNote::Yeu,
            _ => DigitNote::KhaManh,
        }
    }

    /// Rank used to order strategy digits: câm first, then yếu, then the rest.
    pub fn priority(&self) -> u8 {
        match self {
            DigitNote::Cam => 0,
            DigitNote::Yeu => 1,
            DigitNote::KhaManh | DigitNote::Manh => 2,
        }
    }
}

impl std::fmt::Display for DigitNote {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DigitNote::Cam => write!(f, "CÂM"),
            DigitNote::Manh => write!(f, "Mạnh"),
            DigitNote::KhaManh => write!(f, "Khá Mạnh"),
            DigitNote::Yeu => write!(f, "Yếu"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DigitStat {
    pub count: u32,
    pub note: DigitNote,
}

impl Default for DigitStat {
    fn default() -> Self {
        Self {
            count: 0,
            note: DigitNote::Cam,
        }
    }
}

/// Head and tail statistics of one draw. Index `i` of `heads`/`tails` is digit `i`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawAnalysis {
    pub draw_date: String,
    pub heads: [DigitStat; 10],
    pub tails: [DigitStat; 10],
    pub all_numbers: Vec<u8>,
}

impl DrawAnalysis {
    pub fn has_number(&self, number: u8) -> bool {
        self.all_numbers.binary_search(&number).is_ok()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Strategy {
    pub potential_heads: Vec<u8>,
    pub potential_tails: Vec<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckResult {
    pub hit_core_numbers: Vec<u8>,
    pub hit_xien3_sets: Vec<Xien3>,
    pub profit: i64,
}

#[derive(Debug, Clone)]
pub struct StoredDraw {
    pub draw_date: String,
    pub raw_data: String,
    pub imported_at: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub session: String,
    pub draw_date: String,
    pub core_numbers: Vec<u8>,
    pub xien3_sets: Vec<Xien3>,
}

pub fn validate_numbers(numbers: &[u8]) -> Result<()> {
    for &n in numbers {
        if n > MAX_NUMBER {
            bail!("Số {} nằm ngoài khoảng 00-99", n);
        }
    }
    for i in 0..numbers.len() {
        for j in (i + 1)..numbers.len() {
            if numbers[i] == numbers[j] {
                bail!("Số bị trùng : {:02}", numbers[i]);
            }
        }
    }
    Ok(())
}

pub fn validate_xien3(set: &Xien3) -> Result<()> {
    validate_numbers(set)
}

pub fn validate_prediction(core_numbers: &[u8], xien3_sets: &[Xien3]) -> Result<()> {
    validate_numbers(core_numbers)?;
    for set in xien3_sets {
        validate_xien3(set)?;
    }
    Ok(())
}
