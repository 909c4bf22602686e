use serde::{Deserialize, Serialize};
use serde_json::Number;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A student's roll as submitted by the caller: a JSON number or a JSON string.
///
/// Equality is strict across kinds (`1` is not `"1"`) and numeric within
/// numbers (`1` is `1.0`). Both are decided by [`Roll::key`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Roll {
    Number(Number),
    Text(String),
}

impl Roll {
    /// Canonical matching key, stored next to the raw JSON in `students.roll_key`.
    pub fn key(&self) -> String {
        match self {
            Roll::Number(n) => format!("n:{}", canonical_number(n)),
            Roll::Text(s) => format!("s:{}", s),
        }
    }

    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(raw: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}

fn canonical_number(n: &Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    let f = n.as_f64().unwrap_or(f64::NAN);
    // Integral floats print like integers so 3.0 and 3 share a key.
    if f.fract() == 0.0 && f.abs() < 9_007_199_254_740_992.0 {
        (f as i64).to_string()
    } else {
        f.to_string()
    }
}

impl PartialEq for Roll {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Roll {}

impl Hash for Roll {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl fmt::Display for Roll {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Roll::Number(n) => f.write_str(&canonical_number(n)),
            Roll::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for Roll {
    fn from(v: i64) -> Self {
        Roll::Number(Number::from(v))
    }
}

impl From<&str> for Roll {
    fn from(v: &str) -> Self {
        Roll::Text(v.to_string())
    }
}
