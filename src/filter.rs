use std::fmt;
use std::str::FromStr;

use anyhow::{Context, bail};

use crate::job::JobPosting;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WorkMode {
    Remote,
    Onsite,
}

impl WorkMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkMode::Remote => "remote",
            WorkMode::Onsite => "onsite",
        }
    }
}

impl fmt::Display for WorkMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "remote" => Ok(WorkMode::Remote),
            "onsite" | "on-site" => Ok(WorkMode::Onsite),
            other => bail!("Unknown work mode: {}. Use: remote, onsite", other),
        }
    }
}

/// User-entered constraints; `None` means the criterion is not applied.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FilterCriteria {
    pub experience_ceiling: Option<u32>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub work_mode: Option<WorkMode>,
    pub role: Option<String>,
    /// In thousands, like `minJdSalary`.
    pub min_base_pay: Option<u32>,
}

/// A single named criterion, as entered in one form control.
#[derive(Clone, Debug, PartialEq)]
pub enum FilterField {
    Experience(Option<u32>),
    Company(Option<String>),
    Location(Option<String>),
    WorkMode(Option<WorkMode>),
    Role(Option<String>),
    MinBasePay(Option<u32>),
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Accepts `3`, `3y` and `3 years`.
pub fn parse_experience(raw: &str) -> anyhow::Result<u32> {
    let digits = raw
        .trim()
        .trim_end_matches("years")
        .trim_end_matches("year")
        .trim_end_matches('y')
        .trim();
    digits
        .parse()
        .with_context(|| format!("Invalid experience: {}", raw))
}

/// Accepts `50`, `50k` and `100k+`; the result is in thousands.
pub fn parse_base_pay(raw: &str) -> anyhow::Result<u32> {
    let digits = raw
        .trim()
        .trim_end_matches('+')
        .trim_end_matches(['k', 'K']);
    digits
        .parse()
        .with_context(|| format!("Invalid base pay: {}", raw))
}

impl FromStr for FilterField {
    type Err = anyhow::Error;

    /// Parses `key=value`; an empty value clears that criterion.
    fn from_str(s: &str) -> anyhow::Result<Self> {
        let Some((key, value)) = s.split_once('=') else {
            bail!("Invalid filter: {}. Expected key=value", s);
        };
        let value = value.trim();
        let field = match key.trim() {
            "exp" | "experience" => FilterField::Experience(
                non_empty(value).map(|v| parse_experience(&v)).transpose()?,
            ),
            "company" => FilterField::Company(non_empty(value)),
            "location" => FilterField::Location(non_empty(value)),
            "mode" => FilterField::WorkMode(non_empty(value).map(|v| v.parse()).transpose()?),
            "role" => FilterField::Role(non_empty(value)),
            "pay" | "min-pay" => FilterField::MinBasePay(
                non_empty(value).map(|v| parse_base_pay(&v)).transpose()?,
            ),
            other => bail!(
                "Unknown filter: {}. Use: exp, company, location, mode, role, pay",
                other
            ),
        };
        Ok(field)
    }
}

impl FilterCriteria {
    pub fn is_empty(&self) -> bool {
        *self == FilterCriteria::default()
    }

    /// Merges fields by name; other criteria are left as they are.
    pub fn merge<I: IntoIterator<Item = FilterField>>(&mut self, fields: I) {
        for field in fields {
            match field {
                FilterField::Experience(v) => self.experience_ceiling = v,
                FilterField::Company(v) => self.company = v.as_deref().and_then(non_empty),
                FilterField::Location(v) => self.location = v.as_deref().and_then(non_empty),
                FilterField::WorkMode(v) => self.work_mode = v,
                FilterField::Role(v) => self.role = v.as_deref().and_then(non_empty),
                FilterField::MinBasePay(v) => self.min_base_pay = v,
            }
        }
    }

    pub fn matches(&self, job: &JobPosting) -> bool {
        if let Some(ceiling) = self.experience_ceiling
            && job.min_experience() > ceiling
        {
            return false;
        }
        if let Some(ref company) = self.company
            && !contains_ci(&job.company_name, company)
        {
            return false;
        }
        if let Some(ref location) = self.location
            && !contains_ci(&job.location, location)
        {
            return false;
        }
        if let Some(mode) = self.work_mode
            && job.location.to_lowercase() != mode.as_str()
        {
            return false;
        }
        if let Some(ref role) = self.role
            && !contains_ci(&job.job_role, role)
        {
            return false;
        }
        if let Some(pay) = self.min_base_pay
            && job.min_jd_salary.unwrap_or(0) < pay
        {
            return false;
        }
        true
    }

    /// Human-readable summary, e.g. `exp<=3 company~acme`.
    pub fn describe(&self) -> String {
        let mut parts = Vec::new();
        if let Some(exp) = self.experience_ceiling {
            parts.push(format!("exp<={exp}"));
        }
        if let Some(ref company) = self.company {
            parts.push(format!("company~{company}"));
        }
        if let Some(ref location) = self.location {
            parts.push(format!("location~{location}"));
        }
        if let Some(mode) = self.work_mode {
            parts.push(format!("mode={mode}"));
        }
        if let Some(ref role) = self.role {
            parts.push(format!("role~{role}"));
        }
        if let Some(pay) = self.min_base_pay {
            parts.push(format!("pay>={pay}k"));
        }
        if parts.is_empty() {
            "none".to_string()
        } else {
            parts.join(" ")
        }
    }
}

/// Ordered subsequence of `accumulated` matching every set criterion.
pub fn filtered_view<'a>(
    accumulated: &'a [JobPosting],
    criteria: &FilterCriteria,
) -> Vec<&'a JobPosting> {
    accumulated
        .iter()
        .filter(|job| criteria.matches(job))
        .collect()
}
