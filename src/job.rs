use serde::Deserialize;

const DEFAULT_CURRENCY: &str = "USD";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobPosting {
    #[serde(default)]
    pub jd_uid: Option<String>,
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub job_role: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub job_details_from_company: String,
    #[serde(default)]
    pub min_exp: Option<u32>,
    #[serde(default)]
    pub max_exp: Option<u32>,
    #[serde(default)]
    pub min_jd_salary: Option<u32>,
    #[serde(default)]
    pub max_jd_salary: Option<u32>,
    #[serde(default)]
    pub salary_currency_code: Option<String>,
    #[serde(default)]
    pub jd_link: String,
}

/// One page as returned by the listing endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobPage {
    pub jd_list: Vec<JobPosting>,
    #[serde(default)]
    pub total_count: Option<u64>,
}

impl JobPosting {
    pub fn currency(&self) -> &str {
        self.salary_currency_code
            .as_deref()
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_CURRENCY)
    }

    /// Salary line in thousands; a missing minimum shows as 0.
    pub fn salary_range(&self) -> String {
        let min = self.min_jd_salary.unwrap_or(0);
        match self.max_jd_salary {
            Some(max) => format!("{min}k - {max}k {}", self.currency()),
            None => format!("{min}k+ {}", self.currency()),
        }
    }

    pub fn min_experience(&self) -> u32 {
        self.min_exp.unwrap_or(0)
    }

    pub fn experience_range(&self) -> String {
        match (self.min_exp, self.max_exp) {
            (Some(min), Some(max)) => format!("{min} - {max} years"),
            (Some(min), None) => format!("{min}+ years"),
            (None, Some(max)) => format!("up to {max} years"),
            (None, None) => "not specified".to_string(),
        }
    }
}

pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
pub(crate) fn posting(company: &str, role: &str, location: &str) -> JobPosting {
    JobPosting {
        jd_uid: None,
        company_name: company.to_string(),
        job_role: role.to_string(),
        location: location.to_string(),
        job_details_from_company: String::new(),
        min_exp: None,
        max_exp: None,
        min_jd_salary: None,
        max_jd_salary: None,
        salary_currency_code: None,
        jd_link: String::new(),
    }
}
