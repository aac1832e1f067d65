//! Domain types shared by the optimization engine
//!
//! Everything here is built fresh from a store snapshot at the start of an
//! optimization call and dropped at its end.

use crate::input::store::{EmployeeRecord, ProjectRecord};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillLevel {
    Junior,
    Mid,
    Senior,
}

impl SkillLevel {
    /// Case-insensitive parse. Unknown or blank levels are treated as unset.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "junior" => Some(SkillLevel::Junior),
            "mid" => Some(SkillLevel::Mid),
            "senior" => Some(SkillLevel::Senior),
            _ => None,
        }
    }

    pub fn as_key(&self) -> &'static str {
        match self {
            SkillLevel::Junior => "junior",
            SkillLevel::Mid => "mid",
            SkillLevel::Senior => "senior",
        }
    }

    /// senior: 3, mid: 2, junior: 1, unset: 0
    pub fn rank(level: Option<SkillLevel>) -> u8 {
        match level {
            Some(SkillLevel::Senior) => 3,
            Some(SkillLevel::Mid) => 2,
            Some(SkillLevel::Junior) => 1,
            None => 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub fn normalize(raw: Option<&str>) -> Self {
        match raw.map(|g| g.trim().to_lowercase()).as_deref() {
            Some("male") | Some("m") | Some("man") => Gender::Male,
            Some("female") | Some("f") | Some("woman") => Gender::Female,
            _ => Gender::Other,
        }
    }

    pub fn as_key(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Other => "other",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_key())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skill {
    pub name: String,
    pub level: Option<SkillLevel>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Employee {
    pub id: String,
    pub name: String,
    pub email: String,
    pub skills: Vec<Skill>,
    pub gender: Gender,
    /// Gender as entered, kept for display.
    pub raw_gender: Option<String>,
    pub department: Option<String>,
}

impl Employee {
    /// Build from a store record. `index` stands in for the id when the
    /// record carries none.
    pub fn from_record(record: &EmployeeRecord, index: usize) -> Self {
        let id = record
            .id
            .clone()
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| format!("employee-{}", index));

        Self {
            id,
            name: record.name.clone(),
            email: record.email.clone(),
            skills: record
                .skills
                .iter()
                .map(|s| Skill {
                    name: s.name.clone(),
                    level: s.level.as_deref().and_then(SkillLevel::parse),
                })
                .collect(),
            gender: Gender::normalize(record.gender.as_deref()),
            raw_gender: record.gender.clone(),
            department: record.department.clone(),
        }
    }

    /// Lower-cased, trimmed skill names.
    pub fn skill_names(&self) -> impl Iterator<Item = String> + '_ {
        self.skills.iter().map(|s| s.name.trim().to_lowercase())
    }

    /// Seniority level of each skill that declares one, in skill order.
    pub fn skill_levels(&self) -> impl Iterator<Item = SkillLevel> + '_ {
        self.skills.iter().filter_map(|s| s.level)
    }

    /// Comma-joined skill names padded with the generic vocabulary.
    pub fn skill_profile(&self, generic_vocabulary: &[String]) -> String {
        self.skills
            .iter()
            .map(|s| s.name.as_str())
            .chain(generic_vocabulary.iter().map(|s| s.as_str()))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleRequirement {
    pub role: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Order is significant: position i is assignment index i.
    pub roles: Vec<RoleRequirement>,
    pub constraints: String,
}

impl Project {
    pub fn from_record(id: &str, record: &ProjectRecord) -> Self {
        let roles = record
            .required_roles
            .iter()
            .filter(|r| !r.role.trim().is_empty())
            .map(|r| RoleRequirement {
                role: r.role.trim().to_string(),
                description: r.description.clone(),
            })
            .collect();

        Self {
            id: id.to_string(),
            name: record.name.clone(),
            description: record.description.clone(),
            roles,
            constraints: record.constraints.clone().unwrap_or_default(),
        }
    }

    pub fn role_labels(&self) -> Vec<String> {
        self.roles.iter().map(|r| r.role.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::store::{RoleRecord, SkillRecord};

    #[test]
    fn test_gender_normalization() {
        assert_eq!(Gender::normalize(Some(" Female ")), Gender::Female);
        assert_eq!(Gender::normalize(Some("M")), Gender::Male);
        assert_eq!(Gender::normalize(Some("non-binary")), Gender::Other);
        assert_eq!(Gender::normalize(None), Gender::Other);
    }

    #[test]
    fn test_level_rank() {
        assert_eq!(SkillLevel::rank(SkillLevel::parse("Senior")), 3);
        assert_eq!(SkillLevel::rank(SkillLevel::parse("mid")), 2);
        assert_eq!(SkillLevel::rank(SkillLevel::parse("junior")), 1);
        assert_eq!(SkillLevel::rank(SkillLevel::parse("")), 0);
        assert_eq!(SkillLevel::rank(SkillLevel::parse("principal")), 0);
    }

    #[test]
    fn test_employee_from_record() {
        let record = EmployeeRecord {
            id: None,
            name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
            skills: vec![
                SkillRecord { name: "Python".to_string(), level: Some("senior".to_string()) },
                SkillRecord { name: "Design".to_string(), level: None },
            ],
            gender: Some("female".to_string()),
            department: Some("Engineering".to_string()),
        };

        let employee = Employee::from_record(&record, 7);
        assert_eq!(employee.id, "employee-7");
        assert_eq!(employee.gender, Gender::Female);
        assert_eq!(employee.skill_names().collect::<Vec<_>>(), vec!["python", "design"]);
        assert_eq!(employee.skill_levels().collect::<Vec<_>>(), vec![SkillLevel::Senior]);

        let vocab = vec!["programming".to_string(), "software".to_string()];
        assert_eq!(employee.skill_profile(&vocab), "Python, Design, programming, software");
    }

    #[test]
    fn test_project_skips_blank_roles() {
        let record = ProjectRecord {
            name: "Apollo".to_string(),
            description: String::new(),
            required_roles: vec![
                RoleRecord { role: " Backend Engineer ".to_string(), description: None },
                RoleRecord { role: "  ".to_string(), description: None },
                RoleRecord { role: "Designer".to_string(), description: Some("UI".to_string()) },
            ],
            constraints: None,
        };

        let project = Project::from_record("p1", &record);
        assert_eq!(project.role_labels(), vec!["Backend Engineer", "Designer"]);
        assert_eq!(project.constraints, "");
    }
}
