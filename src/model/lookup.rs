use serde::{Deserialize, Serialize};

use super::task::{DeveloperId, ProjectId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    #[serde(rename = "projectID")]
    pub id: ProjectId,
    #[serde(rename = "projectName")]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Developer {
    #[serde(rename = "developerID")]
    pub id: DeveloperId,
    #[serde(rename = "firstName", default)]
    pub first_name: String,
    #[serde(rename = "lastName", default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
}

impl Developer {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}
