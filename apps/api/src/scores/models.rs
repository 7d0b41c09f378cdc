use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Per-item scores as produced by JD analysis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SkillEntry {
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub importance: f64,
    #[serde(default)]
    pub selection_score: f64,
    #[serde(default)]
    pub rejection_score: f64,
}

impl SkillEntry {
    pub fn get(&self, field: ScoreField) -> f64 {
        match field {
            ScoreField::Rating => self.rating,
            ScoreField::Importance => self.importance,
        }
    }

    pub fn set(&mut self, field: ScoreField, value: f64) {
        match field {
            ScoreField::Rating => self.rating = value,
            ScoreField::Importance => self.importance = value,
        }
    }
}

/// The two fields a directive is allowed to write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreField {
    Rating,
    Importance,
}

impl fmt::Display for ScoreField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoreField::Rating => f.write_str("rating"),
            ScoreField::Importance => f.write_str("importance"),
        }
    }
}

/// One of the three fixed partitions of a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Skills,
    Achievements,
    Activities,
}

impl Category {
    /// Order in which directive targets are looked up.
    pub const SEARCH_ORDER: [Category; 3] =
        [Category::Skills, Category::Achievements, Category::Activities];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Skills => "skills",
            Category::Achievements => "achievements",
            Category::Activities => "activities",
        }
    }
}

/// Scores for one role, partitioned by category.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoleRecord {
    #[serde(default)]
    pub skills: IndexMap<String, SkillEntry>,
    #[serde(default)]
    pub achievements: IndexMap<String, SkillEntry>,
    #[serde(default)]
    pub activities: IndexMap<String, SkillEntry>,
}

impl RoleRecord {
    pub fn category(&self, category: Category) -> &IndexMap<String, SkillEntry> {
        match category {
            Category::Skills => &self.skills,
            Category::Achievements => &self.achievements,
            Category::Activities => &self.activities,
        }
    }

    pub fn category_mut(&mut self, category: Category) -> &mut IndexMap<String, SkillEntry> {
        match category {
            Category::Skills => &mut self.skills,
            Category::Achievements => &mut self.achievements,
            Category::Activities => &mut self.activities,
        }
    }

    /// Finds `name` in the first category (in search order) that holds it.
    pub fn locate_mut(&mut self, name: &str) -> Option<(Category, &mut SkillEntry)> {
        for category in Category::SEARCH_ORDER {
            if self.category(category).contains_key(name) {
                return self.category_mut(category).get_mut(name).map(|e| (category, e));
            }
        }
        None
    }

    /// Iterates every entry with its category, in search order.
    pub fn entries(&self) -> impl Iterator<Item = (Category, &String, &SkillEntry)> + '_ {
        Category::SEARCH_ORDER.into_iter().flat_map(move |c| {
            self.category(c)
                .iter()
                .map(move |(name, entry)| (c, name, entry))
        })
    }
}

/// Role name -> role scores. Serialized as a bare JSON object keyed by role.
///
/// Roles and items keep the order they were inserted or deserialized in, so
/// "the first role" is the first key of the incoming object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScoreStore(pub IndexMap<String, RoleRecord>);

impl ScoreStore {
    pub fn first_role(&self) -> Option<&str> {
        self.0.keys().next().map(String::as_str)
    }

    pub fn role(&self, name: &str) -> Option<&RoleRecord> {
        self.0.get(name)
    }

    pub fn role_mut(&mut self, name: &str) -> Option<&mut RoleRecord> {
        self.0.get_mut(name)
    }

    pub fn insert_role(&mut self, name: impl Into<String>, record: RoleRecord) {
        self.0.insert(name.into(), record);
    }

    pub fn roles(&self) -> impl Iterator<Item = (&String, &RoleRecord)> + '_ {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
