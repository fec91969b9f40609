//! Subject model

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::id::{ClassId, SubjectId, UserId};

/// Colors a new subject may be assigned
pub const SUBJECT_COLORS: [&str; 7] = [
    "blue", "green", "purple", "pink", "yellow", "red", "indigo",
];

/// Icons a new subject may be assigned
pub const SUBJECT_ICONS: [&str; 7] = ["📚", "🔬", "🎨", "💻", "🌍", "📊", "🎵"];

/// A named topical bucket of notes within a class
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub id: SubjectId,
    pub name: String,
    pub description: Option<String>,
    pub class_id: ClassId,
    pub color: String,
    pub icon: String,
    pub created_by: Option<UserId>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Subject {
    /// Create a subject with a color and icon drawn from the fixed palettes.
    pub fn new<R: Rng + ?Sized>(
        name: &str,
        class_id: ClassId,
        created_by: UserId,
        rng: &mut R,
    ) -> Self {
        let (color, icon) = random_appearance(rng);
        let now = crate::util::now_millis();
        Self {
            id: SubjectId::new(),
            name: name.trim().to_string(),
            description: None,
            class_id,
            color: color.to_string(),
            icon: icon.to_string(),
            created_by: Some(created_by),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Uniformly pick a (color, icon) pair.
pub fn random_appearance<R: Rng + ?Sized>(rng: &mut R) -> (&'static str, &'static str) {
    let color = SUBJECT_COLORS.choose(rng).copied().unwrap_or(SUBJECT_COLORS[0]);
    let icon = SUBJECT_ICONS.choose(rng).copied().unwrap_or(SUBJECT_ICONS[0]);
    (color, icon)
}
