//! Dashboard: class, subject and note navigation.

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

use super::{AuthenticatedUser, DatabaseService};
use crate::models::{
    generate_invite_code, normalize_invite_code, Class, ClassMember, MemberRole, Note, NoteId,
    Subject, User,
};
use crate::util::single_line;
use crate::Result;

/// Attempts at a fresh invite code before a collision is reported
pub const INVITE_CODE_ATTEMPTS: usize = 5;

/// What the dashboard is currently drilled into.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum ViewState {
    #[default]
    NoClassSelected,
    ClassSelected {
        class: Class,
    },
    SubjectSelected {
        class: Class,
        subject: Subject,
    },
}

impl ViewState {
    pub fn class(&self) -> Option<&Class> {
        match self {
            Self::NoClassSelected => None,
            Self::ClassSelected { class } | Self::SubjectSelected { class, .. } => Some(class),
        }
    }

    pub fn subject(&self) -> Option<&Subject> {
        match self {
            Self::SubjectSelected { subject, .. } => Some(subject),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Modal {
    CreateClass,
    JoinClass,
    AddSubject,
    CreateNote,
}

pub struct Dashboard {
    user: AuthenticatedUser,
    profile: Option<User>,
    pub classes: Vec<Class>,
    pub subjects: Vec<Subject>,
    pub notes: Vec<Note>,
    view: ViewState,
    modal: Option<Modal>,
    modal_error: Option<String>,
    rng: StdRng,
}

impl Dashboard {
    pub fn new(user: AuthenticatedUser) -> Self {
        Self::with_rng(user, StdRng::from_entropy())
    }

    /// Dashboard with a caller-supplied randomness source
    pub fn with_rng(user: AuthenticatedUser, rng: StdRng) -> Self {
        Self {
            user,
            profile: None,
            classes: Vec::new(),
            subjects: Vec::new(),
            notes: Vec::new(),
            view: ViewState::NoClassSelected,
            modal: None,
            modal_error: None,
            rng,
        }
    }

    pub const fn user(&self) -> &AuthenticatedUser {
        &self.user
    }

    pub const fn profile(&self) -> Option<&User> {
        self.profile.as_ref()
    }

    pub const fn view(&self) -> &ViewState {
        &self.view
    }

    pub const fn modal(&self) -> Option<Modal> {
        self.modal
    }

    pub fn modal_error(&self) -> Option<&str> {
        self.modal_error.as_deref()
    }

    /// Fetch the profile and the user's classes.
    pub async fn load(&mut self, db: &DatabaseService) -> Result<()> {
        self.profile = db.get_user(&self.user.user_id).await?;
        self.classes = db.list_classes_for_member(&self.user.user_id).await?;
        tracing::debug!(
            "Loaded {} classes for {}",
            self.classes.len(),
            self.user.user_id
        );
        Ok(())
    }

    /// Profile full name, falling back to the sign-in email.
    pub fn welcome_name(&self) -> &str {
        self.profile
            .as_ref()
            .map(|profile| profile.full_name.trim())
            .filter(|name| !name.is_empty())
            .unwrap_or(self.user.email.as_str())
    }

    pub async fn select_class(&mut self, db: &DatabaseService, class: Class) -> Result<()> {
        self.subjects = db.list_subjects(&class.id).await?;
        self.notes.clear();
        self.view = ViewState::ClassSelected { class };
        Ok(())
    }

    /// Drill into a subject of the selected class.
    pub async fn select_subject(&mut self, db: &DatabaseService, subject: Subject) -> Result<()> {
        let Some(class) = self.view.class().cloned() else {
            return Err(crate::Error::InvalidInput(
                "Select a class first".to_string(),
            ));
        };
        self.notes = db.list_notes(&subject.id).await?;
        self.view = ViewState::SubjectSelected { class, subject };
        Ok(())
    }

    /// Clear the innermost selection.
    pub fn back(&mut self) {
        self.view = match std::mem::take(&mut self.view) {
            ViewState::SubjectSelected { class, .. } => {
                self.notes.clear();
                ViewState::ClassSelected { class }
            }
            ViewState::ClassSelected { .. } | ViewState::NoClassSelected => {
                self.subjects.clear();
                self.notes.clear();
                ViewState::NoClassSelected
            }
        };
    }

    pub fn open_modal(&mut self, modal: Modal) {
        self.modal = Some(modal);
        self.modal_error = None;
    }

    pub fn close_modal(&mut self) {
        self.modal = None;
        self.modal_error = None;
    }

    /// Create a class with a fresh invite code; the creator becomes admin.
    pub async fn create_class(&mut self, db: &DatabaseService, name: &str) -> Option<Class> {
        let name = name.trim();
        if name.is_empty() {
            return self.fail("Please enter a class name");
        }

        for attempt in 1..=INVITE_CODE_ATTEMPTS {
            let code = generate_invite_code(&mut self.rng);
            let class = Class::new(name, code, self.user.user_id);
            match db.create_class(&class).await {
                Ok((class, _)) => {
                    self.classes.insert(0, class.clone());
                    self.close_modal();
                    return Some(class);
                }
                Err(error) if error.is_unique_violation() && attempt < INVITE_CODE_ATTEMPTS => {
                    tracing::warn!("Invite code {} already taken, retrying", class.invite_code);
                }
                Err(error) => return self.fail(&error.to_string()),
            }
        }
        None
    }

    /// Join a class by invite code as a plain member.
    pub async fn join_class(&mut self, db: &DatabaseService, code: &str) -> Option<Class> {
        if code.trim().is_empty() {
            return self.fail("Please enter an invite code");
        }
        let code = normalize_invite_code(code);

        let class = match db.find_class_by_invite_code(&code).await {
            Ok(Some(class)) => class,
            Ok(None) => return self.fail("Invalid invite code"),
            Err(error) => return self.fail(&error.to_string()),
        };

        match db.find_member(&class.id, &self.user.user_id).await {
            Ok(Some(_)) => return self.fail("You are already a member of this class"),
            Ok(None) => {}
            Err(error) => return self.fail(&error.to_string()),
        }

        let member = ClassMember::new(class.id, self.user.user_id, MemberRole::Member);
        match db.insert_member(&member).await {
            Ok(_) => {
                tracing::info!("{} joined class {}", self.user.user_id, class.id);
                self.classes.insert(0, class.clone());
                self.close_modal();
                Some(class)
            }
            Err(error) if error.is_unique_violation() => {
                self.fail("You are already a member of this class")
            }
            Err(error) => self.fail(&error.to_string()),
        }
    }

    /// Add a subject to the selected class with a random color and icon.
    pub async fn add_subject(&mut self, db: &DatabaseService, name: &str) -> Option<Subject> {
        let name = name.trim();
        let Some(class_id) = self.view.class().map(|class| class.id) else {
            return self.fail("Please enter a subject name");
        };
        if name.is_empty() {
            return self.fail("Please enter a subject name");
        }

        let subject = Subject::new(name, class_id, self.user.user_id, &mut self.rng);
        match db.insert_subject(&subject).await {
            Ok(subject) => {
                self.subjects.insert(0, subject.clone());
                self.close_modal();
                Some(subject)
            }
            Err(error) => self.fail(&error.to_string()),
        }
    }

    /// Create an empty public note in the selected subject.
    pub async fn create_note(&mut self, db: &DatabaseService, title: &str) -> Option<Note> {
        let title = title.trim();
        let Some(subject_id) = self.view.subject().map(|subject| subject.id) else {
            return self.fail("Please enter a note title");
        };
        if title.is_empty() {
            return self.fail("Please enter a note title");
        }

        let note = Note::new(title, subject_id, self.user.user_id);
        match db.insert_note(&note).await {
            Ok(note) => {
                self.notes.insert(0, note.clone());
                self.close_modal();
                Some(note)
            }
            Err(error) => self.fail(&error.to_string()),
        }
    }

    /// Id of a listed note, to hand to the note editor.
    pub fn open_note(&self, note_id: &NoteId) -> Option<NoteId> {
        self.notes
            .iter()
            .find(|note| &note.id == note_id)
            .map(|note| note.id)
    }

    fn fail<T>(&mut self, message: &str) -> Option<T> {
        self.modal_error = Some(single_line(message));
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{UserId, INVITE_CODE_LEN, SUBJECT_COLORS, SUBJECT_ICONS};
    use pretty_assertions::assert_eq;

    async fn signed_in(db: &DatabaseService, email: &str, name: &str) -> AuthenticatedUser {
        let user = User::new(UserId::new(), email, name, name);
        db.insert_user(&user).await.unwrap();
        AuthenticatedUser {
            user_id: user.id,
            email: email.to_string(),
            session: None,
        }
    }

    async fn dashboard(db: &DatabaseService, seed: u64) -> Dashboard {
        let user = signed_in(db, "owner@example.com", "owner").await;
        let mut dashboard = Dashboard::with_rng(user, StdRng::seed_from_u64(seed));
        dashboard.load(db).await.unwrap();
        dashboard
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn load_fetches_profile_and_falls_back_to_email() {
        let db = DatabaseService::open_in_memory().await.unwrap();
        let dash = dashboard(&db, 1).await;
        assert_eq!(dash.welcome_name(), "owner");

        let stranger = AuthenticatedUser {
            user_id: UserId::new(),
            email: "ghost@example.com".to_string(),
            session: None,
        };
        let mut missing = Dashboard::with_rng(stranger, StdRng::seed_from_u64(1));
        missing.load(&db).await.unwrap();
        assert_eq!(missing.welcome_name(), "ghost@example.com");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn create_class_generates_code_and_admin_membership() {
        let db = DatabaseService::open_in_memory().await.unwrap();
        let mut dash = dashboard(&db, 7).await;
        dash.open_modal(Modal::CreateClass);

        let class = dash.create_class(&db, "  Class 9A ").await.unwrap();
        assert_eq!(class.name, "Class 9A");
        assert_eq!(class.invite_code.len(), INVITE_CODE_LEN);
        assert!(class
            .invite_code
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
        assert_eq!(dash.classes[0].id, class.id);
        assert_eq!(dash.modal(), None);

        let member = db
            .find_member(&class.id, &dash.user().user_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(member.role, MemberRole::Admin);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn blank_class_name_is_rejected_in_modal() {
        let db = DatabaseService::open_in_memory().await.unwrap();
        let mut dash = dashboard(&db, 7).await;
        dash.open_modal(Modal::CreateClass);

        assert!(dash.create_class(&db, "   ").await.is_none());
        assert_eq!(dash.modal_error(), Some("Please enter a class name"));
        assert_eq!(dash.modal(), Some(Modal::CreateClass));
        assert!(dash.classes.is_empty());

        dash.close_modal();
        assert_eq!(dash.modal_error(), None);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn invite_code_collision_is_retried() {
        let db = DatabaseService::open_in_memory().await.unwrap();
        let mut first = dashboard(&db, 42).await;
        let taken = first.create_class(&db, "First").await.unwrap();

        // Same seed, same first code: the second dashboard must move past it.
        let other = signed_in(&db, "other@example.com", "other").await;
        let mut second = Dashboard::with_rng(other, StdRng::seed_from_u64(42));
        let class = second.create_class(&db, "Second").await.unwrap();

        assert_ne!(class.invite_code, taken.invite_code);
        assert_eq!(second.modal_error(), None);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn join_class_by_code_and_reject_repeat() {
        let db = DatabaseService::open_in_memory().await.unwrap();
        let mut owner = dashboard(&db, 3).await;
        let class = owner.create_class(&db, "Physics").await.unwrap();

        let student = signed_in(&db, "student@example.com", "student").await;
        let mut dash = Dashboard::with_rng(student, StdRng::seed_from_u64(4));
        dash.open_modal(Modal::JoinClass);

        let code = format!("  {}  ", class.invite_code.to_lowercase());
        let joined = dash.join_class(&db, &code).await.unwrap();
        assert_eq!(joined.id, class.id);
        assert_eq!(dash.classes.len(), 1);

        assert!(dash.join_class(&db, &class.invite_code).await.is_none());
        assert_eq!(
            dash.modal_error(),
            Some("You are already a member of this class")
        );
        assert_eq!(dash.classes.len(), 1);

        let member = db
            .find_member(&class.id, &dash.user().user_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(member.role, MemberRole::Member);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn join_class_error_messages() {
        let db = DatabaseService::open_in_memory().await.unwrap();
        let mut dash = dashboard(&db, 5).await;

        assert!(dash.join_class(&db, " ").await.is_none());
        assert_eq!(dash.modal_error(), Some("Please enter an invite code"));

        assert!(dash.join_class(&db, "NOPE42").await.is_none());
        assert_eq!(dash.modal_error(), Some("Invalid invite code"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn navigation_drills_down_and_back() {
        let db = DatabaseService::open_in_memory().await.unwrap();
        let mut dash = dashboard(&db, 9).await;
        let class = dash.create_class(&db, "History").await.unwrap();

        assert!(dash.add_subject(&db, "Rome").await.is_none());
        assert_eq!(dash.modal_error(), Some("Please enter a subject name"));

        dash.select_class(&db, class.clone()).await.unwrap();
        let older = dash.add_subject(&db, "Rome").await.unwrap();
        let newer = dash.add_subject(&db, "Greece").await.unwrap();
        assert!(SUBJECT_COLORS.contains(&newer.color.as_str()));
        assert!(SUBJECT_ICONS.contains(&newer.icon.as_str()));
        assert_eq!(dash.subjects[0].id, newer.id);

        assert!(dash.create_note(&db, "Caesar").await.is_none());
        assert_eq!(dash.modal_error(), Some("Please enter a note title"));

        dash.select_subject(&db, older.clone()).await.unwrap();
        assert_eq!(dash.view().subject().map(|s| s.id), Some(older.id));
        assert!(dash.create_note(&db, "   ").await.is_none());
        let note = dash.create_note(&db, "Caesar").await.unwrap();
        assert_eq!(note.content, "");
        assert!(note.is_public);
        assert_eq!(dash.open_note(&note.id), Some(note.id));

        dash.back();
        assert_eq!(
            dash.view(),
            &ViewState::ClassSelected {
                class: class.clone()
            }
        );
        assert!(dash.notes.is_empty());
        assert_eq!(dash.open_note(&note.id), None);

        dash.back();
        assert_eq!(dash.view(), &ViewState::NoClassSelected);
        assert!(dash.subjects.is_empty());

        // Reselecting refetches from the store, newest first.
        dash.select_class(&db, class).await.unwrap();
        let names: Vec<_> = dash.subjects.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names.len(), 2);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn select_subject_without_class_is_rejected() {
        let db = DatabaseService::open_in_memory().await.unwrap();
        let mut dash = dashboard(&db, 9).await;
        let class = dash.create_class(&db, "C").await.unwrap();
        dash.select_class(&db, class).await.unwrap();
        let subject = dash.add_subject(&db, "S").await.unwrap();
        dash.back();

        assert!(dash.select_subject(&db, subject).await.is_err());
        assert_eq!(dash.view(), &ViewState::NoClassSelected);
    }
}
