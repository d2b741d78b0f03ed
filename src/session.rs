use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::journal::{Journal, SectionId};

pub const IDENTITY_FILE: &str = "current_user.json";

/// The authenticated principal. Only a teacher carries the set of sections
/// they are authorized to manage; a student identity has no such field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Identity {
    Teacher {
        id: String,
        name: String,
        email: String,
        sections: Vec<SectionId>,
    },
    Student {
        id: String,
        name: String,
        email: String,
    },
}

impl Identity {
    pub fn id(&self) -> &str {
        match self {
            Identity::Teacher { id, .. } | Identity::Student { id, .. } => id,
        }
    }

    pub fn role(&self) -> &'static str {
        match self {
            Identity::Teacher { .. } => "teacher",
            Identity::Student { .. } => "student",
        }
    }
}

/// Holds the current identity and mirrors it to a file under the profile
/// directory so a restarted instance comes back logged in.
#[derive(Debug)]
pub struct SessionStore {
    current: Option<Identity>,
    identity_path: PathBuf,
}

impl SessionStore {
    /// Opens the session for a profile directory, restoring any persisted
    /// identity verbatim. The restored record is not re-checked against the
    /// roster; only an explicit logout invalidates it.
    pub fn open(profile_dir: &Path) -> Self {
        let identity_path = profile_dir.join(IDENTITY_FILE);
        let current = match fs::read_to_string(&identity_path) {
            Ok(raw) => match serde_json::from_str::<Identity>(&raw) {
                Ok(identity) => {
                    log::info!("restored identity: {} ({})", identity.id(), identity.role());
                    Some(identity)
                }
                Err(e) => {
                    log::warn!("ignoring unreadable identity file: {e}");
                    None
                }
            },
            Err(_) => None,
        };
        Self {
            current,
            identity_path,
        }
    }

    pub fn current(&self) -> Option<&Identity> {
        self.current.as_ref()
    }

    /// Teachers are checked before students; the first exact email+password
    /// match becomes the current identity, overwriting any prior login. A
    /// failed attempt returns false and leaves the existing identity alone.
    pub fn login(&mut self, journal: &Journal, email: &str, password: &str) -> bool {
        if let Some(teacher) = journal
            .teachers
            .iter()
            .find(|t| t.email == email && t.password == password)
        {
            self.establish(Identity::Teacher {
                id: teacher.id.clone(),
                name: teacher.name.clone(),
                email: teacher.email.clone(),
                sections: teacher.sections.clone(),
            });
            return true;
        }

        if let Some(student) = journal.students.iter().find(|s| {
            s.email.as_deref() == Some(email) && s.password.as_deref() == Some(password)
        }) {
            self.establish(Identity::Student {
                id: student.id.clone(),
                name: student.name.clone(),
                email: student.email.clone().unwrap_or_default(),
            });
            return true;
        }

        false
    }

    /// Clears the identity slot and the durable copy. Safe to call when
    /// nobody is logged in.
    pub fn logout(&mut self) {
        if let Some(identity) = self.current.take() {
            log::info!("logout: {}", identity.id());
        }
        if let Err(e) = fs::remove_file(&self.identity_path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                log::warn!("failed to remove identity file: {e}");
            }
        }
    }

    fn establish(&mut self, identity: Identity) {
        match serde_json::to_string(&identity) {
            Ok(raw) => {
                // Persistence is best-effort; a failed write still logs in.
                if let Err(e) = fs::write(&self.identity_path, raw) {
                    log::warn!("failed to persist identity: {e}");
                }
            }
            Err(e) => log::warn!("failed to serialize identity: {e}"),
        }
        log::info!("login: {} ({})", identity.id(), identity.role());
        self.current = Some(identity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::default_journal;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_profile(prefix: &str) -> PathBuf {
        let p = std::env::temp_dir().join(format!(
            "{}-{}",
            prefix,
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .expect("clock")
                .as_nanos()
        ));
        fs::create_dir_all(&p).expect("create temp profile");
        p
    }

    #[test]
    fn login_persists_and_logout_erases() {
        let dir = temp_profile("studiod-session");
        let journal = default_journal();

        let mut session = SessionStore::open(&dir);
        assert!(session.current().is_none());
        assert!(session.login(&journal, "alex@example.com", "teacher123"));
        assert_eq!(session.current().map(Identity::id), Some("teacher1"));
        assert!(dir.join(IDENTITY_FILE).exists());

        // A fresh open restores the persisted identity as-is.
        let restored = SessionStore::open(&dir);
        assert_eq!(restored.current(), session.current());

        session.logout();
        assert!(session.current().is_none());
        assert!(!dir.join(IDENTITY_FILE).exists());
        session.logout(); // idempotent

        let after_logout = SessionStore::open(&dir);
        assert!(after_logout.current().is_none());
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn failed_login_keeps_prior_identity() {
        let dir = temp_profile("studiod-session");
        let journal = default_journal();

        let mut session = SessionStore::open(&dir);
        assert!(session.login(&journal, "anna@example.com", "student123"));
        let anna = session.current().cloned();
        assert!(matches!(anna, Some(Identity::Student { .. })));

        assert!(!session.login(&journal, "anna@example.com", "wrong"));
        assert_eq!(session.current().cloned(), anna);

        // A second successful login simply overwrites the slot.
        assert!(session.login(&journal, "elena@example.com", "teacher123"));
        assert_eq!(session.current().map(Identity::id), Some("teacher2"));
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn teachers_are_matched_before_students() {
        let dir = temp_profile("studiod-session");
        let mut journal = default_journal();
        journal.teachers[0].email = "dup@example.com".to_string();
        journal.teachers[0].password = "dup".to_string();
        journal.students[0].email = Some("dup@example.com".to_string());
        journal.students[0].password = Some("dup".to_string());

        let mut session = SessionStore::open(&dir);
        assert!(session.login(&journal, "dup@example.com", "dup"));
        assert!(matches!(
            session.current(),
            Some(Identity::Teacher { .. })
        ));
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn student_without_credentials_never_matches() {
        let dir = temp_profile("studiod-session");
        let mut journal = default_journal();
        journal.students[0].email = None;
        journal.students[0].password = None;

        let mut session = SessionStore::open(&dir);
        assert!(!session.login(&journal, "anna@example.com", "student123"));
        assert!(!session.login(&journal, "", ""));
        assert!(session.current().is_none());
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn corrupt_identity_file_is_ignored() {
        let dir = temp_profile("studiod-session");
        fs::write(dir.join(IDENTITY_FILE), "{not json").expect("write");
        let session = SessionStore::open(&dir);
        assert!(session.current().is_none());
        let _ = fs::remove_dir_all(dir);
    }
}
