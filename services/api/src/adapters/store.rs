//! services/api/src/adapters/store.rs
//!
//! In-memory implementation of the `StorageService` port. This is the
//! injected backing store for the running service and for tests; a database
//! adapter can replace it behind the same trait without touching the core.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::RwLock;

use study_planner_core::domain::{
    Id, NewPdf, NewSchedule, NewSession, PdfDocument, PdfUpdate, ScheduleUpdate, StudySchedule,
    StudySession, User, UserStats,
};
use study_planner_core::ports::{PortError, PortResult, StorageService};
use study_planner_core::stats;

#[derive(Default)]
struct Tables {
    users: HashMap<Id, User>,
    schedules: HashMap<Id, StudySchedule>,
    sessions: HashMap<Id, StudySession>,
    pdfs: HashMap<Id, PdfDocument>,
}

/// Keyed in-memory collections with atomic per-collection id counters.
#[derive(Default)]
pub struct MemStore {
    tables: RwLock<Tables>,
    next_user_id: AtomicI64,
    next_schedule_id: AtomicI64,
    next_session_id: AtomicI64,
    next_pdf_id: AtomicI64,
}

impl MemStore {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
            next_user_id: AtomicI64::new(1),
            next_schedule_id: AtomicI64::new(1),
            next_session_id: AtomicI64::new(1),
            next_pdf_id: AtomicI64::new(1),
        }
    }

    fn lock_err<E: std::fmt::Display>(e: E) -> PortError {
        PortError::Unexpected(format!("store lock poisoned: {}", e))
    }
}

#[async_trait]
impl StorageService for MemStore {
    async fn get_user(&self, id: Id) -> PortResult<Option<User>> {
        let tables = self.tables.read().map_err(Self::lock_err)?;
        Ok(tables.users.get(&id).cloned())
    }

    async fn get_user_by_username(&self, username: &str) -> PortResult<Option<User>> {
        let tables = self.tables.read().map_err(Self::lock_err)?;
        Ok(tables
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn create_user(&self, username: &str, password: &str) -> PortResult<User> {
        let id = self.next_user_id.fetch_add(1, Ordering::SeqCst);
        let user = User {
            id,
            username: username.to_string(),
            password: password.to_string(),
        };
        let mut tables = self.tables.write().map_err(Self::lock_err)?;
        tables.users.insert(id, user.clone());
        Ok(user)
    }

    async fn schedules_by_user(&self, user_id: Id) -> PortResult<Vec<StudySchedule>> {
        let tables = self.tables.read().map_err(Self::lock_err)?;
        let mut schedules: Vec<StudySchedule> = tables
            .schedules
            .values()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect();
        schedules.sort_by_key(|s| s.id);
        Ok(schedules)
    }

    async fn get_schedule(&self, id: Id) -> PortResult<Option<StudySchedule>> {
        let tables = self.tables.read().map_err(Self::lock_err)?;
        Ok(tables.schedules.get(&id).cloned())
    }

    async fn create_schedule(
        &self,
        user_id: Id,
        schedule: NewSchedule,
    ) -> PortResult<StudySchedule> {
        let id = self.next_schedule_id.fetch_add(1, Ordering::SeqCst);
        let stored = StudySchedule {
            id,
            user_id,
            title: schedule.title,
            description: schedule.description,
            subjects: schedule.subjects,
            start_date: schedule.start_date,
            end_date: schedule.end_date,
            hours_per_day: schedule.hours_per_day,
            created_at: Utc::now(),
            exam_date: schedule.exam_date,
            edital_pdf_id: schedule.edital_pdf_id,
            weekly_plan: schedule.weekly_plan,
            is_ai_generated: schedule.is_ai_generated,
        };
        let mut tables = self.tables.write().map_err(Self::lock_err)?;
        tables.schedules.insert(id, stored.clone());
        Ok(stored)
    }

    async fn update_schedule(
        &self,
        id: Id,
        updates: ScheduleUpdate,
    ) -> PortResult<Option<StudySchedule>> {
        let mut tables = self.tables.write().map_err(Self::lock_err)?;
        let Some(schedule) = tables.schedules.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(title) = updates.title {
            schedule.title = title;
        }
        if let Some(description) = updates.description {
            schedule.description = Some(description);
        }
        if let Some(subjects) = updates.subjects {
            schedule.subjects = subjects;
        }
        if let Some(start_date) = updates.start_date {
            schedule.start_date = start_date;
        }
        if let Some(end_date) = updates.end_date {
            schedule.end_date = end_date;
        }
        if let Some(hours_per_day) = updates.hours_per_day {
            schedule.hours_per_day = hours_per_day;
        }
        if let Some(exam_date) = updates.exam_date {
            schedule.exam_date = Some(exam_date);
        }
        if let Some(weekly_plan) = updates.weekly_plan {
            schedule.weekly_plan = Some(weekly_plan);
        }
        Ok(Some(schedule.clone()))
    }

    async fn delete_schedule(&self, id: Id) -> PortResult<bool> {
        let mut tables = self.tables.write().map_err(Self::lock_err)?;
        let deleted = tables.schedules.remove(&id).is_some();
        if deleted {
            // Sessions are never cascade-deleted; their weak reference is
            // nulled out instead of left dangling.
            for session in tables.sessions.values_mut() {
                if session.schedule_id == Some(id) {
                    session.schedule_id = None;
                }
            }
        }
        Ok(deleted)
    }

    async fn sessions_by_user(&self, user_id: Id) -> PortResult<Vec<StudySession>> {
        let tables = self.tables.read().map_err(Self::lock_err)?;
        let mut sessions: Vec<StudySession> = tables
            .sessions
            .values()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect();
        sessions.sort_by_key(|s| s.id);
        Ok(sessions)
    }

    async fn recent_sessions(&self, user_id: Id, limit: usize) -> PortResult<Vec<StudySession>> {
        let mut sessions = self.sessions_by_user(user_id).await?;
        sessions.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
        sessions.truncate(limit);
        Ok(sessions)
    }

    async fn create_session(&self, user_id: Id, session: NewSession) -> PortResult<StudySession> {
        let id = self.next_session_id.fetch_add(1, Ordering::SeqCst);
        let stored = StudySession {
            id,
            user_id,
            schedule_id: session.schedule_id,
            subject: session.subject,
            duration: session.duration,
            completed_at: Utc::now(),
        };
        let mut tables = self.tables.write().map_err(Self::lock_err)?;
        tables.sessions.insert(id, stored.clone());
        Ok(stored)
    }

    async fn pdfs_by_user(&self, user_id: Id) -> PortResult<Vec<PdfDocument>> {
        let tables = self.tables.read().map_err(Self::lock_err)?;
        let mut pdfs: Vec<PdfDocument> = tables
            .pdfs
            .values()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect();
        pdfs.sort_by_key(|p| p.id);
        Ok(pdfs)
    }

    async fn get_pdf(&self, id: Id) -> PortResult<Option<PdfDocument>> {
        let tables = self.tables.read().map_err(Self::lock_err)?;
        Ok(tables.pdfs.get(&id).cloned())
    }

    async fn create_pdf(&self, user_id: Id, pdf: NewPdf) -> PortResult<PdfDocument> {
        let id = self.next_pdf_id.fetch_add(1, Ordering::SeqCst);
        let stored = PdfDocument {
            id,
            user_id,
            title: pdf.title,
            filename: pdf.filename,
            uploaded_at: Utc::now(),
            last_read_page: 1,
        };
        let mut tables = self.tables.write().map_err(Self::lock_err)?;
        tables.pdfs.insert(id, stored.clone());
        Ok(stored)
    }

    async fn update_pdf(&self, id: Id, updates: PdfUpdate) -> PortResult<Option<PdfDocument>> {
        let mut tables = self.tables.write().map_err(Self::lock_err)?;
        let Some(pdf) = tables.pdfs.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(title) = updates.title {
            pdf.title = title;
        }
        if let Some(filename) = updates.filename {
            pdf.filename = filename;
        }
        if let Some(last_read_page) = updates.last_read_page {
            pdf.last_read_page = last_read_page.max(1);
        }
        Ok(Some(pdf.clone()))
    }

    async fn delete_pdf(&self, id: Id) -> PortResult<bool> {
        let mut tables = self.tables.write().map_err(Self::lock_err)?;
        let deleted = tables.pdfs.remove(&id).is_some();
        if deleted {
            // Null out the weak reference on schedules generated from this
            // edital instead of leaving it dangling.
            for schedule in tables.schedules.values_mut() {
                if schedule.edital_pdf_id == Some(id) {
                    schedule.edital_pdf_id = None;
                }
            }
        }
        Ok(deleted)
    }

    async fn user_stats(&self, user_id: Id) -> PortResult<UserStats> {
        let sessions = self.sessions_by_user(user_id).await?;
        Ok(stats::compute_stats(&sessions, Utc::now().date_naive()))
    }
}
