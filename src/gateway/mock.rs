//! In-memory gateway for action tests: behaves like the real backend
//! (owner-scoped rows, upsert-one-reminder-per-prayer, reminder cascade on
//! prayer delete) and can be told to reject the next call of a given
//! operation. It also records fetch traffic so tests can assert when the
//! network was — and was not — touched.

use std::cell::RefCell;
use std::collections::HashSet;

use crate::gateway::{Gateway, GatewayError};
use crate::models::{
    Journal, JournalPatch, NewJournal, NewPrayer, Prayer, PrayerPatch, Profile, ProfilePatch,
    Reminder, ReminderSchedule, ReminderWithPrayer, Tag,
};
use crate::store::Entity;

const OWNER: &str = "u1";
const STAMP: &str = "2025-06-01T00:00:00Z";

#[derive(Default)]
struct ServerState {
    prayers: Vec<Prayer>,
    reminders: Vec<Reminder>,
    journals: Vec<Journal>,
    profile: Option<Profile>,
    tags: Vec<Tag>,
    next_id: u32,
}

#[derive(Default)]
pub struct MockGateway {
    state: RefCell<ServerState>,
    failures: RefCell<HashSet<&'static str>>,
    prayer_fetches: RefCell<Vec<Option<String>>>,
    reminder_fetches: RefCell<u32>,
    set_reminder_calls: RefCell<u32>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next call of the named operation fail.
    pub fn fail_next(&self, op: &'static str) {
        self.failures.borrow_mut().insert(op);
    }

    fn trip(&self, op: &'static str) -> Result<(), GatewayError> {
        if self.failures.borrow_mut().remove(op) {
            Err(GatewayError::Rejected {
                status: 500,
                message: format!("injected failure: {}", op),
            })
        } else {
            Ok(())
        }
    }

    fn make_id(&self, prefix: &str) -> String {
        let mut state = self.state.borrow_mut();
        state.next_id += 1;
        format!("{}{}", prefix, state.next_id)
    }

    fn default_reminder(&self, prayer_id: &str) -> Reminder {
        Reminder {
            id: self.make_id("r"),
            user_id: OWNER.to_string(),
            prayer_id: prayer_id.to_string(),
            kind: None,
            day_of_week: None,
            time: None,
            enabled: false,
            created_at: STAMP.to_string(),
            updated_at: STAMP.to_string(),
        }
    }

    // ── seeding / inspection ────────────────────────────────────────────

    pub fn seed_prayer(&self, title: &str) -> Prayer {
        let prayer = Prayer {
            id: self.make_id("p"),
            user_id: OWNER.to_string(),
            title: title.to_string(),
            description: None,
            answered: false,
            tag_id: None,
            created_at: STAMP.to_string(),
            updated_at: STAMP.to_string(),
        };
        let reminder = self.default_reminder(&prayer.id);
        let mut state = self.state.borrow_mut();
        state.prayers.insert(0, prayer.clone());
        state.reminders.insert(0, reminder);
        prayer
    }

    pub fn seed_tagged_prayers(&self, count: usize, tag_id: &str) {
        for n in 0..count {
            let mut prayer = self.seed_prayer(&format!("prayer {}", n));
            prayer.tag_id = Some(tag_id.to_string());
            let mut state = self.state.borrow_mut();
            let id = prayer.id.clone();
            if let Some(slot) = state.prayers.iter_mut().find(|p| p.id == id) {
                *slot = prayer;
            }
        }
    }

    pub fn seed_profile(&self, full_name: &str) -> Profile {
        let profile = Profile {
            id: self.make_id("pr"),
            user_id: OWNER.to_string(),
            full_name: Some(full_name.to_string()),
            email: Some("owner@example.com".to_string()),
            avatar_url: None,
            created_at: STAMP.to_string(),
            updated_at: STAMP.to_string(),
        };
        self.state.borrow_mut().profile = Some(profile.clone());
        profile
    }

    pub fn server_prayers(&self) -> Vec<Prayer> {
        self.state.borrow().prayers.clone()
    }

    pub fn reminder_count_for(&self, prayer_id: &str) -> usize {
        self.state
            .borrow()
            .reminders
            .iter()
            .filter(|r| r.prayer_id == prayer_id)
            .count()
    }

    /// Tag arguments of every `fetch_prayers` call so far.
    pub fn prayer_fetches(&self) -> Vec<Option<String>> {
        self.prayer_fetches.borrow().clone()
    }

    pub fn reminder_fetches(&self) -> u32 {
        *self.reminder_fetches.borrow()
    }

    pub fn set_reminder_calls(&self) -> u32 {
        *self.set_reminder_calls.borrow()
    }
}

impl Gateway for MockGateway {
    fn fetch_prayers(&self, tag: Option<&str>) -> Result<Vec<Prayer>, GatewayError> {
        self.prayer_fetches
            .borrow_mut()
            .push(tag.map(|t| t.to_string()));
        self.trip("fetch_prayers")?;
        let state = self.state.borrow();
        Ok(state
            .prayers
            .iter()
            .filter(|p| tag.is_none_or(|t| p.tag_id.as_deref() == Some(t)))
            .cloned()
            .collect())
    }

    fn create_prayer(&self, new: &NewPrayer) -> Result<Prayer, GatewayError> {
        self.trip("create_prayer")?;
        let prayer = Prayer {
            id: self.make_id("p"),
            user_id: OWNER.to_string(),
            title: new.title.clone(),
            description: new.description.clone(),
            answered: new.answered,
            tag_id: new.tag_id.clone(),
            created_at: STAMP.to_string(),
            updated_at: STAMP.to_string(),
        };
        // The backend seeds a blank reminder row alongside each prayer so it
        // shows up on the reminders screen.
        let reminder = self.default_reminder(&prayer.id);
        let mut state = self.state.borrow_mut();
        state.prayers.insert(0, prayer.clone());
        state.reminders.insert(0, reminder);
        Ok(prayer)
    }

    fn update_prayer(&self, id: &str, patch: &PrayerPatch) -> Result<Prayer, GatewayError> {
        self.trip("update_prayer")?;
        let mut state = self.state.borrow_mut();
        let prayer = state
            .prayers
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(GatewayError::EmptyReply)?;
        prayer.apply(patch);
        Ok(prayer.clone())
    }

    fn delete_prayer(&self, id: &str) -> Result<(), GatewayError> {
        self.trip("delete_prayer")?;
        let mut state = self.state.borrow_mut();
        state.prayers.retain(|p| p.id != id);
        // reminder rows cascade with their prayer
        state.reminders.retain(|r| r.prayer_id != id);
        Ok(())
    }

    fn fetch_journals(&self) -> Result<Vec<Journal>, GatewayError> {
        self.trip("fetch_journals")?;
        Ok(self.state.borrow().journals.clone())
    }

    fn create_journal(&self, new: &NewJournal) -> Result<Journal, GatewayError> {
        self.trip("create_journal")?;
        let journal = Journal {
            id: self.make_id("j"),
            user_id: OWNER.to_string(),
            content: new.content.clone(),
            date: new.date.clone(),
            linked_prayer_id: new.linked_prayer_id.clone(),
            created_at: STAMP.to_string(),
            updated_at: STAMP.to_string(),
        };
        self.state.borrow_mut().journals.insert(0, journal.clone());
        Ok(journal)
    }

    fn update_journal(&self, id: &str, patch: &JournalPatch) -> Result<Journal, GatewayError> {
        self.trip("update_journal")?;
        let mut state = self.state.borrow_mut();
        let journal = state
            .journals
            .iter_mut()
            .find(|j| j.id == id)
            .ok_or(GatewayError::EmptyReply)?;
        journal.apply(patch);
        Ok(journal.clone())
    }

    fn delete_journal(&self, id: &str) -> Result<(), GatewayError> {
        self.trip("delete_journal")?;
        self.state.borrow_mut().journals.retain(|j| j.id != id);
        Ok(())
    }

    fn fetch_reminders(&self) -> Result<Vec<ReminderWithPrayer>, GatewayError> {
        *self.reminder_fetches.borrow_mut() += 1;
        self.trip("fetch_reminders")?;
        let state = self.state.borrow();
        Ok(state
            .reminders
            .iter()
            .filter_map(|reminder| {
                let prayer = state.prayers.iter().find(|p| p.id == reminder.prayer_id)?;
                Some(ReminderWithPrayer {
                    reminder: reminder.clone(),
                    prayer: prayer.clone(),
                })
            })
            .collect())
    }

    fn set_reminder(&self, schedule: &ReminderSchedule) -> Result<Reminder, GatewayError> {
        *self.set_reminder_calls.borrow_mut() += 1;
        self.trip("set_reminder")?;
        let mut state = self.state.borrow_mut();
        if let Some(reminder) = state
            .reminders
            .iter_mut()
            .find(|r| r.prayer_id == schedule.prayer_id)
        {
            reminder.kind = schedule.schedule.kind;
            reminder.time = schedule.schedule.time.clone();
            reminder.day_of_week = schedule.schedule.day_of_week;
            reminder.enabled = schedule.schedule.enabled;
            return Ok(reminder.clone());
        }
        drop(state);
        let mut reminder = self.default_reminder(&schedule.prayer_id);
        reminder.kind = schedule.schedule.kind;
        reminder.time = schedule.schedule.time.clone();
        reminder.day_of_week = schedule.schedule.day_of_week;
        reminder.enabled = schedule.schedule.enabled;
        self.state.borrow_mut().reminders.insert(0, reminder.clone());
        Ok(reminder)
    }

    fn fetch_profile(&self) -> Result<Profile, GatewayError> {
        self.trip("fetch_profile")?;
        self.state
            .borrow()
            .profile
            .clone()
            .ok_or(GatewayError::EmptyReply)
    }

    fn update_profile(&self, patch: &ProfilePatch) -> Result<Profile, GatewayError> {
        self.trip("update_profile")?;
        let mut state = self.state.borrow_mut();
        let profile = state.profile.as_mut().ok_or(GatewayError::EmptyReply)?;
        profile.apply(patch);
        Ok(profile.clone())
    }

    fn fetch_tags(&self) -> Result<Vec<Tag>, GatewayError> {
        self.trip("fetch_tags")?;
        Ok(self.state.borrow().tags.clone())
    }
}
