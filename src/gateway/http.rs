use anyhow::{Context, Result};
use log::{debug, warn};
use reqwest::blocking::{Client, Response};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::config::ServerConfig;
use crate::gateway::{Gateway, GatewayError};
use crate::models::{
    Journal, JournalPatch, NewJournal, NewPrayer, Prayer, PrayerPatch, Profile, ProfilePatch,
    Reminder, ReminderSchedule, ReminderWithPrayer, Tag,
};

const REPRESENTATION: &str = "return=representation";

/// PostgREST-style client for the hosted backend. All requests carry the
/// configured api key and bearer token; row-level authorization is the
/// backend's concern, but queries are still scoped to the owner id so a
/// misconfigured backend fails closed.
pub struct HttpGateway {
    client: Client,
    base_url: String,
    user_id: String,
}

impl HttpGateway {
    pub fn new(config: &ServerConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "apikey",
            HeaderValue::from_str(&config.api_key).context("Invalid api key")?,
        );
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", config.access_token))
                .context("Invalid access token")?,
        );
        let client = Client::builder()
            .default_headers(headers)
            .build()
            .context("Building HTTP client")?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            user_id: config.user_id.clone(),
        })
    }

    fn url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn owner_eq(&self) -> String {
        format!("eq.{}", self.user_id)
    }

    /// Attach the owner id to an insert body.
    fn owned(&self, body: Value) -> Value {
        let mut map = match body {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        map.insert("user_id".to_string(), Value::String(self.user_id.clone()));
        Value::Object(map)
    }

    fn check(response: Response) -> Result<Response, GatewayError> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let message = response.text().unwrap_or_default();
            Err(GatewayError::Rejected {
                status: status.as_u16(),
                message,
            })
        }
    }

    fn rows<T: DeserializeOwned>(response: Response) -> Result<Vec<T>, GatewayError> {
        Ok(Self::check(response)?.json::<Vec<T>>()?)
    }

    /// PostgREST answers inserts/updates with a one-element array under
    /// `Prefer: return=representation`; an empty array means the write
    /// silently matched nothing.
    fn single<T: DeserializeOwned>(response: Response) -> Result<T, GatewayError> {
        Self::rows::<T>(response)?
            .into_iter()
            .next()
            .ok_or(GatewayError::EmptyReply)
    }
}

impl Gateway for HttpGateway {
    fn fetch_prayers(&self, tag: Option<&str>) -> Result<Vec<Prayer>, GatewayError> {
        debug!("fetching prayers (tag filter: {:?})", tag);
        let mut request = self.client.get(self.url("prayers")).query(&[
            ("select", "*"),
            ("user_id", self.owner_eq().as_str()),
            ("order", "created_at.desc"),
        ]);
        if let Some(tag) = tag {
            request = request.query(&[("tag_id", format!("eq.{}", tag))]);
        }
        Self::rows(request.send()?)
    }

    fn create_prayer(&self, new: &NewPrayer) -> Result<Prayer, GatewayError> {
        debug!("creating prayer '{}'", new.title);
        let body = self.owned(serde_json::to_value(new)?);
        let response = self
            .client
            .post(self.url("prayers"))
            .header("Prefer", REPRESENTATION)
            .json(&body)
            .send()?;
        let prayer: Prayer = Self::single(response)?;

        // Seed a blank reminder row so the prayer shows up on the reminders
        // screen. Best effort: the prayer itself is already committed.
        let reminder_body = self.owned(serde_json::json!({
            "prayer_id": prayer.id,
            "type": Value::Null,
            "time": Value::Null,
            "enabled": false,
        }));
        let seeded = self
            .client
            .post(self.url("reminders"))
            .json(&reminder_body)
            .send()
            .map(|response| response.status().is_success());
        if !matches!(seeded, Ok(true)) {
            warn!("could not seed default reminder for prayer {}", prayer.id);
        }

        Ok(prayer)
    }

    fn update_prayer(&self, id: &str, patch: &PrayerPatch) -> Result<Prayer, GatewayError> {
        debug!("updating prayer {}", id);
        let response = self
            .client
            .patch(self.url("prayers"))
            .query(&[
                ("id", format!("eq.{}", id)),
                ("user_id", self.owner_eq()),
            ])
            .header("Prefer", REPRESENTATION)
            .json(patch)
            .send()?;
        Self::single(response)
    }

    fn delete_prayer(&self, id: &str) -> Result<(), GatewayError> {
        debug!("deleting prayer {}", id);
        let response = self
            .client
            .delete(self.url("prayers"))
            .query(&[
                ("id", format!("eq.{}", id)),
                ("user_id", self.owner_eq()),
            ])
            .send()?;
        Self::check(response)?;
        Ok(())
    }

    fn fetch_journals(&self) -> Result<Vec<Journal>, GatewayError> {
        debug!("fetching journals");
        let response = self
            .client
            .get(self.url("journals"))
            .query(&[
                ("select", "*"),
                ("user_id", self.owner_eq().as_str()),
                ("order", "created_at.desc"),
            ])
            .send()?;
        Self::rows(response)
    }

    fn create_journal(&self, new: &NewJournal) -> Result<Journal, GatewayError> {
        debug!("creating journal entry for {}", new.date);
        let body = self.owned(serde_json::to_value(new)?);
        let response = self
            .client
            .post(self.url("journals"))
            .header("Prefer", REPRESENTATION)
            .json(&body)
            .send()?;
        Self::single(response)
    }

    fn update_journal(&self, id: &str, patch: &JournalPatch) -> Result<Journal, GatewayError> {
        debug!("updating journal {}", id);
        let response = self
            .client
            .patch(self.url("journals"))
            .query(&[
                ("id", format!("eq.{}", id)),
                ("user_id", self.owner_eq()),
            ])
            .header("Prefer", REPRESENTATION)
            .json(patch)
            .send()?;
        Self::single(response)
    }

    fn delete_journal(&self, id: &str) -> Result<(), GatewayError> {
        debug!("deleting journal {}", id);
        let response = self
            .client
            .delete(self.url("journals"))
            .query(&[
                ("id", format!("eq.{}", id)),
                ("user_id", self.owner_eq()),
            ])
            .send()?;
        Self::check(response)?;
        Ok(())
    }

    fn fetch_reminders(&self) -> Result<Vec<ReminderWithPrayer>, GatewayError> {
        debug!("fetching reminders with embedded prayers");
        let response = self
            .client
            .get(self.url("reminders"))
            .query(&[
                ("select", "*,prayer:prayers(*)"),
                ("user_id", self.owner_eq().as_str()),
                ("order", "created_at.desc"),
            ])
            .send()?;
        Self::rows(response)
    }

    fn set_reminder(&self, schedule: &ReminderSchedule) -> Result<Reminder, GatewayError> {
        debug!("setting reminder for prayer {}", schedule.prayer_id);

        let mut body = Map::new();
        body.insert(
            "type".to_string(),
            serde_json::to_value(schedule.schedule.kind)?,
        );
        body.insert(
            "time".to_string(),
            serde_json::to_value(&schedule.schedule.time)?,
        );
        body.insert(
            "day_of_week".to_string(),
            serde_json::to_value(schedule.schedule.day_of_week)?,
        );
        body.insert(
            "enabled".to_string(),
            Value::Bool(schedule.schedule.enabled),
        );

        // One reminder per prayer: probe for an existing row, then update
        // it or insert a fresh one.
        #[derive(Deserialize)]
        struct IdRow {
            id: String,
        }
        let existing: Vec<IdRow> = Self::rows(
            self.client
                .get(self.url("reminders"))
                .query(&[
                    ("select", "id"),
                    ("prayer_id", format!("eq.{}", schedule.prayer_id).as_str()),
                    ("user_id", self.owner_eq().as_str()),
                ])
                .send()?,
        )?;

        let response = match existing.first() {
            Some(row) => self
                .client
                .patch(self.url("reminders"))
                .query(&[
                    ("id", format!("eq.{}", row.id)),
                    ("user_id", self.owner_eq()),
                ])
                .header("Prefer", REPRESENTATION)
                .json(&Value::Object(body))
                .send()?,
            None => {
                body.insert(
                    "prayer_id".to_string(),
                    Value::String(schedule.prayer_id.clone()),
                );
                self.client
                    .post(self.url("reminders"))
                    .header("Prefer", REPRESENTATION)
                    .json(&self.owned(Value::Object(body)))
                    .send()?
            }
        };
        Self::single(response)
    }

    fn fetch_profile(&self) -> Result<Profile, GatewayError> {
        debug!("fetching profile");
        let response = self
            .client
            .get(self.url("profiles"))
            .query(&[("select", "*"), ("user_id", self.owner_eq().as_str())])
            .send()?;
        Self::single(response)
    }

    fn update_profile(&self, patch: &ProfilePatch) -> Result<Profile, GatewayError> {
        debug!("updating profile");
        let body = self.owned(serde_json::to_value(patch)?);
        let response = self
            .client
            .post(self.url("profiles"))
            .query(&[("on_conflict", "user_id")])
            .header("Prefer", "resolution=merge-duplicates,return=representation")
            .json(&body)
            .send()?;
        Self::single(response)
    }

    fn fetch_tags(&self) -> Result<Vec<Tag>, GatewayError> {
        debug!("fetching tags");
        let response = self
            .client
            .get(self.url("tags"))
            .query(&[("select", "*"), ("order", "display_order.asc")])
            .send()?;
        Self::rows(response)
    }
}
