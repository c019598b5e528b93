use anyhow::{Result, anyhow, bail};
use chrono::Local;
use std::str::FromStr;

use crate::actions;
use crate::actions::prayers::TagFilter;
use crate::cli::args::{JournalCommands, PrayerCommands, ProfileCommands, RemindCommands};
use crate::config::{AppConfig, ServerConfig};
use crate::gateway::Gateway;
use crate::models::{
    DayOfWeek, Journal, JournalPatch, NewJournal, NewPrayer, Prayer, PrayerPatch, ProfilePatch,
    ReminderKind, ReminderWithPrayer, Schedule, Tag,
};
use crate::store::{Entity, EntityStore, LoadState};
use crate::utils::format::{format_schedule, parse_time, short_id};

// ─── ANSI helpers ────────────────────────────────────────────────────────────

macro_rules! println_colored {
    ($color:expr, $($arg:tt)*) => {{
        print!("{}", $color);
        print!($($arg)*);
        println!("\x1b[0m");
    }};
}

const GREEN: &str = "\x1b[32m";
const AMBER: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const DIM: &str = "\x1b[2m";
const GOLD: &str = "\x1b[38;2;196;160;68m";

// ─── Store plumbing ──────────────────────────────────────────────────────────

/// Surface a fetch failure as a retryable CLI error. Mutation failures come
/// back through `ActionError`; fetch failures live in store state.
fn ensure_loaded<T: Entity>(store: &EntityStore<T>, what: &str) -> Result<()> {
    if let LoadState::Failed(message) = store.state() {
        bail!("Could not fetch {}: {} — try again", what, message);
    }
    Ok(())
}

fn load_prayers(gateway: &dyn Gateway) -> Result<(EntityStore<Prayer>, TagFilter)> {
    let mut prayers = EntityStore::new();
    let mut filter = TagFilter::new();
    actions::prayers::load(gateway, &mut prayers, &mut filter);
    ensure_loaded(&prayers, "prayers")?;
    Ok((prayers, filter))
}

fn load_reminders(gateway: &dyn Gateway) -> Result<EntityStore<ReminderWithPrayer>> {
    let mut reminders = EntityStore::new();
    actions::reminders::load(gateway, &mut reminders);
    ensure_loaded(&reminders, "reminders")?;
    Ok(reminders)
}

fn load_journals(gateway: &dyn Gateway) -> Result<EntityStore<Journal>> {
    let mut journals = EntityStore::new();
    actions::journal::load(gateway, &mut journals);
    ensure_loaded(&journals, "journal entries")?;
    Ok(journals)
}

/// Resolve a (possibly abbreviated) id against a loaded store.
fn resolve_id<T: Entity>(store: &EntityStore<T>, needle: &str, what: &str) -> Result<String> {
    let matches: Vec<&str> = store
        .items()
        .iter()
        .map(|item| item.id())
        .filter(|id| id.starts_with(needle))
        .collect();
    match matches.as_slice() {
        [] => bail!("No {} found matching id '{}'", what, needle),
        [only] => Ok((*only).to_string()),
        many => bail!(
            "Id '{}' is ambiguous: {} {}s match — give more characters",
            needle,
            many.len(),
            what
        ),
    }
}

fn find_tag<'a>(tags: &'a [Tag], name: &str) -> Result<&'a Tag> {
    tags.iter()
        .find(|t| t.name.eq_ignore_ascii_case(name))
        .ok_or_else(|| anyhow!("Unknown tag '{}'. See `munajat tags`", name))
}

fn parse_schedule(freq: &str, at: &str, on: Option<&str>) -> Result<Schedule> {
    let kind = ReminderKind::from_str(freq)?;
    let time = parse_time(at)?;
    let day_of_week = on.map(DayOfWeek::from_str).transpose()?;
    Ok(Schedule {
        kind: Some(kind),
        time: Some(time.format("%H:%M").to_string()),
        day_of_week,
        enabled: true,
    })
}

// ─── Init ────────────────────────────────────────────────────────────────────

pub fn handle_init(url: String, api_key: String, token: String, user: String) -> Result<()> {
    let config = AppConfig {
        server: ServerConfig {
            base_url: url,
            api_key,
            access_token: token,
            user_id: user,
        },
    };
    config.save()?;
    println_colored!(GREEN, "  ✓ Backend configured");
    Ok(())
}

// ─── Prayers ─────────────────────────────────────────────────────────────────

pub fn handle_prayer(gateway: &dyn Gateway, action: &PrayerCommands) -> Result<()> {
    match action {
        PrayerCommands::Add {
            title,
            description,
            tag,
            remind,
            at,
            on,
        } => {
            let tag_id = match tag {
                Some(name) => {
                    let tags = gateway.fetch_tags()?;
                    Some(find_tag(&tags, name)?.id.clone())
                }
                None => None,
            };
            let schedule = remind
                .as_deref()
                .map(|freq| parse_schedule(freq, at.as_deref().unwrap_or("09:00"), on.as_deref()))
                .transpose()?;

            let (mut prayers, _) = load_prayers(gateway)?;
            let mut reminders = load_reminders(gateway)?;
            let new = NewPrayer {
                title: title.clone(),
                description: description.clone(),
                answered: false,
                tag_id,
            };
            let prayer =
                actions::prayers::create(gateway, &mut prayers, &mut reminders, new, schedule)?;
            println_colored!(
                GREEN,
                "  ✓ Prayer added: {} ({})",
                prayer.title,
                short_id(&prayer.id)
            );
            if let Some(entry) = reminders.items().iter().find(|r| r.prayer.id == prayer.id) {
                println_colored!(DIM, "    reminder: {}", format_schedule(&entry.reminder));
            }
        }

        PrayerCommands::List {
            answered,
            unanswered,
            tag,
            search,
        } => {
            let (mut prayers, mut filter) = load_prayers(gateway)?;
            let tags = gateway.fetch_tags()?;
            if let Some(name) = tag {
                let tag_id = find_tag(&tags, name)?.id.clone();
                actions::prayers::select_tag(gateway, &mut prayers, &mut filter, Some(tag_id));
                ensure_loaded(&prayers, "prayers")?;
            }

            let query = search.as_deref().unwrap_or("").to_lowercase();
            let visible: Vec<&Prayer> = actions::prayers::visible(&prayers, &filter)
                .into_iter()
                .filter(|p| match (answered, unanswered) {
                    (true, _) => p.answered,
                    (_, true) => !p.answered,
                    _ => true,
                })
                .filter(|p| query.is_empty() || p.title.to_lowercase().contains(&query))
                .collect();

            println!();
            if visible.is_empty() {
                println_colored!(DIM, "  No prayers found");
            } else {
                println_colored!(GOLD, "  Prayers ({})", visible.len());
                println!();
                for prayer in visible {
                    let mark = if prayer.answered {
                        format!("{}✓\x1b[0m", GREEN)
                    } else {
                        "○".to_string()
                    };
                    let tag_name = prayer
                        .tag_id
                        .as_deref()
                        .and_then(|id| tags.iter().find(|t| t.id == id))
                        .map(|t| format!("  [{}]", t.name))
                        .unwrap_or_default();
                    println!(
                        "  {} {:<40}{}  \x1b[2m{}\x1b[0m",
                        mark,
                        prayer.title,
                        tag_name,
                        short_id(&prayer.id)
                    );
                }
            }
            println!();
        }

        PrayerCommands::Answer { id, undo } => {
            let (mut prayers, _) = load_prayers(gateway)?;
            let mut reminders = load_reminders(gateway)?;
            let id = resolve_id(&prayers, id, "prayer")?;
            let patch = PrayerPatch::answered(!*undo);
            let prayer =
                actions::prayers::update(gateway, &mut prayers, &mut reminders, &id, &patch)?;
            if *undo {
                println_colored!(AMBER, "  ○ {} marked unanswered", prayer.title);
            } else {
                println_colored!(GREEN, "  ✓ {} marked answered", prayer.title);
            }
        }

        PrayerCommands::Edit {
            id,
            title,
            description,
            tag,
            no_tag,
        } => {
            let tag_id = match (tag, no_tag) {
                (Some(name), _) => {
                    let tags = gateway.fetch_tags()?;
                    Some(Some(find_tag(&tags, name)?.id.clone()))
                }
                (None, true) => Some(None),
                (None, false) => None,
            };
            let patch = PrayerPatch {
                title: title.clone(),
                description: description.clone(),
                answered: None,
                tag_id,
            };
            if patch.is_empty() {
                bail!("Nothing to change — pass at least one of --title/--description/--tag");
            }
            let (mut prayers, _) = load_prayers(gateway)?;
            let mut reminders = load_reminders(gateway)?;
            let id = resolve_id(&prayers, id, "prayer")?;
            let prayer =
                actions::prayers::update(gateway, &mut prayers, &mut reminders, &id, &patch)?;
            println_colored!(GREEN, "  ✓ Updated {}", prayer.title);
        }

        PrayerCommands::Delete { id } => {
            let (mut prayers, _) = load_prayers(gateway)?;
            let mut reminders = load_reminders(gateway)?;
            let id = resolve_id(&prayers, id, "prayer")?;
            let title = prayers
                .get(&id)
                .map(|p| p.title.clone())
                .unwrap_or_default();
            actions::prayers::delete(gateway, &mut prayers, &mut reminders, &id)?;
            println_colored!(RED, "  ✗ Deleted {}", title);
        }
    }
    Ok(())
}

// ─── Journal ─────────────────────────────────────────────────────────────────

pub fn handle_journal(gateway: &dyn Gateway, action: &JournalCommands) -> Result<()> {
    match action {
        JournalCommands::Add {
            content,
            prayer,
            date,
        } => {
            let linked_prayer_id = match prayer {
                Some(prefix) => {
                    let (prayers, _) = load_prayers(gateway)?;
                    Some(resolve_id(&prayers, prefix, "prayer")?)
                }
                None => None,
            };
            let mut journals = load_journals(gateway)?;
            let new = NewJournal {
                content: content.clone(),
                date: date
                    .clone()
                    .unwrap_or_else(|| Local::now().date_naive().format("%Y-%m-%d").to_string()),
                linked_prayer_id,
            };
            let journal = actions::journal::create(gateway, &mut journals, new)?;
            println_colored!(
                GREEN,
                "  ✓ Journal entry added for {} ({})",
                journal.date,
                short_id(&journal.id)
            );
        }

        JournalCommands::List { prayer } => {
            let journals = load_journals(gateway)?;
            let entries: Vec<&Journal> = match prayer {
                Some(prefix) => {
                    let (prayers, _) = load_prayers(gateway)?;
                    let id = resolve_id(&prayers, prefix, "prayer")?;
                    actions::journal::linked_to(&journals, &id)
                }
                None => journals.items().iter().collect(),
            };
            println!();
            if entries.is_empty() {
                println_colored!(DIM, "  No journal entries");
            } else {
                println_colored!(GOLD, "  Journal ({})", entries.len());
                println!();
                for entry in entries {
                    let link = if entry.linked_prayer_id.is_some() {
                        "  ⇢"
                    } else {
                        ""
                    };
                    println!(
                        "  {}  {}{}  \x1b[2m{}\x1b[0m",
                        entry.date,
                        entry.content,
                        link,
                        short_id(&entry.id)
                    );
                }
            }
            println!();
        }

        JournalCommands::Edit {
            id,
            content,
            prayer,
            unlink,
        } => {
            let linked_prayer_id = match (prayer, unlink) {
                (Some(prefix), _) => {
                    let (prayers, _) = load_prayers(gateway)?;
                    Some(Some(resolve_id(&prayers, prefix, "prayer")?))
                }
                (None, true) => Some(None),
                (None, false) => None,
            };
            let patch = JournalPatch {
                content: content.clone(),
                date: None,
                linked_prayer_id,
            };
            if patch.is_empty() {
                bail!("Nothing to change — pass --content, --prayer or --unlink");
            }
            let mut journals = load_journals(gateway)?;
            let id = resolve_id(&journals, id, "journal entry")?;
            actions::journal::update(gateway, &mut journals, &id, &patch)?;
            println_colored!(GREEN, "  ✓ Journal entry updated");
        }

        JournalCommands::Delete { id } => {
            let mut journals = load_journals(gateway)?;
            let id = resolve_id(&journals, id, "journal entry")?;
            actions::journal::delete(gateway, &mut journals, &id)?;
            println_colored!(RED, "  ✗ Journal entry deleted");
        }
    }
    Ok(())
}

// ─── Reminders ───────────────────────────────────────────────────────────────

pub fn handle_remind(gateway: &dyn Gateway, action: &RemindCommands) -> Result<()> {
    match action {
        RemindCommands::List => {
            let reminders = load_reminders(gateway)?;
            println!();
            if reminders.is_empty() {
                println_colored!(DIM, "  No reminders");
            } else {
                println_colored!(GOLD, "  Reminders");
                println!();
                for entry in reminders.items() {
                    let schedule = format_schedule(&entry.reminder);
                    if entry.reminder.enabled {
                        println!("  {:<40}  {}", entry.prayer.title, schedule);
                    } else {
                        println_colored!(DIM, "  {:<40}  {}", entry.prayer.title, schedule);
                    }
                }
            }
            println!();
        }

        RemindCommands::Set {
            prayer,
            freq,
            at,
            on,
        } => {
            let schedule = parse_schedule(freq, at, on.as_deref())?;
            let (prayers, _) = load_prayers(gateway)?;
            let mut reminders = load_reminders(gateway)?;
            let id = resolve_id(&prayers, prayer, "prayer")?;
            actions::reminders::set(gateway, &mut reminders, &prayers, &id, schedule)?;
            let entry = reminders.items().iter().find(|r| r.reminder.prayer_id == id);
            match entry {
                Some(entry) => println_colored!(
                    GREEN,
                    "  ✓ {} — {}",
                    entry.prayer.title,
                    format_schedule(&entry.reminder)
                ),
                None => println_colored!(GREEN, "  ✓ Reminder set"),
            }
        }

        RemindCommands::Off { prayer } => {
            let (prayers, _) = load_prayers(gateway)?;
            let mut reminders = load_reminders(gateway)?;
            let id = resolve_id(&prayers, prayer, "prayer")?;
            actions::reminders::clear(gateway, &mut reminders, &prayers, &id)?;
            println_colored!(AMBER, "  Reminder turned off");
        }
    }
    Ok(())
}

// ─── Profile ─────────────────────────────────────────────────────────────────

pub fn handle_profile(gateway: &dyn Gateway, action: &ProfileCommands) -> Result<()> {
    match action {
        ProfileCommands::Show => {
            let mut profile = EntityStore::new();
            actions::profile::load(gateway, &mut profile);
            ensure_loaded(&profile, "profile")?;
            let profile =
                actions::profile::current(&profile).ok_or_else(|| anyhow!("No profile found"))?;
            println!();
            println_colored!(GOLD, "  Profile");
            println!();
            println!("  Name:    {}", profile.full_name.as_deref().unwrap_or("—"));
            println!("  Email:   {}", profile.email.as_deref().unwrap_or("—"));
            println!("  Avatar:  {}", profile.avatar_url.as_deref().unwrap_or("—"));
            println!();
        }

        ProfileCommands::Set {
            name,
            email,
            avatar,
        } => {
            let patch = ProfilePatch {
                full_name: name.clone(),
                email: email.clone(),
                avatar_url: avatar.clone(),
            };
            if patch.is_empty() {
                bail!("Nothing to change — pass at least one of --name/--email/--avatar");
            }
            let mut profile = EntityStore::new();
            actions::profile::load(gateway, &mut profile);
            ensure_loaded(&profile, "profile")?;
            actions::profile::update(gateway, &mut profile, &patch)?;
            println_colored!(GREEN, "  ✓ Profile updated");
        }
    }
    Ok(())
}

// ─── Tags ────────────────────────────────────────────────────────────────────

pub fn handle_tags(gateway: &dyn Gateway) -> Result<()> {
    let tags = gateway.fetch_tags()?;
    println!();
    println_colored!(GOLD, "  Tags");
    println!();
    for tag in &tags {
        println!("  {:<16}  \x1b[2m{}\x1b[0m", tag.name, tag.icon_name);
    }
    println!();
    Ok(())
}

// ─── Refresh ─────────────────────────────────────────────────────────────────

/// The pull-to-refresh analogue: refetch every store and report what the
/// backend currently holds. Individual failures are shown but do not stop
/// the other fetches.
pub fn handle_refresh(gateway: &dyn Gateway) -> Result<()> {
    let mut prayers = EntityStore::new();
    let mut filter = TagFilter::new();
    actions::prayers::load(gateway, &mut prayers, &mut filter);
    let mut reminders = EntityStore::new();
    actions::reminders::load(gateway, &mut reminders);
    let mut journals = EntityStore::new();
    actions::journal::load(gateway, &mut journals);
    let mut profile = EntityStore::new();
    actions::profile::load(gateway, &mut profile);

    println!();
    println_colored!(GOLD, "  Refreshed from backend");
    println!();
    report("prayers", prayers.state(), prayers.len());
    report("reminders", reminders.state(), reminders.len());
    report("journal entries", journals.state(), journals.len());
    report("profile", profile.state(), profile.len());
    println!();
    Ok(())
}

fn report(what: &str, state: &LoadState, count: usize) {
    match state {
        LoadState::Failed(message) => {
            println_colored!(RED, "  ✗ {:<16} {}", what, message);
        }
        _ => {
            println!("  {:<16} {}", what, count);
        }
    }
}
