use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "munajat",
    version,
    about = "A terminal companion for a hosted prayer journal"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Store backend connection details (url, keys, owner id)
    Init {
        /// Backend base URL
        #[arg(long)]
        url: String,
        /// Public api key
        #[arg(long)]
        api_key: String,
        /// Access token issued by the identity provider
        #[arg(long)]
        token: String,
        /// Owner (user) id
        #[arg(long)]
        user: String,
    },
    /// Prayer requests
    Prayer {
        #[command(subcommand)]
        action: PrayerCommands,
    },
    /// Journal entries
    Journal {
        #[command(subcommand)]
        action: JournalCommands,
    },
    /// Prayer reminders
    Remind {
        #[command(subcommand)]
        action: RemindCommands,
    },
    /// Profile details
    Profile {
        #[command(subcommand)]
        action: ProfileCommands,
    },
    /// List the available prayer tags
    Tags,
    /// Refetch every collection from the backend
    Refresh,
}

#[derive(Subcommand, Debug)]
pub enum PrayerCommands {
    /// Add a prayer request
    Add {
        /// Prayer title
        title: String,
        /// Longer description
        #[arg(long)]
        description: Option<String>,
        /// Tag name (see `munajat tags`)
        #[arg(long)]
        tag: Option<String>,
        /// Reminder frequency: daily or weekly
        #[arg(long)]
        remind: Option<String>,
        /// Reminder time (HH:MM, default 09:00)
        #[arg(long)]
        at: Option<String>,
        /// Day of week for weekly reminders
        #[arg(long)]
        on: Option<String>,
    },
    /// List prayer requests
    List {
        /// Only answered prayers
        #[arg(long, conflicts_with = "unanswered")]
        answered: bool,
        /// Only unanswered prayers
        #[arg(long)]
        unanswered: bool,
        /// Filter by tag name
        #[arg(long)]
        tag: Option<String>,
        /// Case-insensitive title search
        #[arg(long)]
        search: Option<String>,
    },
    /// Mark a prayer as answered
    Answer {
        /// Prayer id (prefix is enough)
        id: String,
        /// Mark as unanswered again
        #[arg(long)]
        undo: bool,
    },
    /// Edit a prayer's fields
    Edit {
        /// Prayer id (prefix is enough)
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// Assign a tag by name
        #[arg(long, conflicts_with = "no_tag")]
        tag: Option<String>,
        /// Clear the tag
        #[arg(long)]
        no_tag: bool,
    },
    /// Delete a prayer (its reminder goes with it)
    Delete {
        /// Prayer id (prefix is enough)
        id: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum JournalCommands {
    /// Add a journal entry for today
    Add {
        /// Entry text
        content: String,
        /// Link to a prayer by id (prefix is enough)
        #[arg(long)]
        prayer: Option<String>,
        /// Entry date (YYYY-MM-DD, default today)
        #[arg(long)]
        date: Option<String>,
    },
    /// List journal entries
    List {
        /// Only entries linked to this prayer id
        #[arg(long)]
        prayer: Option<String>,
    },
    /// Edit a journal entry
    Edit {
        /// Entry id (prefix is enough)
        id: String,
        #[arg(long)]
        content: Option<String>,
        /// Link to a prayer by id
        #[arg(long, conflicts_with = "unlink")]
        prayer: Option<String>,
        /// Remove the prayer link
        #[arg(long)]
        unlink: bool,
    },
    /// Delete a journal entry
    Delete {
        /// Entry id (prefix is enough)
        id: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum RemindCommands {
    /// Show every prayer's reminder
    List,
    /// Schedule the reminder for a prayer
    Set {
        /// Prayer id (prefix is enough)
        prayer: String,
        /// Frequency: daily or weekly
        #[arg(long, default_value = "daily")]
        freq: String,
        /// Time of day (HH:MM)
        #[arg(long, default_value = "09:00")]
        at: String,
        /// Day of week (weekly only)
        #[arg(long)]
        on: Option<String>,
    },
    /// Turn a prayer's reminder off
    Off {
        /// Prayer id (prefix is enough)
        prayer: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum ProfileCommands {
    /// Show the profile
    Show,
    /// Update profile fields
    Set {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        /// Avatar image URL
        #[arg(long)]
        avatar: Option<String>,
    },
}
