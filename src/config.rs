use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::booking::{default_time_slots, BlockedSlots, DateWindow, TimeSlot};
use crate::catalog::{default_clients, default_equipment, default_services, Catalog, Client, Service};
use crate::session::{default_checklist, default_follow_ups, Exercise, SessionRecord, SessionStatus};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub booking: BookingConfig,
    #[serde(default)]
    pub session: SessionConfig,
    pub paths: PathsConfig,
    pub ui: UiConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Clients, services and equipment the flows choose from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default = "default_clients")]
    pub clients: Vec<Client>,
    #[serde(default = "default_services")]
    pub services: Vec<Service>,
    /// Equipment offered on the booking details step
    #[serde(default = "default_equipment")]
    pub equipment: Vec<String>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            clients: default_clients(),
            services: default_services(),
            equipment: default_equipment(),
        }
    }
}

impl CatalogConfig {
    pub fn to_catalog(&self) -> Catalog {
        Catalog::new(self.clients.clone(), self.services.clone())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingConfig {
    /// Number of bookable days starting today (default: 14)
    #[serde(default = "default_window_days")]
    pub window_days: u32,
    #[serde(default = "default_time_slots")]
    pub time_slots: Vec<TimeSlot>,
    /// Unavailable slots, either `HH:MM` (every day) or `YYYY-MM-DD HH:MM`
    #[serde(default)]
    pub blocked_slots: Vec<String>,
}

fn default_window_days() -> u32 {
    DateWindow::DEFAULT_DAYS
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            window_days: default_window_days(),
            time_slots: default_time_slots(),
            blocked_slots: Vec::new(),
        }
    }
}

impl BookingConfig {
    pub fn blocked(&self) -> Result<BlockedSlots> {
        BlockedSlots::parse(&self.blocked_slots)
            .map_err(anyhow::Error::msg)
            .context("Invalid booking.blocked_slots entry")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Interval between elapsed-time ticks (default: 1000)
    #[serde(default = "default_tick_interval")]
    pub tick_interval_ms: u64,
    #[serde(default = "default_checklist")]
    pub checklist: Vec<String>,
    #[serde(default = "default_follow_ups")]
    pub follow_ups: Vec<String>,
    /// Sessions listed on the dashboard
    #[serde(default = "default_sessions")]
    pub sessions: Vec<SessionRecord>,
}

fn default_tick_interval() -> u64 {
    1000 // one elapsed second per tick
}

fn plan(entries: &[(&str, u32)]) -> Vec<Exercise> {
    entries
        .iter()
        .map(|(name, minutes)| Exercise::new(*name, *minutes))
        .collect()
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

/// Today's demo schedule
pub fn default_sessions() -> Vec<SessionRecord> {
    vec![
        SessionRecord {
            id: uuid::Uuid::new_v4(),
            client: "Emma L.".to_string(),
            service: "Yoga Session".to_string(),
            time: "10:00 AM".to_string(),
            location: "Studio A".to_string(),
            price: 65,
            status: SessionStatus::Completed,
            goals: strings(&["Improve flexibility", "Reduce stress"]),
            equipment: strings(&["Yoga mat", "Blocks", "Straps"]),
            notes: String::new(),
            session_plan: plan(&[
                ("Breathing warm-up", 10),
                ("Sun salutations", 20),
                ("Balance poses", 25),
                ("Savasana", 20),
            ]),
        },
        SessionRecord {
            id: uuid::Uuid::new_v4(),
            client: "John D.".to_string(),
            service: "Strength Training".to_string(),
            time: "2:00 PM".to_string(),
            location: "Gym - Weight Room".to_string(),
            price: 75,
            status: SessionStatus::StartingSoon,
            goals: strings(&["Build muscle mass", "Improve squat form"]),
            equipment: strings(&["Barbell", "Bench", "Dumbbells"]),
            notes: "Left knee is sensitive, keep squats above parallel".to_string(),
            session_plan: plan(&[
                ("Dynamic warm-up", 10),
                ("Back squats", 15),
                ("Bench press", 15),
                ("Bent-over rows", 10),
                ("Cool down", 10),
            ]),
        },
        SessionRecord {
            id: uuid::Uuid::new_v4(),
            client: "Sarah K.".to_string(),
            service: "HIIT Training".to_string(),
            time: "6:00 PM".to_string(),
            location: "Gym - Cardio Area".to_string(),
            price: 80,
            status: SessionStatus::Upcoming,
            goals: strings(&["Improve endurance"]),
            equipment: strings(&["Jump rope", "Resistance bands"]),
            notes: String::new(),
            session_plan: plan(&[("Jump rope", 10), ("Tabata circuit", 25), ("Stretching", 10)]),
        },
    ]
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval(),
            checklist: default_checklist(),
            follow_ups: default_follow_ups(),
            sessions: default_sessions(),
        }
    }
}

impl SessionConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    pub state: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    pub refresh_rate_ms: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to log to file in TUI mode (false = stderr for debugging)
    #[serde(default = "default_log_to_file")]
    pub to_file: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_to_file() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            to_file: default_log_to_file(),
        }
    }
}

impl Config {
    /// Project-local config file
    pub fn project_config_path() -> PathBuf {
        PathBuf::from(".coachflow/config.toml")
    }

    pub fn load(config_path: Option<&str>) -> Result<Self> {
        // Start with embedded defaults so coachflow works without config files
        let defaults = Config::default();
        let defaults_json =
            serde_json::to_string(&defaults).context("Failed to serialize default config")?;

        let mut builder = config::Config::builder().add_source(config::File::from_str(
            &defaults_json,
            config::FileFormat::Json,
        ));

        let project_config = Self::project_config_path();
        if project_config.exists() {
            builder = builder.add_source(config::File::from(project_config));
        }

        // User config in ~/.config/coachflow/ (optional global overrides)
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("coachflow").join("config.toml");
            if user_config.exists() {
                builder = builder.add_source(config::File::from(user_config));
            }
        }

        // Explicit config file (CLI override)
        if let Some(path) = config_path {
            builder = builder.add_source(config::File::with_name(path));
        }

        // Environment variables with COACHFLOW_ prefix
        builder = builder.add_source(
            config::Environment::with_prefix("COACHFLOW")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to load configuration")?;
        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Save config to `.coachflow/config.toml`
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::project_config_path())
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .context("Failed to create coachflow config directory")?;
        }

        let toml_str =
            toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;

        std::fs::write(config_path, toml_str).context("Failed to write config file")?;

        Ok(())
    }

    /// Get absolute path to state directory
    pub fn state_path(&self) -> PathBuf {
        let path = PathBuf::from(&self.paths.state);
        if path.is_absolute() {
            path
        } else {
            std::env::current_dir().unwrap_or_default().join(path)
        }
    }

    /// Get absolute path to logs directory
    pub fn logs_path(&self) -> PathBuf {
        self.state_path().join("logs")
    }

    pub fn refresh_rate(&self) -> Duration {
        Duration::from_millis(self.ui.refresh_rate_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog: CatalogConfig::default(),
            booking: BookingConfig::default(),
            session: SessionConfig::default(),
            paths: PathsConfig {
                state: ".coachflow".to_string(),
            },
            ui: UiConfig {
                refresh_rate_ms: 250,
            },
            logging: LoggingConfig::default(),
        }
    }
}
