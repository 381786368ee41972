//! Read-only client and service catalogs supplied by the host

use serde::{Deserialize, Serialize};

/// Client activity status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientStatus {
    #[default]
    Active,
    Inactive,
}

impl ClientStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ClientStatus::Active => "active",
            ClientStatus::Inactive => "inactive",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    pub id: u32,
    pub name: String,
    /// Human-readable time since the last session (e.g. "2 days ago")
    #[serde(default)]
    pub last_session: String,
    #[serde(default)]
    pub total_sessions: u32,
    #[serde(default)]
    pub preferred_services: Vec<String>,
    #[serde(default)]
    pub status: ClientStatus,
}

impl Client {
    /// Avatar initials, e.g. "EL" for "Emma L."
    pub fn initials(&self) -> String {
        self.name
            .split_whitespace()
            .filter_map(|part| part.chars().next())
            .flat_map(char::to_uppercase)
            .take(2)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    pub id: u32,
    pub name: String,
    /// Minutes
    pub duration: u32,
    /// Whole currency units
    pub price: u32,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    /// Equipment pre-seeded onto a booking when this service is chosen
    #[serde(default)]
    pub equipment: Vec<String>,
}

/// Clients and services the booking wizard chooses from
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub clients: Vec<Client>,
    #[serde(default)]
    pub services: Vec<Service>,
}

impl Catalog {
    pub fn new(clients: Vec<Client>, services: Vec<Service>) -> Self {
        Self { clients, services }
    }

    /// Clients whose name contains `query`, ignoring case. An empty query matches all.
    pub fn filter_clients(&self, query: &str) -> Vec<&Client> {
        let needle = query.trim().to_lowercase();
        self.clients
            .iter()
            .filter(|c| c.name.to_lowercase().contains(&needle))
            .collect()
    }

    pub fn client(&self, id: u32) -> Option<&Client> {
        self.clients.iter().find(|c| c.id == id)
    }

    pub fn service(&self, id: u32) -> Option<&Service> {
        self.services.iter().find(|s| s.id == id)
    }

    /// Exact, case-insensitive name lookup (used by the CLI)
    pub fn client_named(&self, name: &str) -> Option<&Client> {
        self.clients
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name.trim()))
    }

    pub fn service_named(&self, name: &str) -> Option<&Service> {
        self.services
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(name.trim()))
    }
}

fn client(id: u32, name: &str, last: &str, total: u32, prefs: &[&str], status: ClientStatus) -> Client {
    Client {
        id,
        name: name.to_string(),
        last_session: last.to_string(),
        total_sessions: total,
        preferred_services: prefs.iter().map(|s| (*s).to_string()).collect(),
        status,
    }
}

fn service(
    id: u32,
    name: &str,
    duration: u32,
    price: u32,
    description: &str,
    category: &str,
    equipment: &[&str],
) -> Service {
    Service {
        id,
        name: name.to_string(),
        duration,
        price,
        description: description.to_string(),
        category: category.to_string(),
        equipment: equipment.iter().map(|s| (*s).to_string()).collect(),
    }
}

/// Default client roster
pub fn default_clients() -> Vec<Client> {
    use ClientStatus::{Active, Inactive};
    vec![
        client(1, "Emma L.", "2 days ago", 12, &["Yoga", "Pilates"], Active),
        client(2, "John D.", "1 week ago", 8, &["Strength Training", "HIIT"], Active),
        client(3, "Sarah K.", "3 days ago", 15, &["HIIT", "Cardio"], Active),
        client(4, "Mike R.", "1 month ago", 5, &["Strength Training"], Inactive),
        client(5, "Lisa M.", "5 days ago", 20, &["Yoga", "Meditation"], Active),
    ]
}

/// Default service menu
pub fn default_services() -> Vec<Service> {
    vec![
        service(
            1,
            "Personal Training",
            60,
            75,
            "One-on-one strength and conditioning",
            "Strength",
            &["Dumbbells", "Barbell", "Bench"],
        ),
        service(
            2,
            "Yoga Session",
            75,
            65,
            "Flexibility and mindfulness practice",
            "Flexibility",
            &["Yoga mat", "Blocks", "Straps"],
        ),
        service(
            3,
            "HIIT Training",
            45,
            80,
            "High-intensity interval training",
            "Cardio",
            &["Bodyweight", "Resistance bands"],
        ),
        service(
            4,
            "Pilates",
            60,
            70,
            "Core strength and stability",
            "Core",
            &["Mat", "Pilates ball", "Resistance bands"],
        ),
        service(
            5,
            "Nutrition Consultation",
            30,
            50,
            "Dietary planning and guidance",
            "Consultation",
            &[],
        ),
    ]
}

/// Equipment the details step offers for toggling
pub fn default_equipment() -> Vec<String> {
    [
        "Dumbbells",
        "Barbell",
        "Bench",
        "Yoga mat",
        "Blocks",
        "Straps",
        "Resistance bands",
        "Kettlebells",
        "Medicine ball",
        "Foam roller",
    ]
    .iter()
    .map(|s| (*s).to_string())
    .collect()
}
