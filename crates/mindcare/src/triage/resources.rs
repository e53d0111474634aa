use serde::Serialize;

pub const EMERGENCY_NUMBER: &str = "911";

/// Contact channel offered by a crisis resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Hotline,
    Text,
    Chat,
    Local,
}

/// Static crisis contact rendered next to a crisis reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrisisResource {
    pub name: &'static str,
    pub phone: &'static str,
    pub description: &'static str,
    pub available: &'static str,
    pub kind: ResourceKind,
}

impl CrisisResource {
    /// `tel:` link built from the digits of the phone field.
    pub fn dial_uri(&self) -> String {
        dial_uri(self.phone)
    }
}

pub fn dial_uri(phone: &str) -> String {
    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
    format!("tel:{digits}")
}

pub fn crisis_resources() -> &'static [CrisisResource] {
    &CRISIS_RESOURCES
}

static CRISIS_RESOURCES: [CrisisResource; 3] = [
    CrisisResource {
        name: "988 Suicide & Crisis Lifeline",
        phone: "988",
        description: "Free and confidential emotional support for people in suicidal crisis or emotional distress",
        available: "24/7",
        kind: ResourceKind::Hotline,
    },
    CrisisResource {
        name: "Crisis Text Line",
        phone: "Text HOME to 741741",
        description: "Free, 24/7 text support for those in crisis",
        available: "24/7",
        kind: ResourceKind::Text,
    },
    CrisisResource {
        name: "Campus Counseling Center",
        phone: "(555) 123-4567",
        description: "On-campus mental health services and emergency support",
        available: "Mon-Fri 8AM-5PM",
        kind: ResourceKind::Local,
    },
];
