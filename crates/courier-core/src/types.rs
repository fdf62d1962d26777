use serde::{Deserialize, Serialize};

/// How often a user wants their notifications delivered.
///
/// `Daily` and `Weekly` double as the clock cadence names; `Immediate`
/// never has a batch scheduler behind it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    /// Dispatch synchronously with the `notify` call.
    Immediate,
    /// Accumulate and flush once per day.
    Daily,
    /// Accumulate and flush once per week.
    Weekly,
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Frequency::Immediate => "immediate",
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for Frequency {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "immediate" => Ok(Frequency::Immediate),
            "daily" => Ok(Frequency::Daily),
            "weekly" => Ok(Frequency::Weekly),
            other => Err(format!("unknown frequency: {other}")),
        }
    }
}

/// The delivery channels courier knows about. The manager iterates a fixed
/// list of these rather than branching on individual settings fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelKind {
    Email,
    Sms,
}

impl std::fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChannelKind::Email => write!(f, "email"),
            ChannelKind::Sms => write!(f, "sms"),
        }
    }
}

/// Per-user notification preferences.
///
/// Once read through the directory these are total: a known user without
/// stored settings gets [`NotificationSettings::default`], so every enabled
/// user has a resolvable frequency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationSettings {
    pub enabled: bool,
    pub by_email: bool,
    pub by_sms: bool,
    pub frequency: Frequency,
}

impl NotificationSettings {
    /// Whether the given channel is switched on in these settings.
    pub fn channel_enabled(&self, kind: ChannelKind) -> bool {
        match kind {
            ChannelKind::Email => self.by_email,
            ChannelKind::Sms => self.by_sms,
        }
    }
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            by_email: true,
            by_sms: false,
            frequency: Frequency::Immediate,
        }
    }
}

/// Emitted whenever a channel send fails, either during an immediate
/// dispatch or inside a flushed batch.
///
/// Produced by the manager and the scheduler flush, consumed by the user
/// directory's append-only error log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryFailure {
    pub user_id: String,
    pub error: String,
}
