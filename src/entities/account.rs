use crate::admin::roles::AccountRole;

/// Persisted account row. The email is the unique key, matched
/// case-insensitively everywhere. Characters point back at their account by
/// index; the account side is derived, never stored twice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountRecord {
    pub index: u32,
    pub email: String,
    pub role: u8,
    pub game_gold: u32,
    pub hunt_gold: u32,
    pub banned: bool,
    pub created_at: i64,
}

impl AccountRecord {
    pub fn new(index: u32, email: &str) -> AccountRecord {
        AccountRecord {
            index,
            email: email.trim().to_string(),
            role: AccountRole::Normal.value(),
            game_gold: 0,
            hunt_gold: 0,
            banned: false,
            created_at: 0,
        }
    }

    pub fn balance(&self, currency: CurrencyKind) -> u32 {
        match currency {
            CurrencyKind::GameGold => self.game_gold,
            CurrencyKind::HuntGold => self.hunt_gold,
        }
    }

    /// Applies a signed delta, clamping at zero. Returns the new balance.
    pub fn adjust_currency(&mut self, currency: CurrencyKind, delta: i64) -> u32 {
        let current = i64::from(self.balance(currency));
        let next = (current + delta).clamp(0, i64::from(u32::MAX)) as u32;
        match currency {
            CurrencyKind::GameGold => self.game_gold = next,
            CurrencyKind::HuntGold => self.hunt_gold = next,
        }
        next
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurrencyKind {
    GameGold,
    HuntGold,
}

impl CurrencyKind {
    pub fn name(self) -> &'static str {
        match self {
            CurrencyKind::GameGold => "game gold",
            CurrencyKind::HuntGold => "hunt gold",
        }
    }

    pub fn parse(value: &str) -> Option<CurrencyKind> {
        match value.trim().to_ascii_lowercase().as_str() {
            "game" | "gamegold" | "game_gold" => Some(CurrencyKind::GameGold),
            "hunt" | "huntgold" | "hunt_gold" => Some(CurrencyKind::HuntGold),
            _ => None,
        }
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}
