/// Ordered permission tiers carried on accounts. The numeric value is the
/// claim threaded through every command; a higher value grants everything a
/// lower one does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum AccountRole {
    Normal = 0,
    Supervisor = 1,
    Operator = 2,
    Admin = 3,
    SuperAdmin = 4,
}

impl AccountRole {
    pub const ALL: [AccountRole; 5] = [
        AccountRole::Normal,
        AccountRole::Supervisor,
        AccountRole::Operator,
        AccountRole::Admin,
        AccountRole::SuperAdmin,
    ];

    pub fn value(self) -> u8 {
        self as u8
    }

    pub fn from_value(value: u8) -> Option<AccountRole> {
        match value {
            0 => Some(AccountRole::Normal),
            1 => Some(AccountRole::Supervisor),
            2 => Some(AccountRole::Operator),
            3 => Some(AccountRole::Admin),
            4 => Some(AccountRole::SuperAdmin),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            AccountRole::Normal => "normal",
            AccountRole::Supervisor => "supervisor",
            AccountRole::Operator => "operator",
            AccountRole::Admin => "admin",
            AccountRole::SuperAdmin => "super-admin",
        }
    }
}

/// Authorization gate used by the dispatcher: the caller's resolved role
/// value must meet the command's required tier.
pub fn has_role(caller_value: u8, required: AccountRole) -> bool {
    caller_value >= required.value()
}
