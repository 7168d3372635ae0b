use crate::admin::commands::CommandOutcome;
use crate::admin::query::{keyword_matches, paginate, Page, QueryError, ACCOUNT_PAGE_SIZE};
use crate::admin::roles::AccountRole;
use crate::entities::account::{normalize_email, AccountRecord, CurrencyKind};
use crate::telemetry::logging;
use crate::world::state::WorldState;
use std::sync::Mutex;

/// Search row: the account joined with the names of its characters. The
/// character list is derived here, never stored on the account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountView {
    pub index: u32,
    pub email: String,
    pub role: u8,
    pub game_gold: u32,
    pub hunt_gold: u32,
    pub banned: bool,
    pub characters: Vec<String>,
}

/// Keyword search over accounts. The keyword matches the email, any owned
/// character name, or the account index.
pub fn search_accounts(
    world: &Mutex<WorldState>,
    keyword: &str,
    page: i64,
) -> Result<Page<AccountView>, QueryError> {
    let world = world.lock().map_err(|_| QueryError::WorldUnavailable)?;
    let mut views: Vec<AccountView> = world
        .records
        .accounts
        .iter()
        .map(|account| {
            let characters: Vec<String> = world
                .records
                .characters
                .iter()
                .filter(|character| character.account == account.index)
                .map(|character| character.name.clone())
                .collect();
            AccountView {
                index: account.index,
                email: account.email.clone(),
                role: account.role,
                game_gold: account.game_gold,
                hunt_gold: account.hunt_gold,
                banned: account.banned,
                characters,
            }
        })
        .filter(|view| {
            let mut fields: Vec<&str> = vec![view.email.as_str()];
            fields.extend(view.characters.iter().map(|name| name.as_str()));
            keyword_matches(keyword, view.index, &fields)
        })
        .collect();
    drop(world);

    views.sort_by_key(|view| view.index);
    Ok(paginate(views, page, ACCOUNT_PAGE_SIZE))
}

/// Sets or clears the ban flag. Re-applying the current state succeeds
/// silently, so the command is idempotent.
pub fn set_ban(
    world: &mut WorldState,
    email: &str,
    banned: bool,
) -> Result<CommandOutcome, String> {
    let account = find_account_mut(world, email)?;
    account.banned = banned;
    let email = account.email.clone();
    let action = if banned { "banned" } else { "unbanned" };
    logging::log_admin(&format!("account {} {}", email, action));
    Ok(CommandOutcome::success(format!("account {} {}", email, action)))
}

/// Applies a signed delta to one currency balance. The balance clamps at
/// zero; an over-negative delta is not an error.
pub fn adjust_currency(
    world: &mut WorldState,
    email: &str,
    currency: CurrencyKind,
    delta: i64,
) -> Result<CommandOutcome, String> {
    let account = find_account_mut(world, email)?;
    let balance = account.adjust_currency(currency, delta);
    let email = account.email.clone();
    logging::log_admin(&format!(
        "account {} {} adjusted by {} to {}",
        email,
        currency.name(),
        delta,
        balance
    ));
    Ok(CommandOutcome::success(format!(
        "account {} {} balance is now {}",
        email,
        currency.name(),
        balance
    )))
}

pub fn set_account_role(
    world: &mut WorldState,
    email: &str,
    role: u8,
) -> Result<CommandOutcome, String> {
    let Some(parsed) = AccountRole::from_value(role) else {
        return Err(format!("role {} out of range", role));
    };
    let account = find_account_mut(world, email)?;
    account.role = role;
    let email = account.email.clone();
    logging::log_admin(&format!("account {} role set to {}", email, parsed.name()));
    Ok(CommandOutcome::success(format!(
        "account {} role set to {}",
        email,
        parsed.name()
    )))
}

fn find_account_mut<'a>(
    world: &'a mut WorldState,
    email: &str,
) -> Result<&'a mut AccountRecord, String> {
    let key = normalize_email(email);
    world
        .records
        .accounts
        .iter_mut()
        .find(|account| normalize_email(&account.email) == key)
        .ok_or_else(|| format!("no account with email {}", email))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::character::{CharacterClass, CharacterRecord};
    use crate::persistence::store::RecordDb;
    use std::collections::HashMap;
    use std::sync::Arc;

    fn test_world() -> WorldState {
        let mut db = RecordDb::default();
        let keeper = db
            .accounts
            .create(|index| AccountRecord::new(index, "keeper@eldermoor.io"));
        let warden = db
            .accounts
            .create(|index| AccountRecord::new(index, "warden@eldermoor.io"));
        db.accounts
            .create(|index| AccountRecord::new(index, "smith@forge.io"));
        db.characters
            .create(|index| CharacterRecord::new(index, keeper, "Aldric", CharacterClass::Mage));
        db.characters
            .create(|index| CharacterRecord::new(index, warden, "Berrin", CharacterClass::Warrior));
        db.characters
            .create(|index| CharacterRecord::new(index, warden, "Caya", CharacterClass::Ranger));
        WorldState::from_parts(db, HashMap::new())
    }

    #[test]
    fn keyword_reaches_owned_character_names() {
        let world = Mutex::new(test_world());
        let page = search_accounts(&world, "berrin", 1).expect("search");
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].email, "warden@eldermoor.io");
        assert_eq!(page.items[0].characters, vec!["Berrin", "Caya"]);
    }

    #[test]
    fn keyword_matches_email_case_insensitively() {
        let world = Mutex::new(test_world());
        let page = search_accounts(&world, "KEEPER", 1).expect("search");
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].email, "keeper@eldermoor.io");
    }

    #[test]
    fn account_pages_hold_ten_rows() {
        let mut world = test_world();
        for n in 0..9 {
            world
                .records
                .accounts
                .create(|index| AccountRecord::new(index, &format!("extra{}@eldermoor.io", n)));
        }
        let world = Mutex::new(world);

        let first = search_accounts(&world, "", 1).expect("search");
        assert_eq!(first.items.len(), 10);
        assert_eq!(first.total, 12);
        assert_eq!(first.total_pages(), 2);

        let second = search_accounts(&world, "", 2).expect("search");
        assert_eq!(second.items.len(), 2);
        assert_eq!(second.page, 2);
    }

    #[test]
    fn poisoned_world_reports_unavailable() {
        let world = Arc::new(Mutex::new(test_world()));
        let poisoner = Arc::clone(&world);
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.lock().unwrap();
            panic!("poisoning the lock");
        })
        .join();

        let err = search_accounts(&world, "", 1).unwrap_err();
        assert_eq!(err, QueryError::WorldUnavailable);
    }

    #[test]
    fn ban_is_idempotent() {
        let mut world = test_world();

        let outcome = set_ban(&mut world, "keeper@eldermoor.io", true).expect("ban");
        assert!(outcome.ok);
        assert!(world.records.accounts.get(1).unwrap().banned);

        let again = set_ban(&mut world, "keeper@eldermoor.io", true).expect("re-ban");
        assert!(again.ok);
        assert!(world.records.accounts.get(1).unwrap().banned);

        let cleared = set_ban(&mut world, "KEEPER@eldermoor.io", false).expect("unban");
        assert!(cleared.ok);
        assert!(!world.records.accounts.get(1).unwrap().banned);
    }

    #[test]
    fn ban_reports_missing_accounts() {
        let mut world = test_world();
        let err = set_ban(&mut world, "ghost@eldermoor.io", true).unwrap_err();
        assert!(err.contains("no account with email"));
    }

    #[test]
    fn currency_clamps_at_zero() {
        let mut world = test_world();
        world.records.accounts.get_mut(1).unwrap().game_gold = 100;

        let outcome =
            adjust_currency(&mut world, "keeper@eldermoor.io", CurrencyKind::GameGold, -250)
                .expect("adjust");
        assert!(outcome.ok);
        assert_eq!(world.records.accounts.get(1).unwrap().game_gold, 0);

        adjust_currency(&mut world, "keeper@eldermoor.io", CurrencyKind::GameGold, 50)
            .expect("adjust");
        assert_eq!(world.records.accounts.get(1).unwrap().game_gold, 50);
    }

    #[test]
    fn role_values_outside_the_range_are_rejected() {
        let mut world = test_world();
        let err = set_account_role(&mut world, "keeper@eldermoor.io", 5).unwrap_err();
        assert!(err.contains("role 5 out of range"));
        assert_eq!(world.records.accounts.get(1).unwrap().role, 0);

        let outcome = set_account_role(&mut world, "keeper@eldermoor.io", 2).expect("set role");
        assert!(outcome.message.contains("operator"));
        assert_eq!(world.records.accounts.get(1).unwrap().role, 2);
    }
}
