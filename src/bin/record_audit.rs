use eldermoor::config::AppConfig;
use eldermoor::persistence::store::{audit_records, Store};

fn main() -> Result<(), String> {
    let args: Vec<String> = std::env::args().collect();
    let config = AppConfig::from_args(&args)?;
    let store = Store::from_root(&config.root);
    let db = store.load()?;
    let problems = audit_records(&db);

    println!("record audit:");
    println!("- accounts: {}", db.accounts.len());
    println!("- characters: {}", db.characters.len());
    println!("- items: {}", db.items.len());
    println!("- monsters: {}", db.monsters.len());
    println!("- maps: {}", db.maps.len());
    println!("- spells: {}", db.spells.len());
    println!("- learned spells: {}", db.learned.len());
    println!("- problems: {}", problems.len());
    if !problems.is_empty() {
        for problem in problems {
            println!("- {}", problem);
        }
        return Err("record audit found problems".to_string());
    }
    Ok(())
}
