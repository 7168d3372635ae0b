pub mod admin;
pub mod config;
pub mod entities;
pub mod persistence;
pub mod telemetry;
pub mod world;

pub use admin::commands::{
    parse_console_command, AdminCommand, CommandOutcome, ConsoleInput, OutcomeData,
};
pub use admin::dispatch::{required_role, AdminConsole, AdminIdentity};
pub use admin::query::Page;
pub use admin::roles::AccountRole;
pub use world::state::{ChatKind, Notification, PlayerNotice, WorldState};

enum SessionEnd {
    Quit,
    Reload,
}

/// Loads the world, opens the operator console on stdin, and keeps going
/// until quit. A `reload` saves, drops the live world and rebuilds it from
/// disk without leaving the process.
pub fn run(args: &[String]) -> Result<(), String> {
    let app = config::AppConfig::from_args(args)?;
    telemetry::logging::init(&app.root)?;
    let game_config = config::GameConfig::load(&app.root)?;
    let store = persistence::store::Store::from_root(&app.root);

    loop {
        let records = store.load()?;
        for problem in persistence::store::audit_records(&records) {
            eprintln!("eldermoor: audit: {}", problem);
        }
        let mut grids = world::grid_cache::GridCache::new(
            game_config.grid_cache_capacity,
            store.grids_dir(),
        );
        let world = std::sync::Arc::new(std::sync::Mutex::new(WorldState::load(
            records, &mut grids,
        )));
        let console = AdminConsole::new(std::sync::Arc::clone(&world), game_config.clone());
        let identity = AdminIdentity::new(
            game_config.console_email.clone(),
            game_config.console_role,
        );

        print_world_summary(&world)?;
        let role_name = AccountRole::from_value(identity.role)
            .map(|role| role.name())
            .unwrap_or("unknown");
        println!(
            "eldermoor: console ready as {} ({}); type 'help' for commands",
            identity.account, role_name
        );
        telemetry::logging::log_game(&format!(
            "console session opened as {} ({})",
            identity.account, role_name
        ));

        match console_loop(&console, &identity, &store)? {
            SessionEnd::Quit => return Ok(()),
            SessionEnd::Reload => {
                println!("eldermoor: reloading records from disk");
                telemetry::logging::log_game("console requested a reload");
            }
        }
    }
}

fn console_loop(
    console: &AdminConsole,
    identity: &AdminIdentity,
    store: &persistence::store::Store,
) -> Result<SessionEnd, String> {
    let stdin = std::io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        std::io::Write::flush(&mut std::io::stdout())
            .map_err(|err| format!("stdout flush failed: {}", err))?;
        line.clear();
        let read = stdin
            .read_line(&mut line)
            .map_err(|err| format!("stdin read failed: {}", err))?;
        if read == 0 {
            println!();
            save_world(store, console.world())?;
            println!("eldermoor: records saved; goodbye");
            return Ok(SessionEnd::Quit);
        }

        let input = match parse_console_command(&line) {
            Ok(input) => input,
            Err(err) => {
                eprintln!("error: {}", err);
                continue;
            }
        };
        match input {
            ConsoleInput::Empty => {}
            ConsoleInput::Help => print_help(),
            ConsoleInput::Save => match save_world(store, console.world()) {
                Ok(()) => println!("eldermoor: records saved"),
                Err(err) => eprintln!("error: {}", err),
            },
            ConsoleInput::Reload => match save_world(store, console.world()) {
                Ok(()) => return Ok(SessionEnd::Reload),
                Err(err) => eprintln!("error: save before reload failed: {}", err),
            },
            ConsoleInput::Quit => {
                save_world(store, console.world())?;
                println!("eldermoor: records saved; goodbye");
                return Ok(SessionEnd::Quit);
            }
            ConsoleInput::Command(command) => {
                let outcome = console.execute(identity, command);
                render_outcome(&outcome);
                drain_notices(console.world());
            }
        }
    }
}

fn save_world(
    store: &persistence::store::Store,
    world: &std::sync::Mutex<WorldState>,
) -> Result<(), String> {
    let world = world
        .lock()
        .map_err(|_| "world state unavailable".to_string())?;
    store.save(&world.records)
}

fn print_world_summary(world: &std::sync::Mutex<WorldState>) -> Result<(), String> {
    let world = world
        .lock()
        .map_err(|_| "world state unavailable".to_string())?;
    let live = world
        .records
        .maps
        .iter()
        .filter(|record| world.live_map(record.index).is_some())
        .count();
    println!(
        "eldermoor: {} accounts, {} characters, {} items, {} monsters, {} spells",
        world.records.accounts.len(),
        world.records.characters.len(),
        world.records.items.len(),
        world.records.monsters.len(),
        world.records.spells.len()
    );
    println!(
        "eldermoor: {} of {} maps live",
        live,
        world.records.maps.len()
    );
    Ok(())
}

fn render_outcome(outcome: &CommandOutcome) {
    if outcome.ok {
        println!("{}", outcome.message);
    } else {
        eprintln!("error: {}", outcome.message);
    }
    let Some(data) = &outcome.data else {
        return;
    };
    match data {
        OutcomeData::Accounts(page) => {
            for view in &page.items {
                let role = AccountRole::from_value(view.role)
                    .map(|role| role.name())
                    .unwrap_or("?");
                let flag = if view.banned { " [banned]" } else { "" };
                println!(
                    "  #{} {} {} gold {}/{}{}",
                    view.index, view.email, role, view.game_gold, view.hunt_gold, flag
                );
                if !view.characters.is_empty() {
                    println!("      characters: {}", view.characters.join(", "));
                }
            }
            print_page_footer(page.page, page.total_pages());
        }
        OutcomeData::Players(views) => {
            for view in views {
                println!(
                    "  {} ({} {}) map {} {} account {}",
                    view.name,
                    view.class.name(),
                    view.level,
                    view.map,
                    view.position,
                    view.account
                );
            }
        }
        OutcomeData::Items(page) => {
            for record in &page.items {
                println!(
                    "  #{} {} [{}] level {} price {}",
                    record.index,
                    record.name,
                    record.category.name(),
                    record.required_level,
                    record.price
                );
            }
            print_page_footer(page.page, page.total_pages());
        }
        OutcomeData::Item(record) => {
            println!("  category: {}", record.category.name());
            println!("  required class: {}", record.required_class.name());
            println!("  required level: {}", record.required_level);
            println!("  stack size: {}", record.stack_size);
            println!("  price: {}", record.price);
            println!("  weight: {}", record.weight);
            println!("  durability: {}", record.durability);
            println!("  rarity: {}", record.rarity.name());
        }
        OutcomeData::Monsters(page) => {
            for record in &page.items {
                println!(
                    "  #{} {} level {} xp {}",
                    record.index, record.name, record.level, record.experience
                );
            }
            print_page_footer(page.page, page.total_pages());
        }
        OutcomeData::Monster(record) => {
            println!("  level: {}", record.level);
            println!("  experience: {}", record.experience);
            println!("  view range: {}", record.view_range);
            println!("  attack delay: {} ms", record.attack_delay);
            println!("  move delay: {} ms", record.move_delay);
            let mut flags = Vec::new();
            if record.flags.boss {
                flags.push("boss");
            }
            if record.flags.undead {
                flags.push("undead");
            }
            if record.flags.tameable {
                flags.push("tameable");
            }
            if record.flags.pushable {
                flags.push("pushable");
            }
            if !flags.is_empty() {
                println!("  flags: {}", flags.join(", "));
            }
            for (kind, amount) in record.stats.iter() {
                println!("  {}: {}", kind.name(), amount);
            }
        }
        OutcomeData::Maps(views) => {
            for view in views {
                if view.live {
                    println!(
                        "  #{} {} ({}) {} players, {} monsters",
                        view.record.index,
                        view.record.description,
                        view.record.file_name,
                        view.players,
                        view.monsters
                    );
                } else {
                    println!(
                        "  #{} {} ({}) offline",
                        view.record.index, view.record.description, view.record.file_name
                    );
                }
            }
        }
        OutcomeData::Map(record) => {
            println!("  file: {}", record.file_name);
            println!("  description: {}", record.description);
            println!("  levels: {}..{}", record.min_level, record.max_level);
            println!(
                "  recall: {}  teleport: {}  mining: {}",
                yes_no(record.allow_recall),
                yes_no(record.allow_teleport),
                yes_no(record.can_mine)
            );
            println!(
                "  drop rate: {}/{}  experience rate: {}/{}  gold rate: {}/{}",
                record.drop_rate,
                record.max_drop_rate,
                record.experience_rate,
                record.max_experience_rate,
                record.gold_rate,
                record.max_gold_rate
            );
        }
        OutcomeData::Spells(page) => {
            for record in &page.items {
                println!(
                    "  #{} {} ({} {}) needs level {}",
                    record.index,
                    record.name,
                    record.class.name(),
                    record.school.name(),
                    record.need_levels[0]
                );
            }
            print_page_footer(page.page, page.total_pages());
        }
    }
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

fn print_page_footer(page: usize, total_pages: usize) {
    if total_pages > 1 {
        println!("  page {} of {}", page, total_pages);
    }
}

fn drain_notices(world: &std::sync::Mutex<WorldState>) {
    let Ok(mut world) = world.lock() else {
        return;
    };
    for notification in world.take_notices() {
        let player = notification.player.0;
        match notification.notice {
            PlayerNotice::SpellLearned { spell, level } => {
                println!("  -> player {} learned spell {} at level {}", player, spell, level)
            }
            PlayerNotice::SpellLeveled { spell, level } => {
                println!("  -> player {} spell {} now level {}", player, spell, level)
            }
            PlayerNotice::LevelChanged { level } => {
                println!("  -> player {} is now level {}", player, level)
            }
            PlayerNotice::ItemGranted { item, count } => {
                println!("  -> player {} received {}x item {}", player, count, item)
            }
            PlayerNotice::Chat { kind, message } => {
                let label = match kind {
                    ChatKind::System => "system",
                    ChatKind::Announcement => "announcement",
                };
                println!("  -> [{}] to player {}: {}", label, player, message)
            }
            PlayerNotice::Disconnect { reason } => {
                println!("  -> player {} disconnected: {}", player, reason)
            }
        }
    }
}

fn print_help() {
    println!("queries (any role)");
    println!("  accounts [keyword] [page]");
    println!("  players [keyword]");
    println!("  items [keyword] [category] [page]");
    println!("  monsters [keyword] [page]");
    println!("  maps");
    println!("  spells [keyword] [class] [school] [page]");
    println!("account commands");
    println!("  ban <email> | unban <email>");
    println!("  gold <email> <game|hunt> <delta>");
    println!("  role <email> <0-4>");
    println!("player commands");
    println!("  teleport|tp <name> <map> <x> <y>");
    println!("  summon <target> <anchor>");
    println!("  kick <name>");
    println!("  levelup <name> <levels>");
    println!("  broadcast <message>");
    println!("item commands");
    println!("  item <index>");
    println!("  give <name> <item> [count]");
    println!("  createitem <name> [key=value ...]");
    println!("  updateitem <index> [key=value ...]");
    println!("monster commands");
    println!("  monster <index>");
    println!("  spawn <anchor> <monster> [count] [radius]");
    println!("  clearmap <anchor>");
    println!("  createmonster <name> [key=value ...]");
    println!("  updatemonster <index> [key=value ...]");
    println!("map commands");
    println!("  map <index>");
    println!("  createmap <file> [key=value ...]");
    println!("  updatemap <index> [key=value ...]");
    println!("spell commands");
    println!("  grantspell <name> <spell> [level]");
    println!("  grantclassspells <name> [level]");
    println!("  revokespell <name> <spell>");
    println!("  updatespell <index> [key=value ...]");
    println!("console");
    println!("  save | reload | quit | help");
    println!("quote multi-word names: give \"Sir Aldric\" 3 5");
}
