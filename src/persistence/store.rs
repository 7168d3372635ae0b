use crate::admin::roles::AccountRole;
use crate::entities::account::{normalize_email, AccountRecord};
use crate::entities::character::{CharacterClass, CharacterRecord};
use crate::entities::item::{ClassRequirement, ItemCategory, ItemRecord, Rarity};
use crate::entities::monster::MonsterRecord;
use crate::entities::spell::{CastMode, LearnedSpell, SpellRecord, SpellSchool, SPELL_TIERS};
use crate::entities::stats::StatKind;
use crate::persistence::records::{parse_blocks, FieldBlock, Record, RecordSet};
use crate::world::map::MapRecord;
use crate::world::position::Point;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

impl Record for AccountRecord {
    fn index(&self) -> u32 {
        self.index
    }
}

impl Record for CharacterRecord {
    fn index(&self) -> u32 {
        self.index
    }
}

impl Record for ItemRecord {
    fn index(&self) -> u32 {
        self.index
    }
}

impl Record for MonsterRecord {
    fn index(&self) -> u32 {
        self.index
    }
}

impl Record for MapRecord {
    fn index(&self) -> u32 {
        self.index
    }
}

impl Record for SpellRecord {
    fn index(&self) -> u32 {
        self.index
    }
}

impl Record for LearnedSpell {
    fn index(&self) -> u32 {
        self.index
    }
}

/// Every record collection the server owns. Character learned-spell lists
/// are rebuilt from the learned collection at load; only the learned records
/// go to disk.
#[derive(Debug, Clone, Default)]
pub struct RecordDb {
    pub accounts: RecordSet<AccountRecord>,
    pub characters: RecordSet<CharacterRecord>,
    pub items: RecordSet<ItemRecord>,
    pub monsters: RecordSet<MonsterRecord>,
    pub maps: RecordSet<MapRecord>,
    pub spells: RecordSet<SpellRecord>,
    pub learned: RecordSet<LearnedSpell>,
}

#[derive(Debug, Clone)]
pub struct Store {
    root: PathBuf,
}

impl Store {
    pub fn from_root(root: &Path) -> Store {
        Store {
            root: root.to_path_buf(),
        }
    }

    pub fn data_dir(&self) -> PathBuf {
        self.root.join("data")
    }

    pub fn grids_dir(&self) -> PathBuf {
        self.root.join("maps")
    }

    /// Missing files mean an empty collection, so a fresh root just works.
    pub fn load(&self) -> Result<RecordDb, String> {
        let mut db = RecordDb::default();
        self.load_collection("accounts.txt", &mut db.accounts, parse_account)?;
        self.load_collection("characters.txt", &mut db.characters, parse_character)?;
        self.load_collection("items.txt", &mut db.items, parse_item)?;
        self.load_collection("monsters.txt", &mut db.monsters, parse_monster)?;
        self.load_collection("maps.txt", &mut db.maps, parse_map)?;
        self.load_collection("spells.txt", &mut db.spells, parse_spell)?;
        self.load_collection("learned.txt", &mut db.learned, parse_learned)?;
        link_learned_spells(&mut db);
        Ok(db)
    }

    pub fn save(&self, db: &RecordDb) -> Result<(), String> {
        let dir = self.data_dir();
        fs::create_dir_all(&dir)
            .map_err(|err| format!("record dir create failed for {}: {}", dir.display(), err))?;
        self.save_collection("accounts.txt", serialize_accounts(&db.accounts))?;
        self.save_collection("characters.txt", serialize_characters(&db.characters))?;
        self.save_collection("items.txt", serialize_items(&db.items))?;
        self.save_collection("monsters.txt", serialize_monsters(&db.monsters))?;
        self.save_collection("maps.txt", serialize_maps(&db.maps))?;
        self.save_collection("spells.txt", serialize_spells(&db.spells))?;
        self.save_collection("learned.txt", serialize_learned(&db.learned))?;
        Ok(())
    }

    fn load_collection<T: Record>(
        &self,
        file: &str,
        set: &mut RecordSet<T>,
        parse: fn(FieldBlock) -> Result<T, String>,
    ) -> Result<(), String> {
        let path = self.data_dir().join(file);
        let data = match fs::read_to_string(&path) {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(err) => {
                return Err(format!(
                    "record read failed for {}: {}",
                    path.display(),
                    err
                ))
            }
        };
        for block in parse_blocks(&data, file)? {
            let record = parse(block)?;
            set.insert_loaded(record)
                .map_err(|err| format!("{}: {}", file, err))?;
        }
        Ok(())
    }

    /// Writes through a temp file; the previous file survives as `.bak`.
    fn save_collection(&self, file: &str, data: String) -> Result<(), String> {
        let path = self.data_dir().join(file);
        let backup = self.data_dir().join(format!("{}.bak", file));
        let temp = self.data_dir().join(format!("{}.tmp", file));
        if path.exists() {
            fs::copy(&path, &backup).map_err(|err| {
                format!("record backup failed for {}: {}", backup.display(), err)
            })?;
        }
        fs::write(&temp, data)
            .map_err(|err| format!("record write failed for {}: {}", temp.display(), err))?;
        fs::rename(&temp, &path)
            .map_err(|err| format!("record rename failed for {}: {}", path.display(), err))
    }
}

/// Rebuilds each character's owned learned-spell list from the learned
/// collection. Orphaned learned records stay in the set; the audit reports
/// them.
fn link_learned_spells(db: &mut RecordDb) {
    let mut by_character: HashMap<u32, Vec<u32>> = HashMap::new();
    for learned in db.learned.iter() {
        by_character
            .entry(learned.character)
            .or_default()
            .push(learned.index);
    }
    for character in db.characters.iter_mut() {
        character.spells = by_character.remove(&character.index).unwrap_or_default();
    }
}

/// Referential checks across collections. Returns one line per problem.
pub fn audit_records(db: &RecordDb) -> Vec<String> {
    let mut problems = Vec::new();

    let mut emails: HashMap<String, u32> = HashMap::new();
    for account in db.accounts.iter() {
        if let Some(first) = emails.insert(normalize_email(&account.email), account.index) {
            problems.push(format!(
                "account {} duplicates email '{}' of account {}",
                account.index, account.email, first
            ));
        }
    }

    let mut names: HashMap<String, u32> = HashMap::new();
    for character in db.characters.iter() {
        if db.accounts.get(character.account).is_none() {
            problems.push(format!(
                "character {} '{}' references missing account {}",
                character.index, character.name, character.account
            ));
        }
        let key = character.name.trim().to_ascii_lowercase();
        if let Some(first) = names.insert(key, character.index) {
            problems.push(format!(
                "character {} duplicates name '{}' of character {}",
                character.index, character.name, first
            ));
        }
    }

    let mut pairs: HashSet<(u32, u32)> = HashSet::new();
    for learned in db.learned.iter() {
        if db.characters.get(learned.character).is_none() {
            problems.push(format!(
                "learned spell {} references missing character {}",
                learned.index, learned.character
            ));
        }
        if db.spells.get(learned.spell).is_none() {
            problems.push(format!(
                "learned spell {} references missing spell {}",
                learned.index, learned.spell
            ));
        }
        if !pairs.insert((learned.character, learned.spell)) {
            problems.push(format!(
                "character {} has duplicate learned records for spell {}",
                learned.character, learned.spell
            ));
        }
    }

    problems
}

fn unknown_value_err(block: &FieldBlock, key: &str, value: &str) -> String {
    format!(
        "{} unknown {} '{}' near line {}",
        block.label(),
        key,
        value,
        block.line_no()
    )
}

fn parse_account(mut block: FieldBlock) -> Result<AccountRecord, String> {
    let index = block.require_u32("index")?;
    let email = block.require("email")?;
    if email.is_empty() {
        return Err(format!(
            "{} empty email near line {}",
            block.label(),
            block.line_no()
        ));
    }
    let mut record = AccountRecord::new(index, &email);
    record.role = block.take_u8("role", record.role)?;
    if AccountRole::from_value(record.role).is_none() {
        return Err(format!(
            "{} role {} out of range near line {}",
            block.label(),
            record.role,
            block.line_no()
        ));
    }
    record.game_gold = block.take_u32("game_gold", record.game_gold)?;
    record.hunt_gold = block.take_u32("hunt_gold", record.hunt_gold)?;
    record.banned = block.take_bool("banned", record.banned)?;
    record.created_at = block.take_i64("created_at", record.created_at)?;
    block.finish()?;
    Ok(record)
}

fn parse_character(mut block: FieldBlock) -> Result<CharacterRecord, String> {
    let index = block.require_u32("index")?;
    let account = block.require_u32("account")?;
    let name = block.require("name")?;
    let class_raw = block.require("class")?;
    let class = CharacterClass::parse(&class_raw)
        .ok_or_else(|| unknown_value_err(&block, "class", &class_raw))?;
    let mut record = CharacterRecord::new(index, account, &name, class);
    record.level = block.take_u16("level", record.level)?;
    record.map = block.take_u32("map", record.map)?;
    record.position = Point::new(block.take_u16("x", 0)?, block.take_u16("y", 0)?);
    block.finish()?;
    Ok(record)
}

fn parse_item(mut block: FieldBlock) -> Result<ItemRecord, String> {
    let index = block.require_u32("index")?;
    let name = block.require("name")?;
    let mut record = ItemRecord::new(index, &name);
    if let Some(raw) = block.take("category")? {
        record.category =
            ItemCategory::parse(&raw).ok_or_else(|| unknown_value_err(&block, "category", &raw))?;
    }
    if let Some(raw) = block.take("required_class")? {
        record.required_class = ClassRequirement::parse(&raw)
            .ok_or_else(|| unknown_value_err(&block, "required_class", &raw))?;
    }
    record.required_level = block.take_u16("required_level", record.required_level)?;
    record.stack_size = block.take_u32("stack_size", record.stack_size)?.max(1);
    record.price = block.take_u32("price", record.price)?;
    record.weight = block.take_u32("weight", record.weight)?;
    record.durability = block.take_u32("durability", record.durability)?;
    if let Some(raw) = block.take("rarity")? {
        record.rarity =
            Rarity::parse(&raw).ok_or_else(|| unknown_value_err(&block, "rarity", &raw))?;
    }
    block.finish()?;
    Ok(record)
}

fn parse_monster(mut block: FieldBlock) -> Result<MonsterRecord, String> {
    let index = block.require_u32("index")?;
    let name = block.require("name")?;
    let mut record = MonsterRecord::new(index, &name);
    record.level = block.take_u16("level", record.level)?;
    record.experience = block.take_u32("experience", record.experience)?;
    record.view_range = block.take_u8("view_range", record.view_range)?;
    record.attack_delay = block.take_u32("attack_delay", record.attack_delay)?;
    record.move_delay = block.take_u32("move_delay", record.move_delay)?;
    record.flags.boss = block.take_bool("boss", record.flags.boss)?;
    record.flags.undead = block.take_bool("undead", record.flags.undead)?;
    record.flags.tameable = block.take_bool("tameable", record.flags.tameable)?;
    record.flags.pushable = block.take_bool("pushable", record.flags.pushable)?;
    for raw in block.take_all("stat") {
        let mut parts = raw.split_whitespace();
        let (Some(kind_raw), Some(amount_raw), None) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(format!(
                "{} stat expects '<kind> <amount>' near line {}, got '{}'",
                block.label(),
                block.line_no(),
                raw
            ));
        };
        let kind =
            StatKind::parse(kind_raw).ok_or_else(|| unknown_value_err(&block, "stat", kind_raw))?;
        let amount = amount_raw.parse::<i32>().map_err(|_| {
            format!(
                "{} stat amount invalid near line {}, got '{}'",
                block.label(),
                block.line_no(),
                amount_raw
            )
        })?;
        record.stats.set(kind, amount);
    }
    record.stats_changed();
    block.finish()?;
    Ok(record)
}

fn parse_map(mut block: FieldBlock) -> Result<MapRecord, String> {
    let index = block.require_u32("index")?;
    let file_name = block.require("file")?;
    if file_name.is_empty() {
        return Err(format!(
            "{} empty file name near line {}",
            block.label(),
            block.line_no()
        ));
    }
    let mut record = MapRecord::new(index, &file_name);
    if let Some(description) = block.take("description")? {
        record.description = description;
    }
    record.allow_recall = block.take_bool("allow_recall", record.allow_recall)?;
    record.allow_teleport = block.take_bool("allow_teleport", record.allow_teleport)?;
    record.can_mine = block.take_bool("can_mine", record.can_mine)?;
    record.min_level = block.take_u16("min_level", record.min_level)?;
    record.max_level = block.take_u16("max_level", record.max_level)?;
    record.drop_rate = block.take_u32("drop_rate", record.drop_rate)?;
    record.max_drop_rate = block.take_u32("max_drop_rate", record.max_drop_rate)?;
    record.experience_rate = block.take_u32("experience_rate", record.experience_rate)?;
    record.max_experience_rate =
        block.take_u32("max_experience_rate", record.max_experience_rate)?;
    record.gold_rate = block.take_u32("gold_rate", record.gold_rate)?;
    record.max_gold_rate = block.take_u32("max_gold_rate", record.max_gold_rate)?;
    block.finish()?;
    Ok(record)
}

fn parse_spell(mut block: FieldBlock) -> Result<SpellRecord, String> {
    let index = block.require_u32("index")?;
    let name = block.require("name")?;
    let class_raw = block.require("class")?;
    let class = CharacterClass::parse(&class_raw)
        .ok_or_else(|| unknown_value_err(&block, "class", &class_raw))?;
    let school_raw = block.require("school")?;
    let school = SpellSchool::parse(&school_raw)
        .ok_or_else(|| unknown_value_err(&block, "school", &school_raw))?;
    let mut record = SpellRecord::new(index, &name, class, school);
    if let Some(raw) = block.take("mode")? {
        record.mode =
            CastMode::parse(&raw).ok_or_else(|| unknown_value_err(&block, "mode", &raw))?;
    }
    record.min_power = block.take_u16("min_power", record.min_power)?;
    record.max_power = block.take_u16("max_power", record.max_power)?;
    record.mana_cost = block.take_u16("mana_cost", record.mana_cost)?;
    record.cost_per_level = block.take_u16("cost_per_level", record.cost_per_level)?;
    if let Some(raw) = block.take("need_levels")? {
        record.need_levels = parse_tier_u16(&block, "need_levels", &raw)?;
    }
    if let Some(raw) = block.take("tier_experience")? {
        record.tier_experience = parse_tier_u32(&block, "tier_experience", &raw)?;
    }
    record.delay_ms = block.take_u32("delay", record.delay_ms)?;
    if let Some(description) = block.take("description")? {
        record.description = description;
    }
    block.finish()?;
    Ok(record)
}

fn parse_learned(mut block: FieldBlock) -> Result<LearnedSpell, String> {
    let index = block.require_u32("index")?;
    let character = block.require_u32("character")?;
    let spell = block.require_u32("spell")?;
    let level = block.take_u8("level", 1)?;
    let mut record = LearnedSpell::new(index, character, spell, level);
    record.experience = block.take_u32("experience", record.experience)?;
    block.finish()?;
    Ok(record)
}

fn parse_tier_u16(block: &FieldBlock, key: &str, raw: &str) -> Result<[u16; SPELL_TIERS], String> {
    let mut out = [0u16; SPELL_TIERS];
    parse_tier_values(block, key, raw, &mut out, |token| token.parse::<u16>().ok())?;
    Ok(out)
}

fn parse_tier_u32(block: &FieldBlock, key: &str, raw: &str) -> Result<[u32; SPELL_TIERS], String> {
    let mut out = [0u32; SPELL_TIERS];
    parse_tier_values(block, key, raw, &mut out, |token| token.parse::<u32>().ok())?;
    Ok(out)
}

fn parse_tier_values<N: Copy>(
    block: &FieldBlock,
    key: &str,
    raw: &str,
    out: &mut [N; SPELL_TIERS],
    parse: fn(&str) -> Option<N>,
) -> Result<(), String> {
    let tokens: Vec<&str> = raw.split_whitespace().collect();
    if tokens.len() != SPELL_TIERS {
        return Err(format!(
            "{} field '{}' needs {} values near line {}, got {}",
            block.label(),
            key,
            SPELL_TIERS,
            block.line_no(),
            tokens.len()
        ));
    }
    for (slot, token) in out.iter_mut().zip(tokens) {
        *slot = parse(token).ok_or_else(|| {
            format!(
                "{} field '{}' has invalid number near line {}, got '{}'",
                block.label(),
                key,
                block.line_no(),
                token
            )
        })?;
    }
    Ok(())
}

fn bool_flag(value: bool) -> &'static str {
    if value {
        "1"
    } else {
        "0"
    }
}

fn serialize_accounts(set: &RecordSet<AccountRecord>) -> String {
    let mut lines = Vec::new();
    for record in set.iter() {
        lines.push(format!("index = {}", record.index));
        lines.push(format!("email = {}", record.email));
        lines.push(format!("role = {}", record.role));
        lines.push(format!("game_gold = {}", record.game_gold));
        lines.push(format!("hunt_gold = {}", record.hunt_gold));
        lines.push(format!("banned = {}", bool_flag(record.banned)));
        lines.push(format!("created_at = {}", record.created_at));
        lines.push(String::new());
    }
    lines.join("\n")
}

fn serialize_characters(set: &RecordSet<CharacterRecord>) -> String {
    let mut lines = Vec::new();
    for record in set.iter() {
        lines.push(format!("index = {}", record.index));
        lines.push(format!("account = {}", record.account));
        lines.push(format!("name = {}", record.name));
        lines.push(format!("class = {}", record.class.name()));
        lines.push(format!("level = {}", record.level));
        lines.push(format!("map = {}", record.map));
        lines.push(format!("x = {}", record.position.x));
        lines.push(format!("y = {}", record.position.y));
        lines.push(String::new());
    }
    lines.join("\n")
}

fn serialize_items(set: &RecordSet<ItemRecord>) -> String {
    let mut lines = Vec::new();
    for record in set.iter() {
        lines.push(format!("index = {}", record.index));
        lines.push(format!("name = {}", record.name));
        lines.push(format!("category = {}", record.category.name()));
        lines.push(format!("required_class = {}", record.required_class.name()));
        lines.push(format!("required_level = {}", record.required_level));
        lines.push(format!("stack_size = {}", record.stack_size));
        lines.push(format!("price = {}", record.price));
        lines.push(format!("weight = {}", record.weight));
        lines.push(format!("durability = {}", record.durability));
        lines.push(format!("rarity = {}", record.rarity.name()));
        lines.push(String::new());
    }
    lines.join("\n")
}

fn serialize_monsters(set: &RecordSet<MonsterRecord>) -> String {
    let mut lines = Vec::new();
    for record in set.iter() {
        lines.push(format!("index = {}", record.index));
        lines.push(format!("name = {}", record.name));
        lines.push(format!("level = {}", record.level));
        lines.push(format!("experience = {}", record.experience));
        lines.push(format!("view_range = {}", record.view_range));
        lines.push(format!("attack_delay = {}", record.attack_delay));
        lines.push(format!("move_delay = {}", record.move_delay));
        lines.push(format!("boss = {}", bool_flag(record.flags.boss)));
        lines.push(format!("undead = {}", bool_flag(record.flags.undead)));
        lines.push(format!("tameable = {}", bool_flag(record.flags.tameable)));
        lines.push(format!("pushable = {}", bool_flag(record.flags.pushable)));
        for (kind, amount) in record.stats.iter() {
            lines.push(format!("stat = {} {}", kind.name(), amount));
        }
        lines.push(String::new());
    }
    lines.join("\n")
}

fn serialize_maps(set: &RecordSet<MapRecord>) -> String {
    let mut lines = Vec::new();
    for record in set.iter() {
        lines.push(format!("index = {}", record.index));
        lines.push(format!("file = {}", record.file_name));
        lines.push(format!("description = {}", record.description));
        lines.push(format!("allow_recall = {}", bool_flag(record.allow_recall)));
        lines.push(format!(
            "allow_teleport = {}",
            bool_flag(record.allow_teleport)
        ));
        lines.push(format!("can_mine = {}", bool_flag(record.can_mine)));
        lines.push(format!("min_level = {}", record.min_level));
        lines.push(format!("max_level = {}", record.max_level));
        lines.push(format!("drop_rate = {}", record.drop_rate));
        lines.push(format!("max_drop_rate = {}", record.max_drop_rate));
        lines.push(format!("experience_rate = {}", record.experience_rate));
        lines.push(format!(
            "max_experience_rate = {}",
            record.max_experience_rate
        ));
        lines.push(format!("gold_rate = {}", record.gold_rate));
        lines.push(format!("max_gold_rate = {}", record.max_gold_rate));
        lines.push(String::new());
    }
    lines.join("\n")
}

fn serialize_spells(set: &RecordSet<SpellRecord>) -> String {
    let mut lines = Vec::new();
    for record in set.iter() {
        lines.push(format!("index = {}", record.index));
        lines.push(format!("name = {}", record.name));
        lines.push(format!("class = {}", record.class.name()));
        lines.push(format!("school = {}", record.school.name()));
        lines.push(format!("mode = {}", record.mode.name()));
        lines.push(format!("min_power = {}", record.min_power));
        lines.push(format!("max_power = {}", record.max_power));
        lines.push(format!("mana_cost = {}", record.mana_cost));
        lines.push(format!("cost_per_level = {}", record.cost_per_level));
        lines.push(format!(
            "need_levels = {} {} {}",
            record.need_levels[0], record.need_levels[1], record.need_levels[2]
        ));
        lines.push(format!(
            "tier_experience = {} {} {}",
            record.tier_experience[0], record.tier_experience[1], record.tier_experience[2]
        ));
        lines.push(format!("delay = {}", record.delay_ms));
        if !record.description.is_empty() {
            lines.push(format!("description = {}", record.description));
        }
        lines.push(String::new());
    }
    lines.join("\n")
}

fn serialize_learned(set: &RecordSet<LearnedSpell>) -> String {
    let mut lines = Vec::new();
    for record in set.iter() {
        lines.push(format!("index = {}", record.index));
        lines.push(format!("character = {}", record.character));
        lines.push(format!("spell = {}", record.spell));
        lines.push(format!("level = {}", record.level));
        lines.push(format!("experience = {}", record.experience));
        lines.push(String::new());
    }
    lines.join("\n")
}
