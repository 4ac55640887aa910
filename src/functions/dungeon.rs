//! Game mechanics for an AI dungeon master: dice, character stats,
//! inventory, turn-based combat and random encounters. State is shared
//! between calls and persisted as JSON.

use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, info};
use uuid::Uuid;

use super::{definition, int_arg_or, string_arg, text_arg};
use crate::function_registry::FunctionRegistry;

pub const CLASSES: &[&str] = &["Warrior", "Mage", "Rogue"];
pub const DEFAULT_SAVE_FILE: &str = "dungeon_save.json";

const POTION_HEAL: i64 = 30;
const LEVEL_HEALTH_BONUS: i64 = 20;
const TREASURES: &[&str] = &["Magic Ring", "Silver Dagger", "Enchanted Amulet", "Health Potion", "Mana Potion"];

pub trait Dice: Send {
    /// A uniform roll in `1..=sides`.
    fn roll(&mut self, sides: u32) -> u32;
}

/// Draws from the random bits of a v4 uuid.
pub struct RandomDice;

impl Dice for RandomDice {
    fn roll(&mut self, sides: u32) -> u32 {
        let sides = sides.max(1);
        (Uuid::new_v4().as_u128() % u128::from(sides)) as u32 + 1
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Player {
    pub name: String,
    pub class: String,
    pub level: u32,
    pub health: i64,
    pub max_health: i64,
    pub experience: i64,
    pub gold: i64,
    pub inventory: Vec<String>,
    pub location: String,
    pub story_progress: String,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            name: "Adventurer".to_string(),
            class: "Warrior".to_string(),
            level: 1,
            health: 100,
            max_health: 100,
            experience: 0,
            gold: 50,
            inventory: vec!["Health Potion".to_string(), "Rusty Sword".to_string()],
            location: "Village Tavern".to_string(),
            story_progress: "beginning".to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct SessionStats {
    pub battles_won: u32,
    pub treasures_found: u32,
    pub skills_used: u32,
    pub dice_rolled: u32,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct GameState {
    pub player: Player,
    pub session_stats: SessionStats,
}

#[derive(Serialize, Deserialize)]
struct SaveFile {
    player: Player,
    session_stats: SessionStats,
    #[serde(default)]
    saved_at: Option<DateTime<Local>>,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct Roll {
    pub purpose: String,
    pub num_dice: u32,
    pub sides: u32,
    pub rolls: Vec<u32>,
    pub modifier: i64,
    pub total: i64,
    pub description: &'static str,
    pub timestamp: String,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct CombatRound {
    pub round: u32,
    pub player_roll: i64,
    pub player_damage: i64,
    pub enemy_damage: i64,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct CombatLog {
    pub enemy: String,
    pub enemy_attack: i64,
    pub rounds: Vec<CombatRound>,
    pub victory: bool,
    pub player_health_start: i64,
    pub player_health_end: i64,
    pub xp_reward: i64,
    pub gold_reward: i64,
    pub treasure: Option<String>,
}

enum Encounter {
    Combat { enemy: &'static str, health: i64, attack: i64 },
    Treasure { item: &'static str, gold: i64 },
    Skill { challenge: &'static str, difficulty: i64 },
}

const WILDERNESS: &[Encounter] = &[
    Encounter::Combat { enemy: "Goblin Scout", health: 20, attack: 6 },
    Encounter::Combat { enemy: "Wild Wolf", health: 25, attack: 8 },
    Encounter::Treasure { item: "Ancient Coin", gold: 25 },
    Encounter::Treasure { item: "Health Potion", gold: 0 },
    Encounter::Skill { challenge: "Navigate through thorns", difficulty: 12 },
];

const DUNGEON: &[Encounter] = &[
    Encounter::Combat { enemy: "Skeleton Warrior", health: 35, attack: 10 },
    Encounter::Combat { enemy: "Cave Spider", health: 15, attack: 12 },
    Encounter::Treasure { item: "Magic Sword", gold: 50 },
    Encounter::Skill { challenge: "Pick ancient lock", difficulty: 15 },
];

const VILLAGE: &[Encounter] = &[
    Encounter::Treasure { item: "Village Gift", gold: 10 },
    Encounter::Skill { challenge: "Persuade merchant for discount", difficulty: 10 },
];

pub struct Game {
    pub state: GameState,
    dice: Box<dyn Dice>,
    save_path: PathBuf,
}

pub type SharedGame = Arc<Mutex<Game>>;

impl Game {
    pub fn new(dice: Box<dyn Dice>, save_path: impl Into<PathBuf>) -> Self {
        Self {
            state: GameState::default(),
            dice,
            save_path: save_path.into(),
        }
    }

    pub fn shared(self) -> SharedGame {
        Arc::new(Mutex::new(self))
    }

    /// Unknown classes fall back to Warrior; blank names to Adventurer.
    pub fn create_character(&mut self, name: &str, class: &str) {
        let player = &mut self.state.player;
        player.name = match name.trim() {
            "" => "Adventurer".to_string(),
            name => name.to_string(),
        };
        player.class = CLASSES
            .iter()
            .find(|c| c.eq_ignore_ascii_case(class.trim()))
            .unwrap_or(&"Warrior")
            .to_string();
    }

    pub fn roll(&mut self, num_dice: u32, sides: u32, modifier: i64, purpose: &str) -> Roll {
        let rolls: Vec<u32> = (0..num_dice).map(|_| self.dice.roll(sides)).collect();
        let total = rolls.iter().map(|r| i64::from(*r)).sum::<i64>() + modifier;
        self.state.session_stats.dice_rolled += num_dice;

        let description = if rolls.contains(&20) {
            "🌟 CRITICAL SUCCESS! The dice gods smile upon you!"
        } else if rolls.contains(&1) {
            "💥 CRITICAL FAILURE! Even heroes have bad days..."
        } else if total >= 15 {
            "🎲 Excellent roll! Fortune favors the bold!"
        } else if total >= 10 {
            "🎲 Solid roll! You're doing well!"
        } else {
            "🎲 Challenging roll! But heroes overcome obstacles!"
        };
        debug!(purpose, ?rolls, total, "dice rolled");

        Roll {
            purpose: purpose.to_string(),
            num_dice,
            sides,
            rolls,
            modifier,
            total,
            description,
            timestamp: Local::now().format("%H:%M:%S").to_string(),
        }
    }

    pub fn stats(&self) -> Value {
        let p = &self.state.player;
        json!({
            "name": p.name,
            "class": p.class,
            "level": p.level,
            "health": format!("{}/{}", p.health, p.max_health),
            "experience": p.experience,
            "gold": p.gold,
            "location": p.location
        })
    }

    /// Applies `amount` to a stat and returns its new value, or the level-up
    /// summary when experience crosses the next threshold.
    pub fn modify_stat(&mut self, stat: &str, amount: i64) -> Result<Value, String> {
        let p = &mut self.state.player;
        match stat {
            "health" => {
                p.health = (p.health + amount).clamp(0, p.max_health);
                Ok(json!(p.health))
            }
            "experience" => {
                p.experience += amount;
                if p.experience >= i64::from(p.level) * 100 {
                    return Ok(self.level_up());
                }
                Ok(json!(p.experience))
            }
            "gold" => {
                p.gold = (p.gold + amount).max(0);
                Ok(json!(p.gold))
            }
            "level" => Err("level only changes through the level_up action".to_string()),
            other => Err(format!("unknown stat '{other}'")),
        }
    }

    pub fn level_up(&mut self) -> Value {
        let p = &mut self.state.player;
        p.level += 1;
        p.max_health += LEVEL_HEALTH_BONUS;
        p.health = p.max_health;
        let abilities: Vec<&str> = match p.class.as_str() {
            "Warrior" => vec!["🛡️ Improved Defense"],
            "Mage" => vec!["🔮 New Spell Learned"],
            "Rogue" => vec!["🗡️ Sneak Attack Improved"],
            _ => Vec::new(),
        };
        info!(level = p.level, "player levelled up");
        json!({
            "new_level": p.level,
            "health_bonus": LEVEL_HEALTH_BONUS,
            "new_max_health": p.max_health,
            "abilities_unlocked": abilities
        })
    }

    pub fn add_item(&mut self, item: &str, quantity: u32) -> String {
        for _ in 0..quantity {
            self.state.player.inventory.push(item.to_string());
        }
        self.state.session_stats.treasures_found += 1;
        format!("Added {item}")
    }

    fn take_item(&mut self, item: &str) -> bool {
        let inventory = &mut self.state.player.inventory;
        match inventory.iter().position(|i| i == item) {
            Some(idx) => {
                inventory.remove(idx);
                true
            }
            None => false,
        }
    }

    pub fn use_item(&mut self, item: &str) -> Result<String, String> {
        if !self.take_item(item) {
            return Ok(format!("You don't have {item}!"));
        }
        if item.contains("Health Potion") {
            self.modify_stat("health", POTION_HEAL)?;
            Ok(format!("Used {item} - healed {POTION_HEAL} health!"))
        } else if item.contains("Mana Potion") {
            Ok(format!("Used {item} - mana restored!"))
        } else {
            Ok(format!("Used {item}"))
        }
    }

    /// Fights until one side drops. A defeated player respawns in the
    /// village with 1 health.
    pub fn combat(&mut self, enemy: &str, enemy_health: i64, enemy_attack: i64) -> Result<CombatLog, String> {
        let mut log = CombatLog {
            enemy: enemy.to_string(),
            enemy_attack,
            rounds: Vec::new(),
            victory: false,
            player_health_start: self.state.player.health,
            player_health_end: 0,
            xp_reward: 0,
            gold_reward: 0,
            treasure: None,
        };
        let mut remaining = enemy_health;
        let mut round = 1;

        while remaining > 0 && self.state.player.health > 0 {
            let attack = self.roll(1, 20, 2, "player attack");
            let player_damage = (attack.total - 10).max(1);
            remaining -= player_damage;
            let mut record = CombatRound {
                round,
                player_roll: attack.total,
                player_damage,
                enemy_damage: 0,
            };
            if remaining <= 0 {
                log.victory = true;
                log.rounds.push(record);
                break;
            }
            let counter = self.roll(1, 20, 0, "enemy attack");
            record.enemy_damage = (counter.total - 8).max(1);
            self.state.player.health -= record.enemy_damage;
            log.rounds.push(record);
            round += 1;
        }

        log.player_health_end = self.state.player.health;
        if self.state.player.health <= 0 {
            info!(enemy, "player defeated");
            self.state.player.health = 1;
            self.state.player.location = "Village".to_string();
            return Ok(log);
        }

        log.xp_reward = enemy_health + 10;
        log.gold_reward = 9 + i64::from(self.dice.roll(21));
        self.modify_stat("experience", log.xp_reward)?;
        self.modify_stat("gold", log.gold_reward)?;
        self.state.session_stats.battles_won += 1;
        if self.dice.roll(100) <= 30 {
            let treasure: &str = *self.pick(TREASURES);
            self.add_item(treasure, 1);
            log.treasure = Some(treasure.to_string());
        }
        info!(enemy, rounds = log.rounds.len(), "combat won");
        Ok(log)
    }

    /// Unknown locations use the wilderness table.
    pub fn encounter(&mut self, location: &str) -> Result<Value, String> {
        let table = match location {
            "dungeon" => DUNGEON,
            "village" => VILLAGE,
            _ => WILDERNESS,
        };
        match self.pick(table) {
            Encounter::Combat { enemy, health, attack } => {
                let log = self.combat(enemy, *health, *attack)?;
                serde_json::to_value(log).map_err(|e| e.to_string())
            }
            Encounter::Treasure { item, gold } => {
                self.add_item(item, 1);
                if *gold > 0 {
                    self.modify_stat("gold", *gold)?;
                }
                Ok(json!({ "type": "treasure", "item": item, "gold": gold }))
            }
            Encounter::Skill { challenge, difficulty } => {
                let check = self.roll(1, 20, 3, &format!("skill check: {challenge}"));
                let success = check.total >= *difficulty;
                self.state.session_stats.skills_used += 1;
                let reward = if success {
                    let reward: &str = *self.pick(&["Health Potion", "Gold Coins", "Experience"]);
                    match reward {
                        "Gold Coins" => self.modify_stat("gold", 20)?,
                        "Experience" => self.modify_stat("experience", 25)?,
                        item => json!(self.add_item(item, 1)),
                    };
                    reward
                } else {
                    self.modify_stat("experience", 5)?;
                    "Experience"
                };
                Ok(json!({
                    "type": "skill",
                    "challenge": challenge,
                    "success": success,
                    "roll": check.total,
                    "reward": reward
                }))
            }
        }
    }

    fn pick<'t, T>(&mut self, items: &'t [T]) -> &'t T {
        let idx = self.dice.roll(items.len() as u32) as usize - 1;
        &items[idx.min(items.len() - 1)]
    }

    pub fn save(&self) -> Result<String, String> {
        let save = SaveFile {
            player: self.state.player.clone(),
            session_stats: self.state.session_stats.clone(),
            saved_at: Some(Local::now()),
        };
        let text = serde_json::to_string_pretty(&save).map_err(|e| e.to_string())?;
        fs::write(&self.save_path, text).map_err(|e| format!("Save failed: {e}"))?;
        info!(path = %self.save_path.display(), "game saved");
        Ok("Game saved".to_string())
    }

    /// `Ok(false)` when there is no save file yet.
    pub fn load(&mut self) -> Result<bool, String> {
        let text = match fs::read_to_string(&self.save_path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(format!("Load failed: {e}")),
        };
        let save: SaveFile = serde_json::from_str(&text).map_err(|e| format!("Load failed: {e}"))?;
        self.state = GameState {
            player: save.player,
            session_stats: save.session_stats,
        };
        Ok(true)
    }

    /// Narrator instructions carrying the current character sheet.
    pub fn system_prompt(&self) -> String {
        let p = &self.state.player;
        format!(
            "You are an expert AI Dungeon Master running an interactive RPG adventure. \
You have access to game mechanics through function calls.

Current Game State:
- Player: {} the {} (Level {})
- Health: {}/{}
- Location: {}
- Experience: {} XP
- Gold: {} coins

Narrate with vivid descriptions and present meaningful choices. Use dice rolls for \
every uncertain outcome, and use the stats, inventory, combat and encounter functions \
whenever the story changes them. End by asking the player what they want to do next.",
            p.name, p.class, p.level, p.health, p.max_health, p.location, p.experience, p.gold
        )
    }
}

fn with_game<T>(game: &SharedGame, f: impl FnOnce(&mut Game) -> Result<T, String>) -> Result<T, String> {
    let mut guard = game.lock().map_err(|_| "game state is unavailable".to_string())?;
    f(&mut guard)
}

pub fn roll_dice(game: &SharedGame, input: &Value) -> Result<Value, String> {
    let num_dice = int_arg_or(input, "num_dice", 1)?;
    let sides = int_arg_or(input, "sides", 20)?;
    let modifier = int_arg_or(input, "modifier", 0)?;
    if !(1..=100).contains(&num_dice) || !(2..=1000).contains(&sides) {
        return Err(format!("cannot roll {num_dice}d{sides}"));
    }
    let purpose = text_arg(input, "purpose").unwrap_or_else(|| "general".to_string());
    with_game(game, |g| {
        let roll = g.roll(num_dice as u32, sides as u32, modifier, &purpose);
        serde_json::to_value(roll).map_err(|e| e.to_string())
    })
}

pub fn manage_player_stats(game: &SharedGame, input: &Value) -> Result<Value, String> {
    let action = string_arg(input, "action")?;
    with_game(game, |g| match action.as_str() {
        "get_stats" => Ok(g.stats()),
        "modify" => {
            let stat = string_arg(input, "stat")?;
            let amount = int_arg_or(input, "amount", 0)?;
            g.modify_stat(&stat, amount)
        }
        "level_up" => Ok(g.level_up()),
        other => Err(format!("unknown stats action '{other}'")),
    })
}

pub fn manage_inventory(game: &SharedGame, input: &Value) -> Result<Value, String> {
    let action = string_arg(input, "action")?;
    with_game(game, |g| match action.as_str() {
        "list" => Ok(json!(g.state.player.inventory)),
        "add" => {
            let item = string_arg(input, "item")?;
            let quantity = int_arg_or(input, "quantity", 1)?.clamp(1, 99) as u32;
            Ok(json!(g.add_item(&item, quantity)))
        }
        "remove" => {
            let item = string_arg(input, "item")?;
            Ok(json!(if g.take_item(&item) {
                format!("Used {item}")
            } else {
                format!("Don't have {item}")
            }))
        }
        "use" => {
            let item = string_arg(input, "item")?;
            Ok(json!(g.use_item(&item)?))
        }
        other => Err(format!("unknown inventory action '{other}'")),
    })
}

pub fn combat_system(game: &SharedGame, input: &Value) -> Result<Value, String> {
    let enemy = string_arg(input, "enemy_name")?;
    let health = int_arg_or(input, "enemy_health", 30)?.max(1);
    let attack = int_arg_or(input, "enemy_attack", 8)?;
    with_game(game, |g| {
        let log = g.combat(&enemy, health, attack)?;
        serde_json::to_value(log).map_err(|e| e.to_string())
    })
}

pub fn generate_encounter(game: &SharedGame, input: &Value) -> Result<Value, String> {
    let location = text_arg(input, "location").unwrap_or_else(|| "wilderness".to_string());
    with_game(game, |g| g.encounter(&location))
}

pub fn register(registry: &mut FunctionRegistry, game: SharedGame) {
    type Handler = fn(&SharedGame, &Value) -> Result<Value, String>;
    let handlers: [(&str, &str, Value, Handler); 5] = [
        (
            "roll_dice",
            "Roll dice for combat, skill checks, and random events",
            json!({
                "type": "object",
                "properties": {
                    "num_dice": { "type": "integer", "description": "Number of dice to roll", "default": 1 },
                    "sides": { "type": "integer", "description": "Number of sides on each die", "default": 20 },
                    "modifier": { "type": "integer", "description": "Bonus/penalty to add to roll", "default": 0 },
                    "purpose": { "type": "string", "description": "What the roll is for (e.g., 'attack roll', 'skill check')" }
                },
                "required": ["purpose"]
            }),
            roll_dice,
        ),
        (
            "manage_player_stats",
            "Manage player statistics including health, experience, gold, and level progression",
            json!({
                "type": "object",
                "properties": {
                    "action": { "type": "string", "enum": ["get_stats", "modify", "level_up"] },
                    "stat": { "type": "string", "enum": ["health", "experience", "gold", "level"] },
                    "amount": { "type": "integer", "description": "Amount to add/subtract" }
                },
                "required": ["action"]
            }),
            manage_player_stats,
        ),
        (
            "manage_inventory",
            "Manage player inventory including adding items, using potions, and listing equipment",
            json!({
                "type": "object",
                "properties": {
                    "action": { "type": "string", "enum": ["list", "add", "remove", "use"] },
                    "item": { "type": "string", "description": "Item name" },
                    "quantity": { "type": "integer", "description": "How many items", "default": 1 }
                },
                "required": ["action"]
            }),
            manage_inventory,
        ),
        (
            "combat_system",
            "Run turn-based combat against an enemy with dice rolls and damage",
            json!({
                "type": "object",
                "properties": {
                    "enemy_name": { "type": "string", "description": "Name of the enemy to fight" },
                    "enemy_health": { "type": "integer", "description": "Enemy's health points", "default": 30 },
                    "enemy_attack": { "type": "integer", "description": "Enemy's attack power", "default": 8 }
                },
                "required": ["enemy_name"]
            }),
            combat_system,
        ),
        (
            "generate_encounter",
            "Generate a random combat, treasure or skill encounter",
            json!({
                "type": "object",
                "properties": {
                    "location": { "type": "string", "enum": ["wilderness", "dungeon", "village"] }
                },
                "required": ["location"]
            }),
            generate_encounter,
        ),
    ];
    for (name, description, parameters, handler) in handlers {
        let game = game.clone();
        registry.register(definition(name, description, parameters), move |input| handler(&game, input));
    }

    let no_args = || json!({ "type": "object", "properties": {} });
    let saver = game.clone();
    registry.register(
        definition("save_game_state", "Save the current game progress to continue later", no_args()),
        move |_| with_game(&saver, |g| g.save().map(Value::from)),
    );
    registry.register(
        definition("load_game_state", "Load previously saved game progress", no_args()),
        move |_| {
            with_game(&game, |g| {
                Ok(json!(if g.load()? { "Game loaded" } else { "No save file" }))
            })
        },
    );
}
