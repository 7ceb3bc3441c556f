//! `/barterchest` admin command surface.

use log::info;

use crate::barter::admin::AdminModeRegistry;
use crate::barter::entities::EntityStore;
use crate::barter::errors::BarterError;
use crate::barter::interaction::Actor;
use crate::config::Config;
use crate::logutil::escape_log;

pub const MSG_PLAYERS_ONLY: &str = "This command can only be used by players!";
pub const MSG_NO_PERMISSION: &str = "You don't have permission to use this command.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarterCommand {
    Help,
    Admin,
    Cleanup,
}

impl BarterCommand {
    /// Parse `/barterchest [admin|cleanup]`. The leading slash and root word are optional.
    pub fn parse(input: &str) -> Option<Self> {
        let mut words = input.split_whitespace();
        let mut first = words.next().unwrap_or_default().trim_start_matches('/');
        if first.eq_ignore_ascii_case("barterchest") {
            first = words.next().unwrap_or_default();
        }
        match first.to_ascii_lowercase().as_str() {
            "" | "help" => Some(BarterCommand::Help),
            "admin" => Some(BarterCommand::Admin),
            "cleanup" => Some(BarterCommand::Cleanup),
            _ => None,
        }
    }

    pub fn requires_permission(&self) -> bool {
        !matches!(self, BarterCommand::Help)
    }
}

/// Who issued a command.
#[derive(Debug, Clone, Copy)]
pub enum CommandSender<'a> {
    Player(&'a Actor),
    Console,
}

pub fn help_lines() -> Vec<String> {
    vec![
        "BarterChest Commands:".to_string(),
        "  /barterchest admin - Toggle admin mode".to_string(),
        "  /barterchest cleanup - Refresh display for nearby shop".to_string(),
    ]
}

/// Check that `actor` may run `command`.
pub fn authorize(command: BarterCommand, actor: &Actor, config: &Config) -> Result<(), BarterError> {
    if command.requires_permission() && !actor.has_permission(&config.shop.admin_permission) {
        return Err(BarterError::PermissionDenied(format!(
            "{} may not run /barterchest {:?}",
            escape_log(&actor.name),
            command
        )));
    }
    Ok(())
}

/// Run a command and return the lines to send back to the sender.
pub fn execute(
    command: BarterCommand,
    sender: CommandSender<'_>,
    admin: &mut AdminModeRegistry,
    entities: &mut dyn EntityStore,
    config: &Config,
) -> Vec<String> {
    if command == BarterCommand::Help {
        return help_lines();
    }
    let CommandSender::Player(actor) = sender else {
        return vec![MSG_PLAYERS_ONLY.to_string()];
    };
    if let Err(e) = authorize(command, actor, config) {
        info!(target: "security", "{}", e);
        return vec![MSG_NO_PERMISSION.to_string()];
    }
    match command {
        BarterCommand::Help => help_lines(),
        BarterCommand::Admin => {
            if admin.toggle(actor.id) {
                vec!["Admin mode ENABLED - You can now manage any shop".to_string()]
            } else {
                vec!["Admin mode DISABLED - You now interact as a customer".to_string()]
            }
        }
        BarterCommand::Cleanup => cleanup(actor, entities, config.display.cleanup_radius),
    }
}

fn cleanup(actor: &Actor, entities: &mut dyn EntityStore, radius: f64) -> Vec<String> {
    match entities.nearest_non_pickupable(actor.position, radius) {
        Some((id, distance)) if entities.despawn(id) => {
            info!(
                "{} removed floating item {} at distance {:.1}",
                escape_log(&actor.name),
                id,
                distance
            );
            vec![format!("Removed floating item {:.1} blocks away", distance)]
        }
        _ => vec![format!(
            "No floating items found within {} blocks",
            radius as i64
        )],
    }
}
