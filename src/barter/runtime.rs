//! Per-world executor.
//!
//! Every world owns one tokio task holding its [`WorldContext`]. Anything that touches
//! shop state (trades, config saves, license use, admin commands) is shipped to that
//! task as a closure through [`WorldHandle::run`], so jobs for one world never overlap.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use log::{debug, error, info};
use tokio::sync::{mpsc, oneshot};

use crate::barter::admin::AdminModeRegistry;
use crate::barter::claims::ClaimChecker;
use crate::barter::commands::{self, BarterCommand, CommandSender};
use crate::barter::config_surface::{ConfigEnv, ConfigOutcome, ConfigSession};
use crate::barter::entities::EntityStore;
use crate::barter::errors::BarterError;
use crate::barter::interaction::{Actor, InteractionDispatcher, InteractionEnv, SurfaceKind, SurfaceRequest, UseBlockEvent};
use crate::barter::item::ItemCatalog;
use crate::barter::lifecycle::{self, LicenseRejection};
use crate::barter::protection::{self, BlockChangeEvent};
use crate::barter::storage::{BarterStore, SaveStats};
use crate::barter::trade_surface::TradeSession;
use crate::barter::types::{BlockPos, PlayerId};
use crate::barter::world::{BlockWorld, BreakOutcome};
use crate::config::Config;
use crate::logutil::{escape_log, player_tag};

/// Admin mode is global, so every world shares one registry.
pub type SharedAdmin = Arc<Mutex<AdminModeRegistry>>;

pub fn shared_admin() -> SharedAdmin {
    Arc::new(Mutex::new(AdminModeRegistry::new()))
}

/// The surface a player currently has open.
#[derive(Debug, Clone)]
pub enum OpenSurface {
    Config(ConfigSession),
    Trade(TradeSession),
}

/// State owned by a world's executor task.
pub struct WorldContext {
    pub world: Box<dyn BlockWorld>,
    pub entities: Box<dyn EntityStore>,
    pub catalog: Box<dyn ItemCatalog>,
    pub config: Arc<Config>,
    pub claims: Arc<dyn ClaimChecker>,
    pub admin: SharedAdmin,
    pub dispatcher: InteractionDispatcher,
    pub players: HashMap<PlayerId, Actor>,
    pub sessions: HashMap<PlayerId, OpenSurface>,
    pub store: Option<Arc<BarterStore>>,
}

impl WorldContext {
    pub fn new(
        world: Box<dyn BlockWorld>,
        entities: Box<dyn EntityStore>,
        config: Arc<Config>,
        claims: Arc<dyn ClaimChecker>,
        admin: SharedAdmin,
    ) -> Self {
        let catalog = Box::new(config.shop.catalog());
        Self {
            world,
            entities,
            catalog,
            config,
            claims,
            admin,
            dispatcher: InteractionDispatcher::with_shop_handler(),
            players: HashMap::new(),
            sessions: HashMap::new(),
            store: None,
        }
    }

    pub fn with_store(mut self, store: Arc<BarterStore>) -> Self {
        self.store = Some(store);
        self
    }

    fn admin_registry(&self) -> MutexGuard<'_, AdminModeRegistry> {
        // A panicked job cannot leave the set half-updated, so poisoning is ignored.
        self.admin.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn join(&mut self, actor: Actor) {
        debug!("{} joined world {}", escape_log(&actor.name), self.world.name());
        self.players.insert(actor.id, actor);
    }

    /// Drop the player's session and admin flag.
    pub fn leave(&mut self, player: PlayerId) -> Option<Actor> {
        self.sessions.remove(&player);
        self.admin_registry().on_disconnect(player);
        self.players.remove(&player)
    }

    pub fn player(&self, player: PlayerId) -> Option<&Actor> {
        self.players.get(&player)
    }

    pub fn player_mut(&mut self, player: PlayerId) -> Option<&mut Actor> {
        self.players.get_mut(&player)
    }

    pub fn session(&self, player: PlayerId) -> Option<&OpenSurface> {
        self.sessions.get(&player)
    }

    /// Dispatch a use-block interaction. When a surface is requested it is opened for
    /// the player, replacing any surface they already had.
    pub fn use_block(&mut self, player: PlayerId, event: &mut UseBlockEvent) -> Option<SurfaceRequest> {
        let actor = self.players.get(&player)?;
        let request = {
            let admin = self.admin.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            let env = InteractionEnv {
                world: self.world.as_ref(),
                admin: &admin,
                admin_permission: &self.config.shop.admin_permission,
            };
            self.dispatcher.dispatch(&env, actor, event)
        }?;
        let surface = match request.kind {
            SurfaceKind::Config => {
                OpenSurface::Config(ConfigSession::open(self.world.as_ref(), request.pos, &self.config))
            }
            SurfaceKind::Trade => OpenSurface::Trade(TradeSession::open(request.pos)),
        };
        self.sessions.insert(player, surface);
        Some(request)
    }

    /// Feed a surface action token to the player's open surface. Returns chat lines for
    /// the player; the surface is dropped when it closes.
    pub fn surface_action(&mut self, player: PlayerId, token: &str, shift_held: bool) -> Vec<String> {
        let (Some(session), Some(actor)) = (self.sessions.get_mut(&player), self.players.get_mut(&player)) else {
            return Vec::new();
        };
        match session {
            OpenSurface::Config(session) => {
                let env = ConfigEnv {
                    world: self.world.as_mut(),
                    entities: self.entities.as_mut(),
                    config: self.config.as_ref(),
                };
                match session.handle(env, actor, token) {
                    ConfigOutcome::Closed { messages } => {
                        self.sessions.remove(&player);
                        messages
                    }
                    ConfigOutcome::Updated | ConfigOutcome::Ignored => Vec::new(),
                }
            }
            OpenSurface::Trade(session) => {
                let pos = session.pos();
                let Some(result) = session.handle(self.world.as_mut(), self.catalog.as_ref(), actor, token, shift_held)
                else {
                    return Vec::new();
                };
                if result.is_success() {
                    if let Some(store) = &self.store {
                        let line = format!(
                            "{} {} {}: {}",
                            self.world.name(),
                            pos,
                            player_tag(&actor.name, actor.id),
                            result.message()
                        );
                        if let Err(e) = store.append_log(&line) {
                            error!("failed to append trade log: {}", e);
                        }
                    }
                }
                vec![result.message().to_string()]
            }
        }
    }

    pub fn close_surface(&mut self, player: PlayerId) -> Option<OpenSurface> {
        self.sessions.remove(&player)
    }

    /// Use the player's held license on `pos`. Returns the confirmation for the player.
    pub fn use_license(&mut self, player: PlayerId, pos: BlockPos) -> Result<&'static str, LicenseRejection> {
        let Some(actor) = self.players.get_mut(&player) else {
            return Err(LicenseRejection::NotHoldingLicense(self.config.license.display_name.clone()));
        };
        lifecycle::create_shop(
            self.world.as_mut(),
            self.claims.as_ref(),
            &self.config.license,
            actor,
            pos,
        )?;
        Ok(lifecycle::MSG_SHOP_CREATED)
    }

    /// Break a block on behalf of a player, subject to shop protection.
    pub fn break_block(&mut self, player: PlayerId, pos: BlockPos) -> Result<BreakOutcome, &'static str> {
        let mut event = BlockChangeEvent::new(pos);
        if let Some(message) = protection::guard_break(self.world.as_ref(), &mut event) {
            debug!("break by {} at {} denied", player, pos);
            return Err(message);
        }
        Ok(self.world.break_block(pos))
    }

    /// Place a block on behalf of a player, subject to shop protection.
    pub fn place_block(&mut self, player: PlayerId, pos: BlockPos, block_id: &str) -> Result<(), &'static str> {
        let mut event = BlockChangeEvent::new(pos);
        if let Some(message) = protection::guard_place(self.world.as_ref(), &mut event) {
            debug!("place by {} at {} denied", player, pos);
            return Err(message);
        }
        self.world.place_block(pos, block_id, None);
        Ok(())
    }

    /// Run a `/barterchest` command. `None` as the player means the console.
    pub fn command(&mut self, player: Option<PlayerId>, input: &str) -> Vec<String> {
        let Some(command) = BarterCommand::parse(input) else {
            return commands::help_lines();
        };
        let actor = player.and_then(|id| self.players.get(&id));
        let sender = match actor {
            Some(actor) => CommandSender::Player(actor),
            None => CommandSender::Console,
        };
        let mut admin = self.admin.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        commands::execute(command, sender, &mut admin, self.entities.as_mut(), &self.config)
    }

    /// Write dirty shops through the attached store, if any.
    pub fn persist(&mut self) -> Result<SaveStats, BarterError> {
        match &self.store {
            Some(store) => store.save_world(self.world.as_mut()),
            None => Ok(SaveStats::default()),
        }
    }
}

type Job = Box<dyn FnOnce(&mut WorldContext) + Send>;

enum WorldCommand {
    Run(Job),
    Shutdown(oneshot::Sender<WorldContext>),
}

/// Cloneable handle to a running world executor.
#[derive(Clone, Debug)]
pub struct WorldHandle {
    name: String,
    tx: mpsc::UnboundedSender<WorldCommand>,
}

impl std::fmt::Debug for WorldCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WorldCommand::Run(_) => f.write_str("Run"),
            WorldCommand::Shutdown(_) => f.write_str("Shutdown"),
        }
    }
}

impl WorldHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    fn closed(&self) -> BarterError {
        BarterError::WorldClosed(self.name.clone())
    }

    /// Run `job` on the world's executor and wait for its result.
    pub async fn run<F, R>(&self, job: F) -> Result<R, BarterError>
    where
        F: FnOnce(&mut WorldContext) -> R + Send + 'static,
        R: Send + 'static,
    {
        let (reply_tx, reply_rx) = oneshot::channel();
        let job: Job = Box::new(move |ctx| {
            let _ = reply_tx.send(job(ctx));
        });
        self.tx
            .send(WorldCommand::Run(job))
            .map_err(|_| self.closed())?;
        reply_rx.await.map_err(|_| self.closed())
    }

    /// Stop the executor after queued jobs finish and hand back its context.
    pub async fn shutdown(&self) -> Result<WorldContext, BarterError> {
        let (tx, rx) = oneshot::channel();
        self.tx
            .send(WorldCommand::Shutdown(tx))
            .map_err(|_| self.closed())?;
        rx.await.map_err(|_| self.closed())
    }
}

/// Spawn the executor task for one world. Must be called inside a tokio runtime.
pub fn spawn_world(ctx: WorldContext) -> WorldHandle {
    let name = ctx.world.name().to_string();
    let (tx, mut rx) = mpsc::unbounded_channel::<WorldCommand>();
    let handle = WorldHandle {
        name: name.clone(),
        tx,
    };
    info!("world {} executor started", name);

    tokio::spawn(async move {
        let mut ctx = ctx;
        while let Some(cmd) = rx.recv().await {
            match cmd {
                WorldCommand::Run(job) => job(&mut ctx),
                WorldCommand::Shutdown(done) => {
                    info!("world {} executor stopped", name);
                    let _ = done.send(ctx);
                    return;
                }
            }
        }
        debug!("world {} executor dropped: no handles left", name);
    });

    handle
}
