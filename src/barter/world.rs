//! Block-state model and the world capability the shop logic runs against.

use log::debug;
use std::collections::BTreeMap;

use crate::barter::container::ItemContainer;
use crate::barter::shop::ShopState;
use crate::barter::types::{BlockPos, ItemStack};

/// A plain storage block (chest) with no shop attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerState {
    pub container: ItemContainer,
}

impl ContainerState {
    pub fn new(container: ItemContainer) -> Self {
        Self { container }
    }
}

/// Block states the shop logic cares about.
#[derive(Debug, Clone, PartialEq)]
pub enum BlockState {
    Shop(Box<ShopState>),
    Container(ContainerState),
}

impl BlockState {
    pub fn as_shop(&self) -> Option<&ShopState> {
        match self {
            BlockState::Shop(shop) => Some(&**shop),
            BlockState::Container(_) => None,
        }
    }

    pub fn as_shop_mut(&mut self) -> Option<&mut ShopState> {
        match self {
            BlockState::Shop(shop) => Some(&mut **shop),
            BlockState::Container(_) => None,
        }
    }

    pub fn can_destroy(&self) -> bool {
        match self {
            BlockState::Shop(shop) => shop.can_destroy(),
            BlockState::Container(_) => true,
        }
    }
}

/// Items spilled into the world by breaking a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropEvent {
    pub pos: BlockPos,
    pub stack: ItemStack,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakOutcome {
    Broken { dropped: usize },
    Refused,
    Empty,
}

/// Block storage for one world (dimension).
pub trait BlockWorld: Send {
    /// Dimension name, used for claim lookups and persistence keys.
    fn name(&self) -> &str;

    fn block_id(&self, pos: BlockPos) -> Option<&str>;

    fn state(&self, pos: BlockPos) -> Option<&BlockState>;

    fn state_mut(&mut self, pos: BlockPos) -> Option<&mut BlockState>;

    /// Install `state` on an existing block, returning the previous state.
    /// Returns `Err(state)` when there is no block at `pos`.
    fn replace_state(&mut self, pos: BlockPos, state: BlockState) -> Result<Option<BlockState>, BlockState>;

    /// Detach the state from a block, leaving the block itself in place.
    fn take_state(&mut self, pos: BlockPos) -> Option<BlockState>;

    fn place_block(&mut self, pos: BlockPos, block_id: &str, state: Option<BlockState>);

    /// Destroy the block through the engine's normal path, spilling container contents.
    fn break_block(&mut self, pos: BlockPos) -> BreakOutcome;

    fn shop_positions(&self) -> Vec<BlockPos>;

    fn shop(&self, pos: BlockPos) -> Option<&ShopState> {
        self.state(pos).and_then(BlockState::as_shop)
    }

    fn shop_mut(&mut self, pos: BlockPos) -> Option<&mut ShopState> {
        self.state_mut(pos).and_then(BlockState::as_shop_mut)
    }

    fn is_shop(&self, pos: BlockPos) -> bool {
        self.shop(pos).is_some()
    }
}

#[derive(Debug, Clone)]
struct Block {
    id: String,
    state: Option<BlockState>,
}

/// In-memory world used by the runtime and in tests.
#[derive(Debug, Clone)]
pub struct MemoryWorld {
    name: String,
    blocks: BTreeMap<BlockPos, Block>,
    drops: Vec<DropEvent>,
}

impl MemoryWorld {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            blocks: BTreeMap::new(),
            drops: Vec::new(),
        }
    }

    /// Place a chest-like block holding `container`.
    pub fn place_container(&mut self, pos: BlockPos, block_id: &str, container: ItemContainer) {
        self.place_block(
            pos,
            block_id,
            Some(BlockState::Container(ContainerState::new(container))),
        );
    }

    pub fn drops(&self) -> &[DropEvent] {
        &self.drops
    }

    pub fn container_at(&self, pos: BlockPos) -> Option<&ItemContainer> {
        match self.state(pos)? {
            BlockState::Container(state) => Some(&state.container),
            BlockState::Shop(shop) => Some(shop.container()),
        }
    }
}

impl BlockWorld for MemoryWorld {
    fn name(&self) -> &str {
        &self.name
    }

    fn block_id(&self, pos: BlockPos) -> Option<&str> {
        self.blocks.get(&pos).map(|b| b.id.as_str())
    }

    fn state(&self, pos: BlockPos) -> Option<&BlockState> {
        self.blocks.get(&pos).and_then(|b| b.state.as_ref())
    }

    fn state_mut(&mut self, pos: BlockPos) -> Option<&mut BlockState> {
        self.blocks.get_mut(&pos).and_then(|b| b.state.as_mut())
    }

    fn replace_state(&mut self, pos: BlockPos, state: BlockState) -> Result<Option<BlockState>, BlockState> {
        match self.blocks.get_mut(&pos) {
            Some(block) => Ok(block.state.replace(state)),
            None => Err(state),
        }
    }

    fn take_state(&mut self, pos: BlockPos) -> Option<BlockState> {
        self.blocks.get_mut(&pos).and_then(|b| b.state.take())
    }

    fn place_block(&mut self, pos: BlockPos, block_id: &str, state: Option<BlockState>) {
        self.blocks.insert(
            pos,
            Block {
                id: block_id.to_string(),
                state,
            },
        );
    }

    fn break_block(&mut self, pos: BlockPos) -> BreakOutcome {
        let Some(block) = self.blocks.get(&pos) else {
            return BreakOutcome::Empty;
        };
        if block.state.as_ref().is_some_and(|s| !s.can_destroy()) {
            debug!("{}: refused to destroy block at {}", self.name, pos);
            return BreakOutcome::Refused;
        }
        let Some(block) = self.blocks.remove(&pos) else {
            return BreakOutcome::Empty;
        };
        let spilled: Vec<ItemStack> = match block.state {
            Some(BlockState::Container(state)) => state.container.iter().cloned().collect(),
            Some(BlockState::Shop(shop)) => shop.container().iter().cloned().collect(),
            None => Vec::new(),
        };
        let dropped = spilled.len();
        self.drops
            .extend(spilled.into_iter().map(|stack| DropEvent { pos, stack }));
        BreakOutcome::Broken { dropped }
    }

    fn shop_positions(&self) -> Vec<BlockPos> {
        self.blocks
            .iter()
            .filter(|(_, b)| matches!(b.state, Some(BlockState::Shop(_))))
            .map(|(pos, _)| *pos)
            .collect()
    }
}
