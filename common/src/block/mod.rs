mod block;
mod header;

pub use block::Block;
pub use header::BlockHeader;

// Position of a block in the chain, genesis is 0
pub type BlockNumber = u64;

pub const GENESIS_BLOCK_NUMBER: BlockNumber = 0;
