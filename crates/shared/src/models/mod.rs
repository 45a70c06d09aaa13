pub mod network;
pub mod staker;
