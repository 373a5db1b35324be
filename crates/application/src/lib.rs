//! 应用层实现。
//!
//! 围绕领域模型的用例服务：会话命令处理、存活清扫，
//! 以及对存储与时钟协作者的抽象。

pub mod clock;
pub mod dto;
pub mod error;
pub mod memory;
pub mod repository;
pub mod services;
pub mod sweeper;

pub use clock::{Clock, SystemClock};
pub use dto::{MessageDto, ParticipantDto};
pub use error::{ApplicationError, ApplicationResult};
pub use memory::{InMemoryMessageLog, InMemoryParticipantRegistry};
pub use repository::{
    InsertOutcome, MessageLog, MutationOutcome, ParticipantRegistry, StorageError,
};
pub use services::{RelayDependencies, RelayService};
pub use sweeper::{EvictionSweeper, SweeperConfig};
