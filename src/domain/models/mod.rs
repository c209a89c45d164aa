pub mod config;
pub mod message;
pub mod prediction;
pub mod schedule;
pub mod snapshot;

pub use config::{
    ChannelsConfig, Config, LoggingConfig, ScheduleConfig, StoreConfig, Tunables,
    MAX_OFFSET_LIMIT,
};
pub use message::{CardGroup, InboundMessage, ParsedMessage, Rank};
pub use prediction::{render, MessageRef, Outcome, PredictionRecord, PredictionStatus};
pub use schedule::{
    ImportMode, ImportSummary, ScheduleEntry, ScheduleRow, ScheduleStats, SCHEDULE_MAX_OFFSET,
};
pub use snapshot::{LiveSnapshot, ScheduleSnapshot};
