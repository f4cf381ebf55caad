//! Infrastructure layer: record store adapters and the application services
//! that run on top of them.

pub mod services;
pub mod store;

pub use services::{
    AccountService, ActiveMessages, AttendanceService, BroadcastService, LoginOutcome, RosterService,
    ServiceError,
};
pub use store::{
    AttendanceStore, DailyMark, InMemoryRecordStore, MessageStore, PostgresRecordStore, RecordStore,
    StoreError, StoreResult, UserStore,
};
