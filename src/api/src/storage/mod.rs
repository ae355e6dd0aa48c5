//! SQLite storage module for team data
//!
//! Provides persistent storage for athletes, meets and race results.

pub mod repository;
pub mod schema;

pub use repository::{
    Athlete, AthleteParams, Meet, MeetParams, MeetResultRow, ResultParams, ResultRecord,
    TeamRepository, TopTimeRow,
};
