pub mod candidate;
pub mod dm_time;
pub mod time_frequency;

pub use candidate::{Candidate, CandidateList};
pub use dm_time::{DmTime, DmTimeSlice};
pub use time_frequency::TimeFrequency;
