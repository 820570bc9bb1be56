//! Background protocol modules: task broadcast fan-out with offer
//! retraction, and the scheduled-time reminder sweep.

pub mod broadcast;
pub mod reminder;
