//! Domain model module declarations.

pub mod offer;
pub mod report;
pub mod task;
pub mod task_type;
pub mod user;
pub mod worker;

pub use offer::Offer;
pub use report::{Report, ReportVerdict};
pub use task::{Task, Timeliness};
pub use task_type::{Difficulty, TaskType};
pub use user::User;
pub use worker::{SkillLevel, Worker};
