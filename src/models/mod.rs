pub mod activity;
pub mod bucket;
pub mod lenient;
pub mod plan;
pub mod race;

pub use activity::{NormalizedActivity, RawActivity};
pub use bucket::{Bucket, WeekSummary};
pub use plan::{Intensity, PlanDay, PlanGoal, PlanSource, SavedPlan, TrainingPlan};
pub use race::{DistanceClass, NormalizedRace, RawRace};
