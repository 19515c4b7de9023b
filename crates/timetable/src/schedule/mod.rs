/// Day and week schedule engine
mod clock;
mod day;
mod period;
mod week;

pub use clock::{compute_end_time, ClockTime};
pub use day::DaySchedule;
pub use period::{
    duration_label, ClassPeriod, ClassType, Group, PeriodField, DEFAULT_DURATION, REPEAT_COUNTS,
    STANDARD_DURATIONS,
};
pub use week::{DaySet, WeekSchedule, Weekday};
